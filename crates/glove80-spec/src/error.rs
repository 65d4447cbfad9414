//! Error types for spec construction and reference resolution.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable error codes shared by every layer of the layout toolchain.
///
/// These codes are used by automation and by the editor status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Malformed input to a constructor, add or update.
    ValidationError,
    /// A name lookup missed (layer, family, variant, macro, ...).
    UnknownReference,
    /// Layer, key or key-position index outside its range.
    IndexOutOfRange,
    /// Delete blocked by live references.
    ReferencedEntity,
    /// A declared layer has no generated content.
    MissingLayerData,
    /// Reading or writing an artifact failed.
    IoError,
    /// A document or metadata file is not valid JSON.
    JsonError,
    /// The generator configuration could not be loaded.
    ConfigError,
}

impl ErrorCode {
    /// Returns the string representation of the error code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::UnknownReference => "UNKNOWN_REFERENCE",
            ErrorCode::IndexOutOfRange => "INDEX_OUT_OF_RANGE",
            ErrorCode::ReferencedEntity => "REFERENCED_ENTITY",
            ErrorCode::MissingLayerData => "MISSING_LAYER_DATA",
            ErrorCode::IoError => "IO_ERROR",
            ErrorCode::JsonError => "JSON_ERROR",
            ErrorCode::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while building specs or resolving layer references.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpecError {
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Override index {index} is outside the valid range 0-{max}")]
    IndexOutOfRange { index: i64, max: usize },

    #[error("Invalid override index: {0}")]
    InvalidIndexType(String),

    #[error("Unsupported parameter type: {0}")]
    UnsupportedParamType(String),

    #[error("Unknown key name '{0}'")]
    UnknownKeyName(String),

    #[error("Unknown layer reference '{0}'")]
    UnknownLayerReference(String),
}

impl SpecError {
    /// Shorthand for a validation failure on `field`.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SpecError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            SpecError::Validation { .. }
            | SpecError::InvalidIndexType(_)
            | SpecError::UnsupportedParamType(_) => ErrorCode::ValidationError,
            SpecError::IndexOutOfRange { .. } => ErrorCode::IndexOutOfRange,
            SpecError::UnknownKeyName(_) | SpecError::UnknownLayerReference(_) => {
                ErrorCode::UnknownReference
            }
        }
    }
}
