//! Store error types.

use std::fmt;

use glove80_spec::{ErrorCode, SpecError};
use serde::Serialize;

use crate::references::References;

/// Kind of entity a store operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Layer,
    Key,
    Macro,
    HoldTap,
    Combo,
    Listener,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Layer => "layer",
            EntityKind::Key => "key",
            EntityKind::Macro => "macro",
            EntityKind::HoldTap => "hold-tap",
            EntityKind::Combo => "combo",
            EntityKind::Listener => "listener",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by [`LayoutStore`](crate::LayoutStore) operations.
///
/// A failed operation never mutates state or history.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Unknown {kind} '{name}'")]
    UnknownReference { kind: EntityKind, name: String },

    #[error("{kind} index {index} is out of range (0..{len})")]
    IndexOutOfRange {
        kind: EntityKind,
        index: i64,
        len: usize,
    },

    #[error("{kind} '{identifier}' is still referenced in {count} place(s)", count = .references.len())]
    ReferencedEntity {
        kind: EntityKind,
        identifier: String,
        references: Box<References>,
    },
}

impl StoreError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn unknown(kind: EntityKind, name: impl Into<String>) -> Self {
        StoreError::UnknownReference {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn out_of_range(kind: EntityKind, index: impl TryInto<i64>, len: usize) -> Self {
        StoreError::IndexOutOfRange {
            kind,
            index: index.try_into().unwrap_or(i64::MAX),
            len,
        }
    }

    /// Returns the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::Validation { .. } => ErrorCode::ValidationError,
            StoreError::UnknownReference { .. } => ErrorCode::UnknownReference,
            StoreError::IndexOutOfRange { .. } => ErrorCode::IndexOutOfRange,
            StoreError::ReferencedEntity { .. } => ErrorCode::ReferencedEntity,
        }
    }
}

impl From<SpecError> for StoreError {
    fn from(err: SpecError) -> Self {
        match err {
            SpecError::UnknownLayerReference(name) => StoreError::unknown(EntityKind::Layer, name),
            SpecError::IndexOutOfRange { index, max } => StoreError::IndexOutOfRange {
                kind: EntityKind::Key,
                index,
                len: max + 1,
            },
            SpecError::Validation { field, message } => StoreError::Validation { field, message },
            other => StoreError::validation("value", other.to_string()),
        }
    }
}
