//! Layout composition
//!
//! Turns a `(family, variant)` pair into a complete, resolved document:
//! 1. Look the family up in the registry
//! 2. Let the family assemble its layers and sections ([`LayoutBuilder`])
//! 3. Resolve layer references against the final layer order
//! 4. Attach provenance from the metadata table
//! 5. Validate the result

mod builder;

pub use builder::{FeatureComponents, LayoutBuilder};

use serde_json::Value;
use tracing::debug;

use glove80_spec::{ErrorCode, SpecError};

use crate::document::LayoutPayload;
use crate::families::builtin_registry;
use crate::family::Registry;
use crate::metadata::{MetadataError, MetadataTable};

/// Builds documents from a registry and a metadata table.
pub struct Composer {
    registry: Registry,
    metadata: MetadataTable,
}

impl Composer {
    pub fn new(registry: Registry, metadata: MetadataTable) -> Self {
        Self { registry, metadata }
    }

    /// Built-in families with the compiled-in metadata table.
    pub fn builtin() -> Result<Self, ComposeError> {
        Ok(Self::new(builtin_registry()?, MetadataTable::builtin()?))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn metadata(&self) -> &MetadataTable {
        &self.metadata
    }

    /// Build one variant.
    pub fn build(&self, family: &str, variant: &str) -> Result<LayoutPayload, ComposeError> {
        self.build_with_metadata(family, variant, &self.metadata)
    }

    /// Build one variant against an alternate metadata table.
    pub fn build_with_metadata(
        &self,
        family: &str,
        variant: &str,
        metadata: &MetadataTable,
    ) -> Result<LayoutPayload, ComposeError> {
        let family = self.registry.get(family)?;
        if !family.variants().iter().any(|known| *known == variant) {
            return Err(family.unknown_variant(variant));
        }

        debug!(family = family.name(), variant, "Composing layout");
        let payload = family.build(variant, metadata)?;
        payload.validate()?;
        Ok(payload)
    }

    /// Build one variant and serialize it in the family's field order.
    pub fn build_value(&self, family: &str, variant: &str) -> Result<Value, ComposeError> {
        self.build_value_with_metadata(family, variant, &self.metadata)
    }

    pub fn build_value_with_metadata(
        &self,
        family: &str,
        variant: &str,
        metadata: &MetadataTable,
    ) -> Result<Value, ComposeError> {
        let payload = self.build_with_metadata(family, variant, metadata)?;
        let order = self.registry.get(family)?.field_order();
        let value = match order {
            Some(order) => payload.to_value_ordered(order),
            None => payload.to_value(),
        };
        value.map_err(|e| ComposeError::InvalidDocument(format!("serialization failed: {}", e)))
    }
}

/// Errors raised while composing a document
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("Unknown family '{family}'. Available: {}", available.join(", "))]
    UnknownFamily {
        family: String,
        available: Vec<String>,
    },

    #[error("Unknown variant '{variant}' for family '{family}'. Available: {}", available.join(", "))]
    UnknownVariant {
        family: String,
        variant: String,
        available: Vec<String>,
    },

    #[error("No generated layer data for '{layer}' in variant '{variant}'")]
    MissingLayerData { variant: String, layer: String },

    #[error("No metadata for variant '{variant}' of '{family}'")]
    UnknownVariantMetadata { family: String, variant: String },

    #[error("Family '{0}' is already registered")]
    DuplicateFamily(String),

    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Digest failed: {0}")]
    Digest(String),
}

impl ComposeError {
    /// Returns the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            ComposeError::UnknownFamily { .. }
            | ComposeError::UnknownVariant { .. }
            | ComposeError::UnknownVariantMetadata { .. } => ErrorCode::UnknownReference,
            ComposeError::MissingLayerData { .. } => ErrorCode::MissingLayerData,
            ComposeError::Spec(err) => err.code(),
            ComposeError::Metadata(err) => err.code(),
            ComposeError::DuplicateFamily(_)
            | ComposeError::InvalidDocument(_)
            | ComposeError::Digest(_) => ErrorCode::ValidationError,
        }
    }
}
