//! Variant metadata
//!
//! Release provenance per `family -> variant`: where the artifact lives and
//! the title/uuid/date block stamped into the generated document. A copy of
//! the table ships inside the binary; a replacement can be loaded from disk
//! per family.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use glove80_spec::ErrorCode;

use crate::document::Provenance;

/// Metadata table compiled into the binary.
pub const BUILTIN_METADATA: &str = include_str!("../data/variant_metadata.json");

/// Metadata for a single variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantMetadata {
    /// Artifact path, relative to the output root.
    pub output: String,
    #[serde(flatten)]
    pub provenance: Provenance,
}

/// Variants of one family, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FamilyMetadata {
    variants: Vec<(String, VariantMetadata)>,
}

impl FamilyMetadata {
    pub fn get(&self, variant: &str) -> Option<&VariantMetadata> {
        self.variants
            .iter()
            .find(|(name, _)| name == variant)
            .map(|(_, meta)| meta)
    }

    pub fn variants(&self) -> impl Iterator<Item = (&str, &VariantMetadata)> {
        self.variants.iter().map(|(name, meta)| (name.as_str(), meta))
    }

    pub fn names(&self) -> Vec<String> {
        self.variants.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Parse a `variant -> metadata` object for `family`.
    pub fn from_value(family: &str, value: Value) -> Result<Self, MetadataError> {
        let Value::Object(entries) = value else {
            return Err(MetadataError::Shape(format!(
                "metadata for family '{}' must be an object",
                family
            )));
        };
        let mut variants = Vec::with_capacity(entries.len());
        for (variant, raw) in entries {
            let meta: VariantMetadata = serde_json::from_value(raw)?;
            check_uuid(family, &variant, "uuid", meta.provenance.uuid.as_deref())?;
            check_uuid(family, &variant, "parent_uuid", meta.provenance.parent_uuid.as_deref())?;
            variants.push((variant, meta));
        }
        Ok(Self { variants })
    }

    /// Load a per-family metadata file (`variant -> metadata`).
    pub fn load(family: &str, path: &Path) -> Result<Self, MetadataError> {
        let contents = read_file(path)?;
        let value: Value = serde_json::from_str(&contents)?;
        Self::from_value(family, value)
    }
}

/// The whole `family -> variant -> metadata` table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataTable {
    families: Vec<(String, FamilyMetadata)>,
}

impl MetadataTable {
    /// The table shipped with the crate.
    pub fn builtin() -> Result<Self, MetadataError> {
        Self::from_json_str(BUILTIN_METADATA)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, MetadataError> {
        let value: Value = serde_json::from_str(contents)?;
        let Value::Object(families) = value else {
            return Err(MetadataError::Shape(
                "metadata table must be an object keyed by family".to_string(),
            ));
        };
        Self::from_entries(families)
    }

    pub fn load(path: &Path) -> Result<Self, MetadataError> {
        Self::from_json_str(&read_file(path)?)
    }

    fn from_entries(families: Map<String, Value>) -> Result<Self, MetadataError> {
        let mut table = Self::default();
        for (family, variants) in families {
            let parsed = FamilyMetadata::from_value(&family, variants)?;
            table.families.push((family, parsed));
        }
        Ok(table)
    }

    pub fn family(&self, key: &str) -> Option<&FamilyMetadata> {
        self.families
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, family)| family)
    }

    pub fn get(&self, family: &str, variant: &str) -> Option<&VariantMetadata> {
        self.family(family)?.get(variant)
    }

    /// Replace (or add) the metadata of one family.
    pub fn with_family(mut self, key: impl Into<String>, metadata: FamilyMetadata) -> Self {
        let key = key.into();
        match self.families.iter_mut().find(|(name, _)| *name == key) {
            Some(entry) => entry.1 = metadata,
            None => self.families.push((key, metadata)),
        }
        self
    }
}

fn read_file(path: &Path) -> Result<String, MetadataError> {
    fs::read_to_string(path).map_err(|source| MetadataError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn check_uuid(
    family: &str,
    variant: &str,
    field: &'static str,
    value: Option<&str>,
) -> Result<(), MetadataError> {
    match value {
        Some(text) if uuid::Uuid::parse_str(text).is_err() => Err(MetadataError::InvalidUuid {
            family: family.to_string(),
            variant: variant.to_string(),
            field,
            value: text.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Metadata loading errors
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("Failed to read metadata {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid metadata JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid metadata: {0}")]
    Shape(String),

    #[error("Invalid {field} '{value}' for {family}/{variant}")]
    InvalidUuid {
        family: String,
        variant: String,
        field: &'static str,
        value: String,
    },
}

impl MetadataError {
    pub fn code(&self) -> ErrorCode {
        match self {
            MetadataError::Io { .. } => ErrorCode::IoError,
            MetadataError::Json(_) => ErrorCode::JsonError,
            MetadataError::Shape(_) | MetadataError::InvalidUuid { .. } => {
                ErrorCode::ValidationError
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builtin_table_loads() {
        let table = MetadataTable::builtin().unwrap();
        let tailorkey = table.family("tailorkey").unwrap();
        assert_eq!(tailorkey.names(), vec!["windows", "mac", "dual"]);
        let windows = table.get("tailorkey", "windows").unwrap();
        assert!(windows.output.ends_with(".json"));
        assert!(windows.provenance.uuid.is_some());
    }

    #[test]
    fn test_variant_order_follows_file() {
        let table = MetadataTable::from_json_str(
            r#"{"fam": {"zeta": {"output": "z.json"}, "alpha": {"output": "a.json"}}}"#,
        )
        .unwrap();
        assert_eq!(table.family("fam").unwrap().names(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_invalid_uuid_rejected() {
        let raw = json!({"v": {"output": "v.json", "uuid": "not-a-uuid"}});
        let err = FamilyMetadata::from_value("fam", raw).unwrap_err();
        assert!(matches!(err, MetadataError::InvalidUuid { field: "uuid", .. }));
        assert_eq!(err.code(), ErrorCode::ValidationError);
    }

    #[test]
    fn test_missing_output_rejected() {
        let raw = json!({"v": {"title": "No output"}});
        let err = FamilyMetadata::from_value("fam", raw).unwrap_err();
        assert_eq!(err.code(), ErrorCode::JsonError);
    }

    #[test]
    fn test_with_family_replaces() {
        let table = MetadataTable::builtin().unwrap();
        let replacement =
            FamilyMetadata::from_value("default", json!({"only": {"output": "only.json"}}))
                .unwrap();
        let table = table.with_family("default", replacement);
        assert_eq!(table.family("default").unwrap().names(), vec!["only"]);
        assert!(table.family("tailorkey").is_some());
    }
}
