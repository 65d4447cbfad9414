//! Built-in defaults, the lowest configuration layer

use serde::{Deserialize, Serialize};

/// Default generator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Directory the artifact `output` paths are relative to
    pub output_root: String,

    /// Metadata file used instead of the compiled-in table
    pub metadata_path: Option<String>,

    /// Families generated when none is named (empty: all)
    pub families: Vec<String>,

    /// Report stale artifacts without writing
    pub dry_run: bool,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            output_root: ".".to_string(),
            metadata_path: None,
            families: Vec::new(),
            dry_run: false,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "output_root": self.output_root,
            "metadata_path": self.metadata_path,
            "families": self.families,
            "generate": {
                "dry_run": self.dry_run
            }
        })
    }
}
