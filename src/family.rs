//! Layout families and the registry that selects them by name.

use std::collections::BTreeMap;

use crate::compose::ComposeError;
use crate::document::LayoutPayload;
use crate::metadata::MetadataTable;

/// A family of related layout variants built from shared specs.
pub trait Family: Send + Sync {
    /// Registry name (`tailorkey`, `quantum_touch`, ...).
    fn name(&self) -> &str;

    /// Variants this family knows how to build.
    fn variants(&self) -> &[&'static str];

    /// Key of this family in the metadata table.
    fn metadata_key(&self) -> &str {
        self.name()
    }

    /// Explicit top-level field order, if the family's published artifacts
    /// deviate from the default.
    fn field_order(&self) -> Option<&'static [&'static str]> {
        None
    }

    /// Build one variant, attaching provenance from `metadata`.
    fn build(&self, variant: &str, metadata: &MetadataTable)
        -> Result<LayoutPayload, ComposeError>;

    /// `UnknownVariant` for this family.
    fn unknown_variant(&self, variant: &str) -> ComposeError {
        ComposeError::UnknownVariant {
            family: self.name().to_string(),
            variant: variant.to_string(),
            available: self.variants().iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// Families by name. Immutable once start-up registration is done.
#[derive(Default)]
pub struct Registry {
    families: BTreeMap<String, Box<dyn Family>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a family; a second family with the same name is rejected.
    pub fn register(&mut self, family: Box<dyn Family>) -> Result<(), ComposeError> {
        let name = family.name().to_string();
        if self.families.contains_key(&name) {
            return Err(ComposeError::DuplicateFamily(name));
        }
        self.families.insert(name, family);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&dyn Family, ComposeError> {
        self.families
            .get(name)
            .map(|family| family.as_ref())
            .ok_or_else(|| ComposeError::UnknownFamily {
                family: name.to_string(),
                available: self.names().iter().map(|n| n.to_string()).collect(),
            })
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.families.keys().map(String::as_str).collect()
    }

    /// Registered families, sorted by name.
    pub fn families(&self) -> impl Iterator<Item = &dyn Family> {
        self.families.values().map(|family| family.as_ref())
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}
