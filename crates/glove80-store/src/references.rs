//! Reference search across key slots and section records.

use serde::Serialize;

use crate::state::{LayoutState, Section};
use crate::walk::contains_string;

/// A key slot that mentions the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyReference {
    pub layer_index: usize,
    pub layer_name: String,
    pub key_index: usize,
}

/// A section record that mentions the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordReference {
    /// Position of the record within its section.
    pub index: usize,
    /// The record's own name or code (empty when it has none).
    pub identifier: String,
}

/// Categorized hit locations for an identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct References {
    pub keys: Vec<KeyReference>,
    pub macros: Vec<RecordReference>,
    pub hold_taps: Vec<RecordReference>,
    pub combos: Vec<RecordReference>,
    pub listeners: Vec<RecordReference>,
}

impl References {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of hits.
    pub fn len(&self) -> usize {
        self.keys.len()
            + self.macros.len()
            + self.hold_taps.len()
            + self.combos.len()
            + self.listeners.len()
    }

    pub fn section(&self, section: Section) -> &[RecordReference] {
        match section {
            Section::Macros => &self.macros,
            Section::HoldTaps => &self.hold_taps,
            Section::Combos => &self.combos,
            Section::Listeners => &self.listeners,
        }
    }

    fn section_mut(&mut self, section: Section) -> &mut Vec<RecordReference> {
        match section {
            Section::Macros => &mut self.macros,
            Section::HoldTaps => &mut self.hold_taps,
            Section::Combos => &mut self.combos,
            Section::Listeners => &mut self.listeners,
        }
    }
}

/// Find every place that mentions `identifier`, a record of `owner`.
///
/// The owning record itself is skipped; its siblings are searched like any
/// other section.
pub fn find_references(state: &LayoutState, owner: Section, identifier: &str) -> References {
    let mut refs = References::default();

    for (layer_index, layer) in state.layers.iter().enumerate() {
        for (key_index, slot) in layer.slots.iter().enumerate() {
            if contains_string(slot, identifier) {
                refs.keys.push(KeyReference {
                    layer_index,
                    layer_name: layer.name.clone(),
                    key_index,
                });
            }
        }
    }

    for section in Section::ALL {
        for (index, record) in state.section(section).iter().enumerate() {
            let record_id = section.identifier(record);
            if section == owner && record_id == Some(identifier) {
                continue;
            }
            if contains_string(record, identifier) {
                refs.section_mut(section).push(RecordReference {
                    index,
                    identifier: record_id.unwrap_or_default().to_string(),
                });
            }
        }
    }

    refs
}
