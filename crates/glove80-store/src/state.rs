//! Layout state held by the store, and its import/export form.

use std::collections::HashSet;

use glove80_spec::LAYER_LENGTH;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{EntityKind, StoreError};

/// Top-level payload key for the ordered layer names.
pub const LAYER_NAMES_KEY: &str = "layer_names";

/// Top-level payload key for the dense layers.
pub const LAYERS_KEY: &str = "layers";

/// A section of named records the store manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Macros,
    HoldTaps,
    Combos,
    Listeners,
}

impl Section {
    /// All sections in payload order.
    pub const ALL: [Section; 4] = [
        Section::Macros,
        Section::HoldTaps,
        Section::Combos,
        Section::Listeners,
    ];

    /// Payload key of the section (`holdTaps`, `inputListeners`, ...).
    pub fn payload_key(&self) -> &'static str {
        match self {
            Section::Macros => "macros",
            Section::HoldTaps => "holdTaps",
            Section::Combos => "combos",
            Section::Listeners => "inputListeners",
        }
    }

    /// Field that identifies a record within the section.
    pub fn id_field(&self) -> &'static str {
        match self {
            Section::Listeners => "code",
            _ => "name",
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Section::Macros => EntityKind::Macro,
            Section::HoldTaps => EntityKind::HoldTap,
            Section::Combos => EntityKind::Combo,
            Section::Listeners => EntityKind::Listener,
        }
    }

    /// Identifier of a record in this section, if it has one.
    pub fn identifier<'a>(&self, record: &'a Value) -> Option<&'a str> {
        record.get(self.id_field()).and_then(Value::as_str)
    }
}

/// A named layer and its key slots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerRecord {
    pub name: String,
    pub slots: Vec<Value>,
}

/// Full editable document state.
///
/// Section records are kept as untyped JSON so imported documents round
/// trip exactly.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutState {
    pub layer_names: Vec<String>,
    pub layers: Vec<LayerRecord>,
    pub macros: Vec<Value>,
    pub hold_taps: Vec<Value>,
    pub combos: Vec<Value>,
    pub listeners: Vec<Value>,
    /// Top-level fields the store does not manage (metadata, custom blobs).
    pub fields: Map<String, Value>,
    /// Top-level key order seen at import, used to re-emit the payload.
    key_order: Vec<String>,
}

impl LayoutState {
    /// Import a payload, validating its layer structure.
    pub fn from_payload(payload: &Value) -> Result<Self, StoreError> {
        let object = payload
            .as_object()
            .ok_or_else(|| StoreError::validation("payload", "layout payload must be an object"))?;

        let layer_names = read_layer_names(object.get(LAYER_NAMES_KEY))?;
        let raw_layers = match object.get(LAYERS_KEY) {
            None => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            Some(_) => return Err(StoreError::validation(LAYERS_KEY, "must be an array")),
        };
        if raw_layers.len() != layer_names.len() {
            return Err(StoreError::validation(
                LAYERS_KEY,
                format!(
                    "{} layers for {} layer names",
                    raw_layers.len(),
                    layer_names.len()
                ),
            ));
        }

        let mut layers = Vec::with_capacity(raw_layers.len());
        for (name, raw) in layer_names.iter().zip(raw_layers) {
            let slots = match raw {
                Value::Array(slots) => slots,
                _ => {
                    return Err(StoreError::validation(
                        LAYERS_KEY,
                        format!("layer '{}' must be an array of slots", name),
                    ))
                }
            };
            if slots.len() != LAYER_LENGTH {
                return Err(StoreError::validation(
                    LAYERS_KEY,
                    format!(
                        "layer '{}' has {} slots, expected {}",
                        name,
                        slots.len(),
                        LAYER_LENGTH
                    ),
                ));
            }
            layers.push(LayerRecord {
                name: name.clone(),
                slots,
            });
        }

        let mut state = LayoutState {
            layer_names,
            layers,
            ..LayoutState::default()
        };
        for section in Section::ALL {
            *state.section_mut(section) = read_section(section, object.get(section.payload_key()))?;
        }
        for (key, value) in object {
            state.key_order.push(key.clone());
            if !is_managed_key(key) {
                state.fields.insert(key.clone(), value.clone());
            }
        }
        Ok(state)
    }

    /// Plain payload form: the inverse of [`LayoutState::from_payload`].
    ///
    /// Keys appear in import order; managed keys missing at import are
    /// appended so every section is always present.
    pub fn to_payload(&self) -> Value {
        let mut out = Map::new();
        for key in &self.key_order {
            if let Some(value) = self.field_value(key) {
                out.insert(key.clone(), value);
            }
        }
        for key in [LAYER_NAMES_KEY, LAYERS_KEY]
            .into_iter()
            .chain(Section::ALL.iter().map(Section::payload_key))
        {
            if !out.contains_key(key) {
                if let Some(value) = self.field_value(key) {
                    out.insert(key.to_string(), value);
                }
            }
        }
        for (key, value) in &self.fields {
            if !out.contains_key(key) {
                out.insert(key.clone(), value.clone());
            }
        }
        Value::Object(out)
    }

    pub fn section(&self, section: Section) -> &Vec<Value> {
        match section {
            Section::Macros => &self.macros,
            Section::HoldTaps => &self.hold_taps,
            Section::Combos => &self.combos,
            Section::Listeners => &self.listeners,
        }
    }

    pub fn section_mut(&mut self, section: Section) -> &mut Vec<Value> {
        match section {
            Section::Macros => &mut self.macros,
            Section::HoldTaps => &mut self.hold_taps,
            Section::Combos => &mut self.combos,
            Section::Listeners => &mut self.listeners,
        }
    }

    /// Position of a layer by name.
    pub fn layer_position(&self, name: &str) -> Option<usize> {
        self.layer_names.iter().position(|candidate| candidate == name)
    }

    /// Every mutable JSON tree that can hold references: key slots first,
    /// then each section in payload order.
    pub(crate) fn trees_mut(&mut self) -> impl Iterator<Item = &mut Value> {
        let LayoutState {
            layers,
            macros,
            hold_taps,
            combos,
            listeners,
            ..
        } = self;
        layers
            .iter_mut()
            .flat_map(|layer| layer.slots.iter_mut())
            .chain(macros.iter_mut())
            .chain(hold_taps.iter_mut())
            .chain(combos.iter_mut())
            .chain(listeners.iter_mut())
    }

    fn field_value(&self, key: &str) -> Option<Value> {
        match key {
            LAYER_NAMES_KEY => Some(Value::from(self.layer_names.clone())),
            LAYERS_KEY => Some(Value::Array(
                self.layers
                    .iter()
                    .map(|layer| Value::Array(layer.slots.clone()))
                    .collect(),
            )),
            "macros" => Some(Value::Array(self.macros.clone())),
            "holdTaps" => Some(Value::Array(self.hold_taps.clone())),
            "combos" => Some(Value::Array(self.combos.clone())),
            "inputListeners" => Some(Value::Array(self.listeners.clone())),
            other => self.fields.get(other).cloned(),
        }
    }
}

fn is_managed_key(key: &str) -> bool {
    key == LAYER_NAMES_KEY
        || key == LAYERS_KEY
        || Section::ALL.iter().any(|section| section.payload_key() == key)
}

fn read_layer_names(raw: Option<&Value>) -> Result<Vec<String>, StoreError> {
    let items = match raw {
        None => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(StoreError::validation(LAYER_NAMES_KEY, "must be an array")),
    };
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(items.len());
    for item in items {
        let name = item.as_str().ok_or_else(|| {
            StoreError::validation(LAYER_NAMES_KEY, "layer names must be strings")
        })?;
        if !seen.insert(name) {
            return Err(StoreError::validation(
                LAYER_NAMES_KEY,
                format!("duplicate layer name '{}'", name),
            ));
        }
        names.push(name.to_string());
    }
    Ok(names)
}

fn read_section(section: Section, raw: Option<&Value>) -> Result<Vec<Value>, StoreError> {
    match raw {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => {
            if items.iter().any(|item| !item.is_object()) {
                return Err(StoreError::validation(
                    section.payload_key(),
                    "records must be objects",
                ));
            }
            Ok(items.clone())
        }
        Some(_) => Err(StoreError::validation(
            section.payload_key(),
            "must be an array",
        )),
    }
}

/// Currently selected layer and key; `(-1, -1)` when nothing is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub layer_index: i64,
    pub key_index: i64,
}

impl Selection {
    pub const EMPTY: Selection = Selection {
        layer_index: -1,
        key_index: -1,
    };

    pub fn new(layer_index: usize, key_index: usize) -> Self {
        Self {
            layer_index: layer_index as i64,
            key_index: key_index as i64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.layer_index < 0 || self.key_index < 0
    }

    /// Pull the selection back into the bounds of `state`.
    pub(crate) fn clamped(self, state: &LayoutState) -> Selection {
        let Some(last_layer) = state.layers.len().checked_sub(1) else {
            return Selection::EMPTY;
        };
        let layer = self.layer_index.clamp(0, last_layer as i64);
        let slots = state.layers[layer as usize].slots.len();
        match slots.checked_sub(1) {
            Some(last_key) => Selection {
                layer_index: layer,
                key_index: self.key_index.clamp(0, last_key as i64),
            },
            None => Selection {
                layer_index: layer,
                key_index: -1,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn layer(value: &str) -> Value {
        Value::Array(vec![json!({"value": value, "params": []}); LAYER_LENGTH])
    }

    #[test]
    fn test_round_trip_keeps_key_order() {
        let payload = json!({
            "keyboard": "glove80",
            "layer_names": ["Base"],
            "macros": [],
            "layers": [layer("&kp A")],
            "title": "Demo"
        });
        let state = LayoutState::from_payload(&payload).unwrap();
        let exported = state.to_payload();
        let keys: Vec<&str> = exported.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["keyboard", "layer_names", "macros", "layers", "title", "holdTaps", "combos", "inputListeners"]
        );
        assert_eq!(exported["title"], "Demo");
    }

    #[test]
    fn test_rejects_short_layers() {
        let payload = json!({"layer_names": ["Base"], "layers": [[{"value": "&trans", "params": []}]]});
        let err = LayoutState::from_payload(&payload).unwrap_err();
        assert!(matches!(err, StoreError::Validation { ref field, .. } if field == "layers"));
    }

    #[test]
    fn test_rejects_mismatched_lengths_and_duplicates() {
        let payload = json!({"layer_names": ["Base", "Lower"], "layers": [layer("&kp A")]});
        assert!(LayoutState::from_payload(&payload).is_err());

        let payload = json!({"layer_names": ["Base", "Base"], "layers": [layer("&kp A"), layer("&kp B")]});
        assert!(LayoutState::from_payload(&payload).is_err());
    }

    #[test]
    fn test_section_records_must_be_objects() {
        let payload = json!({"layer_names": [], "layers": [], "combos": [1]});
        let err = LayoutState::from_payload(&payload).unwrap_err();
        assert!(matches!(err, StoreError::Validation { ref field, .. } if field == "combos"));
    }

    #[test]
    fn test_selection_clamp() {
        let payload = json!({"layer_names": ["Base"], "layers": [layer("&kp A")]});
        let state = LayoutState::from_payload(&payload).unwrap();
        let clamped = Selection {
            layer_index: 4,
            key_index: 200,
        }
        .clamped(&state);
        assert_eq!(clamped, Selection::new(0, 79));
        assert_eq!(Selection::new(0, 0).clamped(&LayoutState::default()), Selection::EMPTY);
        assert_eq!(Selection::EMPTY.clamped(&state), Selection::new(0, 0));
    }
}
