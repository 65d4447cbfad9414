//! The layout document
//!
//! A composed layout is a fully resolved JSON document with a fixed
//! top-level field order. This module holds the typed form of that
//! document, the shared metadata block every family starts from and the
//! checks a document must pass before it is handed out.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use glove80_spec::{ALL_LAYERS, LAYER_LENGTH};

use crate::compose::ComposeError;

/// Top-level fields in their default serialization order.
pub const DEFAULT_FIELD_ORDER: &[&str] = &[
    "keyboard",
    "firmware_api_version",
    "locale",
    "unlisted",
    "custom_defined_behaviors",
    "custom_devicetree",
    "config_parameters",
    "layout_parameters",
    "creator",
    "layer_names",
    "macros",
    "holdTaps",
    "combos",
    "inputListeners",
    "layers",
    "title",
    "uuid",
    "parent_uuid",
    "date",
    "notes",
    "tags",
];

/// One `config_parameters` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigParameter {
    #[serde(rename = "paramName")]
    pub param_name: String,
    pub value: Value,
}

impl ConfigParameter {
    pub fn new(param_name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            param_name: param_name.into(),
            value: value.into(),
        }
    }
}

/// Metadata block shared by every variant of a family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonFields {
    pub keyboard: String,
    pub firmware_api_version: String,
    pub locale: String,
    pub unlisted: bool,
    pub custom_defined_behaviors: String,
    pub custom_devicetree: String,
    pub config_parameters: Vec<ConfigParameter>,
    pub layout_parameters: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}

impl CommonFields {
    /// Glove80 defaults: `glove80`, firmware API `1`, `en-US`, listed,
    /// no custom devicetree.
    pub fn base(creator: impl Into<String>) -> Self {
        Self {
            keyboard: "glove80".to_string(),
            firmware_api_version: "1".to_string(),
            locale: "en-US".to_string(),
            unlisted: false,
            custom_defined_behaviors: String::new(),
            custom_devicetree: String::new(),
            config_parameters: Vec::new(),
            layout_parameters: Map::new(),
            creator: Some(creator.into()),
        }
    }

    pub fn with_custom_defined_behaviors(mut self, behaviors: impl Into<String>) -> Self {
        self.custom_defined_behaviors = behaviors.into();
        self
    }

    pub fn with_custom_devicetree(mut self, devicetree: impl Into<String>) -> Self {
        self.custom_devicetree = devicetree.into();
        self
    }

    pub fn with_config_parameter(mut self, parameter: ConfigParameter) -> Self {
        self.config_parameters.push(parameter);
        self
    }
}

/// Release provenance attached from the metadata table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// A complete, resolved layout document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPayload {
    #[serde(flatten)]
    pub common: CommonFields,
    pub layer_names: Vec<String>,
    pub macros: Vec<Value>,
    #[serde(rename = "holdTaps")]
    pub hold_taps: Vec<Value>,
    pub combos: Vec<Value>,
    #[serde(rename = "inputListeners")]
    pub input_listeners: Vec<Value>,
    pub layers: Vec<Vec<Value>>,
    #[serde(flatten)]
    pub provenance: Provenance,
}

impl LayoutPayload {
    /// Check the structural invariants of a resolved document.
    pub fn validate(&self) -> Result<(), ComposeError> {
        if self.layers.len() != self.layer_names.len() {
            return Err(ComposeError::InvalidDocument(format!(
                "{} layers for {} layer names",
                self.layers.len(),
                self.layer_names.len()
            )));
        }

        for (name, layer) in self.layer_names.iter().zip(&self.layers) {
            if layer.len() != LAYER_LENGTH {
                return Err(ComposeError::InvalidDocument(format!(
                    "layer '{}' has {} entries, expected {}",
                    name,
                    layer.len(),
                    LAYER_LENGTH
                )));
            }
        }

        let mut seen = std::collections::HashSet::new();
        for name in &self.layer_names {
            if !seen.insert(name.as_str()) {
                return Err(ComposeError::InvalidDocument(format!(
                    "duplicate layer name '{}'",
                    name
                )));
            }
        }

        let count = self.layer_names.len() as i64;
        for combo in &self.combos {
            check_layer_indices(combo.get("layers"), count, "combo", combo.get("name"))?;
        }
        for listener in &self.input_listeners {
            let code = listener.get("code");
            check_layer_indices(listener.get("layers"), count, "input listener", code)?;
            let nodes = listener.get("nodes").and_then(Value::as_array);
            for node in nodes.into_iter().flatten() {
                check_layer_indices(node.get("layers"), count, "listener node", node.get("code"))?;
            }
        }
        Ok(())
    }

    /// Serialize with the default field order.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Serialize, emitting the fields named in `order` first (in that
    /// order) followed by any remaining fields in their default order.
    pub fn to_value_ordered(&self, order: &[&str]) -> Result<Value, serde_json::Error> {
        let Value::Object(mut fields) = self.to_value()? else {
            return self.to_value();
        };
        let mut ordered = Map::with_capacity(fields.len());
        for key in order {
            if let Some(value) = fields.remove(*key) {
                ordered.insert((*key).to_string(), value);
            }
        }
        for (key, value) in fields {
            ordered.insert(key, value);
        }
        Ok(Value::Object(ordered))
    }

    /// SHA-256 of the RFC 8785 canonical form, hex encoded.
    ///
    /// Two builds of the same variant must produce the same digest.
    pub fn digest(&self) -> Result<String, ComposeError> {
        digest_value(&self.to_value().map_err(|e| ComposeError::Digest(e.to_string()))?)
    }
}

/// Digest of an already serialized document.
pub fn digest_value(value: &Value) -> Result<String, ComposeError> {
    let jcs_bytes =
        serde_json_canonicalizer::to_vec(value).map_err(|e| ComposeError::Digest(e.to_string()))?;

    let mut hasher = Sha256::new();
    hasher.update(&jcs_bytes);
    Ok(hex::encode(hasher.finalize()))
}

fn check_layer_indices(
    layers: Option<&Value>,
    count: i64,
    kind: &str,
    owner: Option<&Value>,
) -> Result<(), ComposeError> {
    let Some(Value::Array(layers)) = layers else {
        return Ok(());
    };
    let owner = owner.and_then(Value::as_str).unwrap_or("<unnamed>");
    for layer in layers {
        match layer.as_i64() {
            Some(index) if index == ALL_LAYERS || (0..count).contains(&index) => {}
            Some(index) => {
                return Err(ComposeError::InvalidDocument(format!(
                    "{} '{}' targets layer {} but only {} layers exist",
                    kind, owner, index, count
                )))
            }
            None => {
                return Err(ComposeError::InvalidDocument(format!(
                    "{} '{}' has unresolved layer {}",
                    kind, owner, layer
                )))
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn trans_layer() -> Vec<Value> {
        vec![json!({"value": "&trans", "params": []}); LAYER_LENGTH]
    }

    fn payload() -> LayoutPayload {
        LayoutPayload {
            common: CommonFields::base("tester"),
            layer_names: vec!["Base".to_string(), "Lower".to_string()],
            macros: Vec::new(),
            hold_taps: Vec::new(),
            combos: vec![json!({"name": "&esc", "layers": [1, -1]})],
            input_listeners: Vec::new(),
            layers: vec![trans_layer(), trans_layer()],
            provenance: Provenance {
                title: Some("Test".to_string()),
                ..Provenance::default()
            },
        }
    }

    #[test]
    fn test_field_order() {
        let value = payload().to_value().unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        let expected: Vec<&str> = DEFAULT_FIELD_ORDER
            .iter()
            .copied()
            .filter(|key| keys.contains(key))
            .collect();
        assert_eq!(keys, expected);
        assert_eq!(keys.last(), Some(&"title"));
    }

    #[test]
    fn test_reordered_fields() {
        let value = payload()
            .to_value_ordered(&["keyboard", "creator", "locale"])
            .unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(&keys[..4], &["keyboard", "creator", "locale", "firmware_api_version"]);
    }

    #[test]
    fn test_validate_ok() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn test_validate_layer_count_mismatch() {
        let mut doc = payload();
        doc.layers.pop();
        assert!(matches!(doc.validate(), Err(ComposeError::InvalidDocument(_))));
    }

    #[test]
    fn test_validate_short_layer() {
        let mut doc = payload();
        doc.layers[1].truncate(79);
        let err = doc.validate().unwrap_err();
        assert!(err.to_string().contains("Lower"));
    }

    #[test]
    fn test_validate_duplicate_names() {
        let mut doc = payload();
        doc.layer_names[1] = "Base".to_string();
        assert!(matches!(doc.validate(), Err(ComposeError::InvalidDocument(_))));
    }

    #[test]
    fn test_validate_combo_layer_range() {
        let mut doc = payload();
        doc.combos = vec![json!({"name": "&esc", "layers": [2]})];
        assert!(matches!(doc.validate(), Err(ComposeError::InvalidDocument(_))));

        doc.combos = vec![json!({"name": "&esc", "layers": [{"name": "Base"}]})];
        assert!(matches!(doc.validate(), Err(ComposeError::InvalidDocument(_))));
    }

    #[test]
    fn test_digest_is_stable() {
        let first = payload().digest().unwrap();
        let second = payload().digest().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);

        let mut changed = payload();
        changed.common.locale = "de-DE".to_string();
        assert_ne!(changed.digest().unwrap(), first);
    }

    #[test]
    fn test_round_trip_through_json() {
        let doc = payload();
        let text = serde_json::to_string(&doc).unwrap();
        let parsed: LayoutPayload = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, doc);
    }
}
