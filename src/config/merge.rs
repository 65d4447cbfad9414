//! Layer merge for configuration values
//!
//! - Objects merge by key
//! - Arrays replace
//! - Scalars override

use serde_json::Value;

/// Merge `overlay` onto `base`.
///
/// A `null` in the overlay replaces the base value like any other scalar.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = if let Some(base_value) = base_map.remove(&key) {
                    deep_merge(base_value, overlay_value)
                } else {
                    overlay_value
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        // no concatenation
        (Value::Array(_), overlay @ Value::Array(_)) => overlay,
        (_, overlay) => overlay,
    }
}

/// Merge layers in order; the last layer has the highest precedence.
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}
