//! Recursive walks over untyped layout records.

use glove80_spec::{layer_tag, layer_tag_name};
use serde_json::{json, Value};

/// Whether any string leaf of `value` equals `needle` exactly.
///
/// Object keys are not leaves.
pub fn contains_string(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(text) => text == needle,
        Value::Array(items) => items.iter().any(|item| contains_string(item, needle)),
        Value::Object(map) => map.values().any(|item| contains_string(item, needle)),
        _ => false,
    }
}

/// Replace every string leaf equal to `from` with `to`, returning the count.
pub fn replace_strings(value: &mut Value, from: &str, to: &str) -> usize {
    match value {
        Value::String(text) if *text == from => {
            *text = to.to_string();
            1
        }
        Value::Array(items) => items
            .iter_mut()
            .map(|item| replace_strings(item, from, to))
            .sum(),
        Value::Object(map) => map
            .values_mut()
            .map(|item| replace_strings(item, from, to))
            .sum(),
        _ => 0,
    }
}

/// Rename `{"name": from}` layer tags to `{"name": to}`, returning the count.
///
/// Only single-key tags are touched; a `name` field inside a larger record
/// (a macro or combo name) is left alone.
pub fn rewrite_layer_refs(value: &mut Value, from: &str, to: &str) -> usize {
    let tag_matches = match &*value {
        Value::Object(map) => layer_tag_name(map).map(|name| name == from),
        _ => None,
    };
    match tag_matches {
        Some(true) => {
            *value = layer_tag(to);
            1
        }
        Some(false) => 0,
        None => match value {
            Value::Object(map) => map
                .values_mut()
                .map(|item| rewrite_layer_refs(item, from, to))
                .sum(),
            Value::Array(items) => items
                .iter_mut()
                .map(|item| rewrite_layer_refs(item, from, to))
                .sum(),
            _ => 0,
        },
    }
}

/// Wrap `{"name": ...}` tags sitting directly in a binding's `params` as
/// leaf bindings `{"value": {"name": ...}, "params": []}`, returning the
/// count. Tags elsewhere (combo or listener `layers`) are left alone.
pub fn wrap_layer_params(value: &mut Value) -> usize {
    match value {
        Value::Array(items) => items.iter_mut().map(wrap_layer_params).sum(),
        Value::Object(map) => {
            let mut wrapped = 0;
            for (key, item) in map.iter_mut() {
                match item {
                    Value::Array(params) if key == "params" => {
                        for param in params.iter_mut() {
                            if is_layer_tag(param) {
                                let tag = std::mem::take(param);
                                *param = json!({"value": tag, "params": []});
                                wrapped += 1;
                            } else {
                                wrapped += wrap_layer_params(param);
                            }
                        }
                    }
                    _ => wrapped += wrap_layer_params(item),
                }
            }
            wrapped
        }
        _ => 0,
    }
}

fn is_layer_tag(value: &Value) -> bool {
    matches!(value, Value::Object(map) if layer_tag_name(map).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_string_is_exact() {
        let value = json!({"binding": {"value": "&macro_one", "params": []}});
        assert!(contains_string(&value, "&macro_one"));
        assert!(!contains_string(&value, "&macro"));
        assert!(!contains_string(&value, "binding"));
    }

    #[test]
    fn test_replace_strings_counts() {
        let mut value = json!(["&m", {"value": "&m", "params": ["&m", "&n"]}]);
        assert_eq!(replace_strings(&mut value, "&m", ""), 3);
        assert_eq!(value, json!(["", {"value": "", "params": ["", "&n"]}]));
    }

    #[test]
    fn test_rewrite_layer_refs_only_touches_tags() {
        let mut value = json!({
            "name": "Base",
            "layers": [{"name": "Base"}, {"name": "Lower"}, -1],
            "binding": {"value": "&mo", "params": [{"name": "Base"}]}
        });
        assert_eq!(rewrite_layer_refs(&mut value, "Base", "Main"), 2);
        assert_eq!(value["name"], "Base");
        assert_eq!(value["layers"], json!([{"name": "Main"}, {"name": "Lower"}, -1]));
        assert_eq!(value["binding"]["params"][0], json!({"name": "Main"}));
    }

    #[test]
    fn test_wrap_layer_params_only_touches_params() {
        let mut value = json!({
            "binding": {"value": "&lt", "params": [{"name": "Lower"}, {"value": "SPACE", "params": []}]},
            "layers": [{"name": "Base"}, -1]
        });
        assert_eq!(wrap_layer_params(&mut value), 1);
        assert_eq!(
            value["binding"]["params"][0],
            json!({"value": {"name": "Lower"}, "params": []})
        );
        assert_eq!(value["binding"]["params"][1], json!({"value": "SPACE", "params": []}));
        assert_eq!(value["layers"], json!([{"name": "Base"}, -1]));

        // Already wrapped
        assert_eq!(wrap_layer_params(&mut value), 0);
    }
}
