//! Normalization and validation of section records supplied to add/update.

use glove80_spec::catalog::BEHAVIOR_SIGIL;
use glove80_spec::{layer_tag, layer_tag_name, HoldTapFlavor, LAYER_LENGTH};
use serde_json::{Map, Value};

use crate::error::{EntityKind, StoreError};
use crate::state::Section;

/// Normalize `payload` into a record for `section`.
///
/// Identifiers are trimmed and, for everything but listeners, gain the
/// behavior sigil. Missing list fields default to `[]`. Layer references
/// are checked against `layer_names` and stored as `{"name": ...}` tags;
/// `-1` is kept as the all-layers sentinel.
pub fn normalize_record(
    section: Section,
    payload: Value,
    layer_names: &[String],
) -> Result<Value, StoreError> {
    let Value::Object(mut record) = payload else {
        return Err(StoreError::validation(
            section.payload_key(),
            format!("{} payload must be an object", section.kind()),
        ));
    };

    let id_field = section.id_field();
    let identifier = record
        .get(id_field)
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    if identifier.is_empty() {
        return Err(StoreError::validation(
            id_field,
            format!("{} {} cannot be empty", section.kind(), id_field),
        ));
    }
    let identifier = match section {
        Section::Listeners => identifier,
        _ if identifier.starts_with(BEHAVIOR_SIGIL) => identifier,
        _ => format!("{}{}", BEHAVIOR_SIGIL, identifier),
    };
    record.insert(id_field.to_string(), Value::String(identifier));

    match section {
        Section::Macros => normalize_macro(&mut record)?,
        Section::HoldTaps => normalize_hold_tap(&mut record)?,
        Section::Combos => normalize_combo(&mut record, layer_names)?,
        Section::Listeners => normalize_listener(&mut record, layer_names)?,
    }
    Ok(Value::Object(record))
}

fn normalize_macro(record: &mut Map<String, Value>) -> Result<(), StoreError> {
    default_list(record, "bindings")?;
    default_list(record, "params")?;
    if let Some(Value::Array(bindings)) = record.get("bindings") {
        if bindings.iter().any(|binding| !binding.is_object()) {
            return Err(StoreError::validation(
                "bindings",
                "macro bindings must be objects",
            ));
        }
    }
    check_non_negative(record, &["waitMs", "tapMs"])
}

fn normalize_hold_tap(record: &mut Map<String, Value>) -> Result<(), StoreError> {
    default_list(record, "bindings")?;
    if let Some(Value::Array(bindings)) = record.get("bindings") {
        if bindings.iter().any(|binding| !binding.is_string()) {
            return Err(StoreError::validation(
                "bindings",
                "hold-tap bindings must be behavior names",
            ));
        }
    }
    check_non_negative(record, &["tappingTermMs", "quickTapMs", "requirePriorIdleMs"])?;
    match record.get("flavor") {
        None | Some(Value::Null) => {}
        Some(Value::String(flavor)) => {
            flavor
                .parse::<HoldTapFlavor>()
                .map_err(|err| StoreError::validation("flavor", err.to_string()))?;
        }
        Some(_) => return Err(StoreError::validation("flavor", "must be a string")),
    }
    if let Some(value) = record.get("holdTriggerOnRelease") {
        if !value.is_boolean() && !value.is_null() {
            return Err(StoreError::validation("holdTriggerOnRelease", "must be a boolean"));
        }
    }
    if let Some(positions) = record.get("holdTriggerKeyPositions") {
        if !positions.is_null() {
            check_key_positions("holdTriggerKeyPositions", positions)?;
        }
    }
    Ok(())
}

fn normalize_combo(
    record: &mut Map<String, Value>,
    layer_names: &[String],
) -> Result<(), StoreError> {
    default_list(record, "keyPositions")?;
    default_list(record, "layers")?;
    match record.get("binding") {
        Some(Value::Object(binding)) => {
            let has_value = match binding.get("value") {
                Some(Value::String(value)) => !value.trim().is_empty(),
                Some(Value::Number(_)) => true,
                _ => false,
            };
            if !has_value {
                return Err(StoreError::validation("binding", "combo binding needs a value"));
            }
        }
        _ => return Err(StoreError::validation("binding", "combo binding must be an object")),
    }
    let positions = record.get("keyPositions").cloned().unwrap_or(Value::Null);
    if positions.as_array().map_or(true, Vec::is_empty) {
        return Err(StoreError::validation(
            "keyPositions",
            "combo needs at least one key position",
        ));
    }
    check_key_positions("keyPositions", &positions)?;
    check_non_negative(record, &["timeoutMs"])?;
    if let Some(layers) = record.get_mut("layers") {
        tag_layer_list(layers, layer_names)?;
    }
    Ok(())
}

fn normalize_listener(
    record: &mut Map<String, Value>,
    layer_names: &[String],
) -> Result<(), StoreError> {
    default_list(record, "inputProcessors")?;
    default_list(record, "nodes")?;
    check_processors(record.get("inputProcessors"))?;
    if let Some(layers) = record.get_mut("layers") {
        tag_layer_list(layers, layer_names)?;
    }
    if let Some(Value::Array(nodes)) = record.get_mut("nodes") {
        for node in nodes.iter_mut() {
            let Value::Object(node) = node else {
                return Err(StoreError::validation("nodes", "listener nodes must be objects"));
            };
            check_processors(node.get("inputProcessors"))?;
            if let Some(layers) = node.get_mut("layers") {
                tag_layer_list(layers, layer_names)?;
            }
        }
    }
    Ok(())
}

fn default_list(record: &mut Map<String, Value>, field: &str) -> Result<(), StoreError> {
    match record.get(field) {
        None | Some(Value::Null) => {
            record.insert(field.to_string(), Value::Array(Vec::new()));
            Ok(())
        }
        Some(Value::Array(_)) => Ok(()),
        Some(_) => Err(StoreError::validation(field, "must be a list")),
    }
}

fn check_non_negative(record: &Map<String, Value>, fields: &[&str]) -> Result<(), StoreError> {
    for field in fields {
        match record.get(*field) {
            None | Some(Value::Null) => {}
            Some(Value::Number(number)) if number.as_u64().is_some() => {}
            Some(_) => {
                return Err(StoreError::validation(
                    *field,
                    "must be a non-negative integer",
                ))
            }
        }
    }
    Ok(())
}

fn check_key_positions(field: &str, positions: &Value) -> Result<(), StoreError> {
    let items = positions
        .as_array()
        .ok_or_else(|| StoreError::validation(field, "must be a list of key positions"))?;
    for item in items {
        let position = item
            .as_i64()
            .ok_or_else(|| StoreError::validation(field, "key positions must be integers"))?;
        if position < 0 || position >= LAYER_LENGTH as i64 {
            return Err(StoreError::out_of_range(EntityKind::Key, position, LAYER_LENGTH));
        }
    }
    Ok(())
}

fn check_processors(processors: Option<&Value>) -> Result<(), StoreError> {
    let Some(processors) = processors else {
        return Ok(());
    };
    let items = processors
        .as_array()
        .ok_or_else(|| StoreError::validation("inputProcessors", "must be a list"))?;
    for processor in items {
        let code = processor.get("code").and_then(Value::as_str).unwrap_or_default();
        if code.trim().is_empty() {
            return Err(StoreError::validation(
                "inputProcessors",
                "input processors need a non-empty code",
            ));
        }
    }
    Ok(())
}

/// Rewrite a `layers` list into tags, checking every entry against the
/// current layer names.
fn tag_layer_list(layers: &mut Value, layer_names: &[String]) -> Result<(), StoreError> {
    let items = match layers {
        Value::Null => {
            *layers = Value::Array(Vec::new());
            return Ok(());
        }
        Value::Array(items) => items,
        _ => return Err(StoreError::validation("layers", "must be a list")),
    };
    for item in items.iter_mut() {
        *item = tag_layer(item, layer_names)?;
    }
    Ok(())
}

fn tag_layer(item: &Value, layer_names: &[String]) -> Result<Value, StoreError> {
    let name = match item {
        Value::Number(number) => {
            let index = number
                .as_i64()
                .ok_or_else(|| StoreError::validation("layers", "layer indices must be integers"))?;
            if index == glove80_spec::ALL_LAYERS {
                return Ok(item.clone());
            }
            return usize::try_from(index)
                .ok()
                .and_then(|position| layer_names.get(position))
                .map(|name| layer_tag(name))
                .ok_or_else(|| StoreError::out_of_range(EntityKind::Layer, index, layer_names.len()));
        }
        Value::String(name) => name.as_str(),
        Value::Object(map) => layer_tag_name(map)
            .ok_or_else(|| StoreError::validation("layers", "layer references must be {\"name\": ...}"))?,
        _ => return Err(StoreError::validation("layers", "unsupported layer reference")),
    };
    if layer_names.iter().any(|candidate| candidate == name) {
        Ok(layer_tag(name))
    } else {
        Err(StoreError::unknown(EntityKind::Layer, name))
    }
}
