//! Input listener CRUD and layer-reference validation.

use glove80_store::{EntityKind, LayoutStore, StoreError};
use serde_json::{json, Value};

fn slot(value: &str) -> Value {
    json!({"value": value, "params": []})
}

fn sample_payload() -> Value {
    json!({
        "layer_names": ["Base", "Raise"],
        "layers": [vec![slot("&listener_primary"); 80], vec![slot("&kp B"); 80]],
        "macros": [{
            "name": "&macro_listener",
            "bindings": [
                {"value": "&listener_primary", "params": []},
                {"value": "&kp", "params": []}
            ],
            "params": []
        }],
        "holdTaps": [{"name": "&hold_listener", "bindings": ["&listener_primary"]}],
        "combos": [{
            "name": "combo_listener",
            "binding": {"value": "&listener_primary", "params": []},
            "keyPositions": [0, 1],
            "layers": [{"name": "Base"}]
        }],
        "inputListeners": [
            {
                "code": "&listener_primary",
                "nodes": [{
                    "code": "node_primary",
                    "layers": [0],
                    "inputProcessors": [{"code": "&kp", "params": []}]
                }],
                "inputProcessors": [{"code": "&kp", "params": []}]
            },
            {
                "code": "&listener_secondary",
                "nodes": [{
                    "code": "node_secondary",
                    "layers": [1],
                    "inputProcessors": [{"code": "&listener_primary", "params": []}]
                }],
                "inputProcessors": [{"code": "&listener_primary", "params": []}]
            }
        ]
    })
}

#[test]
fn test_list_listeners_returns_copy() {
    let store = LayoutStore::from_payload(&sample_payload()).unwrap();
    let mut listing = store.list_listeners();
    listing[0]["code"] = json!("mutated");
    assert_eq!(store.state().listeners[0]["code"], "&listener_primary");
}

#[test]
fn test_add_listener() {
    let mut store = LayoutStore::from_payload(&sample_payload()).unwrap();
    store
        .add_listener(json!({"code": "&listener_new", "nodes": [], "inputProcessors": []}))
        .unwrap();
    assert!(store.state().listeners.iter().any(|l| l["code"] == "&listener_new"));

    store.undo();
    assert!(store.state().listeners.iter().all(|l| l["code"] != "&listener_new"));
}

#[test]
fn test_add_listener_duplicate_code() {
    let mut store = LayoutStore::from_payload(&sample_payload()).unwrap();
    let err = store
        .add_listener(json!({"code": "&listener_primary", "nodes": [], "inputProcessors": []}))
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation { .. }));
}

#[test]
fn test_add_listener_rejects_unknown_layer() {
    let mut store = LayoutStore::from_payload(&sample_payload()).unwrap();
    let err = store
        .add_listener(json!({
            "code": "&listener_bad",
            "nodes": [{"code": "n", "layers": [{"name": "Gaming"}], "inputProcessors": []}]
        }))
        .unwrap_err();
    assert_eq!(
        err,
        StoreError::UnknownReference {
            kind: EntityKind::Layer,
            name: "Gaming".to_string()
        }
    );
    assert!(!store.can_undo());
}

#[test]
fn test_add_listener_rejects_out_of_range_layer() {
    let mut store = LayoutStore::from_payload(&sample_payload()).unwrap();
    let err = store
        .add_listener(json!({"code": "&listener_bad", "layers": [5], "nodes": []}))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::IndexOutOfRange { kind: EntityKind::Layer, index: 5, len: 2 }
    ));
    assert_eq!(store.state().listeners.len(), 2);
}

#[test]
fn test_update_listener_fields() {
    let mut store = LayoutStore::from_payload(&sample_payload()).unwrap();
    let mut updated = store.state().listeners[0].clone();
    updated["description"] = json!("Updated");
    updated["nodes"][0]["layers"] = json!([1]);
    store.update_listener("&listener_primary", updated).unwrap();

    let listener = &store.state().listeners[0];
    assert_eq!(listener["description"], "Updated");
    assert_eq!(listener["nodes"][0]["layers"], json!([{"name": "Raise"}]));
}

#[test]
fn test_updated_listener_follows_layer_rename() {
    let mut store = LayoutStore::from_payload(&sample_payload()).unwrap();
    let mut updated = store.state().listeners[0].clone();
    updated["nodes"][0]["layers"] = json!([1, -1]);
    store.update_listener("&listener_primary", updated).unwrap();
    store.rename_layer("Raise", "Upper").unwrap();

    assert_eq!(
        store.state().listeners[0]["nodes"][0]["layers"],
        json!([{"name": "Upper"}, -1])
    );
    let resolved = store.export_resolved_payload().unwrap();
    assert_eq!(resolved["inputListeners"][0]["nodes"][0]["layers"], json!([1, -1]));
}

#[test]
fn test_update_listener_rename_rewrites_references() {
    let mut store = LayoutStore::from_payload(&sample_payload()).unwrap();
    let mut updated = store.state().listeners[0].clone();
    updated["code"] = json!("&listener_renamed");
    store.update_listener("&listener_primary", updated).unwrap();

    let state = store.state();
    assert_eq!(state.listeners[0]["code"], "&listener_renamed");
    assert_eq!(state.layers[0].slots[0]["value"], "&listener_renamed");
    assert_eq!(state.macros[0]["bindings"][0]["value"], "&listener_renamed");
    assert_eq!(state.hold_taps[0]["bindings"][0], "&listener_renamed");
    assert_eq!(state.combos[0]["binding"]["value"], "&listener_renamed");
    assert_eq!(state.listeners[1]["inputProcessors"][0]["code"], "&listener_renamed");
}

#[test]
fn test_delete_listener_blocks_when_referenced() {
    let mut store = LayoutStore::from_payload(&sample_payload()).unwrap();
    let err = store.delete_listener("&listener_primary", false).unwrap_err();
    assert!(matches!(err, StoreError::ReferencedEntity { .. }));
    assert_eq!(err.code().as_str(), "REFERENCED_ENTITY");
}

#[test]
fn test_delete_listener_force_clears_references() {
    let mut store = LayoutStore::from_payload(&sample_payload()).unwrap();
    store.delete_listener("&listener_primary", true).unwrap();

    let state = store.state();
    assert!(state.layers[0].slots.iter().all(|slot| slot["value"] != "&listener_primary"));
    assert_eq!(state.macros[0]["bindings"][0]["value"], "");
    assert_eq!(state.hold_taps[0]["bindings"][0], "");
    assert_eq!(state.combos[0]["binding"]["value"], "");

    store.undo();
    assert!(store.state().listeners.iter().any(|l| l["code"] == "&listener_primary"));
}

#[test]
fn test_find_listener_references() {
    let store = LayoutStore::from_payload(&sample_payload()).unwrap();
    let refs = store.find_listener_references("&listener_primary");
    assert_eq!(refs.keys.len(), 80);
    assert_eq!(refs.keys[0].layer_name, "Base");
    assert_eq!(refs.macros[0].identifier, "&macro_listener");
    assert_eq!(refs.listeners.len(), 1);
    assert_eq!(refs.listeners[0].identifier, "&listener_secondary");
}

#[test]
fn test_listener_operations_support_redo() {
    let mut store = LayoutStore::from_payload(&sample_payload()).unwrap();
    store
        .add_listener(json!({"code": "&listener_temp", "nodes": [], "inputProcessors": []}))
        .unwrap();
    store
        .update_listener(
            "&listener_temp",
            json!({"code": "&listener_temp", "nodes": [], "inputProcessors": [{"code": "&kp", "params": []}]}),
        )
        .unwrap();
    store.undo();
    store.undo();
    assert!(store.state().listeners.iter().all(|l| l["code"] != "&listener_temp"));

    store.redo();
    store.redo();
    let temp = store.state().listeners.last().unwrap();
    assert_eq!(temp["inputProcessors"][0]["code"], "&kp");
}
