//! Composition Tests
//!
//! Every built-in variant builds, validates, resolves all layer references
//! and is byte-for-byte reproducible.

use glove80_layouts::spec::LAYER_LENGTH;
use glove80_layouts::store::contains_string;
use glove80_layouts::{builtin_registry, Composer, MetadataTable};
use serde_json::{json, Value};

fn all_variants(composer: &Composer) -> Vec<(String, String)> {
    let registry = composer.registry();
    registry
        .names()
        .into_iter()
        .flat_map(|name| {
            let family = registry.get(name).unwrap();
            family
                .variants()
                .iter()
                .map(|variant| (name.to_string(), variant.to_string()))
                .collect::<Vec<_>>()
        })
        .collect()
}

fn has_layer_tag(value: &Value) -> bool {
    match value {
        Value::Object(map) => {
            (map.len() == 1 && map.get("name").map_or(false, Value::is_string))
                || map.values().any(has_layer_tag)
        }
        Value::Array(items) => items.iter().any(has_layer_tag),
        _ => false,
    }
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_every_variant_is_reproducible() {
    let composer = Composer::builtin().unwrap();
    let variants = all_variants(&composer);
    assert_eq!(variants.len(), 7);

    for (family, variant) in variants {
        let first = composer.build_value(&family, &variant).unwrap();
        let second = composer.build_value(&family, &variant).unwrap();
        assert_eq!(
            serde_json::to_string_pretty(&first).unwrap(),
            serde_json::to_string_pretty(&second).unwrap(),
            "{}/{} is not reproducible",
            family,
            variant
        );

        let digest_a = composer.build(&family, &variant).unwrap().digest().unwrap();
        let digest_b = composer.build(&family, &variant).unwrap().digest().unwrap();
        assert_eq!(digest_a, digest_b);
        assert_eq!(digest_a.len(), 64);
    }
}

#[test]
fn test_variants_have_distinct_digests() {
    let composer = Composer::builtin().unwrap();
    let mut digests: Vec<String> = all_variants(&composer)
        .iter()
        .map(|(family, variant)| composer.build(family, variant).unwrap().digest().unwrap())
        .collect();
    digests.sort();
    digests.dedup();
    assert_eq!(digests.len(), 7);
}

// =============================================================================
// Document shape
// =============================================================================

#[test]
fn test_documents_are_fully_resolved() {
    let composer = Composer::builtin().unwrap();
    for (family, variant) in all_variants(&composer) {
        let document = composer.build_value(&family, &variant).unwrap();
        assert!(
            !has_layer_tag(&document),
            "{}/{} still has a layer tag",
            family,
            variant
        );

        let names = document["layer_names"].as_array().unwrap();
        let layers = document["layers"].as_array().unwrap();
        assert_eq!(names.len(), layers.len());
        for layer in layers {
            assert_eq!(layer.as_array().unwrap().len(), LAYER_LENGTH);
        }
    }
}

#[test]
fn test_default_field_order() {
    let composer = Composer::builtin().unwrap();
    let document = composer.build_value("default", "factory_default").unwrap();
    let keys: Vec<&str> = document.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(&keys[..4], &["keyboard", "firmware_api_version", "locale", "unlisted"]);
    assert_eq!(keys[4], "custom_defined_behaviors");
    assert_eq!(keys.last(), Some(&"tags"));
}

#[test]
fn test_quantum_touch_field_order() {
    let composer = Composer::builtin().unwrap();
    let document = composer.build_value("quantum_touch", "default").unwrap();
    let keys: Vec<&str> = document.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys[3], "unlisted");
    assert_eq!(keys[4], "creator");
}

#[test]
fn test_glorious_engrammer_field_order() {
    let composer = Composer::builtin().unwrap();
    let document = composer
        .build_value("glorious_engrammer", "v42_rc6_preview")
        .unwrap();
    let keys: Vec<&str> = document.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(
        &keys[..6],
        &["keyboard", "firmware_api_version", "locale", "uuid", "parent_uuid", "unlisted"]
    );
    assert_eq!(
        &keys[15..],
        &["layer_names", "layers", "macros", "inputListeners", "holdTaps", "combos"]
    );
}

#[test]
fn test_glorious_engrammer_thumb_layers_resolved() {
    let composer = Composer::builtin().unwrap();
    let document = composer
        .build_value("glorious_engrammer", "v42_rc6_preview")
        .unwrap();
    assert_eq!(
        document["layer_names"],
        json!(["Engrammer", "Cursor", "Number", "Function", "Symbol", "Lower", "Magic"])
    );
    let space = &document["layers"][0][74];
    assert_eq!(space["value"], "&lt");
    assert_eq!(space["params"][0], json!({"value": 2, "params": []}));
    assert_eq!(document["layers"][0][54]["params"][0]["value"], 5);
}

#[test]
fn test_provenance_attached() {
    let composer = Composer::builtin().unwrap();
    let metadata = MetadataTable::builtin().unwrap();
    let expected = metadata.get("tailorkey", "mac").unwrap();

    let document = composer.build_value("tailorkey", "mac").unwrap();
    assert_eq!(
        document["title"].as_str(),
        expected.provenance.title.as_deref()
    );
    assert_eq!(document["uuid"].as_str(), expected.provenance.uuid.as_deref());
}

// =============================================================================
// Families
// =============================================================================

#[test]
fn test_tailorkey_layer_order() {
    let composer = Composer::builtin().unwrap();
    let expect = |variant: &str, names: Value| {
        let document = composer.build_value("tailorkey", variant).unwrap();
        assert_eq!(document["layer_names"], names, "{}", variant);
    };

    expect(
        "windows",
        json!([
            "HRM_WinLinx", "Typing", "Autoshift", "Cursor", "Symbol", "Gaming", "Lower",
            "Mouse", "MouseSlow", "MouseFast", "MouseWarp", "Magic"
        ]),
    );
    expect(
        "dual",
        json!([
            "HRM_WinLinx", "HRM_macOS", "Typing", "Autoshift", "Cursor", "Symbol", "Gaming",
            "Lower", "Mouse", "MouseSlow", "MouseFast", "MouseWarp", "Magic"
        ]),
    );
}

#[test]
fn test_tailorkey_combo_layers_resolved() {
    let composer = Composer::builtin().unwrap();
    let document = composer.build_value("tailorkey", "dual").unwrap();
    let combos = document["combos"].as_array().unwrap();

    let capslock = combos
        .iter()
        .find(|combo| combo["name"] == "capslock_v1_TKZ")
        .unwrap();
    assert_eq!(capslock["layers"], json!([0, 1, 3]));

    let gaming = combos
        .iter()
        .find(|combo| combo["name"] == "gaming_layer_v1_TKZ")
        .unwrap();
    assert_eq!(gaming["layers"], json!([-1]));
    assert_eq!(gaming["binding"]["params"][0]["value"], 6);
}

#[test]
fn test_tailorkey_mouse_listeners_point_at_speed_layers() {
    let composer = Composer::builtin().unwrap();
    let document = composer.build_value("tailorkey", "windows").unwrap();
    let listeners = document["inputListeners"].as_array().unwrap();
    assert_eq!(listeners.len(), 2);

    let layers: Vec<&Value> = listeners[0]["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|node| &node["layers"])
        .collect();
    assert_eq!(layers, vec![&json!([8]), &json!([9]), &json!([10])]);
}

#[test]
fn test_tailorkey_macros_prepend_mod_tab() {
    let composer = Composer::builtin().unwrap();
    let document = composer.build_value("tailorkey", "mac").unwrap();
    let macros = document["macros"].as_array().unwrap();
    assert_eq!(macros[0]["name"], "&mod_tab_v1_TKZ");
    assert!(contains_string(&document["holdTaps"], "&HRM_left_pinky_v1_TKZ"));
}

#[test]
fn test_default_family_has_no_sections() {
    let composer = Composer::builtin().unwrap();
    let document = composer.build_value("default", "factory_default_macos").unwrap();
    assert_eq!(document["layer_names"], json!(["Base", "Lower", "Magic"]));
    assert_eq!(document["macros"], json!([]));
    assert_eq!(document["combos"], json!([]));
    assert_eq!(document["layers"][0][54]["params"][0]["value"], 1);
    assert_eq!(document["layers"][0][64]["params"][0]["value"], 2);
}

#[test]
fn test_registry_is_explicit() {
    let composer = Composer::new(builtin_registry().unwrap(), MetadataTable::builtin().unwrap());
    assert_eq!(
        composer.registry().names(),
        vec!["default", "glorious_engrammer", "quantum_touch", "tailorkey"]
    );
}
