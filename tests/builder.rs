//! Builder Tests
//!
//! A custom family assembled with `LayoutBuilder`, registered next to the
//! built-in ones and composed end to end, then edited in the store.

use glove80_layouts::spec::{
    kp, layer_param, ks, Behavior, ComboSpec, LayerSpec, LayerTarget, MacroSpec, SpecError,
};
use glove80_layouts::store::LayoutStore;
use glove80_layouts::{
    builtin_registry, CommonFields, ComposeError, Composer, Family, FamilyMetadata,
    FeatureComponents, LayoutBuilder, LayoutPayload, MetadataTable,
};
use serde_json::json;

struct Minimal;

fn toggle(layer: &str) -> Result<Behavior, SpecError> {
    ks("&tog", [layer_param(layer)])
}

impl Family for Minimal {
    fn name(&self) -> &str {
        "minimal"
    }

    fn variants(&self) -> &[&'static str] {
        &["one", "broken"]
    }

    fn build(&self, variant: &str, metadata: &MetadataTable) -> Result<LayoutPayload, ComposeError> {
        let mut builder = LayoutBuilder::new(self.name(), variant, CommonFields::base("tests"));
        builder.set_layer_order(["Base", "Nav"]);
        builder.add_layers(
            [
                ("Base", LayerSpec::new([(0, toggle("Nav")?), (1, kp("A")?)])?),
                ("Nav", LayerSpec::new([(0, toggle("Nav")?)])?),
            ],
            None,
        )?;
        builder.add_mouse_layers(
            FeatureComponents {
                layers: vec![("Mouse".to_string(), LayerSpec::transparent())],
                macros: vec![MacroSpec::new("&hello", "types hi", vec![kp("H")?, kp("I")?])?],
                ..FeatureComponents::default()
            },
            Some("Base"),
        )?;
        builder.add_combos(vec![ComboSpec::new(
            "&nav",
            "toggle nav",
            toggle("Nav")?,
            vec![10, 11],
            vec![LayerTarget::named("Base"), LayerTarget::ALL],
        )?]);
        if variant == "broken" {
            builder.set_layer_order(["Base", "Mouse", "Nav", "Extra"]);
        }
        builder.build(metadata)
    }
}

fn composer() -> Composer {
    let mut registry = builtin_registry().unwrap();
    registry.register(Box::new(Minimal)).unwrap();

    let family = FamilyMetadata::from_value(
        "minimal",
        json!({
            "one": {"output": "minimal/one.json", "title": "Minimal"},
            "broken": {"output": "minimal/broken.json"}
        }),
    )
    .unwrap();
    let metadata = MetadataTable::builtin().unwrap().with_family("minimal", family);
    Composer::new(registry, metadata)
}

#[test]
fn test_custom_family_composes() {
    let document = composer().build_value("minimal", "one").unwrap();

    assert_eq!(document["layer_names"], json!(["Base", "Mouse", "Nav"]));
    assert_eq!(document["layers"][0][0]["params"][0]["value"], 2);
    assert_eq!(document["combos"][0]["layers"], json!([0, -1]));
    assert_eq!(document["macros"][0]["name"], "&hello");
    assert_eq!(document["title"], "Minimal");
    assert_eq!(document["creator"], "tests");
}

#[test]
fn test_missing_layer_data_surfaces() {
    let err = composer().build("minimal", "broken").unwrap_err();
    match err {
        ComposeError::MissingLayerData { variant, layer } => {
            assert_eq!(variant, "broken");
            assert_eq!(layer, "Extra");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_feature_layer_order_is_explicit() {
    let mut builder = LayoutBuilder::new("minimal", "one", CommonFields::base("tests"));
    builder
        .add_layers([("Base", LayerSpec::transparent()), ("Magic", LayerSpec::transparent())], None)
        .unwrap();
    builder
        .add_mouse_layers(
            FeatureComponents {
                layers: vec![
                    ("MouseFast".to_string(), LayerSpec::transparent()),
                    ("Mouse".to_string(), LayerSpec::transparent()),
                ],
                layer_order: vec!["Mouse".to_string(), "MouseFast".to_string()],
                ..FeatureComponents::default()
            },
            Some("Base"),
        )
        .unwrap();
    builder
        .add_cursor_layer("Cursor", LayerSpec::transparent(), Vec::new(), Some("MouseFast"))
        .unwrap();
    assert_eq!(builder.layer_names(), &["Base", "Mouse", "MouseFast", "Cursor", "Magic"]);
}

#[test]
fn test_duplicate_family_rejected() {
    let mut registry = builtin_registry().unwrap();
    registry.register(Box::new(Minimal)).unwrap();
    let err = registry.register(Box::new(Minimal)).unwrap_err();
    assert!(matches!(err, ComposeError::DuplicateFamily(name) if name == "minimal"));
}

#[test]
fn test_composed_document_round_trips_through_store() {
    let composer = Composer::builtin().unwrap();
    let document = composer.build_value("tailorkey", "windows").unwrap();

    let store = LayoutStore::from_payload(&document).unwrap();
    assert_eq!(store.layer_names().len(), 12);
    assert_eq!(store.export_payload()["layer_names"], document["layer_names"]);
    assert_eq!(store.export_payload()["layers"], document["layers"]);
    assert_eq!(store.export_payload()["uuid"], document["uuid"]);
}

#[test]
fn test_store_edits_composed_document() {
    let composer = Composer::builtin().unwrap();
    let document = composer.build_value("default", "factory_default").unwrap();

    let mut store = LayoutStore::from_payload(&document).unwrap();
    store
        .update_key(0, 0, "&kp", vec![json!({"value": "ESC", "params": []})])
        .unwrap();
    assert_eq!(store.export_payload()["layers"][0][0]["params"][0]["value"], "ESC");

    store.undo();
    assert_eq!(store.export_payload()["layers"], document["layers"]);
}
