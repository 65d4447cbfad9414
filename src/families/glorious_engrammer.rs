//! Glorious Engrammer layout
//!
//! Engram letter arrangement with thumb layer-taps into cursor, number,
//! function and symbol layers. No macros, hold-taps or combos; the
//! published artifact puts provenance first and the layers before the
//! sections.

use glove80_spec::{kp, Behavior, LayerSpec, SpecError};

use super::{kp_overrides, lower_layer, lt, magic, magic_layer, mo};
use crate::compose::{ComposeError, LayoutBuilder};
use crate::document::{CommonFields, LayoutPayload};
use crate::family::Family;
use crate::metadata::MetadataTable;

const VARIANTS: &[&str] = &["v42_rc6_preview"];

const LAYER_NAMES: [&str; 7] = [
    "Engrammer",
    "Cursor",
    "Number",
    "Function",
    "Symbol",
    "Lower",
    "Magic",
];

const FIELD_ORDER: &[&str] = &[
    "keyboard",
    "firmware_api_version",
    "locale",
    "uuid",
    "parent_uuid",
    "unlisted",
    "date",
    "creator",
    "title",
    "notes",
    "tags",
    "custom_defined_behaviors",
    "custom_devicetree",
    "config_parameters",
    "layout_parameters",
    "layer_names",
    "layers",
    "macros",
    "inputListeners",
    "holdTaps",
    "combos",
];

const ENGRAM_KEYS: [&str; 80] = [
    "F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8", "F9", "F10",
    "LBKT", "N1", "N2", "N3", "N4", "N5", "N6", "N7", "N8", "N9", "N0", "RBKT",
    "TAB", "B", "Y", "O", "U", "SQT", "DQT", "L", "D", "W", "V", "Z",
    "ESC", "C", "I", "E", "A", "COMMA", "DOT", "H", "T", "S", "N", "Q",
    "GRAVE", "G", "X", "J", "K", "MINUS", "LSHFT", "LCTRL", "LALT", "LGUI", "RCTRL", "RSHFT",
    "QMARK", "R", "M", "F", "P", "FSLH",
    "LEFT", "HOME", "END", "LEFT", "RIGHT", "BSPC", "DEL", "LALT", "RALT", "RET", "SPACE", "UP",
    "DOWN", "EQUAL", "BSLH", "PG_DN",
];

/// Thumb keys: `(slot, layer held)`.
const THUMB_LAYERS: [(i64, &str); 4] = [
    (69, "Cursor"),
    (70, "Function"),
    (73, "Symbol"),
    (74, "Number"),
];

/// Thumb layers in document order, left thumb first.
const THUMB_LAYER_ORDER: [&str; 4] = ["Cursor", "Number", "Function", "Symbol"];

/// Left home row modifiers on the layers held from the thumbs.
const LEFT_MODS: [(i64, &str); 4] = [(35, "LGUI"), (36, "LALT"), (37, "LCTRL"), (38, "LSHFT")];

pub struct GloriousEngrammerFamily;

impl Family for GloriousEngrammerFamily {
    fn name(&self) -> &str {
        "glorious_engrammer"
    }

    fn variants(&self) -> &[&'static str] {
        VARIANTS
    }

    fn field_order(&self) -> Option<&'static [&'static str]> {
        Some(FIELD_ORDER)
    }

    fn build(&self, variant: &str, metadata: &MetadataTable) -> Result<LayoutPayload, ComposeError> {
        if !VARIANTS.contains(&variant) {
            return Err(self.unknown_variant(variant));
        }

        let mut builder = LayoutBuilder::new(self.metadata_key(), variant, CommonFields::base("sunaku"));
        builder.add_layers(
            [
                ("Engrammer", base_layer()?),
                ("Lower", lower_layer()?),
                ("Magic", magic_layer()?),
            ],
            None,
        )?;
        builder.add_layers_ordered(
            [
                ("Symbol", symbol_layer()?),
                ("Function", function_layer()?),
                ("Number", number_layer()?),
                ("Cursor", cursor_layer()?),
            ],
            Some("Engrammer"),
            &THUMB_LAYER_ORDER,
        )?;
        builder.build(metadata)
    }
}

fn base_layer() -> Result<LayerSpec, SpecError> {
    let mut overrides = ENGRAM_KEYS
        .iter()
        .enumerate()
        .map(|(slot, key)| Ok((slot as i64, kp(key)?)))
        .collect::<Result<Vec<_>, SpecError>>()?;
    for (slot, layer) in THUMB_LAYERS {
        overrides.push((slot, lt(layer, ENGRAM_KEYS[slot as usize])?));
    }
    overrides.push((54, mo("Lower")?));
    overrides.push((64, magic()?));
    LayerSpec::new(overrides)
}

/// A thumb layer: left hand modifiers plus `keys`.
fn thumb_layer(keys: &[(i64, &str)]) -> Result<LayerSpec, SpecError> {
    let mut overrides = kp_overrides(&LEFT_MODS)?;
    overrides.extend(kp_overrides(keys)?);
    LayerSpec::new(overrides)
}

fn cursor_layer() -> Result<LayerSpec, SpecError> {
    thumb_layer(&[
        (23, "K_UNDO"),
        (24, "K_CUT"),
        (25, "K_COPY"),
        (26, "K_PASTE"),
        (27, "K_REDO"),
        (28, "HOME"),
        (29, "UP"),
        (30, "END"),
        (31, "PG_UP"),
        (40, "LEFT"),
        (41, "DOWN"),
        (42, "RIGHT"),
        (43, "PG_DN"),
    ])
}

fn number_layer() -> Result<LayerSpec, SpecError> {
    thumb_layer(&[
        (28, "N7"),
        (29, "N8"),
        (30, "N9"),
        (31, "STAR"),
        (40, "N4"),
        (41, "N5"),
        (42, "N6"),
        (43, "PLUS"),
        (59, "N1"),
        (60, "N2"),
        (61, "N3"),
        (62, "DOT"),
        (73, "N0"),
    ])
}

fn function_layer() -> Result<LayerSpec, SpecError> {
    thumb_layer(&[
        (23, "PSCRN"),
        (24, "SLCK"),
        (25, "PAUSE_BREAK"),
        (26, "INS"),
        (27, "K_APP"),
        (28, "F7"),
        (29, "F8"),
        (30, "F9"),
        (31, "F12"),
        (40, "F4"),
        (41, "F5"),
        (42, "F6"),
        (43, "F11"),
        (59, "F1"),
        (60, "F2"),
        (61, "F3"),
        (62, "F10"),
    ])
}

/// Symbols sit under the left hand while the right thumb holds the layer.
fn symbol_layer() -> Result<LayerSpec, SpecError> {
    let mut overrides = kp_overrides(&[
        (22, "TILDE"),
        (23, "EXCL"),
        (24, "AT"),
        (25, "HASH"),
        (26, "DLLR"),
        (27, "PRCNT"),
        (34, "CARET"),
        (35, "LBRC"),
        (36, "LPAR"),
        (37, "RPAR"),
        (38, "RBRC"),
        (39, "PIPE"),
        (46, "LT"),
        (47, "GT"),
        (48, "PLUS"),
        (49, "EQUAL"),
        (50, "COLON"),
        (51, "SEMI"),
    ])?;
    overrides.push((72, Behavior::named("&key_repeat")?));
    LayerSpec::new(overrides)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_layer_engram_home_row() {
        let layer = base_layer().unwrap().to_layer();
        let home: Vec<_> = (35..39)
            .map(|slot| layer[slot].to_tagged_value()["params"][0]["value"].clone())
            .collect();
        assert_eq!(home, vec!["C", "I", "E", "A"]);

        let space = layer[74].to_tagged_value();
        assert_eq!(space["value"], "&lt");
        assert_eq!(space["params"][0]["value"]["name"], "Number");
        assert_eq!(space["params"][1]["value"], "SPACE");
        assert_eq!(layer[54].to_tagged_value()["value"], "&mo");
    }

    #[test]
    fn test_thumb_layers_carry_left_mods() {
        for layer in [cursor_layer(), number_layer(), function_layer()] {
            let layer = layer.unwrap().to_layer();
            assert_eq!(layer[38].to_tagged_value()["params"][0]["value"], "LSHFT");
            assert_eq!(layer[69].to_tagged_value()["value"], "&trans");
        }
    }

    #[test]
    fn test_layer_order_follows_declared_names() {
        let metadata = MetadataTable::builtin().unwrap();
        let payload = GloriousEngrammerFamily.build("v42_rc6_preview", &metadata).unwrap();
        assert_eq!(payload.layer_names, LAYER_NAMES);
        assert!(payload.macros.is_empty());
        assert!(payload.combos.is_empty());
    }

    #[test]
    fn test_field_order_covers_every_field() {
        let mut ours: Vec<&str> = FIELD_ORDER.to_vec();
        let mut all: Vec<&str> = crate::document::DEFAULT_FIELD_ORDER.to_vec();
        ours.sort_unstable();
        all.sort_unstable();
        assert_eq!(ours, all);
    }
}
