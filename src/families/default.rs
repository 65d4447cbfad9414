//! MoErgo factory default layouts.

use glove80_spec::{rows_to_layer_spec, LayerSpec, SpecError, Token};

use super::{keys, kp_overrides, lower_layer, magic, magic_layer, mo};
use crate::compose::{ComposeError, LayoutBuilder};
use crate::document::{CommonFields, LayoutPayload};
use crate::family::Family;
use crate::metadata::MetadataTable;

const VARIANTS: &[&str] = &["factory_default", "factory_default_macos"];
const LAYER_NAMES: [&str; 3] = ["Base", "Lower", "Magic"];

pub struct DefaultFamily;

impl Family for DefaultFamily {
    fn name(&self) -> &str {
        "default"
    }

    fn variants(&self) -> &[&'static str] {
        VARIANTS
    }

    fn build(&self, variant: &str, metadata: &MetadataTable) -> Result<LayoutPayload, ComposeError> {
        let base = match variant {
            "factory_default" => base_layer()?,
            "factory_default_macos" => macos_base_layer()?,
            other => return Err(self.unknown_variant(other)),
        };

        let mut builder = LayoutBuilder::new(self.metadata_key(), variant, CommonFields::base("moergo"));
        builder.set_layer_order(LAYER_NAMES);
        builder.add_layers(
            [
                ("Base", base),
                ("Lower", lower_layer()?),
                ("Magic", magic_layer()?),
            ],
            None,
        )?;
        builder.build(metadata)
    }
}

fn base_layer() -> Result<LayerSpec, SpecError> {
    let mut lower_row = keys(&["GRAVE", "Z", "X", "C", "V", "B", "LSHFT", "LCTRL"]);
    lower_row.push(Token::from(mo("Lower")?));
    lower_row.extend(keys(&[
        "LGUI", "RCTRL", "RSHFT", "N", "M", "COMMA", "DOT", "FSLH", "PG_UP",
    ]));

    let mut thumb_row = vec![Token::from(magic()?)];
    thumb_row.extend(keys(&[
        "HOME", "END", "LEFT", "RIGHT", "BSPC", "DEL", "LALT", "RALT", "RET", "SPACE", "UP",
        "DOWN", "LBKT", "RBKT", "PG_DN",
    ]));

    rows_to_layer_spec(vec![
        keys(&["F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8", "F9", "F10"]),
        keys(&["EQUAL", "N1", "N2", "N3", "N4", "N5", "N6", "N7", "N8", "N9", "N0", "MINUS"]),
        keys(&["TAB", "Q", "W", "E", "R", "T", "Y", "U", "I", "O", "P", "BSLH"]),
        keys(&["ESC", "A", "S", "D", "F", "G", "H", "J", "K", "L", "SEMI", "SQT"]),
        lower_row,
        thumb_row,
    ])
}

/// Command sits where Ctrl is on the Windows layout.
fn macos_base_layer() -> Result<LayerSpec, SpecError> {
    base_layer()?.patched(kp_overrides(&[(53, "LGUI"), (55, "LCTRL"), (56, "RGUI")])?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glove80_spec::kp;

    #[test]
    fn test_base_layer_slots() {
        let layer = base_layer().unwrap().to_layer();
        assert_eq!(layer[0].to_tagged_value(), kp("F1").unwrap().to_canonical().to_tagged_value());
        assert_eq!(layer[53].to_tagged_value()["params"][0]["value"], "LCTRL");
        assert_eq!(layer[54].to_tagged_value()["value"], "&mo");
        assert_eq!(layer[64].to_tagged_value()["value"], "&magic");
        assert_eq!(layer[79].to_tagged_value()["params"][0]["value"], "PG_DN");
    }

    #[test]
    fn test_macos_swaps_modifiers() {
        let layer = macos_base_layer().unwrap().to_layer();
        assert_eq!(layer[53].to_tagged_value()["params"][0]["value"], "LGUI");
        assert_eq!(layer[55].to_tagged_value()["params"][0]["value"], "LCTRL");
    }

    #[test]
    fn test_unknown_variant() {
        let metadata = MetadataTable::builtin().unwrap();
        let err = DefaultFamily.build("colemak", &metadata).unwrap_err();
        assert!(matches!(err, ComposeError::UnknownVariant { .. }));
    }
}
