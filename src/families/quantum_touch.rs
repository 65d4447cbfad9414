//! QuantumTouch layout
//!
//! Home row training layout. Holding a home row finger moves to that
//! finger's layer, where the same-hand keys either tap through a helper
//! macro or chord a second modifier with a hold-tap.

use glove80_spec::{
    kp, Behavior, HoldTapFlavor, HoldTapSpec, LayerSpec, MacroSpec, SpecError,
};

use super::{
    left_hand_positions, lower_layer, lt, magic, magic_layer, mo, mouse_components,
    right_hand_positions, ListenerDescriptions,
};
use crate::compose::{ComposeError, LayoutBuilder};
use crate::document::{CommonFields, LayoutPayload};
use crate::family::Family;
use crate::metadata::MetadataTable;

const VARIANTS: &[&str] = &["default"];

const LAYER_NAMES: [&str; 7] = [
    "Base",
    "LeftPinky",
    "LeftMiddle",
    "RightIndex",
    "RightMiddle",
    "Lower",
    "Magic",
];

/// Published QuantumTouch artifacts carry `creator` right after
/// `unlisted`.
const FIELD_ORDER: &[&str] = &[
    "keyboard",
    "firmware_api_version",
    "locale",
    "unlisted",
    "creator",
    "custom_defined_behaviors",
    "custom_devicetree",
    "config_parameters",
    "layout_parameters",
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

/// QWERTY keys by slot. Slots 54, 64 and 69 are layer keys on Base.
const BASE_KEYS: [&str; 80] = [
    "F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8", "F9", "F10",
    "EQUAL", "N1", "N2", "N3", "N4", "N5", "N6", "N7", "N8", "N9", "N0", "MINUS",
    "TAB", "Q", "W", "E", "R", "T", "Y", "U", "I", "O", "P", "BSLH",
    "ESC", "A", "S", "D", "F", "G", "H", "J", "K", "L", "SEMI", "SQT",
    "GRAVE", "Z", "X", "C", "V", "B", "LSHFT", "LCTRL", "LALT", "LGUI", "RCTRL", "RSHFT",
    "N", "M", "COMMA", "DOT", "FSLH", "PG_UP",
    "LEFT", "HOME", "END", "LEFT", "RIGHT", "BSPC", "DEL", "LALT", "RALT", "RET", "SPACE", "UP",
    "DOWN", "LBKT", "RBKT", "PG_DN",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

impl Side {
    fn prefix(self) -> &'static str {
        match self {
            Side::Left => "L",
            Side::Right => "R",
        }
    }

    /// Home row `(slot, finger, modifier)`, outermost finger first.
    fn home_row(self) -> [(i64, &'static str, &'static str); 4] {
        match self {
            Side::Left => [
                (35, "Pinky", "LCTRL"),
                (36, "Ring", "LALT"),
                (37, "Middle", "LGUI"),
                (38, "Index", "LSHFT"),
            ],
            Side::Right => [
                (44, "Pinky", "RCTRL"),
                (43, "Ring", "RALT"),
                (42, "Middle", "RGUI"),
                (41, "Index", "RSHFT"),
            ],
        }
    }

    /// Same-hand slots that tap through the finger's helper macro.
    fn tap_slots(self) -> Vec<i64> {
        let ranges = match self {
            Side::Left => [0..5, 10..16, 23..28, 39..40, 47..52],
            Side::Right => [5..10, 16..22, 28..33, 40..41, 58..63],
        };
        ranges.into_iter().flatten().collect()
    }

    fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A finger that owns a training layer.
#[derive(Debug, Clone, Copy)]
struct Finger {
    layer: &'static str,
    side: Side,
    name: &'static str,
    home: i64,
}

const FINGERS: [Finger; 4] = [
    Finger { layer: "LeftPinky", side: Side::Left, name: "Pinky", home: 35 },
    Finger { layer: "LeftMiddle", side: Side::Left, name: "Middle", home: 37 },
    Finger { layer: "RightIndex", side: Side::Right, name: "Index", home: 41 },
    Finger { layer: "RightMiddle", side: Side::Right, name: "Middle", home: 42 },
];

impl Finger {
    fn behavior_prefix(&self) -> String {
        format!("&BHRM_{}_{}", self.side.prefix(), self.name)
    }

    fn tap_macro(&self) -> String {
        format!("{}_Tap", self.behavior_prefix())
    }

    fn chord_hold_tap(&self, other: &str) -> String {
        format!("{}_{}", self.behavior_prefix(), other)
    }
}

pub struct QuantumTouchFamily;

impl Family for QuantumTouchFamily {
    fn name(&self) -> &str {
        "quantum_touch"
    }

    fn variants(&self) -> &[&'static str] {
        VARIANTS
    }

    fn field_order(&self) -> Option<&'static [&'static str]> {
        Some(FIELD_ORDER)
    }

    fn build(&self, variant: &str, metadata: &MetadataTable) -> Result<LayoutPayload, ComposeError> {
        if variant != "default" {
            return Err(self.unknown_variant(variant));
        }

        let mut builder = LayoutBuilder::new(self.metadata_key(), variant, common_fields());
        builder.set_layer_order(LAYER_NAMES);
        builder.update_layer("Base", base_layer()?);
        for finger in FINGERS {
            builder.update_layer(finger.layer, finger_layer(&finger)?);
        }
        builder.add_layers([("Lower", lower_layer()?), ("Magic", magic_layer()?)], None)?;

        let mut macros = Vec::with_capacity(FINGERS.len());
        let mut hold_taps = Vec::new();
        for finger in FINGERS {
            macros.push(tap_macro(&finger)?);
            hold_taps.extend(chord_hold_taps(&finger)?);
        }
        builder.add_macros(macros, false);
        builder.add_hold_taps(hold_taps);

        let clipboard = [kp("K_CUT")?, kp("K_COPY")?, kp("K_PASTE")?];
        builder.add_mouse_layers(
            mouse_components(clipboard, &ListenerDescriptions::PLAIN)?,
            Some("Lower"),
        )?;
        builder.build(metadata)
    }
}

fn common_fields() -> CommonFields {
    CommonFields::base("QuantumTouch").with_custom_defined_behaviors(
        "// QuantumTouch\n#define BHRM_TAPPING_RESOLUTION 150\n",
    )
}

fn base_layer() -> Result<LayerSpec, SpecError> {
    let mut overrides = BASE_KEYS
        .iter()
        .enumerate()
        .map(|(slot, key)| Ok((slot as i64, kp(key)?)))
        .collect::<Result<Vec<_>, SpecError>>()?;
    for finger in FINGERS {
        overrides.push((finger.home, lt(finger.layer, BASE_KEYS[finger.home as usize])?));
    }
    overrides.push((54, mo("Lower")?));
    overrides.push((64, magic()?));
    overrides.push((69, lt("Mouse", "BSPC")?));
    LayerSpec::new(overrides)
}

/// While a finger is held: same-hand keys tap through the finger's macro,
/// the other same-hand home keys chord a second modifier and the opposite
/// hand types normally.
fn finger_layer(finger: &Finger) -> Result<LayerSpec, SpecError> {
    let tap = finger.tap_macro();
    let mut overrides = Vec::new();
    for slot in finger.side.tap_slots() {
        overrides.push((slot, Behavior::new(tap.as_str(), [BASE_KEYS[slot as usize]])?));
    }
    for (slot, name, modifier) in finger.side.home_row() {
        let behavior = if name == finger.name {
            Behavior::named("&none")?
        } else {
            Behavior::new(
                finger.chord_hold_tap(name),
                [modifier, BASE_KEYS[slot as usize]],
            )?
        };
        overrides.push((slot, behavior));
    }
    for (slot, _, _) in finger.side.opposite().home_row() {
        overrides.push((slot, kp(BASE_KEYS[slot as usize])?));
    }
    LayerSpec::new(overrides)
}

fn tap_macro(finger: &Finger) -> Result<MacroSpec, SpecError> {
    Ok(MacroSpec::new(
        finger.tap_macro(),
        format!("{} {} tap - QuantumTouch", finger.side.prefix(), finger.name),
        vec![
            Behavior::named("&macro_param_1to1")?,
            Behavior::named("&macro_tap")?,
            kp("MACRO_PLACEHOLDER")?,
        ],
    )?
    .with_params(["code"])
    .with_wait_ms(0)
    .with_tap_ms(0))
}

fn chord_hold_taps(finger: &Finger) -> Result<Vec<HoldTapSpec>, SpecError> {
    let opposite = match finger.side {
        Side::Left => right_hand_positions(),
        Side::Right => left_hand_positions(),
    };
    finger
        .side
        .home_row()
        .iter()
        .filter(|(_, name, _)| *name != finger.name)
        .map(|(_, name, _)| {
            HoldTapSpec::new(
                finger.chord_hold_tap(name),
                format!(
                    "{} {} + {} chord - QuantumTouch",
                    finger.side.prefix(),
                    finger.name,
                    name
                ),
                ["&kp", "&kp"],
            )?
            .with_tapping_term_ms(200)
            .with_flavor(HoldTapFlavor::Balanced)
            .with_quick_tap_ms(300)
            .with_hold_trigger_on_release(true)
            .with_hold_trigger_key_positions(opposite.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_home_row_enters_finger_layers() {
        let layer = base_layer().unwrap().to_layer();
        let pinky = layer[35].to_tagged_value();
        assert_eq!(pinky["value"], "&lt");
        assert_eq!(pinky["params"][0]["value"]["name"], "LeftPinky");
        assert_eq!(pinky["params"][1]["value"], "A");
        assert_eq!(layer[36].to_tagged_value()["params"][0]["value"], "S");
    }

    #[test]
    fn test_finger_layer_shape() {
        let layer = finger_layer(&FINGERS[0]).unwrap().to_layer();
        assert_eq!(layer[35].to_tagged_value()["value"], "&none");
        assert_eq!(layer[36].to_tagged_value()["value"], "&BHRM_L_Pinky_Ring");
        assert_eq!(layer[23].to_tagged_value()["value"], "&BHRM_L_Pinky_Tap");
        assert_eq!(layer[41].to_tagged_value()["value"], "&kp");
        assert_eq!(layer[29].to_tagged_value()["value"], "&trans");
    }

    #[test]
    fn test_chord_hold_taps_per_finger() {
        let hold_taps = chord_hold_taps(&FINGERS[2]).unwrap();
        let names: Vec<&str> = hold_taps.iter().map(HoldTapSpec::name).collect();
        assert_eq!(
            names,
            vec!["&BHRM_R_Index_Pinky", "&BHRM_R_Index_Ring", "&BHRM_R_Index_Middle"]
        );
    }

    #[test]
    fn test_field_order_puts_creator_after_unlisted() {
        let position = |field: &str| FIELD_ORDER.iter().position(|f| *f == field);
        assert_eq!(position("creator"), Some(4));
        assert_eq!(FIELD_ORDER.len(), crate::document::DEFAULT_FIELD_ORDER.len());
    }
}
