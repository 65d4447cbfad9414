//! TailorKey layouts
//!
//! Home row modifiers on a QWERTY base, an autoshift layer, cursor and
//! symbol layers, a gaming layer and the mouse stack. The `dual` variant
//! carries both the Windows and the macOS home row layer and switches
//! between them from the Magic layer.

use glove80_spec::{
    kp, ks, modifier, rows_to_layer_spec, Behavior, ComboSpec, HoldTapFlavor, HoldTapSpec,
    LayerSpec, LayerTarget, MacroSpec, SpecError,
};

use super::{
    chord, keys, kp_overrides, left_hand_positions, lower_layer, lt, magic, magic_layer, mo,
    mouse_components, right_hand_positions, to, tog, ListenerDescriptions,
};
use crate::compose::{ComposeError, FeatureComponents, LayoutBuilder};
use crate::document::{CommonFields, ConfigParameter, LayoutPayload};
use crate::family::Family;
use crate::metadata::MetadataTable;

const VARIANTS: &[&str] = &["windows", "mac", "dual"];

const CORE_LAYERS: [&str; 7] = ["Typing", "Autoshift", "Cursor", "Symbol", "Gaming", "Lower", "Magic"];

/// Letters that autoshift on hold, by slot.
const LETTERS: &[(i64, &str)] = &[
    (23, "Q"), (24, "W"), (25, "E"), (26, "R"), (27, "T"),
    (28, "Y"), (29, "U"), (30, "I"), (31, "O"), (32, "P"),
    (35, "A"), (36, "S"), (37, "D"), (38, "F"), (39, "G"),
    (40, "H"), (41, "J"), (42, "K"), (43, "L"),
    (47, "Z"), (48, "X"), (49, "C"), (50, "V"), (51, "B"),
    (58, "N"), (59, "M"),
];

const WINDOWS_STICKY_DESC: &str =
    "sticky \"hyper\" modifiers (Win + Alt + Ctrl + Shift) - Use with Tab - TailorKey";
const WINDOWS_MEH_DESC: &str =
    "sticky \"meh\" modifiers (Alt + Ctrl + Shift) - Use with Tab - TailorKey";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Os {
    Windows,
    Mac,
}

impl Os {
    fn hrm_layer(self) -> &'static str {
        match self {
            Os::Windows => "HRM_WinLinx",
            Os::Mac => "HRM_macOS",
        }
    }

    /// Home row modifiers, pinky to index.
    fn home_row_modifiers(self) -> [&'static str; 4] {
        match self {
            Os::Windows => ["LGUI", "LALT", "LCTRL", "LSHFT"],
            Os::Mac => ["LCTRL", "LALT", "LGUI", "LSHFT"],
        }
    }

    /// Modifier for clipboard and word shortcuts.
    fn shortcut_modifier(self) -> &'static str {
        match self {
            Os::Windows => "LC",
            Os::Mac => "LG",
        }
    }

    /// Modifier held while cycling windows.
    fn switcher_modifier(self) -> &'static str {
        match self {
            Os::Windows => "LALT",
            Os::Mac => "LGUI",
        }
    }
}

pub struct TailorKeyFamily;

impl Family for TailorKeyFamily {
    fn name(&self) -> &str {
        "tailorkey"
    }

    fn variants(&self) -> &[&'static str] {
        VARIANTS
    }

    fn build(&self, variant: &str, metadata: &MetadataTable) -> Result<LayoutPayload, ComposeError> {
        let systems: &[Os] = match variant {
            "windows" => &[Os::Windows],
            "mac" => &[Os::Mac],
            "dual" => &[Os::Windows, Os::Mac],
            other => return Err(self.unknown_variant(other)),
        };
        let primary = systems[0];
        let hrm_layers: Vec<&str> = systems.iter().map(|os| os.hrm_layer()).collect();

        let mut builder = LayoutBuilder::new(self.metadata_key(), variant, common_fields());
        builder.set_layer_order(hrm_layers.iter().copied().chain(CORE_LAYERS));

        for os in systems {
            builder.update_layer(os.hrm_layer(), hrm_layer(*os)?);
        }
        builder.add_layers(
            [
                ("Typing", typing_layer()?),
                ("Autoshift", autoshift_layer()?),
                ("Symbol", symbol_layer()?),
                ("Gaming", gaming_layer()?),
                ("Lower", lower_layer()?),
                ("Magic", dual_switch(magic_layer()?, systems)?),
            ],
            None,
        )?;
        builder.add_cursor_layer("Cursor", cursor_layer(primary)?, Vec::new(), Some("Autoshift"))?;

        builder.add_home_row_mods(
            primary.hrm_layer(),
            FeatureComponents {
                hold_taps: home_row_hold_taps()?,
                ..FeatureComponents::default()
            },
            None,
        )?;
        builder.add_hold_taps(vec![autoshift_hold_tap()?]);
        builder.add_macros(vec![autoshift_macro()?], false);
        builder.add_mouse_layers(mouse_feature(variant)?, Some("Lower"))?;
        builder.add_macros(vec![mod_tab_macro()?], true);
        builder.add_combos(combos(variant, &hrm_layers)?);
        builder.build(metadata)
    }
}

fn common_fields() -> CommonFields {
    CommonFields::base("TailorKey")
        .with_config_parameter(ConfigParameter::new("HID_POINTING", "y"))
        .with_custom_defined_behaviors(
            "// TailorKey\n#define HRM_TAPPING_TERM 280\n#define AS_TAPPING_TERM 190\n",
        )
}

/// Thumb cluster shared by the typing-style layers.
fn thumb_overrides() -> Result<Vec<(i64, Behavior)>, SpecError> {
    Ok(vec![
        (52, lt("Cursor", "BSPC")?),
        (53, kp("LCTRL")?),
        (54, mo("Lower")?),
        (55, kp("LGUI")?),
        (56, kp("RCTRL")?),
        (57, lt("Symbol", "TAB")?),
        (64, magic()?),
        (69, lt("Mouse", "ESC")?),
        (70, kp("DEL")?),
        (71, kp("LALT")?),
        (72, kp("RALT")?),
        (73, kp("RET")?),
        (74, lt("Cursor", "SPACE")?),
    ])
}

fn typing_layer() -> Result<LayerSpec, SpecError> {
    rows_to_layer_spec(vec![
        keys(&["F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8", "F9", "F10"]),
        keys(&["EQUAL", "N1", "N2", "N3", "N4", "N5", "N6", "N7", "N8", "N9", "N0", "MINUS"]),
        keys(&["TAB", "Q", "W", "E", "R", "T", "Y", "U", "I", "O", "P", "BSLH"]),
        keys(&["ESC", "A", "S", "D", "F", "G", "H", "J", "K", "L", "SEMI", "SQT"]),
        keys(&[
            "GRAVE", "Z", "X", "C", "V", "B", "LSHFT", "LCTRL", "&trans", "LGUI", "RCTRL", "RSHFT",
            "N", "M", "COMMA", "DOT", "FSLH", "PG_UP",
        ]),
        keys(&[
            "&trans", "HOME", "END", "LEFT", "RIGHT", "BSPC", "DEL", "LALT", "RALT", "RET",
            "SPACE", "UP", "DOWN", "LBKT", "RBKT", "PG_DN",
        ]),
    ])?
    .patched(thumb_overrides()?)
}

/// Home row hold-tap names, left pinky to right pinky.
const HRM_NAMES: [&str; 8] = [
    "&HRM_left_pinky_v1_TKZ",
    "&HRM_left_ring_v1_TKZ",
    "&HRM_left_middy_v1_TKZ",
    "&HRM_left_index_v1_TKZ",
    "&HRM_right_index_v1_TKZ",
    "&HRM_right_middy_v1_TKZ",
    "&HRM_right_ring_v1_TKZ",
    "&HRM_right_pinky_v1_TKZ",
];

/// Home row slots in the same order as [`HRM_NAMES`].
const HRM_SLOTS: [(i64, &str); 8] = [
    (35, "A"),
    (36, "S"),
    (37, "D"),
    (38, "F"),
    (41, "J"),
    (42, "K"),
    (43, "L"),
    (44, "SEMI"),
];

fn hrm_layer(os: Os) -> Result<LayerSpec, SpecError> {
    let left = os.home_row_modifiers();
    let mut right = left;
    right.reverse();
    let modifiers = left.iter().chain(right.iter());

    let overrides = HRM_NAMES
        .iter()
        .zip(HRM_SLOTS)
        .zip(modifiers)
        .map(|((name, (slot, key)), hold)| Ok((slot, Behavior::new(*name, [*hold, key])?)))
        .collect::<Result<Vec<_>, SpecError>>()?;
    typing_layer()?.patched(overrides)
}

fn home_row_hold_taps() -> Result<Vec<HoldTapSpec>, SpecError> {
    HRM_NAMES
        .iter()
        .enumerate()
        .map(|(position, name)| {
            let (side, opposite) = if position < 4 {
                ("left", right_hand_positions())
            } else {
                ("right", left_hand_positions())
            };
            HoldTapSpec::new(
                *name,
                format!("homerow mods {} hand - TailorKey", side),
                ["&kp", "&kp"],
            )?
            .with_tapping_term_ms(280)
            .with_flavor(HoldTapFlavor::Balanced)
            .with_quick_tap_ms(300)
            .with_require_prior_idle_ms(150)
            .with_hold_trigger_on_release(true)
            .with_hold_trigger_key_positions(opposite)
        })
        .collect()
}

fn autoshift_hold_tap() -> Result<HoldTapSpec, SpecError> {
    Ok(HoldTapSpec::new(
        "&AS_v1_TKZ",
        "AutoShift - TailorKey",
        ["&AS_Shifted_v1_TKZ", "&kp"],
    )?
    .with_tapping_term_ms(190)
    .with_flavor(HoldTapFlavor::TapPreferred)
    .with_quick_tap_ms(0))
}

fn autoshift_macro() -> Result<MacroSpec, SpecError> {
    Ok(MacroSpec::new(
        "&AS_Shifted_v1_TKZ",
        "AutoShift helper - TailorKey",
        vec![
            Behavior::named("&macro_press")?,
            kp("LSHFT")?,
            Behavior::named("&macro_param_1to1")?,
            Behavior::named("&macro_tap")?,
            kp("MACRO_PLACEHOLDER")?,
            Behavior::named("&macro_release")?,
            kp("LSHFT")?,
        ],
    )?
    .with_params(["code"])
    .with_wait_ms(0)
    .with_tap_ms(0))
}

fn mod_tab_macro() -> Result<MacroSpec, SpecError> {
    Ok(MacroSpec::new(
        "&mod_tab_v1_TKZ",
        "mod tab switcher - TailorKey",
        vec![
            Behavior::named("&macro_param_1to1")?,
            Behavior::named("&macro_press")?,
            kp("MACRO_PLACEHOLDER")?,
            Behavior::named("&macro_tap")?,
            kp("TAB")?,
            Behavior::named("&macro_pause_for_release")?,
            Behavior::named("&macro_param_1to1")?,
            Behavior::named("&macro_release")?,
            kp("MACRO_PLACEHOLDER")?,
        ],
    )?
    .with_params(["code"]))
}

fn autoshift_layer() -> Result<LayerSpec, SpecError> {
    let overrides = LETTERS
        .iter()
        .map(|(slot, letter)| Ok((*slot, Behavior::new("&AS_v1_TKZ", [*letter, *letter])?)))
        .collect::<Result<Vec<_>, SpecError>>()?;
    LayerSpec::new(overrides)
}

fn cursor_layer(os: Os) -> Result<LayerSpec, SpecError> {
    let shortcut = os.shortcut_modifier();
    let mut overrides = kp_overrides(&[
        (28, "PG_UP"),
        (29, "HOME"),
        (30, "UP"),
        (31, "END"),
        (40, "PG_DN"),
        (41, "LEFT"),
        (42, "DOWN"),
        (43, "RIGHT"),
        (44, "RET"),
    ])?;
    for (slot, key) in [(47, "Z"), (48, "X"), (49, "C"), (50, "V"), (51, "Y")] {
        overrides.push((slot, chord(shortcut, key)?));
    }
    overrides.push((
        53,
        Behavior::new("&mod_tab_v1_TKZ", [os.switcher_modifier()])?,
    ));
    overrides.push((35, ks("&sk", [os.home_row_modifiers()[0]])?));
    overrides.push((38, Behavior::named("&caps_word")?));
    LayerSpec::new(overrides)
}

fn symbol_layer() -> Result<LayerSpec, SpecError> {
    LayerSpec::new(kp_overrides(&[
        (23, "EXCL"),
        (24, "AT"),
        (25, "HASH"),
        (26, "DLLR"),
        (27, "PRCNT"),
        (28, "CARET"),
        (29, "AMPS"),
        (30, "STAR"),
        (31, "LPAR"),
        (32, "RPAR"),
        (35, "LBKT"),
        (36, "RBKT"),
        (37, "LBRC"),
        (38, "RBRC"),
        (39, "PIPE"),
        (40, "MINUS"),
        (41, "UNDER"),
        (42, "EQUAL"),
        (43, "PLUS"),
        (44, "COLON"),
        (47, "TILDE"),
        (48, "GRAVE"),
        (49, "BSLH"),
        (50, "SQT"),
        (51, "DQT"),
    ])?)
}

/// Plain keys with a gaming-friendly left thumb cluster.
fn gaming_layer() -> Result<LayerSpec, SpecError> {
    typing_layer()?.patched(kp_overrides(&[
        (52, "SPACE"),
        (53, "LCTRL"),
        (54, "LALT"),
        (69, "LSHFT"),
        (70, "ENTER"),
        (71, "ESC"),
    ])?)
}

/// In the dual variant the Magic layer switches between the home row
/// layers.
fn dual_switch(magic: LayerSpec, systems: &[Os]) -> Result<LayerSpec, SpecError> {
    if systems.len() < 2 {
        return Ok(magic);
    }
    let mut patch = Vec::new();
    for (slot, os) in [11, 12].into_iter().zip(systems) {
        patch.push((slot, to(os.hrm_layer())?));
    }
    patch.push((15, to("Typing")?));
    magic.patched(patch)
}

fn mouse_feature(variant: &str) -> Result<FeatureComponents, SpecError> {
    let clipboard = match variant {
        "dual" => [
            Behavior::named("&none")?,
            Behavior::named("&none")?,
            Behavior::named("&none")?,
        ],
        "mac" => [chord("LG", "X")?, chord("LG", "C")?, chord("LG", "V")?],
        _ => [chord("LC", "X")?, chord("LC", "C")?, chord("LC", "V")?],
    };
    let descriptions = match variant {
        "windows" => ListenerDescriptions::PLAIN,
        "mac" => ListenerDescriptions {
            xy: ["LAYER_MouseSlow\n", "LAYER_MouseFast", "LAYER_MouseWarp"],
            scroll: ["LAYER_MouseSlow\n", "LAYER_MouseFast", "LAYER_MouseWarp"],
        },
        _ => ListenerDescriptions {
            xy: ["LAYER_MouseSlow", "LAYER_MouseFast", "LAYER_MouseWarp"],
            scroll: ["LAYER_MouseSlow\n", "LAYER_MouseFast", "LAYER_MouseWarp"],
        },
    };
    mouse_components(clipboard, &descriptions)
}

fn combos(variant: &str, hrm_layers: &[&str]) -> Result<Vec<ComboSpec>, SpecError> {
    let mut typing_layers: Vec<LayerTarget> =
        hrm_layers.iter().map(|name| LayerTarget::named(*name)).collect();
    typing_layers.push(LayerTarget::named("Autoshift"));

    let windows = variant == "windows";
    let hyper = ks(
        "&sk",
        [modifier("LG", modifier("LA", modifier("LC", "LSHFT")?)?)?],
    )?;
    let meh = ks("&sk", [modifier("LA", modifier("LC", "LSHFT")?)?])?;

    let combo = |name: &str, description: &str, binding: Behavior, positions: [u8; 2]| {
        ComboSpec::new(
            name,
            description,
            binding,
            positions.to_vec(),
            typing_layers.clone(),
        )
        .map(|spec| spec.with_timeout_ms(50))
    };

    Ok(vec![
        combo(
            "capslock_v1_TKZ",
            "capslock when pressing both T1's - TailorKey",
            kp("CAPS")?,
            [52, 57],
        )?,
        combo(
            "F11_v1_TKZ",
            "F11 on RH_C5 and RH_R1+R2 - TailorKey",
            kp("F11")?,
            [8, 20],
        )?,
        combo(
            "F12_v1_TKZ",
            "F12 on RH_C6 and RH_R1+R2 - TailorKey",
            kp("F12")?,
            [9, 21],
        )?,
        combo(
            "sticky_hyp_rght_v1_TKZ",
            if windows {
                WINDOWS_STICKY_DESC
            } else {
                "sticky \"hyper\" modifiers (Win + Alt + Ctrl + Shift) - TailorKey"
            },
            hyper,
            [74, 57],
        )?,
        combo(
            "sticky_meh_rght_v1_TKZ",
            if windows {
                WINDOWS_MEH_DESC
            } else {
                "sticky \"meh\" modifiers (Alt + Ctrl + Shift) - TailorKey"
            },
            meh,
            [73, 74],
        )?,
        ComboSpec::new(
            "gaming_layer_v1_TKZ",
            "toggle gaming layer - TailorKey",
            tog("Gaming")?,
            vec![51, 68],
            vec![LayerTarget::ALL],
        )?
        .with_timeout_ms(50),
    ])
}
