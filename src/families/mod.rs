//! Built-in layout families
//!
//! - `default`: the MoErgo factory layouts
//! - `tailorkey`: home row mods, autoshift and mouse layers
//! - `quantum_touch`: finger layers with a layered mouse stack
//! - `glorious_engrammer`: Engram letters with thumb layer-taps
//!
//! Components shared between families (Lower, Magic, mouse layers) live
//! here.

mod default;
mod glorious_engrammer;
mod quantum_touch;
mod tailorkey;

pub use default::DefaultFamily;
pub use glorious_engrammer::GloriousEngrammerFamily;
pub use quantum_touch::QuantumTouchFamily;
pub use tailorkey::TailorKeyFamily;

use glove80_spec::{
    kp, ks, layer_param, Behavior, InputListenerSpec, InputProcessorSpec, LayerSpec, LayerTarget,
    ListenerNodeSpec, Param, SpecError, Token,
};

use crate::compose::{ComposeError, FeatureComponents};
use crate::family::Registry;

/// Registry with every built-in family.
pub fn builtin_registry() -> Result<Registry, ComposeError> {
    let mut registry = Registry::new();
    registry.register(Box::new(DefaultFamily))?;
    registry.register(Box::new(TailorKeyFamily))?;
    registry.register(Box::new(QuantumTouchFamily))?;
    registry.register(Box::new(GloriousEngrammerFamily))?;
    Ok(registry)
}

/// Mouse speed layers, slowest first.
pub(crate) const MOUSE_SPEED_LAYERS: [&str; 3] = ["MouseSlow", "MouseFast", "MouseWarp"];

/// Key-name tokens for one physical row.
pub(crate) fn keys(names: &[&'static str]) -> Vec<Token> {
    names.iter().copied().map(Token::from).collect()
}

/// `&kp` overrides for `(slot, key)` pairs.
pub(crate) fn kp_overrides(pairs: &[(i64, &str)]) -> Result<Vec<(i64, Behavior)>, SpecError> {
    pairs
        .iter()
        .map(|(slot, key)| Ok((*slot, kp(key)?)))
        .collect()
}

/// `&kp <modifier>(<key>)`, e.g. `chord("LC", "C")` for Ctrl+C.
pub(crate) fn chord(modifier: &str, key: &str) -> Result<Behavior, SpecError> {
    ks("&kp", [glove80_spec::modifier(modifier, key)?])
}

pub(crate) fn mo(layer: &str) -> Result<Behavior, SpecError> {
    ks("&mo", [layer_param(layer)])
}

pub(crate) fn to(layer: &str) -> Result<Behavior, SpecError> {
    ks("&to", [layer_param(layer)])
}

pub(crate) fn tog(layer: &str) -> Result<Behavior, SpecError> {
    ks("&tog", [layer_param(layer)])
}

/// Layer-tap: `layer` on hold, `key` on tap.
pub(crate) fn lt(layer: &str, key: &str) -> Result<Behavior, SpecError> {
    Behavior::new("&lt", [Param::from(layer_param(layer)), Param::from(key)])
}

/// The Magic key: momentary Magic layer with the status LED indicator.
pub(crate) fn magic() -> Result<Behavior, SpecError> {
    Behavior::new("&magic", [Param::from(layer_param("Magic")), Param::Int(0)])
}

fn command(behavior: &str, name: &str) -> Result<Behavior, SpecError> {
    ks(behavior, [name])
}

/// Key positions on the left half, function row to lower thumb cluster.
pub(crate) fn left_hand_positions() -> Vec<u8> {
    let ranges = [0..5, 10..16, 22..28, 34..40, 46..55, 64..72];
    ranges.into_iter().flatten().collect()
}

/// Key positions on the right half.
pub(crate) fn right_hand_positions() -> Vec<u8> {
    let left = left_hand_positions();
    (0u8..80).filter(|position| !left.contains(position)).collect()
}

/// Numpad and media layer shared by every family.
pub(crate) fn lower_layer() -> Result<LayerSpec, SpecError> {
    let mut overrides = kp_overrides(&[
        (0, "C_BRI_DN"),
        (1, "C_BRI_UP"),
        (2, "C_PREV"),
        (3, "C_NEXT"),
        (4, "C_PP"),
        (5, "C_MUTE"),
        (6, "C_VOL_DN"),
        (7, "C_VOL_UP"),
        (9, "PAUSE_BREAK"),
        (16, "KP_NUM"),
        (17, "EQUAL"),
        (18, "KP_DIVIDE"),
        (19, "KP_MULTIPLY"),
        (24, "UP"),
        (29, "KP_N7"),
        (30, "KP_N8"),
        (31, "KP_N9"),
        (32, "KP_MINUS"),
        (35, "LEFT"),
        (36, "DOWN"),
        (37, "RIGHT"),
        (41, "KP_N4"),
        (42, "KP_N5"),
        (43, "KP_N6"),
        (44, "KP_PLUS"),
        (59, "KP_N1"),
        (60, "KP_N2"),
        (61, "KP_N3"),
        (62, "KP_ENTER"),
        (76, "KP_N0"),
        (77, "KP_DOT"),
    ])?;
    overrides.push((8, Behavior::named("&none")?));
    LayerSpec::new(overrides)
}

/// Bluetooth, output and lighting controls behind the Magic key.
///
/// Unassigned keys are `&none` so nothing leaks through from below.
pub(crate) fn magic_layer() -> Result<LayerSpec, SpecError> {
    let overrides = vec![
        (0, command("&bt", "BT_CLR")?),
        (1, command("&bt", "BT_PRV")?),
        (2, command("&bt", "BT_NXT")?),
        (3, command("&out", "OUT_USB")?),
        (4, command("&out", "OUT_BLE")?),
        (10, Behavior::named("&bootloader")?),
        (21, Behavior::named("&bootloader")?),
        (22, Behavior::named("&sys_reset")?),
        (33, Behavior::named("&sys_reset")?),
        (34, command("&rgb_ug", "RGB_TOG")?),
        (35, command("&rgb_ug", "RGB_BRI")?),
        (36, command("&rgb_ug", "RGB_BRD")?),
        (37, command("&rgb_ug", "RGB_HUI")?),
        (38, command("&rgb_ug", "RGB_HUD")?),
        (46, command("&rgb_ug", "RGB_EFF")?),
        (47, command("&rgb_ug", "RGB_EFR")?),
        (48, command("&rgb_ug", "RGB_SPI")?),
        (49, command("&rgb_ug", "RGB_SPD")?),
        (64, Behavior::transparent()),
    ];
    Ok(LayerSpec::new(overrides)?.with_default(Behavior::named("&none")?))
}

/// Node and scroll descriptions for the two mouse listeners, per speed
/// layer.
pub(crate) struct ListenerDescriptions {
    pub xy: [&'static str; 3],
    pub scroll: [&'static str; 3],
}

impl ListenerDescriptions {
    pub(crate) const PLAIN: ListenerDescriptions = ListenerDescriptions {
        xy: ["LAYER_MouseSlow", "LAYER_MouseFast", "LAYER_MouseWarp"],
        scroll: ["LAYER_MouseSlow", "LAYER_MouseFast", "LAYER_MouseWarp"],
    };
}

/// Mouse layer, its speed layers and the listeners that scale pointer and
/// scroll movement on them.
///
/// `clipboard` fills the cut/copy/paste keys on the lower thumb row.
pub(crate) fn mouse_components(
    clipboard: [Behavior; 3],
    descriptions: &ListenerDescriptions,
) -> Result<FeatureComponents, SpecError> {
    let mut overrides = vec![
        (28, command("&msc", "SCRL_UP")?),
        (29, command("&mmv", "MOVE_UP")?),
        (40, command("&msc", "SCRL_DOWN")?),
        (41, command("&mmv", "MOVE_LEFT")?),
        (42, command("&mmv", "MOVE_DOWN")?),
        (43, command("&mmv", "MOVE_RIGHT")?),
        (72, command("&mkp", "MCLK")?),
        (73, command("&mkp", "LCLK")?),
        (74, command("&mkp", "RCLK")?),
    ];
    for (slot, layer) in [36, 37, 38].into_iter().zip(MOUSE_SPEED_LAYERS) {
        overrides.push((slot, mo(layer)?));
    }
    for (slot, behavior) in [55, 56, 57].into_iter().zip(clipboard) {
        overrides.push((slot, behavior));
    }

    let mut layers = vec![("Mouse".to_string(), LayerSpec::new(overrides)?)];
    for name in MOUSE_SPEED_LAYERS {
        layers.push((name.to_string(), LayerSpec::transparent()));
    }

    let listeners = vec![
        mouse_listener("&mmv_input_listener", "&zip_xy_scaler", &descriptions.xy)?,
        mouse_listener("&msc_input_listener", "&zip_scroll_scaler", &descriptions.scroll)?,
    ];

    Ok(FeatureComponents {
        layers,
        listeners,
        ..FeatureComponents::default()
    })
}

fn mouse_listener(
    code: &str,
    processor: &str,
    descriptions: &[&'static str; 3],
) -> Result<InputListenerSpec, SpecError> {
    let scales: [(i64, i64); 3] = [(1, 9), (3, 1), (12, 1)];
    let nodes = MOUSE_SPEED_LAYERS
        .iter()
        .zip(descriptions)
        .zip(scales)
        .map(|((layer, description), (multiplier, divisor))| {
            Ok(
                ListenerNodeSpec::new(format!("LAYER_{}", layer), vec![LayerTarget::named(*layer)])?
                    .with_description(*description)
                    .with_input_processors(vec![InputProcessorSpec::new(
                        processor,
                        [multiplier, divisor],
                    )?]),
            )
        })
        .collect::<Result<Vec<_>, SpecError>>()?;
    InputListenerSpec::new(code, nodes)
}
