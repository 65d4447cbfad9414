//! Built-in keycode and behavior catalog.
//!
//! A compact subset of the ZMK keycode and behavior tables. Bare key names
//! (`A`, `LSHFT`, `LC`) are validated against [`KEY_NAMES`]; behaviors
//! (`&kp`, `&mo`, ...) carry a parameter signature used by the key
//! validation service.

/// Behavior sigil: names starting with it are behaviors, not key names.
pub const BEHAVIOR_SIGIL: char = '&';

/// Kind of value a behavior parameter accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Keycode,
    Layer,
    Integer,
    String,
}

/// One parameter of a behavior signature
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub kind: ParamKind,
    pub label: Option<&'static str>,
    pub minimum: Option<i64>,
    pub maximum: Option<i64>,
}

impl ParamSpec {
    const fn of(kind: ParamKind, label: &'static str) -> Self {
        Self {
            kind,
            label: Some(label),
            minimum: None,
            maximum: None,
        }
    }

    const fn bounded(label: &'static str, minimum: i64) -> Self {
        Self {
            kind: ParamKind::Integer,
            label: Some(label),
            minimum: Some(minimum),
            maximum: None,
        }
    }
}

/// A behavior code and the parameters it takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BehaviorSignature {
    pub code: &'static str,
    pub params: &'static [ParamSpec],
}

const KEYCODE: ParamSpec = ParamSpec::of(ParamKind::Keycode, "keycode");
const LAYER: ParamSpec = ParamSpec::of(ParamKind::Layer, "layer");
const MODIFIER: ParamSpec = ParamSpec::of(ParamKind::Keycode, "hold");
const COMMAND: ParamSpec = ParamSpec::of(ParamKind::String, "command");

/// Behaviors known to the catalog, sorted by code.
pub const BEHAVIORS: &[BehaviorSignature] = &[
    BehaviorSignature { code: "&bootloader", params: &[] },
    BehaviorSignature { code: "&bt", params: &[COMMAND] },
    BehaviorSignature { code: "&caps_word", params: &[] },
    BehaviorSignature { code: "&key_repeat", params: &[] },
    BehaviorSignature { code: "&kp", params: &[KEYCODE] },
    BehaviorSignature { code: "&lt", params: &[LAYER, KEYCODE] },
    BehaviorSignature { code: "&macro_pause_for_release", params: &[] },
    BehaviorSignature { code: "&macro_press", params: &[] },
    BehaviorSignature { code: "&macro_release", params: &[] },
    BehaviorSignature { code: "&macro_tap", params: &[] },
    BehaviorSignature { code: "&macro_tap_time", params: &[ParamSpec::bounded("ms", 0)] },
    BehaviorSignature { code: "&macro_wait_time", params: &[ParamSpec::bounded("ms", 0)] },
    BehaviorSignature { code: "&magic", params: &[LAYER, ParamSpec::bounded("index", 0)] },
    BehaviorSignature { code: "&mkp", params: &[COMMAND] },
    BehaviorSignature { code: "&mmv", params: &[COMMAND] },
    BehaviorSignature { code: "&mo", params: &[LAYER] },
    BehaviorSignature { code: "&msc", params: &[COMMAND] },
    BehaviorSignature { code: "&mt", params: &[MODIFIER, KEYCODE] },
    BehaviorSignature { code: "&none", params: &[] },
    BehaviorSignature { code: "&out", params: &[COMMAND] },
    BehaviorSignature { code: "&rgb_ug", params: &[COMMAND] },
    BehaviorSignature { code: "&sk", params: &[KEYCODE] },
    BehaviorSignature { code: "&sl", params: &[LAYER] },
    BehaviorSignature { code: "&sys_reset", params: &[] },
    BehaviorSignature { code: "&to", params: &[LAYER] },
    BehaviorSignature { code: "&tog", params: &[LAYER] },
    BehaviorSignature { code: "&trans", params: &[] },
];

/// Key names accepted as bare (non-sigil) behavior values.
pub const KEY_NAMES: &[&str] = &[
    // Letters
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R",
    "S", "T", "U", "V", "W", "X", "Y", "Z",
    // Digits
    "N0", "N1", "N2", "N3", "N4", "N5", "N6", "N7", "N8", "N9",
    // Function row
    "F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8", "F9", "F10", "F11", "F12", "F13", "F14",
    "F15", "F16", "F17", "F18", "F19", "F20", "F21", "F22", "F23", "F24",
    // Modifiers
    "LSHFT", "LSHIFT", "LEFT_SHIFT", "RSHFT", "RSHIFT", "RIGHT_SHIFT", "LCTRL", "LCTL",
    "LEFT_CONTROL", "RCTRL", "RCTL", "RIGHT_CONTROL", "LALT", "LEFT_ALT", "RALT", "RIGHT_ALT",
    "LGUI", "LCMD", "LWIN", "LEFT_GUI", "RGUI", "RCMD", "RWIN", "RIGHT_GUI",
    // Modifier functions
    "LS", "LC", "LA", "LG", "RS", "RC", "RA", "RG",
    // Editing and navigation
    "ENTER", "RET", "RETURN", "ESC", "ESCAPE", "TAB", "SPACE", "SPC", "BSPC", "BACKSPACE", "DEL",
    "DELETE", "INS", "INSERT", "HOME", "END", "PG_UP", "PAGE_UP", "PG_DN", "PAGE_DOWN", "LEFT",
    "RIGHT", "UP", "DOWN", "CAPS", "CAPSLOCK", "PSCRN", "PRINTSCREEN", "SLCK", "SCROLLLOCK",
    "PAUSE_BREAK", "K_APP", "K_CMENU", "K_UNDO", "K_CUT", "K_COPY", "K_PASTE", "K_REDO",
    // Punctuation
    "MINUS", "EQUAL", "LBKT", "RBKT", "BSLH", "SEMI", "SQT", "APOS", "GRAVE", "COMMA", "DOT",
    "FSLH", "SLASH", "EXCL", "AT", "HASH", "DLLR", "PRCNT", "CARET", "AMPS", "STAR", "ASTRK",
    "LPAR", "RPAR", "UNDER", "UNDERSCORE", "PLUS", "LBRC", "RBRC", "PIPE", "COLON", "DQT",
    "TILDE", "LT", "GT", "QMARK", "NON_US_BSLH",
    // Keypad
    "KP_N0", "KP_N1", "KP_N2", "KP_N3", "KP_N4", "KP_N5", "KP_N6", "KP_N7", "KP_N8", "KP_N9",
    "KP_DOT", "KP_PLUS", "KP_MINUS", "KP_MULTIPLY", "KP_DIVIDE", "KP_ENTER", "KP_NUM",
    // Media and system
    "C_VOL_UP", "C_VOL_DN", "C_MUTE", "C_PP", "C_NEXT", "C_PREV", "C_STOP", "C_BRI_UP",
    "C_BRI_DN", "C_PWR", "C_SLEEP",
    // Bluetooth, output and lighting commands
    "BT_CLR", "BT_NXT", "BT_PRV", "OUT_USB", "OUT_BLE", "OUT_TOG", "RGB_TOG", "RGB_BRI",
    "RGB_BRD", "RGB_HUI", "RGB_HUD", "RGB_SAI", "RGB_SAD", "RGB_EFF", "RGB_EFR", "RGB_SPI",
    "RGB_SPD",
    // Mouse emulation
    "LCLK", "RCLK", "MCLK", "MOVE_UP", "MOVE_DOWN", "MOVE_LEFT", "MOVE_RIGHT", "SCRL_UP",
    "SCRL_DOWN", "SCRL_LEFT", "SCRL_RIGHT",
    // Macro parameter placeholder
    "MACRO_PLACEHOLDER",
];

/// Check whether `name` is an exact key name from the catalog.
pub fn is_known_key_name(name: &str) -> bool {
    KEY_NAMES.contains(&name)
}

/// Look up a key name case-insensitively, returning the canonical spelling.
pub fn canonical_key_name(name: &str) -> Option<&'static str> {
    KEY_NAMES
        .iter()
        .copied()
        .find(|candidate| candidate.eq_ignore_ascii_case(name))
}

/// Look up a behavior signature by its code (`&kp`, `&mo`, ...).
pub fn behavior(code: &str) -> Option<&'static BehaviorSignature> {
    BEHAVIORS.iter().find(|signature| signature.code == code)
}

/// All behavior codes in catalog order.
pub fn behavior_codes() -> impl Iterator<Item = &'static str> {
    BEHAVIORS.iter().map(|signature| signature.code)
}
