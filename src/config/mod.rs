//! Generator configuration
//!
//! Settings are merged from three layers, later layers winning:
//! 1. Built-in defaults
//! 2. Config file (`.glove80/layouts.toml` or `--config`)
//! 3. CLI flags

mod defaults;
mod effective;
mod merge;

pub use defaults::BuiltinDefaults;
pub use effective::{
    ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig, GenerateSettings, GeneratorConfig,
    DEFAULT_CONFIG_PATH,
};
pub use merge::{deep_merge, merge_layers};
