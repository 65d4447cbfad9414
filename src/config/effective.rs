//! Effective configuration with provenance
//!
//! The merged configuration value plus the sources that contributed to it,
//! and the typed settings deserialized from it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use glove80_spec::ErrorCode;

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;

/// Config file read when `--config` is not given, relative to the working
/// directory. Missing is fine.
pub const DEFAULT_CONFIG_PATH: &str = ".glove80/layouts.toml";

/// Origin of a configuration source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    File,
    Cli,
}

/// A contributing config source with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 of the file contents
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// `[generate]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateSettings {
    #[serde(default)]
    pub dry_run: bool,
}

/// Typed generator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    pub output_root: PathBuf,
    #[serde(default)]
    pub metadata_path: Option<PathBuf>,
    #[serde(default)]
    pub families: Vec<String>,
    #[serde(default)]
    pub generate: GenerateSettings,
}

impl GeneratorConfig {
    /// Resolve the effective configuration and deserialize it.
    ///
    /// `explicit` must exist when given; otherwise [`DEFAULT_CONFIG_PATH`]
    /// is read if present.
    pub fn load(explicit: Option<&Path>, cli: Option<Value>) -> Result<Self, ConfigError> {
        EffectiveConfig::load(explicit, cli)?.settings()
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let defaults = BuiltinDefaults::default();
        Self {
            output_root: PathBuf::from(defaults.output_root),
            metadata_path: defaults.metadata_path.map(PathBuf::from),
            families: defaults.families,
            generate: GenerateSettings {
                dry_run: defaults.dry_run,
            },
        }
    }
}

/// Merged configuration with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveConfig {
    /// The merged configuration object
    pub config: Value,

    /// Contributing sources in precedence order
    pub sources: Vec<ConfigSource>,
}

impl EffectiveConfig {
    /// Pick the config file (explicit path or the default location) and
    /// build.
    pub fn load(explicit: Option<&Path>, cli: Option<Value>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::build(Some(path), cli)
            }
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                let file = if default.exists() { Some(default) } else { None };
                Self::build(file, cli)
            }
        }
    }

    /// Merge built-in defaults, `file` and CLI overrides.
    pub fn build(file: Option<&Path>, cli: Option<Value>) -> Result<Self, ConfigError> {
        let mut layers = vec![BuiltinDefaults::default().to_value()];
        let mut sources = vec![ConfigSource {
            origin: ConfigOrigin::Builtin,
            path: None,
            digest: None,
        }];

        if let Some(path) = file {
            let (value, digest) = load_toml_file(path)?;
            layers.push(value);
            sources.push(ConfigSource {
                origin: ConfigOrigin::File,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        if let Some(cli) = cli {
            layers.push(cli);
            sources.push(ConfigSource {
                origin: ConfigOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        Ok(Self {
            config: merge_layers(layers),
            sources,
        })
    }

    /// Deserialize and validate the merged value.
    pub fn settings(&self) -> Result<GeneratorConfig, ConfigError> {
        let settings: GeneratorConfig = serde_json::from_value(self.config.clone())?;
        if settings.output_root.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "output_root must not be empty".to_string(),
            ));
        }
        if let Some(family) = settings.families.iter().find(|f| f.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "families contains an empty name ({:?})",
                family
            )));
        }
        Ok(settings)
    }
}

/// Read and parse a TOML file, returning the value and its digest.
fn load_toml_file(path: &Path) -> Result<(Value, String), ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut hasher = Sha256::new();
    hasher.update(contents.as_bytes());
    let digest = hex::encode(hasher.finalize());

    let toml_value: toml::Value = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok((toml_to_json(toml_value), digest))
}

fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ConfigError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ConfigError::Io { .. } => ErrorCode::IoError,
            _ => ErrorCode::ConfigError,
        }
    }
}
