//! Sparse layer specs and their dense expansion.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::behavior::{kp, Behavior, LayerRef};
use crate::catalog::BEHAVIOR_SIGIL;
use crate::error::SpecError;
use crate::node::Node;

/// Number of key slots on a Glove80 layer.
pub const LAYER_LENGTH: usize = 80;

/// A dense, canonical layer (exactly [`LAYER_LENGTH`] slots once expanded).
pub type Layer = Vec<Node>;

/// Sparse layer: per-slot overrides over a default binding.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    overrides: BTreeMap<usize, Behavior>,
    default: Behavior,
}

impl LayerSpec {
    /// Build a layer spec with `&trans` as the default binding.
    pub fn new<I>(overrides: I) -> Result<Self, SpecError>
    where
        I: IntoIterator<Item = (i64, Behavior)>,
    {
        let mut normalized = BTreeMap::new();
        for (index, behavior) in overrides {
            normalized.insert(checked_index(index)?, behavior);
        }
        Ok(Self {
            overrides: normalized,
            default: transparent(),
        })
    }

    /// Build a layer spec from untyped override keys (as read from JSON or
    /// a script), coercing each key to a slot index.
    pub fn from_raw_overrides<I>(overrides: I) -> Result<Self, SpecError>
    where
        I: IntoIterator<Item = (Value, Behavior)>,
    {
        let mut normalized = BTreeMap::new();
        for (raw, behavior) in overrides {
            let index = coerce_override_index(&raw)?;
            normalized.insert(checked_index(index)?, behavior);
        }
        Ok(Self {
            overrides: normalized,
            default: transparent(),
        })
    }

    /// A layer where every slot falls through to the layer below.
    pub fn transparent() -> Self {
        Self {
            overrides: BTreeMap::new(),
            default: transparent(),
        }
    }

    pub fn with_default(mut self, default: Behavior) -> Self {
        self.default = default;
        self
    }

    pub fn overrides(&self) -> &BTreeMap<usize, Behavior> {
        &self.overrides
    }

    /// Replace or add overrides, keeping the existing ones.
    pub fn patched<I>(mut self, patch: I) -> Result<Self, SpecError>
    where
        I: IntoIterator<Item = (i64, Behavior)>,
    {
        for (index, behavior) in patch {
            self.overrides.insert(checked_index(index)?, behavior);
        }
        Ok(self)
    }

    /// Expand to a dense [`LAYER_LENGTH`]-slot layer.
    pub fn to_layer(&self) -> Layer {
        let mut layer = vec![self.default.to_canonical(); LAYER_LENGTH];
        for (index, behavior) in &self.overrides {
            layer[*index] = behavior.to_canonical();
        }
        layer
    }
}

fn transparent() -> Behavior {
    Behavior::transparent()
}

fn checked_index(index: i64) -> Result<usize, SpecError> {
    let upper = LAYER_LENGTH - 1;
    if index < 0 || index as usize > upper {
        return Err(SpecError::IndexOutOfRange { index, max: upper });
    }
    Ok(index as usize)
}

/// Coerce an untyped override key into an integer index.
///
/// Integers, integral floats and base-10 integer strings are accepted.
/// Booleans are rejected even though they are integer-like.
pub fn coerce_override_index(raw: &Value) -> Result<i64, SpecError> {
    match raw {
        Value::Bool(_) => Err(SpecError::InvalidIndexType(
            "override indices must be integers, not bools".to_string(),
        )),
        Value::Number(number) => {
            if let Some(index) = number.as_i64() {
                return Ok(index);
            }
            match number.as_f64() {
                Some(float) if float.fract() == 0.0 && float.is_finite() => Ok(float as i64),
                _ => Err(SpecError::InvalidIndexType(format!(
                    "override index {} has a fractional component",
                    number
                ))),
            }
        }
        Value::String(text) => text.trim().parse::<i64>().map_err(|_| {
            SpecError::InvalidIndexType(format!(
                "override index '{}' is not an integer string",
                text
            ))
        }),
        Value::Null => Err(SpecError::InvalidIndexType("null".to_string())),
        Value::Array(_) => Err(SpecError::InvalidIndexType("array".to_string())),
        Value::Object(_) => Err(SpecError::InvalidIndexType("object".to_string())),
    }
}

/// A token in a row-based layer description.
#[derive(Debug, Clone)]
pub enum Token {
    /// A sigil behavior (`&trans`) or a key name expanded to `&kp <name>`.
    Key(&'static str),
    /// An explicit behavior.
    Behavior(Behavior),
    /// A literal integer slot value.
    Int(i64),
    /// A layer reference slot value.
    Layer(LayerRef),
}

impl Token {
    fn into_behavior(self) -> Result<Behavior, SpecError> {
        match self {
            Token::Key(name) if name.starts_with(BEHAVIOR_SIGIL) => Behavior::named(name),
            Token::Key(name) => kp(name),
            Token::Behavior(behavior) => Ok(behavior),
            Token::Int(value) => Ok(Behavior::int(value)),
            Token::Layer(layer) => Ok(Behavior::layer(layer.name)),
        }
    }
}

impl From<&'static str> for Token {
    fn from(value: &'static str) -> Self {
        Token::Key(value)
    }
}

impl From<Behavior> for Token {
    fn from(value: Behavior) -> Self {
        Token::Behavior(value)
    }
}

/// Build a fully specified layer from rows of tokens.
///
/// The rows must flatten to exactly [`LAYER_LENGTH`] tokens.
pub fn rows_to_layer_spec<R>(rows: R) -> Result<LayerSpec, SpecError>
where
    R: IntoIterator<Item = Vec<Token>>,
{
    let flat: Vec<Token> = rows.into_iter().flatten().collect();
    if flat.len() != LAYER_LENGTH {
        return Err(SpecError::validation(
            "rows",
            format!("expected {} entries for a layer, got {}", LAYER_LENGTH, flat.len()),
        ));
    }
    let overrides = flat
        .into_iter()
        .enumerate()
        .map(|(index, token)| Ok((index as i64, token.into_behavior()?)))
        .collect::<Result<Vec<_>, SpecError>>()?;
    LayerSpec::new(overrides)
}
