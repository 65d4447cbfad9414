//! Key-binding primitives: behaviors, codes and layer references.

use serde_json::Value;

use crate::catalog::{is_known_key_name, BEHAVIOR_SIGIL};
use crate::error::SpecError;
use crate::node::Node;

/// Reference to a layer by name, resolved to an index at layout build time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerRef {
    pub name: String,
}

impl LayerRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// The `value` half of a binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Code {
    /// A behavior (`&kp`) or a bare key name (`A`, `LSHFT`).
    Name(String),
    /// A literal integer (layer index, timing, ...).
    Int(i64),
    /// A layer placeholder resolved later.
    Layer(LayerRef),
}

/// Declarative spec for a single key binding.
///
/// Canonicalizes to `{"value": ..., "params": [...]}`. Parameters are
/// themselves behaviors; scalars and layer references become leaf
/// behaviors with no parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Behavior {
    value: Code,
    params: Vec<Behavior>,
}

/// A parameter accepted by [`Behavior::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Behavior(Behavior),
    Layer(LayerRef),
    Int(i64),
    Str(String),
}

impl From<Behavior> for Param {
    fn from(value: Behavior) -> Self {
        Param::Behavior(value)
    }
}

impl From<LayerRef> for Param {
    fn from(value: LayerRef) -> Self {
        Param::Layer(value)
    }
}

impl From<i64> for Param {
    fn from(value: i64) -> Self {
        Param::Int(value)
    }
}

impl From<&str> for Param {
    fn from(value: &str) -> Self {
        Param::Str(value.to_string())
    }
}

impl From<String> for Param {
    fn from(value: String) -> Self {
        Param::Str(value)
    }
}

impl Behavior {
    /// Build a behavior from a name and parameters.
    ///
    /// Bare names (no `&` sigil), including those of nested parameters, must
    /// be known key names.
    pub fn new<I, P>(name: impl Into<String>, params: I) -> Result<Self, SpecError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Param>,
    {
        let value = Self::checked_name(name.into())?;
        let params = params
            .into_iter()
            .map(|param| Self::from_param(param.into()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { value, params })
    }

    /// A parameterless behavior or key name.
    pub fn named(name: impl Into<String>) -> Result<Self, SpecError> {
        Ok(Self {
            value: Self::checked_name(name.into())?,
            params: Vec::new(),
        })
    }

    /// `&trans`, the fall-through binding.
    pub fn transparent() -> Self {
        Self {
            value: Code::Name("&trans".to_string()),
            params: Vec::new(),
        }
    }

    /// A leaf behavior holding a literal integer.
    pub fn int(value: i64) -> Self {
        Self {
            value: Code::Int(value),
            params: Vec::new(),
        }
    }

    /// A leaf behavior holding a layer reference.
    pub fn layer(name: impl Into<String>) -> Self {
        Self {
            value: Code::Layer(LayerRef::new(name)),
            params: Vec::new(),
        }
    }

    pub fn value(&self) -> &Code {
        &self.value
    }

    pub fn params(&self) -> &[Behavior] {
        &self.params
    }

    /// Canonical node form; layer references are left for the resolver.
    pub fn to_canonical(&self) -> Node {
        let value = match &self.value {
            Code::Name(name) => Node::Str(name.clone()),
            Code::Int(number) => Node::from(*number),
            Code::Layer(layer) => Node::Layer(layer.clone()),
        };
        Node::map([
            ("value", value),
            (
                "params",
                Node::List(self.params.iter().map(Behavior::to_canonical).collect()),
            ),
        ])
    }

    /// Parse an untyped binding (`{"value": ..., "params": [...]}`).
    ///
    /// Bare strings and integers are accepted as parameterless leaves and a
    /// single-key `{"name": ...}` object is read as a layer reference.
    pub fn from_value(value: &Value) -> Result<Self, SpecError> {
        match value {
            Value::String(name) => Self::named(name.clone()),
            Value::Number(number) => number
                .as_i64()
                .map(Self::int)
                .ok_or_else(|| SpecError::UnsupportedParamType(format!("number {}", number))),
            Value::Object(map) => {
                if map.len() == 1 {
                    if let Some(Value::String(name)) = map.get("name") {
                        return Ok(Self::layer(name.clone()));
                    }
                }
                let code = match map.get("value") {
                    Some(Value::String(name)) => Self::checked_name(name.clone())?,
                    Some(Value::Number(number)) => {
                        Code::Int(number.as_i64().ok_or_else(|| {
                            SpecError::UnsupportedParamType(format!("number {}", number))
                        })?)
                    }
                    Some(Value::Object(inner)) => match inner.get("name") {
                        Some(Value::String(name)) if inner.len() == 1 => {
                            Code::Layer(LayerRef::new(name.clone()))
                        }
                        _ => {
                            return Err(SpecError::UnsupportedParamType(
                                "object binding value".to_string(),
                            ))
                        }
                    },
                    Some(other) => {
                        return Err(SpecError::UnsupportedParamType(type_name(other).to_string()))
                    }
                    None => return Err(SpecError::validation("value", "binding has no value")),
                };
                let params = match map.get("params") {
                    None | Some(Value::Null) => Vec::new(),
                    Some(Value::Array(items)) => items
                        .iter()
                        .map(Self::from_value)
                        .collect::<Result<Vec<_>, _>>()?,
                    Some(other) => {
                        return Err(SpecError::UnsupportedParamType(type_name(other).to_string()))
                    }
                };
                Ok(Self {
                    value: code,
                    params,
                })
            }
            other => Err(SpecError::UnsupportedParamType(type_name(other).to_string())),
        }
    }

    fn checked_name(name: String) -> Result<Code, SpecError> {
        if !name.starts_with(BEHAVIOR_SIGIL) && !is_known_key_name(&name) {
            return Err(SpecError::UnknownKeyName(name));
        }
        Ok(Code::Name(name))
    }

    fn from_param(param: Param) -> Result<Self, SpecError> {
        match param {
            Param::Behavior(behavior) => Ok(behavior),
            Param::Layer(layer) => Ok(Self {
                value: Code::Layer(layer),
                params: Vec::new(),
            }),
            Param::Int(number) => Ok(Self::int(number)),
            // String params are leaf codes and are checked the same way
            Param::Str(name) => Self::named(name),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// `&kp <key>`
pub fn kp(key: &str) -> Result<Behavior, SpecError> {
    Behavior::new("&kp", [key])
}

/// A behavior with parameters, e.g. `ks("&sk", [kp_param])`.
pub fn ks<I, P>(name: &str, params: I) -> Result<Behavior, SpecError>
where
    I: IntoIterator<Item = P>,
    P: Into<Param>,
{
    Behavior::new(name, params)
}

/// A modifier function wrapping another key, e.g. `modifier("LA", inner)`.
pub fn modifier(name: &str, inner: impl Into<Param>) -> Result<Behavior, SpecError> {
    Behavior::new(name, [inner.into()])
}

/// A parameter pointing at a layer by name.
pub fn layer_param(name: &str) -> Behavior {
    Behavior::layer(name)
}
