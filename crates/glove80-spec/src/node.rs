//! Canonical tree for section and layer data that may still hold layer
//! references.
//!
//! Maps keep insertion order so the serialized payload matches the
//! published artifacts field for field.

use serde_json::{Map, Number, Value};

use crate::behavior::LayerRef;
use crate::error::SpecError;
use crate::resolve::{resolve, LayerIndex};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Number(Number),
    Str(String),
    Layer(LayerRef),
    List(Vec<Node>),
    Map(Vec<(String, Node)>),
}

impl Node {
    /// Build an ordered map node.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Node)>,
    {
        Node::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Look up a key in a map node.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Whether any layer reference is left in this tree.
    pub fn contains_layer_ref(&self) -> bool {
        match self {
            Node::Layer(_) => true,
            Node::List(items) => items.iter().any(Node::contains_layer_ref),
            Node::Map(entries) => entries.iter().any(|(_, v)| v.contains_layer_ref()),
            _ => false,
        }
    }

    /// Convert a fully resolved tree into JSON.
    ///
    /// Fails with `UnknownLayerReference` if a layer reference is left.
    pub fn into_value(self) -> Result<Value, SpecError> {
        resolve(&self, &LayerIndex::default())
    }

    /// Convert to JSON keeping layer references as `{"name": ...}` tags.
    pub fn to_tagged_value(&self) -> Value {
        match self {
            Node::Null => Value::Null,
            Node::Bool(flag) => Value::Bool(*flag),
            Node::Number(number) => Value::Number(number.clone()),
            Node::Str(text) => Value::String(text.clone()),
            Node::Layer(layer) => layer_tag(&layer.name),
            Node::List(items) => Value::Array(items.iter().map(Node::to_tagged_value).collect()),
            Node::Map(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_tagged_value()))
                    .collect(),
            ),
        }
    }

    /// Read an untyped tree, treating single-key `{"name": <string>}`
    /// objects as layer references.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(flag) => Node::Bool(*flag),
            Value::Number(number) => Node::Number(number.clone()),
            Value::String(text) => Node::Str(text.clone()),
            Value::Array(items) => Node::List(items.iter().map(Node::from_value).collect()),
            Value::Object(map) => match layer_tag_name(map) {
                Some(name) => Node::Layer(LayerRef::new(name)),
                None => Node::Map(
                    map.iter()
                        .map(|(k, v)| (k.clone(), Node::from_value(v)))
                        .collect(),
                ),
            },
        }
    }
}

/// The `{"name": ...}` tag used for symbolic layer references in untyped
/// payloads.
pub fn layer_tag(name: &str) -> Value {
    let mut map = Map::new();
    map.insert("name".to_string(), Value::String(name.to_string()));
    Value::Object(map)
}

/// The layer name of a `{"name": ...}` tag, if `map` is one.
pub fn layer_tag_name(map: &Map<String, Value>) -> Option<&str> {
    if map.len() != 1 {
        return None;
    }
    map.get("name").and_then(Value::as_str)
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Bool(value)
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Number(Number::from(value))
    }
}

impl From<u32> for Node {
    fn from(value: u32) -> Self {
        Node::Number(Number::from(value))
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Str(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Str(value)
    }
}

impl From<LayerRef> for Node {
    fn from(value: LayerRef) -> Self {
        Node::Layer(value)
    }
}

impl From<Vec<Node>> for Node {
    fn from(value: Vec<Node>) -> Self {
        Node::List(value)
    }
}
