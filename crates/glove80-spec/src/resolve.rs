//! Layer reference resolution.
//!
//! Replaces every [`LayerRef`](crate::LayerRef) in a canonical tree with the
//! index of the named layer. The index map must come from the final
//! `layer_names` order of the document being assembled.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::SpecError;
use crate::node::Node;

/// Authoritative layer name -> index mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerIndex {
    indices: HashMap<String, i64>,
}

impl LayerIndex {
    /// Build the mapping from an ordered list of layer names.
    ///
    /// Later duplicates never shadow the first occurrence.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let mut indices = HashMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            indices
                .entry(name.as_ref().to_string())
                .or_insert(index as i64);
        }
        Self { indices }
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.indices.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Resolve all layer references in `node`, producing plain JSON.
pub fn resolve(node: &Node, index: &LayerIndex) -> Result<Value, SpecError> {
    Ok(match node {
        Node::Null => Value::Null,
        Node::Bool(flag) => Value::Bool(*flag),
        Node::Number(number) => Value::Number(number.clone()),
        Node::Str(text) => Value::String(text.clone()),
        Node::Layer(layer) => {
            let resolved = index
                .get(&layer.name)
                .ok_or_else(|| SpecError::UnknownLayerReference(layer.name.clone()))?;
            Value::from(resolved)
        }
        Node::List(items) => Value::Array(
            items
                .iter()
                .map(|item| resolve(item, index))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Node::Map(entries) => {
            let mut map = Map::new();
            for (key, value) in entries {
                map.insert(key.clone(), resolve(value, index)?);
            }
            Value::Object(map)
        }
    })
}

/// Resolve a whole section (macros, combos, ...) in order.
pub fn resolve_all(nodes: &[Node], index: &LayerIndex) -> Result<Vec<Value>, SpecError> {
    nodes.iter().map(|node| resolve(node, index)).collect()
}
