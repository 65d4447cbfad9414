use crate::behavior::{Behavior, LayerRef};
use crate::error::SpecError;
use crate::node::Node;

use super::{check_key_positions, positions_node, require_non_empty, Fields};

/// Layer a combo or listener is active on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerTarget {
    /// Literal index; `-1` means every layer.
    Index(i64),
    Ref(LayerRef),
}

impl LayerTarget {
    /// The "active on all layers" sentinel.
    pub const ALL: LayerTarget = LayerTarget::Index(-1);

    pub fn named(name: impl Into<String>) -> Self {
        LayerTarget::Ref(LayerRef::new(name))
    }

    pub fn to_canonical(&self) -> Node {
        match self {
            LayerTarget::Index(index) => Node::from(*index),
            LayerTarget::Ref(layer) => Node::Layer(layer.clone()),
        }
    }
}

impl From<i64> for LayerTarget {
    fn from(value: i64) -> Self {
        LayerTarget::Index(value)
    }
}

impl From<LayerRef> for LayerTarget {
    fn from(value: LayerRef) -> Self {
        LayerTarget::Ref(value)
    }
}

pub(crate) fn targets_node(targets: &[LayerTarget]) -> Node {
    Node::List(targets.iter().map(LayerTarget::to_canonical).collect())
}

pub(crate) fn check_targets(field: &str, targets: &[LayerTarget]) -> Result<(), SpecError> {
    if let Some(LayerTarget::Index(index)) = targets
        .iter()
        .find(|target| matches!(target, LayerTarget::Index(index) if *index < -1))
    {
        return Err(SpecError::validation(
            field,
            format!("layer index {} is invalid (use -1 for all layers)", index),
        ));
    }
    Ok(())
}

/// A chord of key positions that fires a single binding.
#[derive(Debug, Clone, PartialEq)]
pub struct ComboSpec {
    name: String,
    description: Option<String>,
    binding: Behavior,
    key_positions: Vec<u8>,
    layers: Vec<LayerTarget>,
    timeout_ms: Option<u32>,
}

impl ComboSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        binding: Behavior,
        key_positions: Vec<u8>,
        layers: Vec<LayerTarget>,
    ) -> Result<Self, SpecError> {
        let name = name.into();
        require_non_empty("name", &name)?;
        if key_positions.is_empty() {
            return Err(SpecError::validation(
                "keyPositions",
                format!("combo '{}' needs at least one key position", name),
            ));
        }
        check_key_positions("keyPositions", &key_positions)?;
        check_targets("layers", &layers)?;
        Ok(Self {
            name,
            description: Some(description.into()),
            binding,
            key_positions,
            layers,
            timeout_ms: None,
        })
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn to_canonical(&self) -> Node {
        Fields::default()
            .push("name", self.name.as_str())
            .push_opt("description", self.description.clone())
            .push("binding", self.binding.to_canonical())
            .push("keyPositions", positions_node(&self.key_positions))
            .push("layers", targets_node(&self.layers))
            .push_opt("timeoutMs", self.timeout_ms)
            .finish()
    }
}
