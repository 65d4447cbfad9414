//! Section records: macros, hold-taps, combos and input listeners.
//!
//! Each spec validates on construction and canonicalizes into a [`Node`]
//! with a fixed field order.

mod combo;
mod hold_tap;
mod listener;
mod macros;

pub use combo::{ComboSpec, LayerTarget};
pub use hold_tap::{HoldTapFlavor, HoldTapSpec};
pub use listener::{InputListenerSpec, InputProcessorSpec, ListenerNodeSpec};
pub use macros::MacroSpec;

use crate::catalog::BEHAVIOR_SIGIL;
use crate::error::SpecError;
use crate::layer::LAYER_LENGTH;
use crate::node::Node;

/// Ordered field list under construction; `None` values are skipped.
#[derive(Default)]
pub(crate) struct Fields(Vec<(String, Node)>);

impl Fields {
    pub(crate) fn push(mut self, key: &str, value: impl Into<Node>) -> Self {
        self.0.push((key.to_string(), value.into()));
        self
    }

    pub(crate) fn push_opt<V: Into<Node>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.push(key, value),
            None => self,
        }
    }

    pub(crate) fn finish(self) -> Node {
        Node::Map(self.0)
    }
}

pub(crate) fn require_sigil(field: &str, name: &str) -> Result<(), SpecError> {
    if !name.starts_with(BEHAVIOR_SIGIL) {
        return Err(SpecError::validation(
            field,
            format!("'{}' must start with '{}'", name, BEHAVIOR_SIGIL),
        ));
    }
    Ok(())
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), SpecError> {
    if value.trim().is_empty() {
        return Err(SpecError::validation(field, "must not be empty"));
    }
    Ok(())
}

pub(crate) fn check_key_positions(field: &str, positions: &[u8]) -> Result<(), SpecError> {
    if let Some(position) = positions
        .iter()
        .find(|position| usize::from(**position) >= LAYER_LENGTH)
    {
        return Err(SpecError::validation(
            field,
            format!(
                "key position {} is outside the valid range 0-{}",
                position,
                LAYER_LENGTH - 1
            ),
        ));
    }
    Ok(())
}

pub(crate) fn positions_node(positions: &[u8]) -> Node {
    Node::List(
        positions
            .iter()
            .map(|position| Node::from(u32::from(*position)))
            .collect(),
    )
}
