use crate::behavior::Behavior;
use crate::error::SpecError;
use crate::node::Node;

use super::{require_sigil, Fields};

/// A ZMK macro definition.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroSpec {
    name: String,
    description: Option<String>,
    bindings: Vec<Behavior>,
    params: Vec<String>,
    wait_ms: Option<u32>,
    tap_ms: Option<u32>,
}

impl MacroSpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        bindings: Vec<Behavior>,
    ) -> Result<Self, SpecError> {
        let name = name.into();
        require_sigil("name", &name)?;
        if bindings.is_empty() {
            return Err(SpecError::validation(
                "bindings",
                format!("macro '{}' needs at least one binding", name),
            ));
        }
        Ok(Self {
            name,
            description: Some(description.into()),
            bindings,
            params: Vec::new(),
            wait_ms: None,
            tap_ms: None,
        })
    }

    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = params.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_wait_ms(mut self, wait_ms: u32) -> Self {
        self.wait_ms = Some(wait_ms);
        self
    }

    pub fn with_tap_ms(mut self, tap_ms: u32) -> Self {
        self.tap_ms = Some(tap_ms);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn to_canonical(&self) -> Node {
        Fields::default()
            .push("name", self.name.as_str())
            .push_opt("description", self.description.clone())
            .push(
                "bindings",
                Node::List(self.bindings.iter().map(Behavior::to_canonical).collect()),
            )
            .push(
                "params",
                Node::List(self.params.iter().map(|p| Node::from(p.as_str())).collect()),
            )
            .push_opt("waitMs", self.wait_ms)
            .push_opt("tapMs", self.tap_ms)
            .finish()
    }
}
