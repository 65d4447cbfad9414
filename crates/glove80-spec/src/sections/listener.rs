use crate::error::SpecError;
use crate::node::Node;

use super::combo::{check_targets, targets_node, LayerTarget};
use super::{require_non_empty, Fields};

/// A processor block (`&input_processor ...`) attached to a listener or node.
#[derive(Debug, Clone, PartialEq)]
pub struct InputProcessorSpec {
    code: String,
    params: Vec<Node>,
}

impl InputProcessorSpec {
    pub fn new<I, P>(code: impl Into<String>, params: I) -> Result<Self, SpecError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Node>,
    {
        let code = code.into();
        require_non_empty("code", &code)?;
        Ok(Self {
            code,
            params: params.into_iter().map(Into::into).collect(),
        })
    }

    pub fn to_canonical(&self) -> Node {
        Fields::default()
            .push("code", self.code.as_str())
            .push("params", Node::List(self.params.clone()))
            .finish()
    }
}

fn processors_node(processors: &[InputProcessorSpec]) -> Node {
    Node::List(processors.iter().map(InputProcessorSpec::to_canonical).collect())
}

/// A listener node: processors that apply while one of `layers` is active.
#[derive(Debug, Clone, PartialEq)]
pub struct ListenerNodeSpec {
    code: String,
    description: Option<String>,
    layers: Vec<LayerTarget>,
    input_processors: Vec<InputProcessorSpec>,
}

impl ListenerNodeSpec {
    pub fn new(code: impl Into<String>, layers: Vec<LayerTarget>) -> Result<Self, SpecError> {
        let code = code.into();
        require_non_empty("code", &code)?;
        if layers.is_empty() {
            return Err(SpecError::validation(
                "layers",
                format!("listener node '{}' must target at least one layer", code),
            ));
        }
        check_targets("layers", &layers)?;
        Ok(Self {
            code,
            description: None,
            layers,
            input_processors: Vec::new(),
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_input_processors(mut self, processors: Vec<InputProcessorSpec>) -> Self {
        self.input_processors = processors;
        self
    }

    pub fn to_canonical(&self) -> Node {
        Fields::default()
            .push("code", self.code.as_str())
            .push("layers", targets_node(&self.layers))
            .push_opt("description", self.description.clone())
            .push("inputProcessors", processors_node(&self.input_processors))
            .finish()
    }
}

/// A top-level input listener (`&mmv_input_listener`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct InputListenerSpec {
    code: String,
    input_processors: Vec<InputProcessorSpec>,
    nodes: Vec<ListenerNodeSpec>,
}

impl InputListenerSpec {
    pub fn new(code: impl Into<String>, nodes: Vec<ListenerNodeSpec>) -> Result<Self, SpecError> {
        let code = code.into();
        require_non_empty("code", &code)?;
        Ok(Self {
            code,
            input_processors: Vec::new(),
            nodes,
        })
    }

    pub fn with_input_processors(mut self, processors: Vec<InputProcessorSpec>) -> Self {
        self.input_processors = processors;
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn to_canonical(&self) -> Node {
        Fields::default()
            .push("code", self.code.as_str())
            .push("inputProcessors", processors_node(&self.input_processors))
            .push(
                "nodes",
                Node::List(self.nodes.iter().map(ListenerNodeSpec::to_canonical).collect()),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{resolve, LayerIndex};
    use serde_json::json;

    fn scaler(mul: i64, div: i64) -> InputProcessorSpec {
        InputProcessorSpec::new("&zip_xy_scaler", [mul, div]).unwrap()
    }

    #[test]
    fn test_listener_shape() {
        let node = ListenerNodeSpec::new("LAYER_MouseSlow", vec![LayerTarget::named("MouseSlow")])
            .unwrap()
            .with_input_processors(vec![scaler(1, 9)]);
        let listener = InputListenerSpec::new("&mmv_input_listener", vec![node]).unwrap();
        let index = LayerIndex::from_names(&["Base", "MouseSlow"]);
        let value = resolve(&listener.to_canonical(), &index).unwrap();
        assert_eq!(
            value,
            json!({
                "code": "&mmv_input_listener",
                "inputProcessors": [],
                "nodes": [{
                    "code": "LAYER_MouseSlow",
                    "layers": [1],
                    "inputProcessors": [{"code": "&zip_xy_scaler", "params": [1, 9]}]
                }]
            })
        );
    }

    #[test]
    fn test_node_requires_layers() {
        let err = ListenerNodeSpec::new("LAYER_X", vec![]).unwrap_err();
        assert!(matches!(err, SpecError::Validation { ref field, .. } if field == "layers"));
    }

    #[test]
    fn test_empty_code_rejected() {
        assert!(InputListenerSpec::new("  ", vec![]).is_err());
        assert!(InputProcessorSpec::new("", Vec::<i64>::new()).is_err());
    }

    #[test]
    fn test_node_description_follows_layers() {
        let node = ListenerNodeSpec::new("LAYER_Fast", vec![LayerTarget::Index(2)])
            .unwrap()
            .with_description("fast pointer");
        let value = node.to_canonical().into_value().unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["code", "layers", "description", "inputProcessors"]);
    }
}
