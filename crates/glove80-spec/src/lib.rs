//! Glove80 Layout Specs
//!
//! Declarative building blocks for Glove80 keyboard layouts: key bindings,
//! sparse layers, section records and the resolver that turns symbolic
//! layer references into indices.

pub mod behavior;
pub mod catalog;
pub mod error;
pub mod layer;
pub mod node;
pub mod resolve;
pub mod sections;

pub use behavior::{kp, ks, layer_param, modifier, Behavior, Code, LayerRef, Param};
pub use error::{ErrorCode, SpecError};
pub use layer::{coerce_override_index, rows_to_layer_spec, Layer, LayerSpec, Token, LAYER_LENGTH};
pub use node::{layer_tag, layer_tag_name, Node};
pub use resolve::{resolve, resolve_all, LayerIndex};
pub use sections::{
    ComboSpec, HoldTapFlavor, HoldTapSpec, InputListenerSpec, InputProcessorSpec, LayerTarget,
    ListenerNodeSpec, MacroSpec,
};

/// Sentinel layer index meaning "active on every layer".
pub const ALL_LAYERS: i64 = -1;
