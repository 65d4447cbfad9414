//! Glove80 Layout Store
//!
//! In-memory editing of a layout document: layer structure, key slots and
//! the macro, hold-tap, combo and input listener sections, with
//! snapshot-based undo/redo, rename propagation and reference-guarded
//! deletes.

pub mod error;
pub mod normalize;
pub mod references;
pub mod state;
pub mod store;
pub mod validation;
pub mod walk;

pub use error::{EntityKind, StoreError};
pub use references::{KeyReference, RecordReference, References};
pub use state::{LayerRecord, LayoutState, Section, Selection};
pub use store::LayoutStore;
pub use validation::{IssueField, Suggestions, ValidationIssue, ValidationResult, ValidationService};
pub use walk::{contains_string, replace_strings, rewrite_layer_refs, wrap_layer_params};
