//! Glove80 Layouts
//!
//! Composes Glove80 keyboard layout documents from declarative specs and
//! keeps the published release artifacts in sync with them.
//!
//! - [`compose`]: registry lookup, layer assembly and reference resolution
//! - [`families`]: the built-in `default`, `tailorkey`, `quantum_touch` and
//!   `glorious_engrammer` families
//! - [`generator`]: regenerate (or check) artifacts on disk
//!
//! The layout building blocks and the editing store are re-exported as
//! [`spec`] and [`store`].

pub mod compose;
pub mod config;
pub mod document;
pub mod families;
pub mod family;
pub mod generator;
pub mod logging;
pub mod metadata;

pub use compose::{ComposeError, Composer, FeatureComponents, LayoutBuilder};
pub use document::{CommonFields, ConfigParameter, LayoutPayload, Provenance};
pub use families::builtin_registry;
pub use family::{Family, Registry};
pub use generator::{
    generate_layouts, GenerateError, GenerateOptions, GenerationReport, GenerationResult,
};
pub use metadata::{FamilyMetadata, MetadataError, MetadataTable, VariantMetadata};

pub use glove80_spec as spec;
pub use glove80_store as store;
