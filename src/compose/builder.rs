//! Declarative layout builder
//!
//! Families describe a variant as an ordered set of layer specs plus the
//! section records that go with them; [`LayoutBuilder::build`] expands,
//! resolves and assembles the final document.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use glove80_spec::{
    resolve, resolve_all, ComboSpec, HoldTapSpec, InputListenerSpec, LayerIndex, LayerSpec,
    MacroSpec, Node, SpecError,
};

use super::ComposeError;
use crate::document::{CommonFields, LayoutPayload};
use crate::metadata::MetadataTable;

/// A bundle of layers and section records that belong to one feature
/// (mouse keys, home row mods, ...).
#[derive(Debug, Clone, Default)]
pub struct FeatureComponents {
    pub layers: Vec<(String, LayerSpec)>,
    pub macros: Vec<MacroSpec>,
    pub hold_taps: Vec<HoldTapSpec>,
    pub combos: Vec<ComboSpec>,
    pub listeners: Vec<InputListenerSpec>,
    /// Order for `layers` when it differs from the order given; empty keeps
    /// the given order.
    pub layer_order: Vec<String>,
}

/// Mutable helper that coordinates every section of a layout payload.
#[derive(Debug, Clone)]
pub struct LayoutBuilder {
    metadata_key: String,
    variant: String,
    common: CommonFields,
    layer_names: Vec<String>,
    layers: HashMap<String, LayerSpec>,
    /// Keyed by name; a later macro with the same name replaces the earlier
    /// one in place.
    macros: Vec<(String, Node)>,
    hold_taps: Vec<Node>,
    combos: Vec<Node>,
    input_listeners: Vec<Node>,
}

impl LayoutBuilder {
    pub fn new(
        metadata_key: impl Into<String>,
        variant: impl Into<String>,
        common: CommonFields,
    ) -> Self {
        Self {
            metadata_key: metadata_key.into(),
            variant: variant.into(),
            common,
            layer_names: Vec::new(),
            layers: HashMap::new(),
            macros: Vec::new(),
            hold_taps: Vec::new(),
            combos: Vec::new(),
            input_listeners: Vec::new(),
        }
    }

    pub fn layer_names(&self) -> &[String] {
        &self.layer_names
    }

    /// Replace the layer order. Duplicates are dropped, first one wins.
    pub fn set_layer_order<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layer_names = unique(names.into_iter().map(Into::into));
        self
    }

    /// Add layer data. Names not yet in the order are appended, or placed
    /// right after `insert_after` when given.
    pub fn add_layers<I, S>(
        &mut self,
        layers: I,
        insert_after: Option<&str>,
    ) -> Result<&mut Self, ComposeError>
    where
        I: IntoIterator<Item = (S, LayerSpec)>,
        S: Into<String>,
    {
        self.add_layers_ordered(layers, insert_after, &[] as &[&str])
    }

    /// Like [`LayoutBuilder::add_layers`], but the names are placed in
    /// `explicit_order` rather than the order given.
    ///
    /// Only layers named in `explicit_order` are added, and every name in it
    /// must be among `layers`. An empty `explicit_order` keeps the given
    /// order.
    pub fn add_layers_ordered<I, S, O>(
        &mut self,
        layers: I,
        insert_after: Option<&str>,
        explicit_order: &[O],
    ) -> Result<&mut Self, ComposeError>
    where
        I: IntoIterator<Item = (S, LayerSpec)>,
        S: Into<String>,
        O: AsRef<str>,
    {
        let mut given: Vec<(String, LayerSpec)> = layers
            .into_iter()
            .map(|(name, spec)| (name.into(), spec))
            .collect();
        if given.is_empty() {
            return Ok(self);
        }

        let order: Vec<String> = if explicit_order.is_empty() {
            given.iter().map(|(name, _)| name.clone()).collect()
        } else {
            explicit_order.iter().map(|name| name.as_ref().to_string()).collect()
        };
        if let Some(missing) = order
            .iter()
            .find(|name| !given.iter().any(|(given_name, _)| given_name == *name))
        {
            return Err(SpecError::validation(
                "explicit_order",
                format!("layer '{}' missing from provided layers", missing),
            )
            .into());
        }

        given.retain(|(name, _)| order.contains(name));
        for (name, spec) in given {
            self.layers.insert(name, spec);
        }
        self.insert_layer_names(order, insert_after)?;
        Ok(self)
    }

    /// Set the data of one layer, appending it to the order if new.
    pub fn update_layer(&mut self, name: impl Into<String>, spec: LayerSpec) -> &mut Self {
        let name = name.into();
        if !self.layer_names.contains(&name) {
            self.layer_names.push(name.clone());
        }
        self.layers.insert(name, spec);
        self
    }

    /// Set the cursor layer's data and add its macros. A layer not yet in
    /// the order goes right after `insert_after`, or at the end.
    pub fn add_cursor_layer(
        &mut self,
        name: impl Into<String>,
        spec: LayerSpec,
        macros: Vec<MacroSpec>,
        insert_after: Option<&str>,
    ) -> Result<&mut Self, ComposeError> {
        let name = name.into();
        if !self.layer_names.contains(&name) {
            self.insert_layer_names(vec![name.clone()], insert_after)?;
        }
        self.layers.insert(name, spec);
        self.add_macros(macros, false);
        Ok(self)
    }

    /// Add macros. With `prepend` the incoming macros go first; either way
    /// a macro whose name already exists replaces the existing entry.
    pub fn add_macros(&mut self, macros: Vec<MacroSpec>, prepend: bool) -> &mut Self {
        if macros.is_empty() {
            return self;
        }
        let incoming: Vec<(String, Node)> = macros
            .iter()
            .map(|spec| (spec.name().to_string(), spec.to_canonical()))
            .collect();

        if prepend {
            let mut updated: Vec<(String, Node)> = Vec::with_capacity(incoming.len());
            for (name, node) in incoming {
                upsert(&mut updated, name, node);
            }
            for (name, node) in std::mem::take(&mut self.macros) {
                if !updated.iter().any(|(existing, _)| *existing == name) {
                    updated.push((name, node));
                }
            }
            self.macros = updated;
        } else {
            for (name, node) in incoming {
                upsert(&mut self.macros, name, node);
            }
        }
        self
    }

    pub fn add_hold_taps(&mut self, hold_taps: Vec<HoldTapSpec>) -> &mut Self {
        self.hold_taps
            .extend(hold_taps.iter().map(HoldTapSpec::to_canonical));
        self
    }

    pub fn add_combos(&mut self, combos: Vec<ComboSpec>) -> &mut Self {
        self.combos.extend(combos.iter().map(ComboSpec::to_canonical));
        self
    }

    pub fn add_input_listeners(&mut self, listeners: Vec<InputListenerSpec>) -> &mut Self {
        self.input_listeners
            .extend(listeners.iter().map(InputListenerSpec::to_canonical));
        self
    }

    /// Attach mouse layers together with their macros, combos and
    /// listeners.
    pub fn add_mouse_layers(
        &mut self,
        feature: FeatureComponents,
        insert_after: Option<&str>,
    ) -> Result<&mut Self, ComposeError> {
        self.add_feature(feature, insert_after)
    }

    /// Attach home row modifiers to `target_layer`. Supporting layers go
    /// after `insert_after`, or after the target layer itself.
    pub fn add_home_row_mods(
        &mut self,
        target_layer: &str,
        feature: FeatureComponents,
        insert_after: Option<&str>,
    ) -> Result<&mut Self, ComposeError> {
        if !self.layer_names.iter().any(|name| name == target_layer) {
            return Err(SpecError::validation(
                "target_layer",
                format!("unknown target layer '{}'", target_layer),
            )
            .into());
        }
        let anchor = insert_after.unwrap_or(target_layer).to_string();
        self.add_feature(feature, Some(&anchor))
    }

    fn add_feature(
        &mut self,
        feature: FeatureComponents,
        insert_after: Option<&str>,
    ) -> Result<&mut Self, ComposeError> {
        self.add_layers_ordered(feature.layers, insert_after, &feature.layer_order)?;
        self.add_macros(feature.macros, false);
        self.add_hold_taps(feature.hold_taps);
        self.add_combos(feature.combos);
        self.add_input_listeners(feature.listeners);
        Ok(self)
    }

    /// Expand, resolve and assemble the document.
    pub fn build(&self, metadata: &MetadataTable) -> Result<LayoutPayload, ComposeError> {
        if let Some(missing) = self
            .layer_names
            .iter()
            .find(|name| !self.layers.contains_key(*name))
        {
            return Err(ComposeError::MissingLayerData {
                variant: self.variant.clone(),
                layer: missing.clone(),
            });
        }

        let index = LayerIndex::from_names(&self.layer_names);
        let macros: Vec<Node> = self.macros.iter().map(|(_, node)| node.clone()).collect();

        let mut layers = Vec::with_capacity(self.layer_names.len());
        for name in &self.layer_names {
            let Some(spec) = self.layers.get(name) else {
                return Err(ComposeError::MissingLayerData {
                    variant: self.variant.clone(),
                    layer: name.clone(),
                });
            };
            layers.push(resolve_layer(spec, &index)?);
        }

        let provenance = metadata
            .get(&self.metadata_key, &self.variant)
            .ok_or_else(|| ComposeError::UnknownVariantMetadata {
                family: self.metadata_key.clone(),
                variant: self.variant.clone(),
            })?
            .provenance
            .clone();

        debug!(
            family = %self.metadata_key,
            variant = %self.variant,
            layers = layers.len(),
            macros = macros.len(),
            combos = self.combos.len(),
            "Assembled layout"
        );

        Ok(LayoutPayload {
            common: self.common.clone(),
            layer_names: self.layer_names.clone(),
            macros: resolve_all(&macros, &index)?,
            hold_taps: resolve_all(&self.hold_taps, &index)?,
            combos: resolve_all(&self.combos, &index)?,
            input_listeners: resolve_all(&self.input_listeners, &index)?,
            layers,
            provenance,
        })
    }

    fn insert_layer_names(
        &mut self,
        names: Vec<String>,
        after: Option<&str>,
    ) -> Result<(), ComposeError> {
        if names.is_empty() {
            return Ok(());
        }
        let names = unique(names);
        let Some(after) = after else {
            for name in names {
                if !self.layer_names.contains(&name) {
                    self.layer_names.push(name);
                }
            }
            return Ok(());
        };

        let filtered: Vec<String> = self
            .layer_names
            .iter()
            .filter(|name| !names.contains(name))
            .cloned()
            .collect();
        let anchor = filtered
            .iter()
            .position(|name| name == after)
            .ok_or_else(|| {
                SpecError::validation(
                    "insert_after",
                    format!("layer '{}' is not present in the order", after),
                )
            })?;

        let mut updated = Vec::with_capacity(filtered.len() + names.len());
        updated.extend_from_slice(&filtered[..=anchor]);
        updated.extend(names);
        updated.extend_from_slice(&filtered[anchor + 1..]);
        self.layer_names = updated;
        Ok(())
    }
}

fn resolve_layer(spec: &LayerSpec, index: &LayerIndex) -> Result<Vec<Value>, ComposeError> {
    spec.to_layer()
        .iter()
        .map(|slot| resolve(slot, index).map_err(ComposeError::from))
        .collect()
}

fn upsert(entries: &mut Vec<(String, Node)>, name: String, node: Node) {
    match entries.iter_mut().find(|(existing, _)| *existing == name) {
        Some(entry) => entry.1 = node,
        None => entries.push((name, node)),
    }
}

fn unique<I: IntoIterator<Item = String>>(values: I) -> Vec<String> {
    let mut ordered: Vec<String> = Vec::new();
    for value in values {
        if !ordered.contains(&value) {
            ordered.push(value);
        }
    }
    ordered
}
