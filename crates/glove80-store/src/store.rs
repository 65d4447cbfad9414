//! The undoable layout store.
//!
//! Every mutating operation validates completely, then swaps in a new state
//! while pushing the previous one onto the undo stack. A failed operation
//! leaves state, history and selection untouched.

use glove80_spec::{resolve, LayerIndex, Node};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{EntityKind, StoreError};
use crate::normalize::normalize_record;
use crate::references::{find_references, References};
use crate::state::{LayerRecord, LayoutState, Section, Selection};
use crate::walk::{replace_strings, rewrite_layer_refs, wrap_layer_params};

/// Mutable layout document with snapshot-based undo/redo.
#[derive(Debug, Clone)]
pub struct LayoutStore {
    state: LayoutState,
    undo_stack: Vec<LayoutState>,
    redo_stack: Vec<LayoutState>,
    clipboard: Option<LayerRecord>,
    selection: Selection,
}

impl LayoutStore {
    pub fn new(state: LayoutState) -> Self {
        let selection = if state.layers.is_empty() {
            Selection::EMPTY
        } else {
            Selection::new(0, 0)
        };
        Self {
            state,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            clipboard: None,
            selection,
        }
    }

    /// Import a layout payload.
    pub fn from_payload(payload: &Value) -> Result<Self, StoreError> {
        Ok(Self::new(LayoutState::from_payload(payload)?))
    }

    // ====================================================================
    // Reads
    // ====================================================================

    pub fn state(&self) -> &LayoutState {
        &self.state
    }

    pub fn layer_names(&self) -> &[String] {
        &self.state.layer_names
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn selected_layer_name(&self) -> Option<&str> {
        usize::try_from(self.selection.layer_index)
            .ok()
            .and_then(|index| self.state.layer_names.get(index))
            .map(String::as_str)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Plain payload snapshot; the inverse of [`LayoutStore::from_payload`].
    pub fn export_payload(&self) -> Value {
        self.state.to_payload()
    }

    /// Payload with every `{"name": ...}` layer tag replaced by its index.
    ///
    /// Tags used as binding params (`&mo {"name": "Lower"}`) resolve to leaf
    /// bindings `{"value": 1, "params": []}`; tags in combo and listener
    /// `layers` resolve to bare integers.
    pub fn export_resolved_payload(&self) -> Result<Value, StoreError> {
        let index = LayerIndex::from_names(&self.state.layer_names);
        let mut payload = self.state.to_payload();
        if let Value::Object(map) = &mut payload {
            for key in ["layers"]
                .into_iter()
                .chain(Section::ALL.iter().map(Section::payload_key))
            {
                if let Some(value) = map.get_mut(key) {
                    if key != Section::Listeners.payload_key() {
                        wrap_layer_params(value);
                    }
                    *value = resolve(&Node::from_value(value), &index)?;
                }
            }
        }
        Ok(payload)
    }

    // ====================================================================
    // Layer structure
    // ====================================================================

    /// Rename a layer and every `{"name": ...}` reference to it.
    pub fn rename_layer(&mut self, old_name: &str, new_name: &str) -> Result<(), StoreError> {
        let position = self.require_layer(old_name)?;
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(StoreError::validation("name", "layer name cannot be empty"));
        }
        if old_name == new_name {
            return Ok(());
        }
        if self.state.layer_position(new_name).is_some() {
            return Err(StoreError::validation(
                "name",
                format!("layer '{}' already exists", new_name),
            ));
        }

        let mut next = self.state.clone();
        next.layer_names[position] = new_name.to_string();
        next.layers[position].name = new_name.to_string();
        let rewritten: usize = next
            .trees_mut()
            .map(|tree| rewrite_layer_refs(tree, old_name, new_name))
            .sum();
        debug!(old_name, new_name, rewritten, "renamed layer");
        self.commit(next);
        Ok(())
    }

    /// Move a layer to a new position. Name tags are unaffected.
    pub fn reorder_layer(&mut self, source_index: usize, dest_index: usize) -> Result<(), StoreError> {
        self.require_layer_index(source_index)?;
        self.require_layer_index(dest_index)?;
        if source_index == dest_index {
            return Ok(());
        }
        let mut next = self.state.clone();
        let name = next.layer_names.remove(source_index);
        next.layer_names.insert(dest_index, name);
        let record = next.layers.remove(source_index);
        next.layers.insert(dest_index, record);
        debug!(source_index, dest_index, "reordered layer");
        self.commit(next);
        Ok(())
    }

    /// Copy a layer next to its source, returning the new layer's name.
    ///
    /// Without `new_name` the copy is called `"{source} Copy"`, then
    /// `"{source} (2)"`, `"{source} (3)"`, ...
    pub fn duplicate_layer(
        &mut self,
        source_name: &str,
        new_name: Option<&str>,
        insert_after: bool,
    ) -> Result<String, StoreError> {
        let position = self.require_layer(source_name)?;
        let new_name = match new_name.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None => increment_name(source_name, &self.state.layer_names),
        };
        if self.state.layer_position(&new_name).is_some() {
            return Err(StoreError::validation(
                "name",
                format!("layer '{}' already exists", new_name),
            ));
        }

        let insert_at = if insert_after { position + 1 } else { position };
        let mut next = self.state.clone();
        let copy = LayerRecord {
            name: new_name.clone(),
            slots: next.layers[position].slots.clone(),
        };
        next.layer_names.insert(insert_at, new_name.clone());
        next.layers.insert(insert_at, copy);
        debug!(source_name, new_name = %new_name, insert_at, "duplicated layer");
        self.commit(next);
        Ok(new_name)
    }

    /// Hold a copy of a layer for a later [`LayoutStore::drop_layer`]. Not
    /// undoable.
    ///
    /// The copy is taken now: edits or a rename made before the drop are not
    /// carried, and a renamed source is not removed by the drop.
    pub fn pick_up_layer(&mut self, name: &str) -> Result<(), StoreError> {
        let position = self.require_layer(name)?;
        self.clipboard = Some(self.state.layers[position].clone());
        Ok(())
    }

    /// Insert the picked-up layer at `target_index` (`0..=len`), removing it
    /// from its old position first. Returns `false` when nothing is held.
    pub fn drop_layer(&mut self, target_index: usize) -> Result<bool, StoreError> {
        let Some(record) = self.clipboard.clone() else {
            return Ok(false);
        };
        let len = self.state.layer_names.len();
        if target_index > len {
            return Err(StoreError::out_of_range(EntityKind::Layer, target_index, len + 1));
        }

        let mut next = self.state.clone();
        let mut target = target_index;
        if let Some(original) = next.layer_position(&record.name) {
            next.layer_names.remove(original);
            next.layers.remove(original);
            if original < target {
                target -= 1;
            }
        }
        next.layer_names.insert(target, record.name.clone());
        next.layers.insert(target, record);
        debug!(target, "dropped layer");
        self.commit(next);
        Ok(true)
    }

    // ====================================================================
    // Selection (view state, never snapshotted)
    // ====================================================================

    pub fn set_selection(&mut self, layer_index: usize, key_index: usize) -> Result<Selection, StoreError> {
        self.require_key_index(layer_index, key_index)?;
        self.selection = Selection::new(layer_index, key_index);
        Ok(self.selection)
    }

    /// Select a layer, keeping the current key when it fits.
    pub fn set_active_layer(&mut self, layer_index: usize) -> Result<Selection, StoreError> {
        if self.state.layers.is_empty() {
            self.selection = Selection::EMPTY;
            return Ok(self.selection);
        }
        self.require_layer_index(layer_index)?;
        let key_index = usize::try_from(self.selection.key_index).unwrap_or(0);
        self.require_key_index(layer_index, key_index)?;
        self.selection = Selection::new(layer_index, key_index);
        Ok(self.selection)
    }

    /// Select a key on the active layer.
    pub fn set_selected_key(&mut self, key_index: usize) -> Result<Selection, StoreError> {
        if self.state.layers.is_empty() {
            self.selection = Selection::EMPTY;
            return Ok(self.selection);
        }
        let layer_index = usize::try_from(self.selection.layer_index).unwrap_or(0);
        self.require_key_index(layer_index, key_index)?;
        self.selection = Selection::new(layer_index, key_index);
        Ok(self.selection)
    }

    // ====================================================================
    // Keys
    // ====================================================================

    /// A copy of one key slot; either index defaults to the selection.
    pub fn get_key(&self, layer_index: Option<usize>, key_index: Option<usize>) -> Result<Value, StoreError> {
        if self.state.layers.is_empty() {
            return Err(StoreError::out_of_range(EntityKind::Layer, self.selection.layer_index, 0));
        }
        let layer = match layer_index {
            Some(index) => index,
            None => self.selected_index(self.selection.layer_index, EntityKind::Layer)?,
        };
        let key = match key_index {
            Some(index) => index,
            None => self.selected_index(self.selection.key_index, EntityKind::Key)?,
        };
        self.require_key_index(layer, key)?;
        Ok(self.state.layers[layer].slots[key].clone())
    }

    /// Replace a key slot wholesale with `{"value": value, "params": params}`.
    pub fn update_key(
        &mut self,
        layer_index: usize,
        key_index: usize,
        value: &str,
        params: Vec<Value>,
    ) -> Result<(), StoreError> {
        if value.trim().is_empty() {
            return Err(StoreError::validation("value", "key value cannot be empty"));
        }
        self.require_key_index(layer_index, key_index)?;
        let mut next = self.state.clone();
        next.layers[layer_index].slots[key_index] = json!({"value": value, "params": params});
        debug!(layer_index, key_index, value, "updated key");
        self.commit(next);
        Ok(())
    }

    pub fn update_selected_key(&mut self, value: &str, params: Vec<Value>) -> Result<(), StoreError> {
        if self.selection.is_empty() {
            return Err(StoreError::validation("selection", "no key selected"));
        }
        let layer = self.selected_index(self.selection.layer_index, EntityKind::Layer)?;
        let key = self.selected_index(self.selection.key_index, EntityKind::Key)?;
        self.update_key(layer, key, value, params)
    }

    /// Copy one key slot between layers. Returns whether anything changed;
    /// a no-op records no history.
    pub fn copy_key_to_layer(
        &mut self,
        source_layer_index: usize,
        target_layer_index: usize,
        key_index: usize,
    ) -> Result<bool, StoreError> {
        self.require_key_index(source_layer_index, key_index)?;
        self.require_key_index(target_layer_index, key_index)?;
        if source_layer_index == target_layer_index {
            return Ok(false);
        }
        let slot = &self.state.layers[source_layer_index].slots[key_index];
        if *slot == self.state.layers[target_layer_index].slots[key_index] {
            return Ok(false);
        }
        let mut next = self.state.clone();
        next.layers[target_layer_index].slots[key_index] = slot.clone();
        debug!(source_layer_index, target_layer_index, key_index, "copied key");
        self.commit(next);
        Ok(true)
    }

    // ====================================================================
    // Macros
    // ====================================================================

    pub fn list_macros(&self) -> Vec<Value> {
        self.list_records(Section::Macros)
    }

    pub fn find_macro_references(&self, name: &str) -> References {
        find_references(&self.state, Section::Macros, name)
    }

    pub fn add_macro(&mut self, payload: Value) -> Result<(), StoreError> {
        self.add_record(Section::Macros, payload)
    }

    pub fn update_macro(&mut self, name: &str, payload: Value) -> Result<(), StoreError> {
        self.update_record(Section::Macros, name, payload)
    }

    pub fn delete_macro(&mut self, name: &str, force: bool) -> Result<(), StoreError> {
        self.delete_record(Section::Macros, name, force)
    }

    // ====================================================================
    // Hold-taps
    // ====================================================================

    pub fn list_hold_taps(&self) -> Vec<Value> {
        self.list_records(Section::HoldTaps)
    }

    pub fn find_hold_tap_references(&self, name: &str) -> References {
        find_references(&self.state, Section::HoldTaps, name)
    }

    pub fn add_hold_tap(&mut self, payload: Value) -> Result<(), StoreError> {
        self.add_record(Section::HoldTaps, payload)
    }

    pub fn update_hold_tap(&mut self, name: &str, payload: Value) -> Result<(), StoreError> {
        self.update_record(Section::HoldTaps, name, payload)
    }

    pub fn delete_hold_tap(&mut self, name: &str, force: bool) -> Result<(), StoreError> {
        self.delete_record(Section::HoldTaps, name, force)
    }

    // ====================================================================
    // Combos
    // ====================================================================

    pub fn list_combos(&self) -> Vec<Value> {
        self.list_records(Section::Combos)
    }

    pub fn find_combo_references(&self, name: &str) -> References {
        find_references(&self.state, Section::Combos, name)
    }

    pub fn add_combo(&mut self, payload: Value) -> Result<(), StoreError> {
        self.add_record(Section::Combos, payload)
    }

    pub fn update_combo(&mut self, name: &str, payload: Value) -> Result<(), StoreError> {
        self.update_record(Section::Combos, name, payload)
    }

    pub fn delete_combo(&mut self, name: &str, force: bool) -> Result<(), StoreError> {
        self.delete_record(Section::Combos, name, force)
    }

    // ====================================================================
    // Input listeners
    // ====================================================================

    pub fn list_listeners(&self) -> Vec<Value> {
        self.list_records(Section::Listeners)
    }

    pub fn find_listener_references(&self, code: &str) -> References {
        find_references(&self.state, Section::Listeners, code)
    }

    pub fn add_listener(&mut self, payload: Value) -> Result<(), StoreError> {
        self.add_record(Section::Listeners, payload)
    }

    pub fn update_listener(&mut self, code: &str, payload: Value) -> Result<(), StoreError> {
        self.update_record(Section::Listeners, code, payload)
    }

    pub fn delete_listener(&mut self, code: &str, force: bool) -> Result<(), StoreError> {
        self.delete_record(Section::Listeners, code, force)
    }

    // ====================================================================
    // Whole document and history
    // ====================================================================

    /// Replace the whole document. Undoable.
    pub fn replace_payload(&mut self, payload: &Value) -> Result<(), StoreError> {
        let next = LayoutState::from_payload(payload)?;
        debug!(layers = next.layer_names.len(), "replaced payload");
        self.commit(next);
        Ok(())
    }

    pub fn undo(&mut self) {
        if let Some(previous) = self.undo_stack.pop() {
            let current = std::mem::replace(&mut self.state, previous);
            self.redo_stack.push(current);
            self.selection = self.selection.clamped(&self.state);
        }
    }

    pub fn redo(&mut self) {
        if let Some(next) = self.redo_stack.pop() {
            let current = std::mem::replace(&mut self.state, next);
            self.undo_stack.push(current);
            self.selection = self.selection.clamped(&self.state);
        }
    }

    // ====================================================================
    // Internals
    // ====================================================================

    fn commit(&mut self, next: LayoutState) {
        let previous = std::mem::replace(&mut self.state, next);
        self.undo_stack.push(previous);
        self.redo_stack.clear();
        self.selection = self.selection.clamped(&self.state);
    }

    fn list_records(&self, section: Section) -> Vec<Value> {
        self.state.section(section).clone()
    }

    fn record_position(&self, section: Section, identifier: &str) -> Option<usize> {
        self.state
            .section(section)
            .iter()
            .position(|record| section.identifier(record) == Some(identifier))
    }

    fn add_record(&mut self, section: Section, payload: Value) -> Result<(), StoreError> {
        let record = normalize_record(section, payload, &self.state.layer_names)?;
        let identifier = section.identifier(&record).unwrap_or_default().to_string();
        if self.record_position(section, &identifier).is_some() {
            return Err(StoreError::validation(
                section.id_field(),
                format!("{} '{}' already exists", section.kind(), identifier),
            ));
        }
        let mut next = self.state.clone();
        next.section_mut(section).push(record);
        debug!(kind = %section.kind(), identifier = %identifier, "added record");
        self.commit(next);
        Ok(())
    }

    fn update_record(&mut self, section: Section, identifier: &str, payload: Value) -> Result<(), StoreError> {
        let position = self
            .record_position(section, identifier)
            .ok_or_else(|| StoreError::unknown(section.kind(), identifier))?;
        let record = normalize_record(section, payload, &self.state.layer_names)?;
        let new_identifier = section.identifier(&record).unwrap_or_default().to_string();

        let mut next = self.state.clone();
        if new_identifier != identifier {
            if self.record_position(section, &new_identifier).is_some() {
                return Err(StoreError::validation(
                    section.id_field(),
                    format!("{} '{}' already exists", section.kind(), new_identifier),
                ));
            }
            let rewritten: usize = next
                .trees_mut()
                .map(|tree| replace_strings(tree, identifier, &new_identifier))
                .sum();
            debug!(kind = %section.kind(), identifier, new_identifier = %new_identifier, rewritten, "renamed record");
        }
        next.section_mut(section)[position] = record;
        self.commit(next);
        Ok(())
    }

    fn delete_record(&mut self, section: Section, identifier: &str, force: bool) -> Result<(), StoreError> {
        let position = self
            .record_position(section, identifier)
            .ok_or_else(|| StoreError::unknown(section.kind(), identifier))?;
        let references = find_references(&self.state, section, identifier);
        if !references.is_empty() && !force {
            return Err(StoreError::ReferencedEntity {
                kind: section.kind(),
                identifier: identifier.to_string(),
                references: Box::new(references),
            });
        }

        let mut next = self.state.clone();
        next.section_mut(section).remove(position);
        let cleared: usize = if references.is_empty() {
            0
        } else {
            next.trees_mut()
                .map(|tree| replace_strings(tree, identifier, ""))
                .sum()
        };
        debug!(kind = %section.kind(), identifier, cleared, "deleted record");
        self.commit(next);
        Ok(())
    }

    fn require_layer(&self, name: &str) -> Result<usize, StoreError> {
        self.state
            .layer_position(name)
            .ok_or_else(|| StoreError::unknown(EntityKind::Layer, name))
    }

    fn require_layer_index(&self, layer_index: usize) -> Result<(), StoreError> {
        let len = self.state.layers.len();
        if layer_index >= len {
            return Err(StoreError::out_of_range(EntityKind::Layer, layer_index, len));
        }
        Ok(())
    }

    fn require_key_index(&self, layer_index: usize, key_index: usize) -> Result<(), StoreError> {
        self.require_layer_index(layer_index)?;
        let len = self.state.layers[layer_index].slots.len();
        if key_index >= len {
            return Err(StoreError::out_of_range(EntityKind::Key, key_index, len));
        }
        Ok(())
    }

    fn selected_index(&self, index: i64, kind: EntityKind) -> Result<usize, StoreError> {
        usize::try_from(index).map_err(|_| StoreError::out_of_range(kind, index, 0))
    }
}

/// `"{base} Copy"`, then `"{base} (2)"`, `"{base} (3)"`, ... until unused.
fn increment_name(base: &str, existing: &[String]) -> String {
    let taken = |candidate: &str| existing.iter().any(|name| name == candidate);
    let mut candidate = format!("{} Copy", base);
    let mut counter = 2;
    while taken(&candidate) {
        candidate = format!("{} ({})", base, counter);
        counter += 1;
    }
    candidate
}
