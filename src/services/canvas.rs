//! Canvas store — canvases, their components, and the active tab.
//!
//! DESIGN
//! ======
//! `CanvasStore` is the single owner of board state. The view and the agent
//! adapters borrow it and go through the methods below; nothing outside this
//! module touches the fields. Every operation is synchronous and total:
//! unknown ids, empty names and same-canvas moves are silent no-ops that
//! return `None` rather than errors.
//!
//! Each state change bumps a revision counter published on a `watch` channel
//! (subscribers learn "something changed" and re-read) and writes the
//! persisted layout through the configured storage.
//!
//! DUPLICATE SUPPRESSION
//! =====================
//! Adds and moves derive an operation key from their targets. A key seen
//! again while still pending is dropped: a drop event delivered twice, or an
//! adapter echoing a change back, must not insert or move twice. See
//! `services::pending` for the window semantics.

#[cfg(test)]
#[path = "canvas_test.rs"]
mod tests;

use std::collections::HashSet;
use std::time::Instant;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::services::pending::{self, PendingOperations};
use crate::services::persistence::{self, KeyValueStorage, PersistedLayout};
use crate::state::{self, Canvas, CanvasComponent, Props};

/// Name given to the n-th canvas when none is supplied (1-based).
#[must_use]
pub fn default_canvas_name(n: usize) -> String {
    format!("New Canvas {n}")
}

/// In-memory canvas state with optional write-through persistence.
pub struct CanvasStore {
    canvases: Vec<Canvas>,
    active_canvas_id: Option<String>,
    pending: PendingOperations,
    revision: watch::Sender<u64>,
    storage: Option<Box<dyn KeyValueStorage>>,
    storage_key: String,
}

impl CanvasStore {
    /// An empty store with no persistence.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self::from_layout(PersistedLayout::default(), config)
    }

    /// Rebuild a store from a persisted layout. Pending operations start empty.
    #[must_use]
    pub fn from_layout(layout: PersistedLayout, config: &Config) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            canvases: layout.canvases,
            active_canvas_id: layout.active_canvas_id,
            pending: PendingOperations::new(config.debounce_window),
            revision,
            storage: None,
            storage_key: config.storage_key.clone(),
        }
    }

    /// Load whatever layout `storage` holds under the configured key and keep
    /// writing changes back to it.
    #[must_use]
    pub fn hydrate(storage: Box<dyn KeyValueStorage>, config: &Config) -> Self {
        let layout = persistence::load_layout(storage.as_ref(), &config.storage_key).unwrap_or_default();
        info!(
            canvases = layout.canvases.len(),
            active = ?layout.active_canvas_id,
            key = %config.storage_key,
            "canvas store hydrated"
        );
        let mut store = Self::from_layout(layout, config);
        store.storage = Some(storage);
        store
    }

    /// Snapshot of the persisted subset.
    #[must_use]
    pub fn to_layout(&self) -> PersistedLayout {
        PersistedLayout { canvases: self.canvases.clone(), active_canvas_id: self.active_canvas_id.clone() }
    }

    // =========================================================================
    // READ
    // =========================================================================

    #[must_use]
    pub fn canvases(&self) -> &[Canvas] {
        &self.canvases
    }

    #[must_use]
    pub fn canvas(&self, id: &str) -> Option<&Canvas> {
        self.canvases.iter().find(|c| c.id == id)
    }

    /// Components of a canvas; empty for unknown ids.
    #[must_use]
    pub fn components(&self, canvas_id: &str) -> &[CanvasComponent] {
        self.canvas(canvas_id).map_or(&[], |c| c.components.as_slice())
    }

    #[must_use]
    pub fn active_canvas_id(&self) -> Option<&str> {
        self.active_canvas_id.as_deref()
    }

    #[must_use]
    pub fn active_canvas(&self) -> Option<&Canvas> {
        self.active_canvas_id.as_deref().and_then(|id| self.canvas(id))
    }

    /// Operation keys still inside their debounce window.
    #[must_use]
    pub fn pending_operations(&self) -> Vec<String> {
        self.pending.keys_at(Instant::now())
    }

    /// Current change counter.
    #[must_use]
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Receive a notification after every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    // =========================================================================
    // CANVASES
    // =========================================================================

    /// Append a new canvas and make it active.
    pub fn create_canvas(&mut self, name: Option<&str>) -> Canvas {
        let name = match name {
            Some(n) if !n.is_empty() => n.to_owned(),
            _ => default_canvas_name(self.canvases.len() + 1),
        };
        let canvas = Canvas::new(state::generate_id(), name);
        debug!(canvas_id = %canvas.id, name = %canvas.name, "canvas created");
        self.active_canvas_id = Some(canvas.id.clone());
        self.canvases.push(canvas.clone());
        self.commit();
        canvas
    }

    /// Rename a canvas. `None` if the trimmed name is empty or the id unknown.
    pub fn update_canvas(&mut self, id: &str, name: &str) -> Option<Canvas> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let canvas = self.canvases.iter_mut().find(|c| c.id == id)?;
        if canvas.name == name {
            return Some(canvas.clone());
        }
        canvas.name = name.to_owned();
        let updated = canvas.clone();
        self.commit();
        Some(updated)
    }

    /// Remove a canvas. If it was active, the first remaining canvas (or none)
    /// becomes active.
    pub fn remove_canvas(&mut self, id: &str) {
        let Some(index) = self.canvases.iter().position(|c| c.id == id) else {
            return;
        };
        self.canvases.remove(index);
        if self.active_canvas_id.as_deref() == Some(id) {
            self.active_canvas_id = self.canvases.first().map(|c| c.id.clone());
        }
        debug!(canvas_id = %id, "canvas removed");
        self.commit();
    }

    /// Set the active canvas without checking that it exists.
    pub fn set_active_canvas(&mut self, id: Option<&str>) {
        let next = id.map(str::to_owned);
        if self.active_canvas_id == next {
            return;
        }
        self.active_canvas_id = next;
        self.commit();
    }

    /// Move a canvas to `new_index`, clamped to the list bounds.
    pub fn reorder_canvas(&mut self, canvas_id: &str, new_index: usize) {
        let Some(from) = self.canvases.iter().position(|c| c.id == canvas_id) else {
            return;
        };
        if from == new_index.min(self.canvases.len() - 1) {
            return;
        }
        state::move_within(&mut self.canvases, from, new_index);
        self.commit();
    }

    /// Remove every component from a canvas.
    pub fn clear_canvas(&mut self, id: &str) {
        let Some(canvas) = self.canvases.iter_mut().find(|c| c.id == id) else {
            return;
        };
        if canvas.components.is_empty() {
            return;
        }
        canvas.components.clear();
        self.commit();
    }

    /// Replace the canvas list with `tabs` (id, name) in order. Canvases whose
    /// ids survive keep their components; new ids become empty canvases;
    /// missing ids are dropped. A repeated id keeps its first occurrence.
    ///
    /// `active` is kept when it names a resulting canvas, otherwise the first
    /// canvas (or none) becomes active.
    pub fn reconcile_tabs<I>(&mut self, tabs: I, active: Option<&str>)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut seen = HashSet::new();
        let tabs: Vec<(String, String)> = tabs
            .into_iter()
            .filter(|(id, _)| {
                let first = seen.insert(id.clone());
                if !first {
                    debug!(canvas_id = %id, "skipping repeated tab id");
                }
                first
            })
            .collect();

        let active = active
            .filter(|a| tabs.iter().any(|(id, _)| id == a))
            .map(str::to_owned)
            .or_else(|| tabs.first().map(|(id, _)| id.clone()));

        let unchanged = tabs.len() == self.canvases.len()
            && tabs.iter().zip(&self.canvases).all(|((id, name), c)| *id == c.id && *name == c.name)
            && active == self.active_canvas_id;
        if unchanged {
            return;
        }

        let mut previous: Vec<Option<Canvas>> = std::mem::take(&mut self.canvases).into_iter().map(Some).collect();
        let next = tabs
            .into_iter()
            .map(|(id, name)| {
                let existing = previous
                    .iter_mut()
                    .find(|slot| slot.as_ref().is_some_and(|c| c.id == id))
                    .and_then(Option::take);
                match existing {
                    Some(mut canvas) => {
                        canvas.name = name;
                        canvas
                    }
                    None => Canvas::new(id, name),
                }
            })
            .collect();

        self.canvases = next;
        self.active_canvas_id = active;
        self.commit();
    }

    // =========================================================================
    // COMPONENTS
    // =========================================================================

    /// Place a component on a canvas, dropping in-flight duplicates.
    ///
    /// Returns `true` if the component was appended.
    pub fn add_component(&mut self, canvas_id: &str, component: CanvasComponent) -> bool {
        self.add_component_at(canvas_id, component, Instant::now())
    }

    fn add_component_at(&mut self, canvas_id: &str, mut component: CanvasComponent, now: Instant) -> bool {
        if component.id().is_none() {
            component.component_id = state::generate_id();
        }
        let key = pending::add_key(&component.component_id, canvas_id);
        if !self.pending.try_begin_at(&key, now) {
            debug!(%key, "skipping duplicate operation");
            return false;
        }

        let Some(canvas) = self.canvases.iter_mut().find(|c| c.id == canvas_id) else {
            debug!(%canvas_id, "add to unknown canvas ignored");
            return false;
        };
        if canvas.contains(&component.component_id) {
            debug!(component_id = %component.component_id, %canvas_id, "component already on canvas");
            return false;
        }

        component.in_canvas = true;
        component.canvas_id = Some(canvas_id.to_owned());
        canvas.components.push(component);
        self.commit();
        true
    }

    /// Shallow-merge `partial` into a component and return the result.
    pub fn update_component(&mut self, canvas_id: &str, component_id: &str, partial: &Props) -> Option<CanvasComponent> {
        let canvas = self.canvases.iter_mut().find(|c| c.id == canvas_id)?;
        let component = canvas.components.iter_mut().find(|c| c.component_id == component_id)?;
        let before = component.clone();
        component.merge(partial);
        let merged = component.clone();
        if merged != before {
            self.commit();
        }
        Some(merged)
    }

    pub fn remove_component(&mut self, canvas_id: &str, component_id: &str) {
        let Some(canvas) = self.canvases.iter_mut().find(|c| c.id == canvas_id) else {
            return;
        };
        let Some(index) = canvas.position_of(component_id) else {
            return;
        };
        canvas.components.remove(index);
        self.commit();
    }

    /// Move a component to another canvas, dropping in-flight duplicates.
    ///
    /// Returns the moved component, or `None` with no state change when the
    /// canvases are the same, the move is already pending, either side is
    /// missing, or the target already holds the id.
    pub fn move_component(&mut self, source_canvas_id: &str, target_canvas_id: &str, component_id: &str) -> Option<CanvasComponent> {
        self.move_component_at(source_canvas_id, target_canvas_id, component_id, Instant::now())
    }

    fn move_component_at(
        &mut self,
        source_canvas_id: &str,
        target_canvas_id: &str,
        component_id: &str,
        now: Instant,
    ) -> Option<CanvasComponent> {
        if source_canvas_id == target_canvas_id {
            return None;
        }
        let key = pending::move_key(component_id, source_canvas_id, target_canvas_id);
        if !self.pending.try_begin_at(&key, now) {
            debug!(%key, "skipping duplicate move operation");
            return None;
        }

        let source_index = self.canvases.iter().position(|c| c.id == source_canvas_id)?;
        let component_index = self.canvases[source_index].position_of(component_id)?;
        let Some(target_index) = self.canvases.iter().position(|c| c.id == target_canvas_id) else {
            warn!(%target_canvas_id, %component_id, "move to unknown canvas ignored");
            return None;
        };
        if self.canvases[target_index].contains(component_id) {
            debug!(%component_id, %target_canvas_id, "component already in target canvas");
            return None;
        }

        let mut moved = self.canvases[source_index].components.remove(component_index);
        moved.canvas_id = Some(target_canvas_id.to_owned());
        self.canvases[target_index].components.push(moved.clone());
        debug!(%component_id, from = %source_canvas_id, to = %target_canvas_id, "component moved");
        self.commit();
        Some(moved)
    }

    /// Move a component to `new_index` within its canvas, clamped to bounds.
    pub fn reorder_component(&mut self, canvas_id: &str, component_id: &str, new_index: usize) {
        let Some(canvas) = self.canvases.iter_mut().find(|c| c.id == canvas_id) else {
            return;
        };
        let Some(from) = canvas.position_of(component_id) else {
            return;
        };
        if from == new_index.min(canvas.components.len() - 1) {
            return;
        }
        state::move_within(&mut canvas.components, from, new_index);
        self.commit();
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn commit(&mut self) {
        self.revision.send_modify(|rev| *rev += 1);
        let Some(storage) = self.storage.as_mut() else {
            return;
        };
        let layout = PersistedLayout { canvases: self.canvases.clone(), active_canvas_id: self.active_canvas_id.clone() };
        if let Err(e) = persistence::save_layout(storage.as_mut(), &self.storage_key, &layout) {
            warn!(error = %e, key = %self.storage_key, "failed to persist canvas layout");
        }
    }
}

impl Default for CanvasStore {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}
