//! Canvas tab bar: create, switch, inline rename, two-step delete.
//!
//! SYSTEM CONTEXT
//! ==============
//! The tab bar keeps only presentation state (which tab is being renamed,
//! which one is waiting for delete confirmation). Every change to canvases
//! goes through `CanvasStore`.
//!
//! Delete needs a second, explicit confirmation inside the confirm window;
//! after that the request lapses on its own. The last remaining canvas cannot
//! be deleted from here, although the store itself would allow it.

#[cfg(test)]
#[path = "tabs_test.rs"]
mod tests;

use std::time::{Duration, Instant};

use tracing::debug;

use crate::services::canvas::CanvasStore;
use crate::state::Canvas;

#[derive(Debug, Clone, PartialEq, Eq)]
struct RenameDraft {
    canvas_id: String,
    name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct DeleteRequest {
    canvas_id: String,
    requested_at: Instant,
}

/// Tab bar presentation state.
#[derive(Debug, Clone)]
pub struct TabBar {
    editing: Option<RenameDraft>,
    pending_delete: Option<DeleteRequest>,
    confirm_window: Duration,
}

impl TabBar {
    #[must_use]
    pub fn new(confirm_window: Duration) -> Self {
        Self { editing: None, pending_delete: None, confirm_window }
    }

    /// "+" button.
    pub fn create(&mut self, store: &mut CanvasStore) -> Canvas {
        store.create_canvas(None)
    }

    /// Tab click: activate and drop any pending delete.
    pub fn select(&mut self, store: &mut CanvasStore, canvas_id: &str) {
        store.set_active_canvas(Some(canvas_id));
        self.pending_delete = None;
    }

    // =========================================================================
    // RENAME
    // =========================================================================

    /// Begin editing a tab's name, seeded with its current name.
    pub fn start_rename(&mut self, store: &CanvasStore, canvas_id: &str) -> bool {
        let Some(canvas) = store.canvas(canvas_id) else {
            return false;
        };
        self.editing = Some(RenameDraft { canvas_id: canvas.id.clone(), name: canvas.name.clone() });
        self.pending_delete = None;
        true
    }

    /// Replace the draft text while editing.
    pub fn edit_name(&mut self, text: &str) {
        if let Some(draft) = self.editing.as_mut() {
            draft.name = text.to_owned();
        }
    }

    /// Commit the draft. A blank draft leaves the name alone; editing ends
    /// either way.
    pub fn save_rename(&mut self, store: &mut CanvasStore) -> Option<Canvas> {
        let draft = self.editing.take()?;
        let name = draft.name.trim();
        if name.is_empty() {
            debug!(canvas_id = %draft.canvas_id, "blank rename ignored");
            return None;
        }
        store.update_canvas(&draft.canvas_id, name)
    }

    pub fn cancel_rename(&mut self) {
        self.editing = None;
    }

    /// Tab being renamed and its current draft.
    #[must_use]
    pub fn editing(&self) -> Option<(&str, &str)> {
        self.editing.as_ref().map(|d| (d.canvas_id.as_str(), d.name.as_str()))
    }

    // =========================================================================
    // DELETE
    // =========================================================================

    /// Whether delete controls are offered at all.
    #[must_use]
    pub fn can_delete(store: &CanvasStore) -> bool {
        store.canvases().len() > 1
    }

    /// First delete click: ask for confirmation.
    pub fn request_delete(&mut self, store: &CanvasStore, canvas_id: &str) -> bool {
        self.request_delete_at(store, canvas_id, Instant::now())
    }

    fn request_delete_at(&mut self, store: &CanvasStore, canvas_id: &str, now: Instant) -> bool {
        if !Self::can_delete(store) || store.canvas(canvas_id).is_none() {
            return false;
        }
        self.pending_delete = Some(DeleteRequest { canvas_id: canvas_id.to_owned(), requested_at: now });
        true
    }

    /// Confirm click: delete if the request for this tab is still open.
    pub fn confirm_delete(&mut self, store: &mut CanvasStore, canvas_id: &str) -> bool {
        self.confirm_delete_at(store, canvas_id, Instant::now())
    }

    fn confirm_delete_at(&mut self, store: &mut CanvasStore, canvas_id: &str, now: Instant) -> bool {
        if self.pending_delete_at(now) != Some(canvas_id) {
            debug!(%canvas_id, "delete confirmation without open request");
            self.expire(now);
            return false;
        }
        self.pending_delete = None;
        if !Self::can_delete(store) {
            return false;
        }
        store.remove_canvas(canvas_id);
        true
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Tab awaiting delete confirmation, if its window is still open.
    #[must_use]
    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete_at(Instant::now())
    }

    fn pending_delete_at(&self, now: Instant) -> Option<&str> {
        self.pending_delete
            .as_ref()
            .filter(|req| now.duration_since(req.requested_at) < self.confirm_window)
            .map(|req| req.canvas_id.as_str())
    }

    fn expire(&mut self, now: Instant) {
        if self.pending_delete_at(now).is_none() {
            self.pending_delete = None;
        }
    }
}
