//! Canvas view: tab bar, drop surface, and the render model.
//!
//! ARCHITECTURE
//! ============
//! `CanvasView` is the controller a UI shell drives. It holds presentation
//! state only and receives the store by reference on every call, so the same
//! store can be shared with the agent adapters without interior mutability.

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

pub mod drop;
pub mod tabs;

use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::services::canvas::{CanvasStore, default_canvas_name};
use crate::state::{CanvasComponent, Props};

pub use drop::{DragPayload, DropAction, DropError, DropOutcome};
pub use tabs::TabBar;

/// One tab as rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabView {
    pub id: String,
    pub name: String,
    pub active: bool,
    /// Current draft when this tab is being renamed.
    pub draft: Option<String>,
    pub delete_pending: bool,
    pub deletable: bool,
}

/// One placed component as rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    pub component_id: String,
    pub component_type: String,
    pub props: Props,
}

/// Everything a shell needs to draw the board.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub tabs: Vec<TabView>,
    pub items: Vec<ItemView>,
    /// "Drag components here".
    pub show_empty_hint: bool,
    /// Whether the clear-canvas action is available.
    pub can_clear: bool,
}

/// Board controller.
#[derive(Debug, Clone)]
pub struct CanvasView {
    tabs: TabBar,
}

#[allow(clippy::unused_self)]
impl CanvasView {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self { tabs: TabBar::new(config.delete_confirm_window) }
    }

    /// First mount: make sure there is a canvas and an active one.
    pub fn mount(&mut self, store: &mut CanvasStore) {
        if store.canvases().is_empty() {
            let canvas = store.create_canvas(Some(&default_canvas_name(1)));
            info!(canvas_id = %canvas.id, "created default canvas");
        } else if store.active_canvas_id().is_none() {
            let first = store.canvases()[0].id.clone();
            store.set_active_canvas(Some(&first));
        }
    }

    #[must_use]
    pub fn tabs(&self) -> &TabBar {
        &self.tabs
    }

    pub fn tabs_mut(&mut self) -> &mut TabBar {
        &mut self.tabs
    }

    pub fn on_drop(&mut self, store: &mut CanvasStore, data: Option<&str>) -> DropOutcome {
        drop::handle_drop(store, data)
    }

    pub fn on_sort_end(&mut self, store: &mut CanvasStore, active_id: &str, over_id: Option<&str>) -> bool {
        drop::handle_sort_end(store, active_id, over_id)
    }

    /// Drag data for a placed component being picked up.
    ///
    /// # Errors
    ///
    /// Propagates the payload serialization error.
    pub fn on_drag_start(&self, component: &CanvasComponent) -> Result<String, DropError> {
        drop::drag_start_payload(component)
    }

    /// "Clear Canvas" on the active canvas.
    pub fn clear_active(&mut self, store: &mut CanvasStore) {
        if let Some(id) = store.active_canvas_id().map(str::to_owned) {
            store.clear_canvas(&id);
        }
    }

    /// Remove button on a placed item.
    pub fn remove_item(&mut self, store: &mut CanvasStore, component: &CanvasComponent) {
        if let Some(canvas_id) = component.canvas_id.as_deref() {
            if component.id().is_some() {
                store.remove_component(canvas_id, &component.component_id);
            }
        }
    }

    /// Build the render model.
    #[must_use]
    pub fn snapshot(&self, store: &CanvasStore) -> ViewSnapshot {
        let active = store.active_canvas_id();
        let deletable = TabBar::can_delete(store);
        let editing = self.tabs.editing();
        let pending_delete = self.tabs.pending_delete();

        let tabs = store
            .canvases()
            .iter()
            .map(|c| TabView {
                id: c.id.clone(),
                name: c.name.clone(),
                active: active == Some(c.id.as_str()),
                draft: editing.filter(|(id, _)| *id == c.id).map(|(_, draft)| draft.to_owned()),
                delete_pending: pending_delete == Some(c.id.as_str()),
                deletable,
            })
            .collect();

        let items: Vec<ItemView> = store
            .active_canvas()
            .map(|c| c.components.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|c| ItemView {
                component_id: c.component_id.clone(),
                component_type: c.component_type.clone(),
                props: c.render_props().clone(),
            })
            .collect();

        ViewSnapshot { show_empty_hint: items.is_empty(), can_clear: active.is_some(), tabs, items }
    }
}
