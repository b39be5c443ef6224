//! Tabs interactable: the canvas list and which one is active.

#[cfg(test)]
#[path = "tabs_test.rs"]
mod tests;

use super::schema::{self, InteractableDefinition, TabEntry, TabsState};
use super::{Interactable, SyncAdapter};
use crate::services::canvas::CanvasStore;

pub struct Tabs;

pub type TabsAdapter = SyncAdapter<Tabs>;

impl Interactable for Tabs {
    const COMPONENT: &'static str = schema::TABS_COMPONENT;

    type State = TabsState;

    fn definition() -> InteractableDefinition {
        schema::tabs_definition()
    }

    fn project(store: &CanvasStore) -> TabsState {
        TabsState {
            canvases: store.canvases().iter().map(|c| TabEntry { id: c.id.clone(), name: c.name.clone() }).collect(),
            active_canvas_id: store.active_canvas_id().map(str::to_owned),
        }
    }

    fn apply(store: &mut CanvasStore, state: TabsState) {
        let tabs = state.canvases.into_iter().map(|t| (t.id, t.name));
        store.reconcile_tabs(tabs, state.active_canvas_id.as_deref());
    }
}
