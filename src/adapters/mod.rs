//! Agent-facing interactables kept in sync with the canvas store.
//!
//! DESIGN
//! ======
//! Each interactable exposes a typed slice of store state to an external
//! agent and applies the agent's edits back. `SyncAdapter` carries the shared
//! mechanics; an `Interactable` implementation says how to project the store
//! into its state and how to apply incoming state.
//!
//! Two guards keep the loop from feeding itself:
//! - while an inbound edit is applied, the store change notifications it
//!   produces are consumed without publishing;
//! - the last published payload is fingerprinted and identical payloads are
//!   not sent again.
//!
//! The agent transport is outside this crate; outward props leave through a
//! `PropsSink` as `{ state, className }` addressed by interactable id.

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;

pub mod canvas_details;
pub mod schema;
pub mod tabs;

use std::marker::PhantomData;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::services::canvas::CanvasStore;

pub use canvas_details::{CanvasDetails, CanvasDetailsAdapter};
pub use schema::{InteractableDefinition, InteractableProps, SchemaError};
pub use tabs::{Tabs, TabsAdapter};

/// Receives outward props for an interactable.
pub trait PropsSink {
    fn update_props(&mut self, interactable_id: &str, props: Value);
}

impl<F> PropsSink for F
where
    F: FnMut(&str, Value),
{
    fn update_props(&mut self, interactable_id: &str, props: Value) {
        self(interactable_id, props);
    }
}

/// A slice of store state exposed to the agent.
pub trait Interactable {
    /// Name the agent knows the interactable by.
    const COMPONENT: &'static str;

    type State: Serialize + DeserializeOwned;

    fn definition() -> InteractableDefinition;

    /// Project the store into outward state.
    fn project(store: &CanvasStore) -> Self::State;

    /// Apply state received from the agent.
    fn apply(store: &mut CanvasStore, state: Self::State);
}

// =============================================================================
// SYNC GUARD
// =============================================================================

/// Echo and duplicate suppression for one interactable.
#[derive(Debug, Clone, Default)]
pub struct SyncGuard {
    applying: bool,
    last_fingerprint: Option<String>,
}

impl SyncGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_apply(&mut self) {
        self.applying = true;
    }

    pub fn end_apply(&mut self) {
        self.applying = false;
    }

    #[must_use]
    pub fn is_applying(&self) -> bool {
        self.applying
    }

    /// Record `payload` as published unless it matches the last one.
    ///
    /// Returns `true` when the caller should send it.
    pub fn admit<T: Serialize>(&mut self, payload: &T) -> bool {
        let fingerprint = match serde_json::to_string(payload) {
            Ok(f) => f,
            Err(e) => {
                warn!(error = %e, "failed to fingerprint payload");
                return false;
            }
        };
        if self.last_fingerprint.as_deref() == Some(fingerprint.as_str()) {
            return false;
        }
        self.last_fingerprint = Some(fingerprint);
        true
    }
}

/// Wait for the interactable registry to report ready, bounded by `window`.
///
/// Returns `false` on timeout or when the signal source goes away.
pub async fn await_registration(ready: &mut watch::Receiver<bool>, window: Duration) -> bool {
    match tokio::time::timeout(window, ready.wait_for(|registered| *registered)).await {
        Ok(Ok(_)) => true,
        Ok(Err(_)) => {
            debug!("registration signal dropped");
            false
        }
        Err(_) => {
            debug!(window_ms = window.as_millis(), "registration wait timed out");
            false
        }
    }
}

// =============================================================================
// ADAPTER
// =============================================================================

/// Bidirectional sync between the store and one interactable.
pub struct SyncAdapter<I: Interactable> {
    interactable_id: String,
    class_name: Option<String>,
    guard: SyncGuard,
    changes: watch::Receiver<u64>,
    /// A store change seen before an inbound apply that is still unpublished.
    backlog: bool,
    initial: InitialPublish,
    _interactable: PhantomData<I>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InitialPublish {
    Waiting,
    Done,
    GaveUp,
}

impl<I: Interactable> SyncAdapter<I> {
    #[must_use]
    pub fn new(interactable_id: impl Into<String>, class_name: Option<String>, store: &CanvasStore) -> Self {
        Self {
            interactable_id: interactable_id.into(),
            class_name,
            guard: SyncGuard::new(),
            changes: store.subscribe(),
            backlog: false,
            initial: InitialPublish::Waiting,
            _interactable: PhantomData,
        }
    }

    #[must_use]
    pub fn interactable_id(&self) -> &str {
        &self.interactable_id
    }

    #[must_use]
    pub fn definition(&self) -> InteractableDefinition {
        I::definition()
    }

    /// Current outward state.
    #[must_use]
    pub fn state(&self, store: &CanvasStore) -> I::State {
        I::project(store)
    }

    /// Validate and apply props received from the agent. Props without a
    /// `state` only update the class name.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` when the props do not match the contract; the
    /// store is left untouched.
    pub fn receive(&mut self, store: &mut CanvasStore, props: Value) -> Result<(), SchemaError> {
        let props: InteractableProps<I::State> = schema::parse_props(I::COMPONENT, props)?;
        if props.class_name.is_some() {
            self.class_name = props.class_name;
        }
        if let Some(state) = props.state {
            self.apply(store, state);
        }
        Ok(())
    }

    /// Apply typed state from the agent without echoing it back. Changes the
    /// store already had pending stay due for the next `sync`.
    pub fn apply(&mut self, store: &mut CanvasStore, state: I::State) {
        self.backlog |= self.changes.has_changed().unwrap_or(false);
        self.guard.begin_apply();
        I::apply(store, state);
        self.changes.mark_unchanged();
        self.guard.end_apply();
        debug!(interactable = %self.interactable_id, revision = store.revision(), "applied inbound state");
    }

    /// Publish if the store changed since the last call and the payload differs
    /// from the last one sent.
    pub fn sync(&mut self, store: &CanvasStore, sink: &mut dyn PropsSink) -> bool {
        if self.guard.is_applying() {
            return false;
        }
        if !self.backlog && !self.changes.has_changed().unwrap_or(false) {
            return false;
        }
        self.backlog = false;
        self.changes.mark_unchanged();
        self.publish(store, sink)
    }

    /// Publish the current payload unless it matches the last one sent.
    pub fn publish(&mut self, store: &CanvasStore, sink: &mut dyn PropsSink) -> bool {
        let state = I::project(store);
        if !self.guard.admit(&state) {
            return false;
        }
        let props = InteractableProps { class_name: self.class_name.clone(), state: Some(state) };
        match serde_json::to_value(&props) {
            Ok(value) => {
                sink.update_props(&self.interactable_id, value);
                true
            }
            Err(e) => {
                warn!(error = %e, interactable = %self.interactable_id, "failed to serialize props");
                false
            }
        }
    }

    /// One-shot initial publish once the interactable is registered.
    ///
    /// Waits on `ready` for at most `window`. After a timeout or a dropped
    /// signal the adapter stops trying; later calls return `false`.
    pub async fn publish_initial(
        &mut self,
        store: &CanvasStore,
        sink: &mut dyn PropsSink,
        ready: &mut watch::Receiver<bool>,
        window: Duration,
    ) -> bool {
        match self.initial {
            InitialPublish::Done => return true,
            InitialPublish::GaveUp => return false,
            InitialPublish::Waiting => {}
        }
        if !await_registration(ready, window).await {
            info!(interactable = %self.interactable_id, "interactable never registered; skipping initial publish");
            self.initial = InitialPublish::GaveUp;
            return false;
        }
        self.initial = InitialPublish::Done;
        self.backlog = false;
        self.changes.mark_unchanged();
        self.publish(store, sink);
        true
    }
}
