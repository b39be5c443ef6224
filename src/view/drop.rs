//! Drag-and-drop translation into store calls.
//!
//! DESIGN
//! ======
//! Two gesture paths reach the board. Native drops carry a JSON payload and
//! either add a new component or pull one over from another canvas. The
//! sortable list reports end-of-sort (`active`, `over`) for reorders inside
//! the active canvas. A drop of a component that already lives on the active
//! canvas is that same reorder gesture arriving through the native path, so
//! the drop handler leaves it to the sort callback instead of applying it
//! twice.

#[cfg(test)]
#[path = "drop_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::services::canvas::CanvasStore;
use crate::state::{self, CanvasComponent};

/// MIME type the drag payload travels under.
pub const DRAG_MIME: &str = "application/json";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DropError {
    #[error("drop carried no data")]
    Empty,
    #[error("invalid drop payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("drop payload has no component type")]
    MissingComponent,
    #[error("drop payload has no props")]
    MissingProps,
}

/// Wire format of a drag: the component type plus its props.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragPayload {
    pub component: String,
    pub props: CanvasComponent,
}

/// What a parsed drop means for the active canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum DropAction {
    /// Reorder within the active canvas; handled by the sort callback.
    Reorder,
    /// Pull an existing component over from another canvas.
    Move { source_canvas_id: String, component_id: String },
    /// Place a new instance.
    Add(CanvasComponent),
}

/// Result of handling one drop event.
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// Payload missing or invalid, or no active canvas.
    Ignored,
    /// Left to the sort callback.
    DeferredToSort,
    /// A move was attempted; `None` if the store rejected it.
    Moved(Option<CanvasComponent>),
    /// An add was attempted; `inserted` is false for suppressed duplicates.
    Added { component_id: String, inserted: bool },
}

// =============================================================================
// PARSE / PLAN
// =============================================================================

/// Parse the raw drag data.
///
/// # Errors
///
/// Returns `Empty` for missing data, `Malformed` for invalid JSON or props,
/// and `MissingComponent`/`MissingProps` when either field is absent.
pub fn parse_drop(data: Option<&str>) -> Result<DragPayload, DropError> {
    let raw = data.map(str::trim).filter(|d| !d.is_empty()).ok_or(DropError::Empty)?;
    let mut value: Value = serde_json::from_str(raw)?;

    let component = value
        .get("component")
        .and_then(Value::as_str)
        .filter(|c| !c.is_empty())
        .ok_or(DropError::MissingComponent)?
        .to_owned();
    let props = match value.get_mut("props").map(Value::take) {
        Some(p @ Value::Object(_)) => p,
        _ => return Err(DropError::MissingProps),
    };
    let props: CanvasComponent = serde_json::from_value(props)?;

    Ok(DragPayload { component, props })
}

/// Decide what a drop onto `active_canvas_id` should do.
#[must_use]
pub fn plan_drop(payload: DragPayload, active_canvas_id: &str) -> DropAction {
    let DragPayload { component, props } = payload;

    if props.is_placed() {
        let source = props.canvas_id.clone().unwrap_or_default();
        if source == active_canvas_id {
            return DropAction::Reorder;
        }
        return DropAction::Move { source_canvas_id: source, component_id: props.component_id };
    }

    let mut instance = props;
    if instance.id().is_none() {
        instance.component_id = state::generate_id();
    }
    instance.in_canvas = true;
    instance.component_type = component;
    DropAction::Add(instance)
}

// =============================================================================
// HANDLERS
// =============================================================================

/// Apply a native drop onto the active canvas. Bad payloads are logged and
/// ignored.
pub fn handle_drop(store: &mut CanvasStore, data: Option<&str>) -> DropOutcome {
    let Some(active) = store.active_canvas_id().map(str::to_owned) else {
        debug!("drop with no active canvas ignored");
        return DropOutcome::Ignored;
    };
    let payload = match parse_drop(data) {
        Ok(payload) => payload,
        Err(DropError::Empty) => return DropOutcome::Ignored,
        Err(e) => {
            warn!(error = %e, "invalid drop data");
            return DropOutcome::Ignored;
        }
    };

    match plan_drop(payload, &active) {
        DropAction::Reorder => DropOutcome::DeferredToSort,
        DropAction::Move { source_canvas_id, component_id } => {
            DropOutcome::Moved(store.move_component(&source_canvas_id, &active, &component_id))
        }
        DropAction::Add(component) => {
            let component_id = component.component_id.clone();
            let inserted = store.add_component(&active, component);
            DropOutcome::Added { component_id, inserted }
        }
    }
}

/// End-of-sort from the sortable list: move `active_id` to `over_id`'s slot.
///
/// Returns `true` if a reorder was issued.
pub fn handle_sort_end(store: &mut CanvasStore, active_id: &str, over_id: Option<&str>) -> bool {
    let Some(over_id) = over_id else {
        return false;
    };
    if active_id == over_id {
        return false;
    }
    let Some(canvas_id) = store.active_canvas_id().map(str::to_owned) else {
        return false;
    };
    let Some(over_index) = store.canvas(&canvas_id).and_then(|c| c.position_of(over_id)) else {
        debug!(%over_id, "sort target not on active canvas");
        return false;
    };
    store.reorder_component(&canvas_id, active_id, over_index);
    true
}

/// Drag data for picking up a placed component, so another canvas can pull it
/// over.
///
/// # Errors
///
/// Returns the serialization error, which does not occur for well-formed
/// props.
pub fn drag_start_payload(component: &CanvasComponent) -> Result<String, DropError> {
    let mut props = component.clone();
    props.in_canvas = true;
    let payload = DragPayload { component: component.component_type.clone(), props };
    Ok(serde_json::to_string(&payload)?)
}
