//! `CanvasDetails` interactable: the charts on the active canvas.
//!
//! Only `Graph` components are exposed. The agent may retitle them, change
//! their chart type and reorder them; it cannot add or remove charts here.
//! Title and type live in two places on a stored component: a top-level
//! `title` prop and a nested `data` object carrying `title` and `type`.
//! Reads prefer the top-level title; writes update both.

#[cfg(test)]
#[path = "canvas_details_test.rs"]
mod tests;

use serde_json::{Map, Value};
use tracing::debug;

use super::schema::{self, CanvasDetailsState, ChartEntry, ChartType, InteractableDefinition};
use super::{Interactable, SyncAdapter};
use crate::services::canvas::CanvasStore;
use crate::state::{CanvasComponent, Props};

/// Component type exposed as a chart.
pub const GRAPH_COMPONENT: &str = "Graph";

pub struct CanvasDetails;

pub type CanvasDetailsAdapter = SyncAdapter<CanvasDetails>;

impl Interactable for CanvasDetails {
    const COMPONENT: &'static str = schema::CANVAS_DETAILS_COMPONENT;

    type State = CanvasDetailsState;

    fn definition() -> InteractableDefinition {
        schema::canvas_details_definition()
    }

    fn project(store: &CanvasStore) -> CanvasDetailsState {
        let charts = store
            .active_canvas()
            .map(|canvas| {
                canvas
                    .components
                    .iter()
                    .filter(|c| c.component_type == GRAPH_COMPONENT)
                    .map(chart_entry)
                    .collect()
            })
            .unwrap_or_default();
        CanvasDetailsState { charts }
    }

    fn apply(store: &mut CanvasStore, state: CanvasDetailsState) {
        let Some(active) = store.active_canvas_id().map(str::to_owned) else {
            debug!("no active canvas; chart edits dropped");
            return;
        };

        for chart in &state.charts {
            let data = store
                .canvas(&active)
                .and_then(|c| c.component(&chart.id))
                .map(|c| chart_data(c, chart))
                .unwrap_or_else(|| Value::Object(Map::new()));
            let mut partial = Props::new();
            partial.insert("title".into(), Value::String(chart.title.clone()));
            partial.insert("data".into(), data);
            store.update_component(&active, &chart.id, &partial);
        }

        for (index, chart) in state.charts.iter().enumerate() {
            store.reorder_component(&active, &chart.id, index);
        }
    }
}

fn chart_entry(component: &CanvasComponent) -> ChartEntry {
    let data = component.props.get("data");
    let nested = |key: &str| data.and_then(|d| d.get(key)).and_then(Value::as_str);
    let title = component.prop_str("title").or_else(|| nested("title")).unwrap_or_default();
    ChartEntry {
        id: component.component_id.clone(),
        title: title.to_owned(),
        chart_type: ChartType::from_stored(nested("type")),
    }
}

/// Existing `data` object with the chart's type and title written in.
fn chart_data(component: &CanvasComponent, chart: &ChartEntry) -> Value {
    let mut data = component.props.get("data").and_then(Value::as_object).cloned().unwrap_or_default();
    data.insert("type".into(), Value::String(chart.chart_type.as_str().to_owned()));
    data.insert("title".into(), Value::String(chart.title.clone()));
    Value::Object(data)
}
