//! Agent-facing contracts for the two interactables.
//!
//! Props arriving from the agent are validated here by deserializing into
//! typed structs; anything that does not fit is rejected as a whole. Unknown
//! keys are ignored. The JSON Schemas below are what the agent is shown when
//! the interactables are registered.

#[cfg(test)]
#[path = "schema_test.rs"]
mod tests;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const TABS_COMPONENT: &str = "Tabs";
pub const CANVAS_DETAILS_COMPONENT: &str = "CanvasDetails";

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("invalid {component} props: {source}")]
    Invalid {
        component: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Registration record for an interactable: name, description, props schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractableDefinition {
    pub component_name: String,
    pub description: String,
    pub props_schema: Value,
}

/// Props envelope shared by both interactables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractableProps<S> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default = "Option::default")]
    pub state: Option<S>,
}

/// Validate raw props for `component`.
///
/// # Errors
///
/// Returns `SchemaError::Invalid` when the value does not match the contract.
pub fn parse_props<S: DeserializeOwned>(component: &'static str, value: Value) -> Result<InteractableProps<S>, SchemaError> {
    serde_json::from_value(value).map_err(|source| SchemaError::Invalid { component, source })
}

// =============================================================================
// TABS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabEntry {
    pub id: String,
    pub name: String,
}

/// Tab list and active tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabsState {
    pub canvases: Vec<TabEntry>,
    #[serde(default)]
    pub active_canvas_id: Option<String>,
}

#[must_use]
pub fn tabs_definition() -> InteractableDefinition {
    InteractableDefinition {
        component_name: TABS_COMPONENT.into(),
        description: "Tabs-only interactable. Manages canvases (id, name) and activeCanvasId. \
                      Use CanvasDetails to edit charts for the selected tab."
            .into(),
        props_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "className": { "type": "string" },
                "state": {
                    "type": "object",
                    "properties": {
                        "canvases": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "id": { "type": "string" },
                                    "name": { "type": "string" }
                                },
                                "required": ["id", "name"]
                            }
                        },
                        "activeCanvasId": { "type": ["string", "null"] }
                    },
                    "required": ["canvases"]
                }
            }
        }),
    }
}

// =============================================================================
// CANVAS DETAILS
// =============================================================================

/// Chart rendering style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
    Pie,
}

impl ChartType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Pie => "pie",
        }
    }

    /// Read a stored chart type; anything unrecognised renders as a bar chart.
    #[must_use]
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("line") => Self::Line,
            Some("pie") => Self::Pie,
            _ => Self::Bar,
        }
    }
}

/// One chart on the active canvas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartEntry {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub chart_type: ChartType,
}

/// Charts of the active canvas, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasDetailsState {
    pub charts: Vec<ChartEntry>,
}

#[must_use]
pub fn canvas_details_definition() -> InteractableDefinition {
    InteractableDefinition {
        component_name: CANVAS_DETAILS_COMPONENT.into(),
        description: "View and edit EXISTING charts on the active canvas tab (Graph only). \
                      Only the chart title and graph type (bar, line, pie) of charts already on \
                      the canvas can be changed. New charts are not created here."
            .into(),
        props_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "className": { "type": "string" },
                "state": {
                    "type": "object",
                    "properties": {
                        "charts": {
                            "type": "array",
                            "description": "Active canvas charts in desired order (Graph components only)",
                            "items": {
                                "type": "object",
                                "properties": {
                                    "id": { "type": "string", "description": "Canvas component id (Graph only)" },
                                    "title": { "type": "string", "description": "Chart title" },
                                    "type": { "type": "string", "enum": ["bar", "line", "pie"], "description": "Chart type" }
                                },
                                "required": ["id", "title", "type"]
                            }
                        }
                    },
                    "required": ["charts"]
                }
            }
        }),
    }
}
