//! Agent tools over the project model.
//!
//! Tools are plain functions of project state wrapped in a tool-call result:
//! a human-readable text block plus the typed data the UI consumes directly.

#[cfg(test)]
#[path = "tools_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::services::project::{ProjectInsights, ProjectStore};
use crate::state;

pub const GET_PROJECT_STATS: &str = "getProjectStats";

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("failed to encode tool result: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A tool definition offered to the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// One block of tool output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

/// Tool output: content blocks plus the raw result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult<T> {
    pub content: Vec<ToolContent>,
    pub data: T,
}

/// Tools available over the project model.
#[must_use]
pub fn project_tools() -> Vec<Tool> {
    vec![Tool {
        name: GET_PROJECT_STATS.into(),
        description: "Calculate aggregate analytics for the current project state, including completion rates \
                      and sprint velocity."
            .into(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {}
        }),
    }]
}

/// Run `getProjectStats` against the current project.
///
/// # Errors
///
/// Returns `Encode` if the insights cannot be rendered as text.
pub fn execute_get_project_stats(project: &ProjectStore) -> Result<ToolResult<ProjectInsights>, ToolError> {
    get_project_stats_at(project, state::now_rfc3339())
}

fn get_project_stats_at(project: &ProjectStore, generated_at: String) -> Result<ToolResult<ProjectInsights>, ToolError> {
    let insights = project.compute_insights(generated_at);
    let text = serde_json::to_string_pretty(&insights)?;
    debug!(total_tasks = insights.total_tasks, sprints = insights.sprint_count, "project stats computed");
    Ok(ToolResult { content: vec![ToolContent::Text { text }], data: insights })
}

/// Dispatch a tool call by name and return its serialized result.
///
/// # Errors
///
/// Returns `UnknownTool` for names not in `project_tools()`, or the tool's
/// own error.
pub fn execute(name: &str, project: &ProjectStore) -> Result<Value, ToolError> {
    match name {
        GET_PROJECT_STATS => Ok(serde_json::to_value(execute_get_project_stats(project)?)?),
        other => Err(ToolError::UnknownTool(other.to_owned())),
    }
}
