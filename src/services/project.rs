//! Project service — tasks, sprints, view mode and project metadata.
//!
//! DESIGN
//! ======
//! `ProjectStore` is the in-memory project model the task list, sprint board
//! and timeline views render from. Like `CanvasStore` it is an explicit owner
//! passed by reference; operations are synchronous and unknown ids are silent
//! no-ops. Nothing here is persisted.
//!
//! Sprints reference tasks by id. Deleting a task also removes its id from
//! every sprint, so a sprint never lists a task that no longer exists.

#[cfg(test)]
#[path = "project_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::state;

const PROJECT_ID_LEN: usize = 7;

pub const DEFAULT_PROJECT_NAME: &str = "New Project";
pub const DEFAULT_PROJECT_DESCRIPTION: &str = "AI Generated Project";
/// Fixed creation stamp of a never-reset project.
pub const INITIAL_CREATED_AT: &str = "2024-01-01T00:00:00.000Z";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}

/// A task before it has an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
}

impl NewTask {
    #[must_use]
    pub fn new(title: impl Into<String>, status: TaskStatus, priority: TaskPriority) -> Self {
        Self {
            title: title.into(),
            description: None,
            status,
            priority,
            start_date: None,
            end_date: None,
            assignee: None,
        }
    }
}

/// Partial task edit; `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub assignee: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SprintStatus {
    Active,
    Future,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: String,
    pub name: String,
    pub task_ids: Vec<String>,
    pub start_date: String,
    pub end_date: String,
    pub status: SprintStatus,
}

/// A sprint before it has an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSprint {
    pub name: String,
    #[serde(default)]
    pub task_ids: Vec<String>,
    pub start_date: String,
    pub end_date: String,
    pub status: SprintStatus,
}

/// Which project view is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    List,
    Board,
    Timeline,
    Insights,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetadata {
    pub project_name: String,
    pub description: String,
    pub created_at: String,
}

impl Default for ProjectMetadata {
    fn default() -> Self {
        Self {
            project_name: DEFAULT_PROJECT_NAME.into(),
            description: DEFAULT_PROJECT_DESCRIPTION.into(),
            created_at: INITIAL_CREATED_AT.into(),
        }
    }
}

/// Aggregate project statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInsights {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub high_priority_tasks: usize,
    pub sprint_count: usize,
    /// Mean sprint size, rounded to one decimal; 0 with no sprints.
    pub tasks_per_sprint: f64,
    pub generated_at: String,
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectStore {
    tasks: Vec<Task>,
    sprints: Vec<Sprint>,
    view_mode: ViewMode,
    metadata: ProjectMetadata,
    insights: Option<ProjectInsights>,
}

impl ProjectStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[must_use]
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    #[must_use]
    pub fn sprints(&self) -> &[Sprint] {
        &self.sprints
    }

    #[must_use]
    pub fn sprint(&self, id: &str) -> Option<&Sprint> {
        self.sprints.iter().find(|s| s.id == id)
    }

    #[must_use]
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    #[must_use]
    pub fn metadata(&self) -> &ProjectMetadata {
        &self.metadata
    }

    /// Last stored statistics, if any were computed.
    #[must_use]
    pub fn insights(&self) -> Option<&ProjectInsights> {
        self.insights.as_ref()
    }

    pub fn set_project_name(&mut self, name: &str) {
        self.metadata.project_name = name.to_owned();
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn set_insights(&mut self, insights: ProjectInsights) {
        self.insights = Some(insights);
    }

    // =========================================================================
    // TASKS
    // =========================================================================

    /// Append a task and return its new id.
    pub fn add_task(&mut self, task: NewTask) -> String {
        let id = state::random_base36(PROJECT_ID_LEN);
        let NewTask { title, description, status, priority, start_date, end_date, assignee } = task;
        self.tasks.push(Task { id: id.clone(), title, description, status, priority, start_date, end_date, assignee });
        debug!(task_id = %id, "task added");
        id
    }

    /// Apply a partial edit. `None` for unknown ids.
    pub fn update_task(&mut self, id: &str, update: TaskUpdate) -> Option<Task> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        let TaskUpdate { title, description, status, priority, start_date, end_date, assignee } = update;
        if let Some(title) = title {
            task.title = title;
        }
        if let Some(status) = status {
            task.status = status;
        }
        if let Some(priority) = priority {
            task.priority = priority;
        }
        if description.is_some() {
            task.description = description;
        }
        if start_date.is_some() {
            task.start_date = start_date;
        }
        if end_date.is_some() {
            task.end_date = end_date;
        }
        if assignee.is_some() {
            task.assignee = assignee;
        }
        Some(task.clone())
    }

    /// Remove a task and drop it from every sprint.
    pub fn delete_task(&mut self, id: &str) {
        self.tasks.retain(|t| t.id != id);
        for sprint in &mut self.sprints {
            sprint.task_ids.retain(|tid| tid != id);
        }
        debug!(task_id = %id, "task deleted");
    }

    // =========================================================================
    // SPRINTS
    // =========================================================================

    /// Append a sprint and return its new id.
    pub fn add_sprint(&mut self, sprint: NewSprint) -> String {
        let id = state::random_base36(PROJECT_ID_LEN);
        let NewSprint { name, task_ids, start_date, end_date, status } = sprint;
        self.sprints.push(Sprint { id: id.clone(), name, task_ids, start_date, end_date, status });
        debug!(sprint_id = %id, "sprint added");
        id
    }

    /// Put a task into a sprint once. The task id is not checked.
    ///
    /// Returns `true` if the sprint gained the id.
    pub fn add_task_to_sprint(&mut self, sprint_id: &str, task_id: &str) -> bool {
        let Some(sprint) = self.sprints.iter_mut().find(|s| s.id == sprint_id) else {
            return false;
        };
        if sprint.task_ids.iter().any(|t| t == task_id) {
            return false;
        }
        sprint.task_ids.push(task_id.to_owned());
        true
    }

    /// Back to an empty project created now. Stored insights survive.
    pub fn reset_project(&mut self) {
        self.reset_project_at(state::now_rfc3339());
    }

    fn reset_project_at(&mut self, created_at: String) {
        self.tasks.clear();
        self.sprints.clear();
        self.view_mode = ViewMode::List;
        self.metadata = ProjectMetadata { created_at, ..ProjectMetadata::default() };
    }

    // =========================================================================
    // STATS
    // =========================================================================

    /// Compute aggregate statistics stamped with `generated_at`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn compute_insights(&self, generated_at: String) -> ProjectInsights {
        let sprint_count = self.sprints.len();
        let tasks_per_sprint = if sprint_count == 0 {
            0.0
        } else {
            let in_sprints: usize = self.sprints.iter().map(|s| s.task_ids.len()).sum();
            (in_sprints as f64 / sprint_count as f64 * 10.0).round() / 10.0
        };
        ProjectInsights {
            total_tasks: self.tasks.len(),
            completed_tasks: self.tasks.iter().filter(|t| t.status == TaskStatus::Done).count(),
            high_priority_tasks: self.tasks.iter().filter(|t| t.priority == TaskPriority::High).count(),
            sprint_count,
            tasks_per_sprint,
            generated_at,
        }
    }
}
