use super::*;

fn sprint(name: &str, task_ids: &[&str]) -> NewSprint {
    NewSprint {
        name: name.into(),
        task_ids: task_ids.iter().map(|t| (*t).to_owned()).collect(),
        start_date: "2024-02-01".into(),
        end_date: "2024-02-14".into(),
        status: SprintStatus::Future,
    }
}

fn task(title: &str) -> NewTask {
    NewTask::new(title, TaskStatus::Todo, TaskPriority::Medium)
}

// =============================================================================
// defaults / metadata
// =============================================================================

#[test]
fn new_project_has_initial_metadata() {
    let project = ProjectStore::new();
    assert!(project.tasks().is_empty());
    assert!(project.sprints().is_empty());
    assert_eq!(project.view_mode(), ViewMode::List);
    assert_eq!(project.metadata().project_name, "New Project");
    assert_eq!(project.metadata().created_at, INITIAL_CREATED_AT);
    assert!(project.insights().is_none());
}

#[test]
fn set_name_and_view_mode() {
    let mut project = ProjectStore::new();
    project.set_project_name("Launch");
    project.set_view_mode(ViewMode::Timeline);
    assert_eq!(project.metadata().project_name, "Launch");
    assert_eq!(project.metadata().description, DEFAULT_PROJECT_DESCRIPTION);
    assert_eq!(project.view_mode(), ViewMode::Timeline);
}

// =============================================================================
// tasks
// =============================================================================

#[test]
fn add_task_assigns_short_id() {
    let mut project = ProjectStore::new();
    let id = project.add_task(task("Write docs"));
    assert_eq!(id.len(), 7);
    assert_eq!(project.task(&id).unwrap().title, "Write docs");
}

#[test]
fn update_task_merges_given_fields() {
    let mut project = ProjectStore::new();
    let mut new = task("Ship");
    new.assignee = Some("sam".into());
    let id = project.add_task(new);

    let updated = project
        .update_task(&id, TaskUpdate { status: Some(TaskStatus::Done), ..TaskUpdate::default() })
        .unwrap();
    assert_eq!(updated.status, TaskStatus::Done);
    assert_eq!(updated.title, "Ship");
    assert_eq!(updated.assignee.as_deref(), Some("sam"));
}

#[test]
fn update_unknown_task_is_none() {
    let mut project = ProjectStore::new();
    assert_eq!(project.update_task("ghost", TaskUpdate::default()), None);
}

#[test]
fn delete_task_removes_it_from_every_sprint() {
    let mut project = ProjectStore::new();
    let keep = project.add_task(task("keep"));
    let gone = project.add_task(task("gone"));
    let s1 = project.add_sprint(sprint("S1", &[]));
    let s2 = project.add_sprint(sprint("S2", &[]));
    project.add_task_to_sprint(&s1, &keep);
    project.add_task_to_sprint(&s1, &gone);
    project.add_task_to_sprint(&s2, &gone);

    project.delete_task(&gone);

    assert!(project.task(&gone).is_none());
    assert_eq!(project.sprint(&s1).unwrap().task_ids, [keep.clone()]);
    assert!(project.sprint(&s2).unwrap().task_ids.is_empty());
    assert!(project.task(&keep).is_some());
}

// =============================================================================
// sprints
// =============================================================================

#[test]
fn add_task_to_sprint_is_idempotent() {
    let mut project = ProjectStore::new();
    let s = project.add_sprint(sprint("S1", &[]));
    assert!(project.add_task_to_sprint(&s, "t1"));
    assert!(!project.add_task_to_sprint(&s, "t1"));
    assert_eq!(project.sprint(&s).unwrap().task_ids, ["t1"]);
}

#[test]
fn add_task_to_unknown_sprint_is_noop() {
    let mut project = ProjectStore::new();
    assert!(!project.add_task_to_sprint("ghost", "t1"));
}

// =============================================================================
// reset
// =============================================================================

#[test]
fn reset_clears_work_and_restamps_creation() {
    let mut project = ProjectStore::new();
    project.set_project_name("Old");
    project.set_view_mode(ViewMode::Board);
    project.add_task(task("a"));
    project.add_sprint(sprint("S", &[]));
    let stats = project.compute_insights("t0".into());
    project.set_insights(stats);

    project.reset_project_at("2025-05-05T00:00:00Z".into());

    assert!(project.tasks().is_empty());
    assert!(project.sprints().is_empty());
    assert_eq!(project.view_mode(), ViewMode::List);
    assert_eq!(project.metadata().project_name, DEFAULT_PROJECT_NAME);
    assert_eq!(project.metadata().created_at, "2025-05-05T00:00:00Z");
    assert!(project.insights().is_some());
}

#[test]
fn reset_uses_current_time() {
    let mut project = ProjectStore::new();
    project.reset_project();
    assert_ne!(project.metadata().created_at, INITIAL_CREATED_AT);
    assert!(project.metadata().created_at.ends_with('Z'));
}

// =============================================================================
// stats
// =============================================================================

#[test]
fn insights_count_done_and_high_priority() {
    let mut project = ProjectStore::new();
    project.add_task(NewTask::new("a", TaskStatus::Done, TaskPriority::High));
    project.add_task(NewTask::new("b", TaskStatus::Done, TaskPriority::Low));
    project.add_task(NewTask::new("c", TaskStatus::InProgress, TaskPriority::High));
    project.add_task(NewTask::new("d", TaskStatus::Todo, TaskPriority::Medium));

    let stats = project.compute_insights("now".into());
    assert_eq!(stats.total_tasks, 4);
    assert_eq!(stats.completed_tasks, 2);
    assert_eq!(stats.high_priority_tasks, 2);
    assert_eq!(stats.generated_at, "now");
}

#[test]
fn tasks_per_sprint_is_zero_without_sprints() {
    let mut project = ProjectStore::new();
    project.add_task(task("a"));
    let stats = project.compute_insights("now".into());
    assert_eq!(stats.sprint_count, 0);
    assert!(stats.tasks_per_sprint.abs() < f64::EPSILON);
}

#[test]
fn tasks_per_sprint_rounds_to_one_decimal() {
    let mut project = ProjectStore::new();
    project.add_sprint(sprint("S1", &["a", "b"]));
    project.add_sprint(sprint("S2", &["c", "d"]));
    project.add_sprint(sprint("S3", &["e", "f", "g"]));
    // 7 / 3 = 2.333...
    let stats = project.compute_insights("now".into());
    assert_eq!(stats.sprint_count, 3);
    assert!((stats.tasks_per_sprint - 2.3).abs() < 1e-9);

    // 8 / 3 = 2.666...
    let first = project.sprints()[0].id.clone();
    project.add_task_to_sprint(&first, "h");
    let stats = project.compute_insights("now".into());
    assert!((stats.tasks_per_sprint - 2.7).abs() < 1e-9);
}

#[test]
fn status_and_priority_use_wire_spellings() {
    let value = serde_json::to_value(NewTask::new("a", TaskStatus::InProgress, TaskPriority::High)).unwrap();
    assert_eq!(value["status"], "in-progress");
    assert_eq!(value["priority"], "high");
}
