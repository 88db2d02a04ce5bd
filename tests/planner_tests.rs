//! End-to-end tests for the planner through its public API
//!
//! Run with: cargo test --test planner_tests

use chrono::NaiveDate;
use life_planner::events::{ChangeAction, EntityType, EventBus};
use life_planner::persistence::{self, FileStore, ImportPlan, KeyValueStore, MemoryStore};
use life_planner::planner::*;
use life_planner::{AppState, Config, StorageBackend};
use std::path::PathBuf;
use std::sync::Arc;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn manager() -> PlannerManager {
    PlannerManager::new(Arc::new(SequentialIdGenerator::new()))
}

fn goal_request(title: &str) -> CreateGoalRequest {
    CreateGoalRequest {
        area_id: "1".to_string(),
        title: title.to_string(),
        description: None,
        deadline: date(2025, 6, 30),
        why_important: None,
        success_criteria: None,
        frequency: None,
    }
}

fn step_request(description: &str) -> AddStepRequest {
    AddStepRequest {
        description: description.to_string(),
        deadline: date(2025, 6, 15),
        priority: Some(Priority::Medium),
        is_completed: false,
    }
}

fn memory_state() -> AppState {
    let config = Config {
        data_dir: PathBuf::from("unused"),
        storage_backend: StorageBackend::Memory,
        history_limit: None,
    };
    AppState::with_store(config, Arc::new(MemoryStore::new()))
}

/// Every step has exactly one task with its id and matching completion
fn assert_paired(planner: &PlannerManager) {
    for goal in planner.goals() {
        for step in &goal.steps {
            let matching: Vec<&Task> = planner.tasks().iter().filter(|t| t.id == step.id).collect();
            assert_eq!(matching.len(), 1, "step {} should have one task", step.id);
            assert_eq!(
                matching[0].is_completed(),
                step.is_completed,
                "task {} completion out of sync",
                step.id
            );
        }
    }
    assert!(planner.consistency_report().is_consistent());
}

// ============================================================================
// Pairing invariant
// ============================================================================

#[test]
fn test_pairing_holds_across_mixed_operations() {
    let mut planner = manager();

    let career = planner.add_goal(goal_request("Career"));
    let health = planner.add_goal(goal_request("Health"));
    assert_paired(&planner);

    let review = planner.add_step(&career.id, step_request("Prepare review")).unwrap();
    let run = planner.add_step(&health.id, step_request("Run 5k")).unwrap();
    let stretch = planner.add_step(&health.id, step_request("Stretch")).unwrap();
    assert_paired(&planner);

    planner.toggle_step(&career.id, &review.id);
    planner.toggle_task(&run.id);
    planner.toggle_task(&career.steps[0].id);
    assert_paired(&planner);

    planner.delete_step(&health.id, &stretch.id);
    assert_paired(&planner);
    assert!(planner.store().task(&stretch.id).is_none());

    planner.toggle_step(&health.id, &run.id);
    planner.delete_goal(&career.id);
    assert_paired(&planner);

    planner.add_step(&health.id, step_request("Buy shoes"));
    planner.toggle_task(&health.steps[0].id);
    assert_paired(&planner);
    assert_eq!(planner.goals().len(), 1);
    assert_eq!(planner.tasks().len(), 3);
}

#[test]
fn test_pairing_holds_after_pastes_and_sample_data() {
    let mut planner = manager();
    planner.seed_sample_data(date(2025, 3, 10));
    assert_paired(&planner);

    let source = planner.goals()[0].clone();
    planner.copy_goal(&source.id);
    planner.paste_goal().unwrap();
    planner.copy_step(&source.steps[0].id);
    planner.paste_step(&planner.goals()[1].id.clone()).unwrap();
    assert_paired(&planner);
}

// ============================================================================
// Cascade delete
// ============================================================================

#[test]
fn test_delete_goal_cascades_to_tasks_only_for_that_goal() {
    let mut planner = manager();
    let goal = planner.add_goal(goal_request("Learn Rust"));
    planner.add_step(&goal.id, step_request("Read the book"));
    let other = planner.add_goal(goal_request("Save money"));
    let filed = planner.add_task(CreateTaskRequest {
        area_id: "1".to_string(),
        title: "Extra practice".to_string(),
        deadline: date(2025, 6, 1),
        goal_id: Some(goal.id.clone()),
        frequency: Some(Frequency::Daily),
    });
    let standalone = planner.add_task(CreateTaskRequest {
        area_id: "4".to_string(),
        title: "Call parents".to_string(),
        deadline: date(2025, 6, 2),
        goal_id: None,
        frequency: None,
    });

    assert!(planner.delete_goal(&goal.id));

    assert!(planner.store().goal(&goal.id).is_none());
    assert!(planner.tasks().iter().all(|t| t.goal_id != goal.id));
    assert!(planner.store().task(&filed.id).is_none());
    assert!(planner.store().task(&standalone.id).is_some());
    assert_eq!(planner.store().tasks_for_goal(&other.id).count(), 1);
}

// ============================================================================
// Undo / redo
// ============================================================================

#[test]
fn test_undo_then_redo_restores_goals() {
    let mut planner = manager();
    let goal = planner.add_goal(goal_request("A"));
    planner.add_step(&goal.id, step_request("A2"));
    planner.add_goal(goal_request("B"));
    planner.update_step(
        &goal.id,
        UpdateStepRequest {
            step_id: goal.steps[0].id.clone(),
            description: Some("A1 renamed".to_string()),
            ..UpdateStepRequest::default()
        },
    );

    let mut states = Vec::new();
    while planner.can_undo() {
        let before = planner.goals().to_vec();
        assert!(planner.undo());
        assert!(planner.redo());
        assert_eq!(planner.goals(), before.as_slice());
        assert!(planner.undo());
        states.push(before);
    }
    assert!(planner.goals().is_empty());

    for expected in states.iter().rev() {
        assert!(planner.redo());
        assert_eq!(planner.goals(), expected.as_slice());
    }
    let end = planner.goals().to_vec();
    assert!(!planner.redo());
    assert_eq!(planner.goals(), end.as_slice());
}

#[test]
fn test_new_tracked_change_clears_redo() {
    let mut planner = manager();
    planner.add_goal(goal_request("A"));
    planner.undo();
    assert!(planner.can_redo());
    planner.add_goal(goal_request("B"));
    assert!(!planner.can_redo());
}

#[test]
fn test_completion_toggles_are_not_undoable() {
    let mut planner = manager();
    let goal = planner.add_goal(goal_request("A"));
    planner.clear_history();

    planner.toggle_step(&goal.id, &goal.steps[0].id);
    planner.toggle_task(&goal.steps[0].id);
    assert!(!planner.can_undo());
}

#[test]
fn test_history_limit_drops_oldest() {
    let mut planner = manager().with_history_limit(Some(2));
    for title in ["A", "B", "C"] {
        planner.add_goal(goal_request(title));
    }
    assert!(planner.undo());
    assert!(planner.undo());
    assert!(!planner.undo());
    assert_eq!(planner.goals().len(), 1);
    assert_eq!(planner.goals()[0].title, "A");
}

// ============================================================================
// Paste independence
// ============================================================================

#[test]
fn test_pasted_goal_is_independent_and_open() {
    let mut planner = manager();
    let source = planner.add_goal(goal_request("Marathon"));
    planner.add_step(&source.id, step_request("Long run"));
    planner.toggle_goal(&source.id);
    planner.toggle_step(&source.id, &source.steps[0].id);

    planner.copy_goal(&source.id);
    let clone = planner.paste_goal().unwrap();

    assert_ne!(clone.id, source.id);
    assert_eq!(clone.title, "Marathon (Copy)");
    assert!(!clone.is_completed);
    assert!(clone.steps.iter().all(|s| !s.is_completed));
    assert!(clone
        .steps
        .iter()
        .all(|s| planner.store().find_step(&s.id).unwrap().0.id == clone.id));

    let original_steps = planner.store().goal(&source.id).unwrap().steps.clone();
    let clone_step = clone.steps[1].id.clone();
    planner.toggle_step(&clone.id, &clone_step);
    planner.update_step(
        &clone.id,
        UpdateStepRequest {
            step_id: clone_step,
            description: Some("Changed".to_string()),
            ..UpdateStepRequest::default()
        },
    );
    assert_eq!(planner.store().goal(&source.id).unwrap().steps, original_steps);
    assert!(planner.store().goal(&source.id).unwrap().is_completed);
    assert_paired(&planner);
}

#[test]
fn test_paste_is_repeatable_with_fresh_ids() {
    let mut planner = manager();
    let source = planner.add_goal(goal_request("Weekly review"));
    planner.copy_goal(&source.id);
    let first = planner.paste_goal().unwrap();
    let second = planner.paste_goal().unwrap();
    assert_ne!(first.id, second.id);
    assert_ne!(first.steps[0].id, second.steps[0].id);
    assert_eq!(planner.goals().len(), 3);
}

// ============================================================================
// Toggle symmetry
// ============================================================================

#[test]
fn test_double_toggle_restores_step_and_task() {
    let mut planner = manager();
    let goal = planner.add_goal(goal_request("A"));
    let step = planner.add_step(&goal.id, step_request("Write")).unwrap();
    planner.toggle_step(&goal.id, &step.id);
    let before = (planner.goals().to_vec(), planner.tasks().to_vec());

    planner.toggle_step(&goal.id, &step.id);
    planner.toggle_step(&goal.id, &step.id);
    assert_eq!((planner.goals().to_vec(), planner.tasks().to_vec()), before);

    planner.toggle_task(&step.id);
    planner.toggle_task(&step.id);
    assert_eq!((planner.goals().to_vec(), planner.tasks().to_vec()), before);
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_learn_go_scenario() {
    let mut planner = manager();
    let goal = planner.add_goal(goal_request("Learn Go"));

    assert_eq!(goal.steps.len(), 1);
    let step = &goal.steps[0];
    assert_eq!(step.description, "Learn Go");
    assert_eq!(step.deadline, date(2025, 6, 30));
    let task = planner.store().task(&step.id).unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.goal_id, goal.id);
    assert_eq!(task.area_id, "1");

    assert!(planner.toggle_task(&step.id));
    assert!(planner.store().goal(&goal.id).unwrap().steps[0].is_completed);
    assert_eq!(
        planner.store().task(&step.id).unwrap().status,
        TaskStatus::Completed
    );

    assert!(planner.delete_goal(&goal.id));
    assert!(planner.store().task(&step.id).is_none());
    assert!(planner.goals().is_empty());
}

#[test]
fn test_draft_report_paste_scenario() {
    let mut planner = manager();
    let work = planner.add_goal(goal_request("Work"));
    let draft = planner
        .add_step(
            &work.id,
            AddStepRequest {
                is_completed: true,
                ..step_request("Draft report")
            },
        )
        .unwrap();
    let other = planner.add_goal(goal_request("Side project"));

    assert!(planner.copy_step(&draft.id));
    let pasted = planner.paste_step(&other.id).unwrap();

    assert_eq!(pasted.description, "Draft report (Copy)");
    assert_ne!(pasted.id, draft.id);
    assert!(!pasted.is_completed);
    assert_eq!(pasted.priority, draft.priority);
    assert_eq!(pasted.deadline, draft.deadline);

    let target = planner.store().goal(&other.id).unwrap();
    assert_eq!(target.steps.last().unwrap(), &pasted);
    let task = planner.store().task(&pasted.id).unwrap();
    assert_eq!(task.status, TaskStatus::Pending);
    assert_eq!(task.goal_id, other.id);
    assert_eq!(task.title, "Draft report (Copy)");
    assert_paired(&planner);
}

#[test]
fn test_goals_only_import_scenario() {
    let mut state = memory_state();
    state.planner.add_goal(goal_request("Will be replaced"));
    state.planner.add_task(CreateTaskRequest {
        area_id: "4".to_string(),
        title: "Old task".to_string(),
        deadline: date(2025, 1, 1),
        goal_id: None,
        frequency: None,
    });

    let backup = r#"{
        "goals": [
            {"id": "g-a", "areaId": "3", "title": "Swim", "deadline": "2025-08-01",
             "steps": [{"id": "s-a", "description": "Lesson", "deadline": "2025-07-01",
                        "priority": "Low", "isCompleted": false}]},
            {"id": "g-b", "areaId": "5", "title": "Read", "deadline": "2025-09-01", "steps": []}
        ]
    }"#;
    let plan = ImportPlan::parse(backup).unwrap();
    assert!(plan.has_core_data());

    state.import_backup(&plan).unwrap();

    let ids: Vec<&str> = state.planner.goals().iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids, vec!["g-a", "g-b"]);
    assert!(state.planner.tasks().is_empty());
    assert_eq!(state.planner.vision(), &VisionBoardData::default());
}

#[test]
fn test_import_without_core_data_is_rejected() {
    let err = ImportPlan::parse(r#"{"data": {"aesthetic_planner_tab": "tasks"}}"#).unwrap_err();
    assert!(matches!(err, persistence::ImportError::NoCoreData));
    assert!(ImportPlan::parse("not json").is_err());
}

// ============================================================================
// Persistence and events
// ============================================================================

#[test]
fn test_export_then_import_restores_everything() {
    let mut source = memory_state();
    source.planner.seed_sample_data(date(2025, 5, 20));
    source.planner.set_selected_month(4);
    source.planner.set_current_tab(Tab::Action);
    let backup = source.export_backup().unwrap();
    let json = serde_json::to_string(&backup).unwrap();

    let mut target = memory_state();
    target.import_backup(&ImportPlan::parse(&json).unwrap()).unwrap();

    assert_eq!(target.planner.goals(), source.planner.goals());
    assert_eq!(target.planner.tasks(), source.planner.tasks());
    assert_eq!(target.planner.vision(), source.planner.vision());
    assert_eq!(target.planner.current_tab(), Tab::Action);
    assert_eq!(target.planner.selected_month(), 4);
}

#[test]
fn test_file_backed_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        data_dir: dir.path().to_path_buf(),
        storage_backend: StorageBackend::File,
        history_limit: Some(10),
    };

    let mut first = AppState::new(config.clone()).unwrap();
    let goal = first.planner.add_goal(goal_request("Learn Go"));
    first.planner.toggle_task(&goal.steps[0].id);
    first.planner.set_selected_month(7);
    drop(first);

    let store = FileStore::open(dir.path()).unwrap();
    assert!(store.get("aesthetic_planner_goals").unwrap().is_some());

    let second = AppState::new(config).unwrap();
    assert_eq!(second.planner.goals().len(), 1);
    assert!(second.planner.goals()[0].steps[0].is_completed);
    assert_eq!(second.planner.selected_month(), 7);
    assert!(!second.planner.can_undo());
    assert_paired(&second.planner);
}

#[test]
fn test_dispatch_batch_from_json() {
    let mut planner = manager();
    let batch = r#"[
        {"op": "add_goal", "areaId": "1", "title": "Learn Go", "deadline": "2025-06-30"},
        {"op": "add_step", "goalId": "g-2",
         "step": {"description": "Tour of Go", "deadline": "2025-06-10"}},
        {"op": "toggle_task", "taskId": "s-1"},
        {"op": "copy_goal", "goalId": "g-2"},
        {"op": "paste_goal"},
        {"op": "undo"},
        {"op": "delete_goal", "goalId": "missing"}
    ]"#;
    let commands = PlannerCommand::parse_batch(batch).unwrap();
    let outcomes = planner.dispatch_all(commands);

    assert_eq!(
        outcomes[0],
        CommandOutcome::Created {
            entity_id: "g-2".to_string()
        }
    );
    assert!(matches!(outcomes[1], CommandOutcome::Created { .. }));
    assert_eq!(outcomes[2], CommandOutcome::Applied);
    assert_eq!(outcomes[5], CommandOutcome::Applied);
    assert_eq!(outcomes[6], CommandOutcome::Unchanged);
    assert_eq!(planner.goals().len(), 1);
    assert!(planner.goals()[0].steps[0].is_completed);
}

#[test]
fn test_events_published_for_goal_lifecycle() {
    let bus = Arc::new(EventBus::default());
    let mut rx = bus.subscribe();
    let mut tasks_only = bus.subscribe_to(&[EntityType::Task]);
    let mut planner = manager().with_event_emitter(bus.clone());

    let goal = planner.add_goal(goal_request("Learn Go"));
    planner.delete_goal(&goal.id);

    let events = rx.drain();
    assert!(events.iter().any(|e| e.entity_type == EntityType::Goal
        && e.action == ChangeAction::Created
        && e.entity_id == goal.id));
    assert!(events.iter().any(|e| e.entity_type == EntityType::Task
        && e.action == ChangeAction::Deleted
        && e.entity_id == goal.steps[0].id));
    assert!(events.iter().any(|e| e.entity_type == EntityType::Goal
        && e.action == ChangeAction::Deleted));

    let task_actions: Vec<ChangeAction> = tasks_only.drain().iter().map(|e| e.action).collect();
    assert_eq!(task_actions, vec![ChangeAction::Created, ChangeAction::Deleted]);
    assert_eq!(tasks_only.missed(), 0);
}
