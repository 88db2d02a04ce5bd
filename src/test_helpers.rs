//! Test helper factories and mock listeners
//!
//! Provides convenience functions for creating test objects with sensible defaults.
#![allow(dead_code)]

use crate::planner::ids::SequentialIdGenerator;
use crate::planner::models::*;
use crate::planner::store::{ChangedSlices, StateListener, StateView};
use crate::planner::PlannerManager;
use chrono::NaiveDate;
use std::sync::{Arc, Mutex};

// ============================================================================
// Managers and listeners
// ============================================================================

/// A manager with deterministic ids (`s-1`, `g-2`, ...)
pub fn test_manager() -> PlannerManager {
    PlannerManager::new(Arc::new(SequentialIdGenerator::new()))
}

/// Listener that records every commit
#[derive(Default)]
pub struct RecordingListener {
    commits: Mutex<Vec<ChangedSlices>>,
    resets: Mutex<usize>,
}

impl RecordingListener {
    pub fn commits(&self) -> Vec<ChangedSlices> {
        self.commits.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn resets(&self) -> usize {
        self.resets.lock().map(|r| *r).unwrap_or_default()
    }
}

impl StateListener for RecordingListener {
    fn on_commit(&self, _state: StateView<'_>, changed: ChangedSlices) {
        if let Ok(mut commits) = self.commits.lock() {
            commits.push(changed);
        }
    }

    fn on_reset(&self) {
        if let Ok(mut resets) = self.resets.lock() {
            *resets += 1;
        }
    }
}

// ============================================================================
// Test data factories
// ============================================================================

pub fn test_date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Goal request in area "1" due 2025-06-30
pub fn test_goal_request(title: &str) -> CreateGoalRequest {
    CreateGoalRequest {
        area_id: "1".to_string(),
        title: title.to_string(),
        description: None,
        deadline: test_date(2025, 6, 30),
        why_important: None,
        success_criteria: None,
        frequency: None,
    }
}

/// Step request due 2025-06-15
pub fn test_step_request(description: &str, is_completed: bool) -> AddStepRequest {
    AddStepRequest {
        description: description.to_string(),
        deadline: test_date(2025, 6, 15),
        priority: Some(Priority::Medium),
        is_completed,
    }
}

/// Standalone task request in area "4"
pub fn test_task_request(title: &str) -> CreateTaskRequest {
    CreateTaskRequest {
        area_id: "4".to_string(),
        title: title.to_string(),
        deadline: test_date(2025, 6, 20),
        goal_id: None,
        frequency: Some(Frequency::Weekly),
    }
}

/// A goal with incomplete steps carrying the given ids
pub fn test_goal_with_steps(goal_id: &str, step_ids: &[&str]) -> Goal {
    Goal {
        id: goal_id.to_string(),
        area_id: "1".to_string(),
        title: format!("Goal {}", goal_id),
        description: String::new(),
        deadline: test_date(2025, 6, 30),
        is_completed: false,
        why_important: String::new(),
        success_criteria: String::new(),
        frequency: Frequency::OneTime,
        steps: step_ids
            .iter()
            .map(|id| Step {
                id: id.to_string(),
                description: format!("Step {}", id),
                deadline: test_date(2025, 6, 15),
                priority: Priority::Medium,
                is_completed: false,
            })
            .collect(),
    }
}

/// One task per step of `goal`, in step order
pub fn paired_tasks(goal: &Goal) -> Vec<Task> {
    goal.steps.iter().map(|s| Task::for_step(goal, s)).collect()
}

/// A pending standalone task
pub fn test_standalone_task(id: &str) -> Task {
    Task {
        id: id.to_string(),
        goal_id: String::new(),
        area_id: "4".to_string(),
        title: format!("Task {}", id),
        status: TaskStatus::Pending,
        deadline: test_date(2025, 6, 20),
        frequency: Frequency::Weekly,
        completed_date: None,
        discipline: Discipline::Pending,
    }
}
