//! In-memory entity store: goals (with embedded steps) and tasks
//!
//! The store is the single source of truth. It only exposes read access
//! publicly; mutation goes through [`crate::planner::sync::SyncEngine`] so that
//! both collections change within the same call.

use super::models::{Goal, Step, Task, Tab, VisionBoardData};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Goals and tasks held as one consistent pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityStore {
    goals: Vec<Goal>,
    tasks: Vec<Task>,
}

impl EntityStore {
    pub fn new(goals: Vec<Goal>, tasks: Vec<Task>) -> Self {
        Self { goals, tasks }
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn goal(&self, goal_id: &str) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == goal_id)
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Locate a step by id in any goal
    pub fn find_step(&self, step_id: &str) -> Option<(&Goal, &Step)> {
        self.goals
            .iter()
            .find_map(|g| g.step(step_id).map(|s| (g, s)))
    }

    /// Tasks filed under `goal_id`
    pub fn tasks_for_goal<'a>(&'a self, goal_id: &'a str) -> impl Iterator<Item = &'a Task> + 'a {
        self.tasks.iter().filter(move |t| t.goal_id == goal_id)
    }

    pub(crate) fn goals_mut(&mut self) -> &mut Vec<Goal> {
        &mut self.goals
    }

    pub(crate) fn tasks_mut(&mut self) -> &mut Vec<Task> {
        &mut self.tasks
    }

    pub(crate) fn goal_mut(&mut self, goal_id: &str) -> Option<&mut Goal> {
        self.goals.iter_mut().find(|g| g.id == goal_id)
    }

    /// Swap in a new goal collection, returning the previous one
    pub(crate) fn replace_goals(&mut self, goals: Vec<Goal>) -> Vec<Goal> {
        std::mem::replace(&mut self.goals, goals)
    }

    pub(crate) fn replace_tasks(&mut self, tasks: Vec<Task>) -> Vec<Task> {
        std::mem::replace(&mut self.tasks, tasks)
    }

    /// Check the step/task pairing without changing anything
    pub fn consistency_report(&self) -> ConsistencyReport {
        let mut report = ConsistencyReport::default();

        let mut task_counts: HashMap<&str, usize> = HashMap::new();
        for task in &self.tasks {
            *task_counts.entry(task.id.as_str()).or_default() += 1;
        }
        let mut seen_duplicates = HashSet::new();
        for task in &self.tasks {
            if task_counts[task.id.as_str()] > 1 && seen_duplicates.insert(task.id.as_str()) {
                report.duplicate_task_ids.push(task.id.clone());
            }
        }

        for goal in &self.goals {
            for step in &goal.steps {
                match self.task(&step.id) {
                    None => report.unpaired_steps.push(StepRef::new(goal, step)),
                    Some(task) if task.is_completed() != step.is_completed => {
                        report.completion_mismatches.push(StepRef::new(goal, step))
                    }
                    Some(_) => {}
                }
            }
        }

        report
    }
}

/// Reference to a step inside a goal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRef {
    pub goal_id: String,
    pub step_id: String,
}

impl StepRef {
    fn new(goal: &Goal, step: &Step) -> Self {
        Self {
            goal_id: goal.id.clone(),
            step_id: step.id.clone(),
        }
    }
}

/// Result of [`EntityStore::consistency_report`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsistencyReport {
    /// Steps with no task carrying their id
    pub unpaired_steps: Vec<StepRef>,
    /// Steps whose paired task disagrees on completion
    pub completion_mismatches: Vec<StepRef>,
    /// Task ids that occur more than once
    pub duplicate_task_ids: Vec<String>,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.unpaired_steps.is_empty()
            && self.completion_mismatches.is_empty()
            && self.duplicate_task_ids.is_empty()
    }

    pub fn issue_count(&self) -> usize {
        self.unpaired_steps.len() + self.completion_mismatches.len() + self.duplicate_task_ids.len()
    }
}

// ============================================================================
// Change notification
// ============================================================================

/// Which top-level state slices a committed operation touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangedSlices {
    pub goals: bool,
    pub tasks: bool,
    pub vision: bool,
    pub tab: bool,
    pub month: bool,
}

impl ChangedSlices {
    pub const NONE: Self = Self {
        goals: false,
        tasks: false,
        vision: false,
        tab: false,
        month: false,
    };

    pub const ALL: Self = Self {
        goals: true,
        tasks: true,
        vision: true,
        tab: true,
        month: true,
    };

    pub fn goals() -> Self {
        Self {
            goals: true,
            ..Self::NONE
        }
    }

    pub fn tasks() -> Self {
        Self {
            tasks: true,
            ..Self::NONE
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            goals: self.goals || other.goals,
            tasks: self.tasks || other.tasks,
            vision: self.vision || other.vision,
            tab: self.tab || other.tab,
            month: self.month || other.month,
        }
    }
}

/// Read-only view of the whole planner state handed to listeners
#[derive(Debug, Clone, Copy)]
pub struct StateView<'a> {
    pub entities: &'a EntityStore,
    pub vision: &'a VisionBoardData,
    pub current_tab: Tab,
    pub selected_month: u32,
}

/// Subscriber notified after every committed change
///
/// Persistence and derived-view recomputation hang off this hook, which keeps
/// the sync engine free of any storage concern.
pub trait StateListener: Send + Sync {
    fn on_commit(&self, state: StateView<'_>, changed: ChangedSlices);

    /// Called after a full reset, before `on_commit` with the default state
    fn on_reset(&self) {}
}
