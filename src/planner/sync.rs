//! Paired goal/step/task mutations
//!
//! Every operation here updates goals and tasks inside one call on
//! `&mut EntityStore`, so no caller ever observes one collection changed
//! without the other. Operations are total: unknown ids shrink the operation
//! to a no-op on the affected side.

use super::ids::{IdGenerator, IdKind};
use super::models::*;
use super::store::{ChangedSlices, EntityStore};
use crate::events::{ChangeAction, ChangeEvent, EntityType};
use std::sync::Arc;
use tracing::debug;

/// Suffix appended to pasted goal titles and step descriptions
pub const COPY_SUFFIX: &str = " (Copy)";

/// What a sync operation changed
#[derive(Debug, Clone, Default)]
pub struct SyncOutcome {
    pub goals_changed: bool,
    pub tasks_changed: bool,
    /// Change events to publish once the operation is committed
    pub events: Vec<ChangeEvent>,
}

impl SyncOutcome {
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn is_noop(&self) -> bool {
        !self.goals_changed && !self.tasks_changed
    }

    pub fn changed_slices(&self) -> ChangedSlices {
        ChangedSlices {
            goals: self.goals_changed,
            tasks: self.tasks_changed,
            ..ChangedSlices::NONE
        }
    }

    fn push(&mut self, event: ChangeEvent) {
        self.events.push(event);
    }
}

fn step_event(action: ChangeAction, goal_id: &str, step_id: &str) -> ChangeEvent {
    ChangeEvent::new(EntityType::Step, action, step_id).with_related(EntityType::Goal, goal_id)
}

fn task_event(action: ChangeAction, task: &Task) -> ChangeEvent {
    let event = ChangeEvent::new(EntityType::Task, action, task.id.as_str()).with_payload(
        serde_json::json!({
            "title": task.title,
            "status": task.status,
        }),
    );
    if task.is_standalone() {
        event
    } else {
        event.with_related(EntityType::Goal, task.goal_id.as_str())
    }
}

/// Applies paired mutations to an [`EntityStore`]
#[derive(Clone)]
pub struct SyncEngine {
    ids: Arc<dyn IdGenerator>,
}

impl SyncEngine {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids }
    }

    pub fn ids(&self) -> &dyn IdGenerator {
        self.ids.as_ref()
    }

    // ========================================================================
    // Goal operations
    // ========================================================================

    /// Insert a goal with one generated initial step and its paired task
    pub fn add_goal(&self, store: &mut EntityStore, req: CreateGoalRequest) -> (Goal, SyncOutcome) {
        let frequency = req.frequency.unwrap_or_default();
        let initial_step = Step {
            id: self.ids.next_id(IdKind::Step),
            description: req.title.clone(),
            deadline: req.deadline,
            priority: Priority::High,
            is_completed: false,
        };
        let goal = Goal {
            id: self.ids.next_id(IdKind::Goal),
            area_id: req.area_id,
            title: req.title,
            description: req.description.unwrap_or_default(),
            deadline: req.deadline,
            is_completed: false,
            why_important: req.why_important.unwrap_or_default(),
            success_criteria: req.success_criteria.unwrap_or_default(),
            frequency,
            steps: vec![initial_step],
        };
        let task = Task::for_step(&goal, &goal.steps[0]);

        let mut outcome = SyncOutcome {
            goals_changed: true,
            tasks_changed: true,
            events: Vec::new(),
        };
        outcome.push(
            ChangeEvent::new(EntityType::Goal, ChangeAction::Created, goal.id.as_str())
                .with_payload(serde_json::json!({ "title": goal.title, "areaId": goal.area_id })),
        );
        outcome.push(step_event(ChangeAction::Created, &goal.id, &task.id));
        outcome.push(task_event(ChangeAction::Created, &task));

        debug!(goal_id = %goal.id, step_id = %task.id, "Goal added with initial step");
        store.goals_mut().push(goal.clone());
        store.tasks_mut().push(task);
        (goal, outcome)
    }

    /// Remove a goal, its steps and every task filed under it
    pub fn delete_goal(&self, store: &mut EntityStore, goal_id: &str) -> SyncOutcome {
        let mut outcome = SyncOutcome::unchanged();

        let goals_before = store.goals().len();
        store.goals_mut().retain(|g| g.id != goal_id);
        if store.goals().len() != goals_before {
            outcome.goals_changed = true;
            outcome.push(ChangeEvent::new(
                EntityType::Goal,
                ChangeAction::Deleted,
                goal_id,
            ));
        }

        let (removed, kept): (Vec<Task>, Vec<Task>) = store
            .replace_tasks(Vec::new())
            .into_iter()
            .partition(|t| t.goal_id == goal_id && !goal_id.is_empty());
        store.replace_tasks(kept);
        if !removed.is_empty() {
            outcome.tasks_changed = true;
            for task in &removed {
                outcome.push(task_event(ChangeAction::Deleted, task));
            }
        }

        debug!(goal_id, tasks_removed = removed.len(), "Goal deleted");
        outcome
    }

    /// Flip a goal's completion flag. Steps and tasks are untouched.
    pub fn toggle_goal(&self, store: &mut EntityStore, goal_id: &str) -> SyncOutcome {
        let Some(goal) = store.goal_mut(goal_id) else {
            return SyncOutcome::unchanged();
        };
        goal.is_completed = !goal.is_completed;
        let is_completed = goal.is_completed;

        let mut outcome = SyncOutcome {
            goals_changed: true,
            ..SyncOutcome::default()
        };
        outcome.push(
            ChangeEvent::new(EntityType::Goal, ChangeAction::Updated, goal_id)
                .with_payload(serde_json::json!({ "isCompleted": is_completed })),
        );
        outcome
    }

    // ========================================================================
    // Step operations
    // ========================================================================

    /// Append a step to a goal and create its paired task
    ///
    /// Returns `None` when the goal does not exist; nothing changes then.
    pub fn add_step(
        &self,
        store: &mut EntityStore,
        goal_id: &str,
        req: AddStepRequest,
    ) -> (Option<Step>, SyncOutcome) {
        let step = Step {
            id: self.ids.next_id(IdKind::Step),
            description: req.description,
            deadline: req.deadline,
            priority: req.priority.unwrap_or_default(),
            is_completed: req.is_completed,
        };
        match self.append_step(store, goal_id, step) {
            Some((step, outcome)) => (Some(step), outcome),
            None => (None, SyncOutcome::unchanged()),
        }
    }

    fn append_step(
        &self,
        store: &mut EntityStore,
        goal_id: &str,
        step: Step,
    ) -> Option<(Step, SyncOutcome)> {
        let goal = store.goal_mut(goal_id)?;
        goal.steps.push(step.clone());
        let task = Task::for_step(goal, &step);

        let mut outcome = SyncOutcome {
            goals_changed: true,
            tasks_changed: true,
            events: Vec::new(),
        };
        outcome.push(step_event(ChangeAction::Created, goal_id, &step.id));
        outcome.push(task_event(ChangeAction::Created, &task));
        store.tasks_mut().push(task);
        Some((step, outcome))
    }

    /// Update a step in place and mirror title/deadline onto its task
    ///
    /// The task is matched by id alone and its status is never touched.
    pub fn update_step(
        &self,
        store: &mut EntityStore,
        goal_id: &str,
        req: UpdateStepRequest,
    ) -> SyncOutcome {
        let mut outcome = SyncOutcome::unchanged();

        let updated = store
            .goal_mut(goal_id)
            .and_then(|g| g.steps.iter_mut().find(|s| s.id == req.step_id))
            .map(|step| {
                if let Some(description) = &req.description {
                    step.description = description.clone();
                }
                if let Some(deadline) = req.deadline {
                    step.deadline = deadline;
                }
                if let Some(priority) = req.priority {
                    step.priority = priority;
                }
                if let Some(is_completed) = req.is_completed {
                    step.is_completed = is_completed;
                }
                step.clone()
            });

        if let Some(step) = &updated {
            outcome.goals_changed = true;
            outcome.push(
                step_event(ChangeAction::Updated, goal_id, &step.id).with_payload(
                    serde_json::json!({
                        "description": step.description,
                        "deadline": step.deadline,
                        "isCompleted": step.is_completed,
                    }),
                ),
            );
        }

        let title = updated
            .as_ref()
            .map(|s| s.description.clone())
            .or_else(|| req.description.clone());
        let deadline = updated.as_ref().map(|s| s.deadline).or(req.deadline);
        if title.is_none() && deadline.is_none() {
            return outcome;
        }

        if let Some(task) = store.tasks_mut().iter_mut().find(|t| t.id == req.step_id) {
            if let Some(title) = title {
                task.title = title;
            }
            if let Some(deadline) = deadline {
                task.deadline = deadline;
            }
            outcome.tasks_changed = true;
            outcome.push(task_event(ChangeAction::Updated, task));
        }

        outcome
    }

    /// Remove a step from a goal and the task sharing its id
    pub fn delete_step(&self, store: &mut EntityStore, goal_id: &str, step_id: &str) -> SyncOutcome {
        let mut outcome = SyncOutcome::unchanged();

        if let Some(goal) = store.goal_mut(goal_id) {
            let before = goal.steps.len();
            goal.steps.retain(|s| s.id != step_id);
            if goal.steps.len() != before {
                outcome.goals_changed = true;
                outcome.push(step_event(ChangeAction::Deleted, goal_id, step_id));
            }
        }

        let tasks_before = store.tasks().len();
        store.tasks_mut().retain(|t| t.id != step_id);
        if store.tasks().len() != tasks_before {
            outcome.tasks_changed = true;
            outcome.push(ChangeEvent::new(
                EntityType::Task,
                ChangeAction::Deleted,
                step_id,
            ));
        }

        outcome
    }

    /// Flip a step in the named goal and the task sharing its id
    ///
    /// The task side keys on id alone, so it flips even when the step is not
    /// found under `goal_id`.
    pub fn toggle_step(&self, store: &mut EntityStore, goal_id: &str, step_id: &str) -> SyncOutcome {
        let mut outcome = SyncOutcome::unchanged();

        if let Some(step) = store
            .goal_mut(goal_id)
            .and_then(|g| g.steps.iter_mut().find(|s| s.id == step_id))
        {
            step.is_completed = !step.is_completed;
            outcome.goals_changed = true;
            outcome.push(
                step_event(ChangeAction::Updated, goal_id, step_id)
                    .with_payload(serde_json::json!({ "isCompleted": step.is_completed })),
            );
        }

        if let Some(task) = Self::flip_task(store, step_id) {
            outcome.tasks_changed = true;
            outcome.push(task_event(ChangeAction::Updated, &task));
        }

        outcome
    }

    // ========================================================================
    // Task operations
    // ========================================================================

    /// Flip a task and every step sharing its id, in any goal
    pub fn toggle_task(&self, store: &mut EntityStore, task_id: &str) -> SyncOutcome {
        let mut outcome = SyncOutcome::unchanged();

        if let Some(task) = Self::flip_task(store, task_id) {
            outcome.tasks_changed = true;
            outcome.push(task_event(ChangeAction::Updated, &task));
        }

        for goal in store.goals_mut().iter_mut() {
            for step in goal.steps.iter_mut().filter(|s| s.id == task_id) {
                step.is_completed = !step.is_completed;
                outcome.goals_changed = true;
                outcome.push(
                    step_event(ChangeAction::Updated, &goal.id, &step.id)
                        .with_payload(serde_json::json!({ "isCompleted": step.is_completed })),
                );
            }
        }

        outcome
    }

    /// Insert a task that is not backed by a step
    pub fn add_task(&self, store: &mut EntityStore, req: CreateTaskRequest) -> (Task, SyncOutcome) {
        let task = Task {
            id: self.ids.next_id(IdKind::Task),
            goal_id: req.goal_id.unwrap_or_default(),
            area_id: req.area_id,
            title: req.title,
            status: TaskStatus::Pending,
            deadline: req.deadline,
            frequency: req.frequency.unwrap_or_default(),
            completed_date: None,
            discipline: Discipline::Pending,
        };

        let mut outcome = SyncOutcome {
            tasks_changed: true,
            ..SyncOutcome::default()
        };
        outcome.push(task_event(ChangeAction::Created, &task));
        store.tasks_mut().push(task.clone());
        (task, outcome)
    }

    fn flip_task(store: &mut EntityStore, task_id: &str) -> Option<Task> {
        let task = store.tasks_mut().iter_mut().find(|t| t.id == task_id)?;
        task.status = task.status.toggled();
        Some(task.clone())
    }

    // ========================================================================
    // Paste operations
    // ========================================================================

    /// Insert an independent copy of `source` with fresh ids
    ///
    /// The copy and all its steps start incomplete and every copied step gets
    /// a Pending task.
    pub fn paste_goal(&self, store: &mut EntityStore, source: &Goal) -> (Goal, SyncOutcome) {
        let goal = Goal {
            id: self.ids.next_id(IdKind::Goal),
            title: format!("{}{}", source.title, COPY_SUFFIX),
            is_completed: false,
            steps: source
                .steps
                .iter()
                .map(|s| Step {
                    id: self.ids.next_id(IdKind::Step),
                    is_completed: false,
                    ..s.clone()
                })
                .collect(),
            ..source.clone()
        };

        let mut outcome = SyncOutcome {
            goals_changed: true,
            tasks_changed: !goal.steps.is_empty(),
            events: Vec::new(),
        };
        outcome.push(
            ChangeEvent::new(EntityType::Goal, ChangeAction::Created, goal.id.as_str())
                .with_payload(serde_json::json!({ "title": goal.title, "copiedFrom": source.id })),
        );
        let tasks: Vec<Task> = goal
            .steps
            .iter()
            .map(|s| Task::for_step(&goal, s))
            .collect();
        for task in &tasks {
            outcome.push(task_event(ChangeAction::Created, task));
        }

        debug!(goal_id = %goal.id, source_id = %source.id, steps = goal.steps.len(), "Goal pasted");
        store.goals_mut().push(goal.clone());
        store.tasks_mut().extend(tasks);
        (goal, outcome)
    }

    /// Append a copy of `source` to the target goal
    ///
    /// Returns `None` when the target goal does not exist; nothing changes then.
    pub fn paste_step(
        &self,
        store: &mut EntityStore,
        target_goal_id: &str,
        source: &Step,
    ) -> (Option<Step>, SyncOutcome) {
        if store.goal(target_goal_id).is_none() {
            return (None, SyncOutcome::unchanged());
        }
        let step = Step {
            id: self.ids.next_id(IdKind::Step),
            description: format!("{}{}", source.description, COPY_SUFFIX),
            is_completed: false,
            ..source.clone()
        };
        match self.append_step(store, target_goal_id, step) {
            Some((step, outcome)) => (Some(step), outcome),
            None => (None, SyncOutcome::unchanged()),
        }
    }

    // ========================================================================
    // Bulk
    // ========================================================================

    /// Append already-paired goals and tasks, e.g. generated sample data
    pub fn append(&self, store: &mut EntityStore, goals: Vec<Goal>, tasks: Vec<Task>) -> SyncOutcome {
        let mut outcome = SyncOutcome {
            goals_changed: !goals.is_empty(),
            tasks_changed: !tasks.is_empty(),
            events: Vec::new(),
        };
        for goal in &goals {
            outcome.push(ChangeEvent::new(
                EntityType::Goal,
                ChangeAction::Created,
                goal.id.as_str(),
            ));
        }
        for task in &tasks {
            outcome.push(task_event(ChangeAction::Created, task));
        }
        store.goals_mut().extend(goals);
        store.tasks_mut().extend(tasks);
        outcome
    }
}
