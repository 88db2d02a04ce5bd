//! Planner management operations
//!
//! [`PlannerManager`] is the only place state changes. Each operation takes
//! an optional history snapshot, runs the sync engine, publishes change
//! events and then notifies state listeners (persistence) of the slices that
//! changed.

use super::clipboard::{Clipboard, ClipboardItem};
use super::defaults;
use super::history::HistoryManager;
use super::ids::IdGenerator;
use super::models::*;
use super::store::{ChangedSlices, ConsistencyReport, EntityStore, StateListener, StateView};
use super::sync::{SyncEngine, SyncOutcome};
use crate::events::{ChangeAction, ChangeEvent, EntityType, EventEmitter};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// The persistable part of planner state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerSnapshot {
    pub goals: Vec<Goal>,
    pub tasks: Vec<Task>,
    pub vision: VisionBoardData,
    pub current_tab: Tab,
    /// Zero-based month, 0..=11
    pub selected_month: u32,
}

impl Default for PlannerSnapshot {
    fn default() -> Self {
        Self {
            goals: Vec::new(),
            tasks: Vec::new(),
            vision: VisionBoardData::default(),
            current_tab: Tab::default(),
            selected_month: current_month(),
        }
    }
}

/// Zero-based month of today's local date
pub fn current_month() -> u32 {
    Local::now().month0()
}

/// Today's local date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Manager for all planner operations
pub struct PlannerManager {
    store: EntityStore,
    vision: VisionBoardData,
    current_tab: Tab,
    selected_month: u32,
    history: HistoryManager,
    clipboard: Clipboard,
    sync: SyncEngine,
    emitter: Option<Arc<dyn EventEmitter>>,
    listeners: Vec<Arc<dyn StateListener>>,
}

impl PlannerManager {
    /// Create a manager holding the default (empty) state
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self::from_snapshot(PlannerSnapshot::default(), ids)
    }

    /// Create a manager over previously persisted state
    pub fn from_snapshot(snapshot: PlannerSnapshot, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            store: EntityStore::new(snapshot.goals, snapshot.tasks),
            vision: snapshot.vision,
            current_tab: snapshot.current_tab,
            selected_month: snapshot.selected_month,
            history: HistoryManager::new(),
            clipboard: Clipboard::new(),
            sync: SyncEngine::new(ids),
            emitter: None,
            listeners: Vec::new(),
        }
    }

    /// Bound the undo stack; `None` keeps it unbounded
    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history = HistoryManager::with_limit(limit);
        self
    }

    /// Set the event emitter (builder pattern)
    pub fn with_event_emitter(mut self, emitter: Arc<dyn EventEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    /// Register a listener notified after every committed change
    pub fn add_listener(&mut self, listener: Arc<dyn StateListener>) {
        self.listeners.push(listener);
    }

    // ========================================================================
    // Read access
    // ========================================================================

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn goals(&self) -> &[Goal] {
        self.store.goals()
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn vision(&self) -> &VisionBoardData {
        &self.vision
    }

    pub fn current_tab(&self) -> Tab {
        self.current_tab
    }

    pub fn selected_month(&self) -> u32 {
        self.selected_month
    }

    pub fn clipboard(&self) -> Option<&ClipboardItem> {
        self.clipboard.item()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn consistency_report(&self) -> ConsistencyReport {
        self.store.consistency_report()
    }

    pub fn snapshot(&self) -> PlannerSnapshot {
        PlannerSnapshot {
            goals: self.store.goals().to_vec(),
            tasks: self.store.tasks().to_vec(),
            vision: self.vision.clone(),
            current_tab: self.current_tab,
            selected_month: self.selected_month,
        }
    }

    fn view(&self) -> StateView<'_> {
        StateView {
            entities: &self.store,
            vision: &self.vision,
            current_tab: self.current_tab,
            selected_month: self.selected_month,
        }
    }

    // ========================================================================
    // Commit plumbing
    // ========================================================================

    fn emit(&self, event: ChangeEvent) {
        if let Some(emitter) = &self.emitter {
            emitter.emit(event);
        }
    }

    fn notify(&self, changed: ChangedSlices) {
        if changed.is_empty() {
            return;
        }
        let view = self.view();
        for listener in &self.listeners {
            listener.on_commit(view, changed);
        }
    }

    fn commit(&self, outcome: SyncOutcome) {
        let changed = outcome.changed_slices();
        for event in outcome.events {
            self.emit(event);
        }
        self.notify(changed);
    }

    /// Run a history-tracked sync operation. The pre-operation goals are
    /// recorded only when the operation actually changed them.
    fn tracked<T>(
        &mut self,
        op: impl FnOnce(&SyncEngine, &mut EntityStore) -> (T, SyncOutcome),
    ) -> T {
        let before = self.store.goals().to_vec();
        let (value, outcome) = op(&self.sync, &mut self.store);
        if outcome.goals_changed {
            self.history.save(before);
        }
        self.commit(outcome);
        value
    }

    fn untracked<T>(
        &mut self,
        op: impl FnOnce(&SyncEngine, &mut EntityStore) -> (T, SyncOutcome),
    ) -> T {
        let (value, outcome) = op(&self.sync, &mut self.store);
        self.commit(outcome);
        value
    }

    // ========================================================================
    // Goal operations
    // ========================================================================

    /// Create a goal with its initial step and paired task
    pub fn add_goal(&mut self, req: CreateGoalRequest) -> Goal {
        let goal = self.tracked(|sync, store| sync.add_goal(store, req));
        info!(goal_id = %goal.id, title = %goal.title, "Goal created");
        goal
    }

    /// Delete a goal, its steps and its tasks. Returns false if not found.
    pub fn delete_goal(&mut self, goal_id: &str) -> bool {
        self.tracked(|sync, store| {
            let outcome = sync.delete_goal(store, goal_id);
            (!outcome.is_noop(), outcome)
        })
    }

    pub fn toggle_goal(&mut self, goal_id: &str) -> bool {
        self.tracked(|sync, store| {
            let outcome = sync.toggle_goal(store, goal_id);
            (outcome.goals_changed, outcome)
        })
    }

    // ========================================================================
    // Step operations
    // ========================================================================

    /// Append a step to a goal. Returns `None` if the goal does not exist.
    pub fn add_step(&mut self, goal_id: &str, req: AddStepRequest) -> Option<Step> {
        self.tracked(|sync, store| sync.add_step(store, goal_id, req))
    }

    pub fn update_step(&mut self, goal_id: &str, req: UpdateStepRequest) -> bool {
        self.tracked(|sync, store| {
            let outcome = sync.update_step(store, goal_id, req);
            (!outcome.is_noop(), outcome)
        })
    }

    pub fn delete_step(&mut self, goal_id: &str, step_id: &str) -> bool {
        self.tracked(|sync, store| {
            let outcome = sync.delete_step(store, goal_id, step_id);
            (!outcome.is_noop(), outcome)
        })
    }

    /// Toggle step completion. Not recorded in history.
    pub fn toggle_step(&mut self, goal_id: &str, step_id: &str) -> bool {
        self.untracked(|sync, store| {
            let outcome = sync.toggle_step(store, goal_id, step_id);
            (!outcome.is_noop(), outcome)
        })
    }

    // ========================================================================
    // Task operations
    // ========================================================================

    /// Toggle task completion. Not recorded in history.
    pub fn toggle_task(&mut self, task_id: &str) -> bool {
        self.untracked(|sync, store| {
            let outcome = sync.toggle_task(store, task_id);
            (!outcome.is_noop(), outcome)
        })
    }

    /// Create a task that is not backed by a step. Not recorded in history.
    pub fn add_task(&mut self, req: CreateTaskRequest) -> Task {
        self.untracked(|sync, store| sync.add_task(store, req))
    }

    // ========================================================================
    // Clipboard
    // ========================================================================

    /// Copy a goal by id. Returns false if not found.
    pub fn copy_goal(&mut self, goal_id: &str) -> bool {
        match self.store.goal(goal_id) {
            Some(goal) => {
                self.clipboard.copy_goal(goal);
                true
            }
            None => false,
        }
    }

    /// Copy a step by id from whichever goal holds it
    pub fn copy_step(&mut self, step_id: &str) -> bool {
        match self.store.find_step(step_id) {
            Some((_, step)) => {
                self.clipboard.copy_step(step);
                true
            }
            None => false,
        }
    }

    /// Put an arbitrary value on the clipboard
    pub fn copy_item(&mut self, item: ClipboardItem) {
        match &item {
            ClipboardItem::Goal(goal) => self.clipboard.copy_goal(goal),
            ClipboardItem::Step(step) => self.clipboard.copy_step(step),
        }
    }

    /// Paste the copied goal. No-op unless the clipboard holds a goal.
    pub fn paste_goal(&mut self) -> Option<Goal> {
        let source = self.clipboard.goal()?.clone();
        let goal = self.tracked(|sync, store| sync.paste_goal(store, &source));
        info!(goal_id = %goal.id, source_id = %source.id, "Goal pasted");
        Some(goal)
    }

    /// Paste the copied step into `target_goal_id`. No-op unless the
    /// clipboard holds a step and the target exists.
    pub fn paste_step(&mut self, target_goal_id: &str) -> Option<Step> {
        let source = self.clipboard.step()?.clone();
        self.tracked(|sync, store| sync.paste_step(store, target_goal_id, &source))
    }

    // ========================================================================
    // History
    // ========================================================================

    pub fn undo(&mut self) -> bool {
        if !self.history.can_undo() {
            return false;
        }
        let current = self.store.goals().to_vec();
        match self.history.undo(current) {
            Some(previous) => {
                self.store.replace_goals(previous);
                self.after_time_travel("undo");
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        if !self.history.can_redo() {
            return false;
        }
        let current = self.store.goals().to_vec();
        match self.history.redo(current) {
            Some(next) => {
                self.store.replace_goals(next);
                self.after_time_travel("redo");
                true
            }
            None => false,
        }
    }

    /// Undo/redo restore goals only; tasks may drift from the restored steps
    fn after_time_travel(&self, operation: &'static str) {
        let report = self.store.consistency_report();
        if !report.is_consistent() {
            debug!(
                operation,
                unpaired_steps = report.unpaired_steps.len(),
                completion_mismatches = report.completion_mismatches.len(),
                "Goals and tasks out of sync after history restore"
            );
        }
        self.emit(
            ChangeEvent::new(EntityType::Planner, ChangeAction::Restored, "goals")
                .with_payload(serde_json::json!({ "operation": operation })),
        );
        self.notify(ChangedSlices::goals());
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        info!("History cleared");
    }

    // ========================================================================
    // Preferences
    // ========================================================================

    /// Select a zero-based month. Values outside 0..=11 are ignored.
    pub fn set_selected_month(&mut self, month: u32) -> bool {
        if month > 11 {
            return false;
        }
        if month == self.selected_month {
            return true;
        }
        self.selected_month = month;
        self.emit(
            ChangeEvent::new(EntityType::Preferences, ChangeAction::Updated, "month")
                .with_payload(serde_json::json!({ "selectedMonth": month })),
        );
        self.notify(ChangedSlices {
            month: true,
            ..ChangedSlices::NONE
        });
        true
    }

    /// Switch tabs. Returns false when `tab` is already current.
    pub fn set_current_tab(&mut self, tab: Tab) -> bool {
        if tab == self.current_tab {
            return false;
        }
        self.current_tab = tab;
        self.emit(
            ChangeEvent::new(EntityType::Preferences, ChangeAction::Updated, "tab")
                .with_payload(serde_json::json!({ "currentTab": tab })),
        );
        self.notify(ChangedSlices {
            tab: true,
            ..ChangedSlices::NONE
        });
        true
    }

    /// Replace the vision board. Returns false when nothing differs.
    pub fn update_vision(&mut self, vision: VisionBoardData) -> bool {
        if vision == self.vision {
            return false;
        }
        self.vision = vision;
        self.emit(ChangeEvent::new(
            EntityType::Vision,
            ChangeAction::Updated,
            "vision",
        ));
        self.notify(ChangedSlices {
            vision: true,
            ..ChangedSlices::NONE
        });
        true
    }

    // ========================================================================
    // Bulk operations
    // ========================================================================

    /// Append example goals and tasks around `today`. Not recorded in history.
    pub fn seed_sample_data(&mut self, today: NaiveDate) -> (usize, usize) {
        let sample = defaults::sample_data(today, self.sync.ids());
        let counts = (sample.goals.len(), sample.tasks.len());
        self.untracked(|sync, store| ((), sync.append(store, sample.goals, sample.tasks)));
        info!(goals = counts.0, tasks = counts.1, "Sample data added");
        counts
    }

    /// Replace all state with `snapshot`, dropping history and clipboard
    ///
    /// Listeners are not notified: the snapshot is assumed to come from
    /// storage already.
    pub fn load(&mut self, snapshot: PlannerSnapshot) {
        self.store = EntityStore::new(snapshot.goals, snapshot.tasks);
        self.vision = snapshot.vision;
        self.current_tab = snapshot.current_tab;
        self.selected_month = snapshot.selected_month;
        self.history.clear();
        self.clipboard.clear();
        self.emit(ChangeEvent::new(
            EntityType::Planner,
            ChangeAction::Restored,
            "state",
        ));
        info!(
            goals = self.store.goals().len(),
            tasks = self.store.tasks().len(),
            "Planner state loaded"
        );
    }

    /// Return everything to defaults and drop history and clipboard
    pub fn reset(&mut self) {
        self.load(PlannerSnapshot::default());
        for listener in &self.listeners {
            listener.on_reset();
        }
        self.notify(ChangedSlices::ALL);
        info!("Planner reset to defaults");
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Apply one command
    pub fn dispatch(&mut self, command: PlannerCommand) -> CommandOutcome {
        use CommandOutcome::{Applied, Created, Unchanged};

        let applied = |changed: bool| if changed { Applied } else { Unchanged };

        match command {
            PlannerCommand::AddGoal(req) => Created {
                entity_id: self.add_goal(req).id,
            },
            PlannerCommand::DeleteGoal { goal_id } => applied(self.delete_goal(&goal_id)),
            PlannerCommand::ToggleGoal { goal_id } => applied(self.toggle_goal(&goal_id)),
            PlannerCommand::AddStep { goal_id, step } => match self.add_step(&goal_id, step) {
                Some(step) => Created { entity_id: step.id },
                None => Unchanged,
            },
            PlannerCommand::UpdateStep { goal_id, step } => {
                applied(self.update_step(&goal_id, step))
            }
            PlannerCommand::DeleteStep { goal_id, step_id } => {
                applied(self.delete_step(&goal_id, &step_id))
            }
            PlannerCommand::ToggleStep { goal_id, step_id } => {
                applied(self.toggle_step(&goal_id, &step_id))
            }
            PlannerCommand::ToggleTask { task_id } => applied(self.toggle_task(&task_id)),
            PlannerCommand::AddTask(req) => Created {
                entity_id: self.add_task(req).id,
            },
            PlannerCommand::CopyGoal { goal_id } => applied(self.copy_goal(&goal_id)),
            PlannerCommand::CopyStep { step_id } => applied(self.copy_step(&step_id)),
            PlannerCommand::PasteGoal => match self.paste_goal() {
                Some(goal) => Created { entity_id: goal.id },
                None => Unchanged,
            },
            PlannerCommand::PasteStep { target_goal_id } => {
                match self.paste_step(&target_goal_id) {
                    Some(step) => Created { entity_id: step.id },
                    None => Unchanged,
                }
            }
            PlannerCommand::Undo => applied(self.undo()),
            PlannerCommand::Redo => applied(self.redo()),
            PlannerCommand::ClearHistory => {
                self.clear_history();
                Applied
            }
            PlannerCommand::SetMonth { month } => applied(self.set_selected_month(month)),
            PlannerCommand::SetTab { tab } => applied(self.set_current_tab(tab)),
            PlannerCommand::UpdateVision { vision } => applied(self.update_vision(vision)),
            PlannerCommand::SeedSampleData { today: day } => {
                self.seed_sample_data(day.unwrap_or_else(today));
                Applied
            }
        }
    }

    /// Apply commands in order, returning one outcome per command
    pub fn dispatch_all(
        &mut self,
        commands: impl IntoIterator<Item = PlannerCommand>,
    ) -> Vec<CommandOutcome> {
        commands.into_iter().map(|c| self.dispatch(c)).collect()
    }
}

/// A serialisable planner operation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum PlannerCommand {
    AddGoal(CreateGoalRequest),
    DeleteGoal { goal_id: String },
    ToggleGoal { goal_id: String },
    AddStep { goal_id: String, step: AddStepRequest },
    UpdateStep { goal_id: String, step: UpdateStepRequest },
    DeleteStep { goal_id: String, step_id: String },
    ToggleStep { goal_id: String, step_id: String },
    ToggleTask { task_id: String },
    AddTask(CreateTaskRequest),
    CopyGoal { goal_id: String },
    CopyStep { step_id: String },
    PasteGoal,
    PasteStep { target_goal_id: String },
    Undo,
    Redo,
    ClearHistory,
    SetMonth { month: u32 },
    SetTab { tab: Tab },
    UpdateVision { vision: VisionBoardData },
    SeedSampleData {
        #[serde(default)]
        today: Option<NaiveDate>,
    },
}

impl PlannerCommand {
    /// Parse a JSON array of commands
    pub fn parse_batch(json: &str) -> serde_json::Result<Vec<PlannerCommand>> {
        serde_json::from_str(json)
    }
}

/// Result of [`PlannerManager::dispatch`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// A goal, step or task was created with this id
    Created { entity_id: String },
    /// The command changed state
    Applied,
    /// The command was a no-op
    Unchanged,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::test_helpers::*;

    // ========================================================================
    // History policy
    // ========================================================================

    #[test]
    fn test_structural_ops_are_undoable() {
        let mut manager = test_manager();
        let goal = manager.add_goal(test_goal_request("A"));
        manager.add_step(&goal.id, test_step_request("B", false));
        assert_eq!(manager.history().undo_depth(), 2);

        assert!(manager.undo());
        assert_eq!(manager.store().goal(&goal.id).unwrap().steps.len(), 1);
        assert!(manager.undo());
        assert!(manager.goals().is_empty());
        assert!(!manager.undo());
    }

    #[test]
    fn test_toggles_are_not_undoable() {
        let mut manager = test_manager();
        let goal = manager.add_goal(test_goal_request("A"));
        let step_id = goal.steps[0].id.clone();
        let depth = manager.history().undo_depth();

        manager.toggle_step(&goal.id, &step_id);
        manager.toggle_task(&step_id);
        manager.add_task(test_task_request("Free"));

        assert_eq!(manager.history().undo_depth(), depth);
    }

    #[test]
    fn test_noop_does_not_clear_redo() {
        let mut manager = test_manager();
        manager.add_goal(test_goal_request("A"));
        manager.undo();
        assert!(manager.can_redo());

        assert!(!manager.delete_goal("g-missing"));
        assert!(manager.add_step("g-missing", test_step_request("x", false)).is_none());
        assert!(manager.can_redo());
    }

    #[test]
    fn test_undo_redo_round_trip_goals_only() {
        let mut manager = test_manager();
        let goal = manager.add_goal(test_goal_request("A"));
        let goals_after_add = manager.goals().to_vec();
        let tasks_after_add = manager.tasks().to_vec();

        manager.undo();
        assert!(manager.goals().is_empty());
        // Tasks are outside history
        assert_eq!(manager.tasks(), tasks_after_add.as_slice());

        manager.redo();
        assert_eq!(manager.goals(), goals_after_add.as_slice());
        assert!(manager.store().goal(&goal.id).is_some());
        assert!(!manager.redo());
    }

    #[test]
    fn test_history_limit_applies() {
        let mut manager = test_manager().with_history_limit(Some(1));
        manager.add_goal(test_goal_request("A"));
        manager.add_goal(test_goal_request("B"));
        assert_eq!(manager.history().undo_depth(), 1);
        manager.undo();
        assert_eq!(manager.goals().len(), 1);
        assert!(!manager.can_undo());
    }

    // ========================================================================
    // Clipboard
    // ========================================================================

    #[test]
    fn test_paste_goal_requires_goal_on_clipboard() {
        let mut manager = test_manager();
        let goal = manager.add_goal(test_goal_request("A"));
        assert!(manager.paste_goal().is_none());

        manager.copy_step(&goal.steps[0].id);
        let depth = manager.history().undo_depth();
        assert!(manager.paste_goal().is_none());
        assert_eq!(manager.history().undo_depth(), depth);

        assert!(manager.copy_goal(&goal.id));
        let copy = manager.paste_goal().unwrap();
        assert_eq!(copy.title, "A (Copy)");
        assert_eq!(manager.history().undo_depth(), depth + 1);
        assert!(manager.consistency_report().is_consistent());
    }

    #[test]
    fn test_paste_is_independent_of_later_source_edits() {
        let mut manager = test_manager();
        let goal = manager.add_goal(test_goal_request("A"));
        manager.copy_goal(&goal.id);
        manager.update_step(
            &goal.id,
            UpdateStepRequest {
                step_id: goal.steps[0].id.clone(),
                description: Some("Changed".to_string()),
                ..Default::default()
            },
        );

        let copy = manager.paste_goal().unwrap();
        assert_eq!(copy.steps[0].description, "A");
    }

    #[test]
    fn test_paste_step_into_missing_goal_saves_no_history() {
        let mut manager = test_manager();
        let goal = manager.add_goal(test_goal_request("A"));
        manager.copy_step(&goal.steps[0].id);
        let depth = manager.history().undo_depth();

        assert!(manager.paste_step("g-missing").is_none());
        assert_eq!(manager.history().undo_depth(), depth);
    }

    #[test]
    fn test_paste_goal_with_empty_clipboard_is_noop() {
        let mut manager = test_manager();
        manager.add_goal(test_goal_request("A"));
        let before = manager.snapshot();
        let depth = manager.history().undo_depth();

        assert!(manager.paste_goal().is_none());
        assert_eq!(manager.snapshot(), before);
        assert_eq!(manager.history().undo_depth(), depth);
    }

    #[test]
    fn test_paste_step_with_empty_clipboard_is_noop() {
        let mut manager = test_manager();
        let goal = manager.add_goal(test_goal_request("A"));
        let before = manager.snapshot();
        let depth = manager.history().undo_depth();

        assert!(manager.paste_step(&goal.id).is_none());
        assert_eq!(manager.snapshot(), before);
        assert_eq!(manager.history().undo_depth(), depth);
    }

    #[test]
    fn test_paste_step_with_goal_on_clipboard_is_noop() {
        let mut manager = test_manager();
        let goal = manager.add_goal(test_goal_request("A"));
        assert!(manager.copy_goal(&goal.id));
        let before = manager.snapshot();
        let depth = manager.history().undo_depth();

        assert!(manager.paste_step(&goal.id).is_none());
        assert_eq!(manager.snapshot(), before);
        assert_eq!(manager.history().undo_depth(), depth);
        assert!(matches!(manager.clipboard(), Some(ClipboardItem::Goal(_))));
    }

    // ========================================================================
    // Preferences, reset, events
    // ========================================================================

    #[test]
    fn test_set_month_validates_range() {
        let mut manager = test_manager();
        assert!(manager.set_selected_month(0));
        assert_eq!(manager.selected_month(), 0);
        assert!(!manager.set_selected_month(12));
        assert_eq!(manager.selected_month(), 0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut manager = test_manager();
        let goal = manager.add_goal(test_goal_request("A"));
        manager.copy_goal(&goal.id);
        manager.set_current_tab(Tab::Tasks);
        manager.seed_sample_data(test_date(2025, 3, 10));

        manager.reset();

        assert!(manager.goals().is_empty());
        assert!(manager.tasks().is_empty());
        assert_eq!(manager.current_tab(), Tab::Dashboard);
        assert_eq!(manager.selected_month(), current_month());
        assert_eq!(manager.vision(), &VisionBoardData::default());
        assert!(!manager.can_undo() && !manager.can_redo());
        assert!(manager.clipboard().is_none());
    }

    #[test]
    fn test_listener_sees_changed_slices() {
        let listener = Arc::new(RecordingListener::default());
        let mut manager = test_manager();
        manager.add_listener(listener.clone());

        let goal = manager.add_goal(test_goal_request("A"));
        manager.toggle_goal(&goal.id);
        manager.toggle_goal("g-missing");
        manager.set_current_tab(Tab::Action);

        let commits = listener.commits();
        assert_eq!(commits.len(), 3);
        assert!(commits[0].goals && commits[0].tasks);
        assert!(commits[1].goals && !commits[1].tasks);
        assert!(commits[2].tab && !commits[2].goals);
    }

    #[test]
    fn test_events_emitted_to_bus() {
        let bus = Arc::new(EventBus::default());
        let mut rx = bus.subscribe();
        let mut manager = test_manager().with_event_emitter(bus.clone());

        let goal = manager.add_goal(test_goal_request("A"));
        let first = rx.try_next().unwrap();
        assert_eq!(first.entity_type, EntityType::Goal);
        assert_eq!(first.entity_id, goal.id);

        manager.undo();
        let last = rx.drain().pop().unwrap();
        assert_eq!(last.entity_type, EntityType::Planner);
        assert_eq!(last.action, ChangeAction::Restored);
    }

    // ========================================================================
    // Commands
    // ========================================================================

    #[test]
    fn test_command_json_shape() {
        let json = r#"[
            {"op": "add_goal", "areaId": "1", "title": "Learn Go", "deadline": "2025-06-30"},
            {"op": "copy_goal", "goalId": "g-2"},
            {"op": "paste_goal"},
            {"op": "undo"},
            {"op": "set_month", "month": 4}
        ]"#;
        let commands = PlannerCommand::parse_batch(json).unwrap();
        assert_eq!(commands.len(), 5);
        assert!(matches!(commands[0], PlannerCommand::AddGoal(_)));
        assert!(matches!(&commands[1], PlannerCommand::CopyGoal { goal_id } if goal_id == "g-2"));
    }

    #[test]
    fn test_dispatch_batch() {
        let mut manager = test_manager();
        let commands = vec![
            PlannerCommand::AddGoal(test_goal_request("Learn Go")),
            PlannerCommand::CopyGoal {
                goal_id: "g-2".to_string(),
            },
            PlannerCommand::PasteGoal,
            PlannerCommand::Undo,
            PlannerCommand::Redo,
            PlannerCommand::Redo,
        ];

        let outcomes = manager.dispatch_all(commands);

        // Sequential ids: step s-1, goal g-2
        assert_eq!(
            outcomes[0],
            CommandOutcome::Created {
                entity_id: "g-2".to_string()
            }
        );
        assert_eq!(outcomes[1], CommandOutcome::Applied);
        assert!(matches!(outcomes[2], CommandOutcome::Created { .. }));
        assert_eq!(outcomes[3], CommandOutcome::Applied);
        assert_eq!(outcomes[4], CommandOutcome::Applied);
        assert_eq!(outcomes[5], CommandOutcome::Unchanged);
        assert_eq!(manager.goals().len(), 2);
    }

    #[test]
    fn test_dispatch_reports_unchanged_preferences() {
        let mut manager = test_manager();
        let vision = manager.vision().clone();

        let outcomes = manager.dispatch_all(vec![
            PlannerCommand::SetTab { tab: Tab::Vision },
            PlannerCommand::SetTab { tab: Tab::Vision },
            PlannerCommand::UpdateVision {
                vision: vision.clone(),
            },
            PlannerCommand::UpdateVision {
                vision: VisionBoardData {
                    vision_statement: "Calm and strong".to_string(),
                    ..vision
                },
            },
        ]);

        assert_eq!(
            outcomes,
            vec![
                CommandOutcome::Applied,
                CommandOutcome::Unchanged,
                CommandOutcome::Unchanged,
                CommandOutcome::Applied,
            ]
        );
        assert_eq!(manager.vision().vision_statement, "Calm and strong");
    }
}
