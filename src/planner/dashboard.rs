//! Read-only aggregates over goals and tasks
//!
//! Months are zero-based (0 = January) to match the stored preference.
//! Percentages are rounded half-up and are 0 for empty sets.

use super::models::{Frequency, Goal, Step, Task, TaskStatus};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// `part / total` as a rounded percentage, 0 when `total` is 0
pub fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part * 200 + total) / (total * 2)) as u32
}

/// Share of a goal's steps that are completed
pub fn goal_progress(goal: &Goal) -> u32 {
    percent(goal.completed_steps(), goal.steps.len())
}

fn in_month(date: NaiveDate, month0: u32, year: Option<i32>) -> bool {
    date.month0() == month0 && year.map_or(true, |y| date.year() == y)
}

// ============================================================================
// Task statistics
// ============================================================================

/// Counts for tasks due in one month
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonthStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub scheduled: usize,
    pub percent: u32,
}

/// Statistics for tasks whose deadline falls in `month0`, optionally
/// restricted to `year`
pub fn month_stats(tasks: &[Task], month0: u32, year: Option<i32>) -> MonthStats {
    let mut stats = MonthStats::default();
    for task in tasks.iter().filter(|t| in_month(t.deadline, month0, year)) {
        stats.total += 1;
        match task.status {
            TaskStatus::Completed => stats.completed += 1,
            TaskStatus::Pending => stats.pending += 1,
            TaskStatus::Scheduled => stats.scheduled += 1,
            TaskStatus::InProgress | TaskStatus::Missed => {}
        }
    }
    stats.percent = percent(stats.completed, stats.total);
    stats
}

/// Total and completed tasks for one month of the overview
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonthSummary {
    pub month: u32,
    pub total: usize,
    pub completed: usize,
}

/// Task counts for each of the twelve months, any year
pub fn yearly_overview(tasks: &[Task]) -> Vec<MonthSummary> {
    let mut months: Vec<MonthSummary> = (0..12)
        .map(|month| MonthSummary {
            month,
            ..MonthSummary::default()
        })
        .collect();
    for task in tasks {
        let summary = &mut months[task.deadline.month0() as usize];
        summary.total += 1;
        if task.is_completed() {
            summary.completed += 1;
        }
    }
    months
}

// ============================================================================
// Grouping
// ============================================================================

/// Tasks of one goal, in the order they were first seen
#[derive(Debug, Clone, Serialize)]
pub struct TaskGroup<'a> {
    pub goal_id: String,
    pub tasks: Vec<&'a Task>,
}

impl TaskGroup<'_> {
    pub fn progress(&self) -> u32 {
        percent(
            self.tasks.iter().filter(|t| t.is_completed()).count(),
            self.tasks.len(),
        )
    }
}

/// Tasks split into goal groups and standalone tasks
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupedTasks<'a> {
    pub groups: Vec<TaskGroup<'a>>,
    pub standalone: Vec<&'a Task>,
}

/// Group tasks by goal id, keeping first-seen order of goals and tasks
pub fn group_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> GroupedTasks<'a> {
    let mut grouped = GroupedTasks::default();
    for task in tasks {
        if task.is_standalone() {
            grouped.standalone.push(task);
            continue;
        }
        match grouped.groups.iter_mut().find(|g| g.goal_id == task.goal_id) {
            Some(group) => group.tasks.push(task),
            None => grouped.groups.push(TaskGroup {
                goal_id: task.goal_id.clone(),
                tasks: vec![task],
            }),
        }
    }
    grouped
}

/// Tasks filtered to one month (and year when given), optionally one area
pub fn tasks_in_month<'a>(
    tasks: &'a [Task],
    month0: u32,
    year: Option<i32>,
    area_id: Option<&'a str>,
) -> impl Iterator<Item = &'a Task> + 'a {
    tasks.iter().filter(move |t| {
        in_month(t.deadline, month0, year) && area_id.map_or(true, |a| t.area_id == a)
    })
}

// ============================================================================
// Routines
// ============================================================================

/// Completion of one routine bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoutineSummary {
    pub total: usize,
    pub completed: usize,
    pub percent: u32,
}

impl RoutineSummary {
    fn add(&mut self, task: &Task) {
        self.total += 1;
        if task.is_completed() {
            self.completed += 1;
        }
    }

    fn finish(mut self) -> Self {
        self.percent = percent(self.completed, self.total);
        self
    }
}

/// Tasks bucketed by frequency. Monthly and one-time tasks share a bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RoutineBreakdown {
    pub daily: RoutineSummary,
    pub weekly: RoutineSummary,
    pub monthly_and_one_time: RoutineSummary,
}

pub fn routine_breakdown<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> RoutineBreakdown {
    let mut breakdown = RoutineBreakdown::default();
    for task in tasks {
        match task.frequency {
            Frequency::Daily => breakdown.daily.add(task),
            Frequency::Weekly => breakdown.weekly.add(task),
            Frequency::Monthly | Frequency::OneTime => breakdown.monthly_and_one_time.add(task),
        }
    }
    RoutineBreakdown {
        daily: breakdown.daily.finish(),
        weekly: breakdown.weekly.finish(),
        monthly_and_one_time: breakdown.monthly_and_one_time.finish(),
    }
}

// ============================================================================
// Action plan
// ============================================================================

/// Goals active in a month, each with only that month's steps
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActionPlanProgress {
    pub goals: Vec<Goal>,
    pub total_steps: usize,
    pub completed_steps: usize,
    pub percent: u32,
}

/// A goal is active in `month0` when its deadline or any step deadline falls
/// in that month. Only the month's steps are counted.
pub fn action_plan(goals: &[Goal], month0: u32) -> ActionPlanProgress {
    let mut progress = ActionPlanProgress::default();
    for goal in goals {
        let steps: Vec<Step> = goal
            .steps
            .iter()
            .filter(|s| s.deadline.month0() == month0)
            .cloned()
            .collect();
        if goal.deadline.month0() != month0 && steps.is_empty() {
            continue;
        }
        progress.total_steps += steps.len();
        progress.completed_steps += steps.iter().filter(|s| s.is_completed).count();
        progress.goals.push(Goal {
            steps,
            ..goal.clone()
        });
    }
    progress.percent = percent(progress.completed_steps, progress.total_steps);
    progress
}

/// Achieved and total goal counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GoalSummary {
    pub achieved: usize,
    pub total: usize,
}

pub fn goal_summary(goals: &[Goal]) -> GoalSummary {
    GoalSummary {
        achieved: goals.iter().filter(|g| g.is_completed).count(),
        total: goals.len(),
    }
}

// ============================================================================
// Days and urgency
// ============================================================================

/// Tasks due exactly on `day`
pub fn tasks_due_on(tasks: &[Task], day: NaiveDate) -> Vec<&Task> {
    tasks.iter().filter(|t| t.deadline == day).collect()
}

/// True when `day` has at least one task and all of them are completed
pub fn is_day_completed(tasks: &[Task], day: NaiveDate) -> bool {
    let due = tasks_due_on(tasks, day);
    !due.is_empty() && due.iter().all(|t| t.is_completed())
}

/// Days ahead within which an open step counts as due soon
pub const DUE_SOON_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepUrgency {
    Done,
    Overdue,
    DueSoon,
    OnTrack,
}

pub fn step_urgency(step: &Step, today: NaiveDate) -> StepUrgency {
    if step.is_completed {
        return StepUrgency::Done;
    }
    let days_left = (step.deadline - today).num_days();
    if days_left < 0 {
        StepUrgency::Overdue
    } else if days_left <= DUE_SOON_DAYS {
        StepUrgency::DueSoon
    } else {
        StepUrgency::OnTrack
    }
}
