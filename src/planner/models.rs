//! Planner models and DTOs
//!
//! Field names serialize in camelCase and enum values keep their display
//! spelling ("In Progress", "One-time") so that stored state and backup
//! documents written by earlier versions load unchanged.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Core Enums
// ============================================================================

/// Status of a task
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Scheduled,
    Missed,
}

impl TaskStatus {
    /// The status a completion toggle moves to: Completed ↔ Pending
    pub fn toggled(self) -> Self {
        if self == Self::Completed {
            Self::Pending
        } else {
            Self::Completed
        }
    }

    /// Status of the task projected from a step
    pub fn from_completion(is_completed: bool) -> Self {
        if is_completed {
            Self::Completed
        } else {
            Self::Pending
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "Pending"),
            Self::InProgress => write!(f, "In Progress"),
            Self::Completed => write!(f, "Completed"),
            Self::Scheduled => write!(f, "Scheduled"),
            Self::Missed => write!(f, "Missed"),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['_', '-'], " ").as_str() {
            "pending" => Ok(Self::Pending),
            "in progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "scheduled" => Ok(Self::Scheduled),
            "missed" => Ok(Self::Missed),
            _ => Err(format!("Unknown task status: {}", s)),
        }
    }
}

/// Priority of a step
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(format!("Unknown priority: {}", s)),
        }
    }
}

/// How often a goal or task recurs
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    #[default]
    #[serde(rename = "One-time")]
    OneTime,
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "Daily"),
            Self::Weekly => write!(f, "Weekly"),
            Self::Monthly => write!(f, "Monthly"),
            Self::OneTime => write!(f, "One-time"),
        }
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "one-time" | "onetime" | "once" => Ok(Self::OneTime),
            _ => Err(format!("Unknown frequency: {}", s)),
        }
    }
}

/// Whether a task was done on time
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Discipline {
    #[serde(rename = "On-time")]
    OnTime,
    Late,
    #[default]
    Pending,
}

/// Top-level view of the application shell
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    Setup,
    #[default]
    Dashboard,
    Vision,
    Action,
    Tasks,
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Setup => write!(f, "setup"),
            Self::Dashboard => write!(f, "dashboard"),
            Self::Vision => write!(f, "vision"),
            Self::Action => write!(f, "action"),
            Self::Tasks => write!(f, "tasks"),
        }
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "setup" => Ok(Self::Setup),
            "dashboard" => Ok(Self::Dashboard),
            "vision" => Ok(Self::Vision),
            "action" => Ok(Self::Action),
            "tasks" => Ok(Self::Tasks),
            _ => Err(format!("Unknown tab: {}", s)),
        }
    }
}

// ============================================================================
// Entities
// ============================================================================

/// A life area (Career, Health, ...). Static for the lifetime of the app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    pub id: String,
    pub name: String,
    pub icon: String,
    #[serde(default)]
    pub vision: String,
    #[serde(default)]
    pub current_status: String,
    /// 1-10, used by the wheel-of-life chart
    pub rating: u8,
    pub color: String,
}

/// An action item embedded in a goal. Its id is shared with exactly one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: String,
    pub description: String,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub is_completed: bool,
}

/// A strategic objective owning an ordered list of steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub area_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub why_important: String,
    #[serde(default)]
    pub success_criteria: String,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Goal {
    /// Find a step of this goal by id
    pub fn step(&self, step_id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    /// Number of completed steps
    pub fn completed_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.is_completed).count()
    }
}

/// A flat to-do item: either the projection of a step or a standalone task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    /// Empty for standalone tasks
    #[serde(default)]
    pub goal_id: String,
    pub area_id: String,
    pub title: String,
    #[serde(default)]
    pub status: TaskStatus,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<NaiveDate>,
    #[serde(default)]
    pub discipline: Discipline,
}

impl Task {
    /// Build the task that mirrors `step` inside `goal`
    pub fn for_step(goal: &Goal, step: &Step) -> Self {
        Self {
            id: step.id.clone(),
            goal_id: goal.id.clone(),
            area_id: goal.area_id.clone(),
            title: step.description.clone(),
            status: TaskStatus::from_completion(step.is_completed),
            deadline: step.deadline,
            frequency: goal.frequency,
            completed_date: None,
            discipline: Discipline::Pending,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Standalone tasks are not attached to any goal
    pub fn is_standalone(&self) -> bool {
        self.goal_id.is_empty()
    }
}

/// Custom colours picked by the user for the "custom" theme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomColors {
    pub primary: String,
    pub text: String,
}

/// Vision board header data. Missing fields are filled from defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VisionBoardData {
    pub year: String,
    pub theme: String,
    pub vision_statement: String,
    pub images: Vec<String>,
    pub theme_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_colors: Option<CustomColors>,
}

// ============================================================================
// Requests
// ============================================================================

/// Request to create a new goal. Steps are not accepted: the first step is
/// generated from the goal itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalRequest {
    pub area_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub why_important: Option<String>,
    #[serde(default)]
    pub success_criteria: Option<String>,
    #[serde(default)]
    pub frequency: Option<Frequency>,
}

/// Request to add a step to a goal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStepRequest {
    pub description: String,
    pub deadline: NaiveDate,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub is_completed: bool,
}

/// Request to update a step. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStepRequest {
    pub step_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub is_completed: Option<bool>,
}

/// Request to create a task directly (not derived from a step)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub area_id: String,
    pub title: String,
    pub deadline: NaiveDate,
    /// Optional goal this task is filed under
    #[serde(default)]
    pub goal_id: Option<String>,
    #[serde(default)]
    pub frequency: Option<Frequency>,
}
