//! Single-slot clipboard for goals and steps

use super::models::{Goal, Step};
use serde::{Deserialize, Serialize};

/// A copied value. Copies are detached from the store, so later edits to the
/// source do not affect what gets pasted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ClipboardItem {
    Goal(Goal),
    Step(Step),
}

/// Holds at most one item; every copy replaces the previous one
#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    item: Option<ClipboardItem>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn copy_goal(&mut self, goal: &Goal) {
        self.item = Some(ClipboardItem::Goal(goal.clone()));
    }

    pub fn copy_step(&mut self, step: &Step) {
        self.item = Some(ClipboardItem::Step(step.clone()));
    }

    pub fn item(&self) -> Option<&ClipboardItem> {
        self.item.as_ref()
    }

    /// The copied goal, if the clipboard holds one
    pub fn goal(&self) -> Option<&Goal> {
        match &self.item {
            Some(ClipboardItem::Goal(goal)) => Some(goal),
            _ => None,
        }
    }

    /// The copied step, if the clipboard holds one
    pub fn step(&self) -> Option<&Step> {
        match &self.item {
            Some(ClipboardItem::Step(step)) => Some(step),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.item.is_none()
    }

    pub fn clear(&mut self) {
        self.item = None;
    }
}
