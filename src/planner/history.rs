//! Linear undo/redo over snapshots of the goal collection

use super::models::Goal;
use std::collections::VecDeque;
use tracing::debug;

/// Undo/redo stacks of whole goal-collection snapshots
///
/// `past` is ordered oldest first, `future` nearest first. Tasks are not
/// part of a snapshot.
#[derive(Debug, Clone, Default)]
pub struct HistoryManager {
    past: VecDeque<Vec<Goal>>,
    future: VecDeque<Vec<Goal>>,
    limit: Option<usize>,
}

impl HistoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `limit` undo entries, dropping the oldest. `None` or zero
    /// means unbounded.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            limit: limit.filter(|&l| l > 0),
            ..Self::default()
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Record `current` as the state to return to, clearing redo
    pub fn save(&mut self, current: Vec<Goal>) {
        self.past.push_back(current);
        self.future.clear();
        if let Some(limit) = self.limit {
            while self.past.len() > limit {
                self.past.pop_front();
            }
        }
        debug!(undo_depth = self.past.len(), "History saved");
    }

    /// Step back. Returns the goals to restore, or `None` when there is
    /// nothing to undo. `current` moves onto the redo stack.
    pub fn undo(&mut self, current: Vec<Goal>) -> Option<Vec<Goal>> {
        let previous = self.past.pop_back()?;
        self.future.push_front(current);
        Some(previous)
    }

    /// Step forward. Returns the goals to restore, or `None` when there is
    /// nothing to redo. `current` moves onto the undo stack.
    pub fn redo(&mut self, current: Vec<Goal>) -> Option<Vec<Goal>> {
        let next = self.future.pop_front()?;
        self.past.push_back(current);
        Some(next)
    }

    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.past.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.future.len()
    }
}
