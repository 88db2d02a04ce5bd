//! Id generation for goals, steps and tasks
//!
//! A step id doubles as the id of its paired task, so two entities created in
//! the same tick must never receive the same id.

use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Kind of entity an id is minted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    Goal,
    Step,
    Task,
}

impl IdKind {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Goal => "g",
            Self::Step => "s",
            Self::Task => "t",
        }
    }
}

/// Source of process-unique entity ids
pub trait IdGenerator: Send + Sync {
    fn next_id(&self, kind: IdKind) -> String;
}

/// Time-ordered UUID v7 ids, e.g. `s-01890a5d-ac96-774b-bcce-b302099a8057`
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self, kind: IdKind) -> String {
        format!("{}-{}", kind.prefix(), Uuid::now_v7())
    }
}

/// Monotonic counter ids, e.g. `g-1`, `s-2`. Deterministic, used in tests and
/// scripted runs.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self, kind: IdKind) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", kind.prefix(), n)
    }
}
