//! Planner module
//!
//! Goals own ordered steps; every step is mirrored by exactly one task with
//! the same id. All mutation goes through [`PlannerManager`], which keeps the
//! two collections paired, records undo history for structural changes and
//! supports copy/paste of goals and steps.

pub mod clipboard;
pub mod dashboard;
pub mod defaults;
pub mod history;
pub mod ids;
pub mod manager;
pub mod models;
pub mod store;
pub mod sync;

pub use clipboard::{Clipboard, ClipboardItem};
pub use history::HistoryManager;
pub use ids::{IdGenerator, IdKind, SequentialIdGenerator, UuidIdGenerator};
pub use manager::{CommandOutcome, PlannerCommand, PlannerManager, PlannerSnapshot};
pub use models::*;
pub use store::{ChangedSlices, ConsistencyReport, EntityStore, StateListener, StateView};
pub use sync::{SyncEngine, SyncOutcome};
