//! Persistence module
//!
//! Planner state lives in an opaque key-value store under stable keys.
//! Loading never fails: every slice that is missing or invalid falls back to
//! its default. Backups are whole-store JSON snapshots.

pub mod backup;
pub mod keys;
pub mod kv;
pub mod state;

pub use backup::{export, BackupDocument, ImportError, ImportPlan, ImportSummary};
pub use kv::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use state::{clear_all, load_state, planner_keys, save_slices, StatePersister};
