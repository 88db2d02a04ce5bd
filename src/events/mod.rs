//! Change event system
//!
//! This module provides:
//! - `ChangeEvent`: typed events emitted after every committed mutation
//! - `EventEmitter`: sink trait the planner manager emits into
//! - `EventBus`: broadcast channel for distributing events to subscribers

mod bus;
mod types;

pub use bus::EventBus;
pub use types::{ChangeAction, ChangeEvent, EntityType, EventEmitter, RelatedEntity};
