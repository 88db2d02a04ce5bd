//! Loading and saving planner state through a [`KeyValueStore`]

use super::keys::*;
use super::kv::{KeyValueStore, StorageError};
use crate::planner::manager::{current_month, PlannerSnapshot};
use crate::planner::models::{Goal, Tab, Task, VisionBoardData};
use crate::planner::store::{ChangedSlices, StateListener, StateView};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Read a value, treating backend errors like a missing key
fn read(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value.filter(|v| !v.is_empty()),
        Err(e) => {
            warn!(key, error = %e, "Failed to read stored value, using default");
            None
        }
    }
}

fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = read(store, key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "Stored value is not valid, using default");
            None
        }
    }
}

/// The stored tab, as plain text or as a JSON string (restored backups)
fn load_tab(store: &dyn KeyValueStore) -> Tab {
    let Some(raw) = read(store, TAB_KEY) else {
        return Tab::default();
    };
    let text = serde_json::from_str::<String>(&raw).unwrap_or_else(|_| raw.clone());
    text.parse().unwrap_or_else(|e: String| {
        warn!(key = TAB_KEY, error = %e, "Stored tab is not valid, using default");
        Tab::default()
    })
}

fn load_month(store: &dyn KeyValueStore) -> u32 {
    read(store, MONTH_KEY)
        .and_then(|raw| raw.trim().trim_matches('"').parse::<u32>().ok())
        .filter(|m| *m <= 11)
        .unwrap_or_else(current_month)
}

/// Load every slice, falling back to its default when absent or invalid
pub fn load_state(store: &dyn KeyValueStore) -> PlannerSnapshot {
    let snapshot = PlannerSnapshot {
        goals: load_json::<Vec<Goal>>(store, GOALS_KEY).unwrap_or_default(),
        tasks: load_json::<Vec<Task>>(store, TASKS_KEY).unwrap_or_default(),
        vision: load_json::<VisionBoardData>(store, VISION_KEY).unwrap_or_default(),
        current_tab: load_tab(store),
        selected_month: load_month(store),
    };
    debug!(
        goals = snapshot.goals.len(),
        tasks = snapshot.tasks.len(),
        tab = %snapshot.current_tab,
        month = snapshot.selected_month,
        "State loaded"
    );
    snapshot
}

/// Write the slices flagged in `changed`
pub fn save_slices(
    store: &dyn KeyValueStore,
    state: StateView<'_>,
    changed: ChangedSlices,
) -> Result<(), StorageError> {
    fn to_json<T: serde::Serialize>(value: &T) -> String {
        // Plain data types with derived Serialize; serialisation cannot fail
        serde_json::to_string(value).unwrap_or_default()
    }

    if changed.goals {
        store.set(GOALS_KEY, &to_json(&state.entities.goals()))?;
    }
    if changed.tasks {
        store.set(TASKS_KEY, &to_json(&state.entities.tasks()))?;
    }
    if changed.vision {
        store.set(VISION_KEY, &to_json(state.vision))?;
    }
    if changed.tab {
        store.set(TAB_KEY, &state.current_tab.to_string())?;
    }
    if changed.month {
        store.set(MONTH_KEY, &state.selected_month.to_string())?;
    }
    Ok(())
}

/// Stored keys in the planner namespace, sorted
pub fn planner_keys(store: &dyn KeyValueStore) -> Result<Vec<String>, StorageError> {
    Ok(store
        .keys()?
        .into_iter()
        .filter(|k| is_planner_key(k))
        .collect())
}

/// Remove every planner key, auxiliary and restored extra ones included
pub fn clear_all(store: &dyn KeyValueStore) -> Result<(), StorageError> {
    let keys = planner_keys(store)?;
    for key in &keys {
        store.remove(key)?;
    }
    debug!(removed = keys.len(), "Planner keys cleared");
    Ok(())
}

/// Writes changed slices to storage after every commit
pub struct StatePersister {
    store: Arc<dyn KeyValueStore>,
}

impl StatePersister {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl StateListener for StatePersister {
    fn on_commit(&self, state: StateView<'_>, changed: ChangedSlices) {
        if let Err(e) = save_slices(self.store.as_ref(), state, changed) {
            error!(error = %e, "Failed to persist planner state");
        }
    }

    fn on_reset(&self) {
        if let Err(e) = clear_all(self.store.as_ref()) {
            error!(error = %e, "Failed to clear stored planner state");
        }
    }
}
