//! Backup export and import
//!
//! Export snapshots every planner key into one JSON document. Import accepts
//! that nested document as well as the older flat shape with `goals`,
//! `tasks` and `visionData`/`vision` at the top level.

use super::keys::*;
use super::kv::{KeyValueStore, StorageError};
use super::state::{clear_all, planner_keys};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

pub const BACKUP_VERSION: &str = "2.0";
pub const BACKUP_APP_NAME: &str = "Life Planner";
pub const BACKUP_DESCRIPTION: &str = "Full System Snapshot";

/// Error returned when a backup cannot be imported
///
/// Parse errors leave storage untouched. A `Storage` error means the backend
/// failed part-way through [`ImportPlan::apply`].
#[derive(Error, Debug)]
pub enum ImportError {
    /// The file is not JSON.
    #[error("backup is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    /// Neither vision data, goals nor tasks were found.
    #[error("backup contains no vision board, goals or tasks")]
    NoCoreData,
    /// Writing the restored values failed.
    #[error("failed to write restored data: {0}")]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupMeta {
    pub version: String,
    pub timestamp: String,
    pub app_name: String,
    pub description: String,
}

/// Full snapshot of stored planner values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupDocument {
    pub meta: BackupMeta,
    /// Stored values keyed by storage key; JSON values are embedded parsed
    pub data: Map<String, Value>,
}

/// Collect every stored planner key into a backup document
///
/// Values that parse as JSON are embedded as JSON, anything else as a string.
pub fn export(store: &dyn KeyValueStore) -> Result<BackupDocument, StorageError> {
    let mut data = Map::new();
    for key in planner_keys(store)? {
        let Some(raw) = store.get(&key)? else {
            continue;
        };
        if raw.is_empty() {
            continue;
        }
        let value = serde_json::from_str(&raw).unwrap_or(Value::String(raw));
        data.insert(key, value);
    }

    info!(keys = data.len(), "Backup exported");
    Ok(BackupDocument {
        meta: BackupMeta {
            version: BACKUP_VERSION.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            app_name: BACKUP_APP_NAME.to_string(),
            description: BACKUP_DESCRIPTION.to_string(),
        },
        data,
    })
}

/// Which layout a backup file uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackupFormat {
    /// `{"meta": ..., "data": {"aesthetic_planner_goals": ...}}`
    Nested,
    /// `{"goals": [...], "tasks": [...], "visionData": {...}}`
    Flat,
}

/// What an import would restore, for confirmation prompts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub format: BackupFormat,
    pub has_vision: bool,
    pub goal_count: usize,
    pub task_count: usize,
    pub extra_keys: Vec<String>,
}

/// JavaScript-style truthiness, which decides whether a slice was provided
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn non_empty_array_len(value: Option<&Value>) -> usize {
    value.and_then(Value::as_array).map_or(0, Vec::len)
}

/// Extra keys a nested backup may restore. Anything else is dropped at parse
/// time so that applying a plan cannot fail on a key.
fn is_restorable_key(key: &str) -> bool {
    if !is_planner_key(key) {
        warn!(key, "Skipping foreign key in backup");
        return false;
    }
    if !is_storable_key(key) {
        warn!(key, "Skipping backup key that cannot be stored");
        return false;
    }
    true
}

/// A parsed backup, validated to contain core data
#[derive(Debug, Clone)]
pub struct ImportPlan {
    format: BackupFormat,
    vision: Option<Value>,
    goals: Option<Value>,
    tasks: Option<Value>,
    extra: Vec<(String, Value)>,
}

impl ImportPlan {
    /// Parse a backup file. Fails when it is not JSON or carries no core data.
    pub fn parse(json: &str) -> Result<Self, ImportError> {
        let root: Value = serde_json::from_str(json)?;
        let plan = match root.get("data").and_then(Value::as_object) {
            Some(data) => Self {
                format: BackupFormat::Nested,
                vision: data.get(VISION_KEY).cloned(),
                goals: data.get(GOALS_KEY).cloned(),
                tasks: data.get(TASKS_KEY).cloned(),
                extra: data
                    .iter()
                    .filter(|(k, _)| !is_core_key(k) && is_restorable_key(k))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            },
            None => Self {
                format: BackupFormat::Flat,
                vision: root
                    .get("visionData")
                    .filter(|v| is_truthy(v))
                    .or_else(|| root.get("vision"))
                    .cloned(),
                goals: root.get("goals").cloned(),
                tasks: root.get("tasks").cloned(),
                extra: Vec::new(),
            },
        };

        if !plan.has_core_data() {
            return Err(ImportError::NoCoreData);
        }
        Ok(plan)
    }

    /// Vision present, or goals or tasks a non-empty array
    pub fn has_core_data(&self) -> bool {
        self.vision.as_ref().is_some_and(is_truthy)
            || non_empty_array_len(self.goals.as_ref()) > 0
            || non_empty_array_len(self.tasks.as_ref()) > 0
    }

    pub fn summary(&self) -> ImportSummary {
        ImportSummary {
            format: self.format,
            has_vision: self.vision.as_ref().is_some_and(is_truthy),
            goal_count: non_empty_array_len(self.goals.as_ref()),
            task_count: non_empty_array_len(self.tasks.as_ref()),
            extra_keys: self.extra.iter().map(|(k, _)| k.clone()).collect(),
        }
    }

    /// Replace stored planner data with this backup
    ///
    /// Clears every planner key, writes the provided core slices and then the
    /// other planner keys of a nested backup.
    pub fn apply(&self, store: &dyn KeyValueStore) -> Result<ImportSummary, ImportError> {
        clear_all(store)?;

        let core = [
            (VISION_KEY, &self.vision),
            (GOALS_KEY, &self.goals),
            (TASKS_KEY, &self.tasks),
        ];
        for (key, value) in core {
            if let Some(value) = value.as_ref().filter(|v| is_truthy(v)) {
                store.set(key, &value.to_string())?;
            }
        }

        for (key, value) in &self.extra {
            store.set(key, &value.to_string())?;
        }

        let summary = self.summary();
        info!(
            format = ?summary.format,
            goals = summary.goal_count,
            tasks = summary.task_count,
            vision = summary.has_vision,
            "Backup restored"
        );
        Ok(summary)
    }
}
