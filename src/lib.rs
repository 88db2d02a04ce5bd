//! Life Planner
//!
//! A personal life planner with:
//! - Goals with ordered steps, each step mirrored by a task with the same id
//! - Undo/redo of structural goal changes
//! - Copy/paste duplication of goals and steps
//! - Key-value persistence with JSON backup export and import
//! - Change events broadcast to subscribers

pub mod events;
pub mod persistence;
pub mod planner;

#[cfg(test)]
pub(crate) mod test_helpers;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use events::EventBus;
use persistence::{FileStore, ImportError, ImportPlan, ImportSummary, KeyValueStore, MemoryStore};
use planner::{PlannerManager, UuidIdGenerator};

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub storage: StorageYamlConfig,
    pub history: HistoryYamlConfig,
}

/// Which key-value backend holds planner data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// One file per key under the data directory
    #[default]
    File,
    /// Process memory only; nothing survives exit
    Memory,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Memory => write!(f, "memory"),
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            _ => Err(format!("Unknown storage backend: {}", s)),
        }
    }
}

/// Storage configuration section
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StorageYamlConfig {
    /// Directory for the file backend; platform data dir when absent
    pub data_dir: Option<String>,
    pub backend: StorageBackend,
}

/// History configuration section
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct HistoryYamlConfig {
    /// Maximum undo entries; unbounded when absent or zero
    pub max_entries: Option<usize>,
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub storage_backend: StorageBackend,
    pub history_limit: Option<usize>,
}

/// `<platform data dir>/life-planner`, or `./.life-planner` when the platform
/// has none
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("life-planner"))
        .unwrap_or_else(|| PathBuf::from(".life-planner"))
}

impl Config {
    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. If the file doesn't
    /// exist, falls back to pure env var / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        // 1. Load YAML config (or defaults if file not found)
        let yaml = Self::load_yaml(yaml_path);

        // 2. Build Config with env var overrides
        let storage_backend = match std::env::var("PLANNER_STORAGE_BACKEND") {
            Ok(value) => value
                .parse::<StorageBackend>()
                .map_err(anyhow::Error::msg)
                .context("Invalid PLANNER_STORAGE_BACKEND")?,
            Err(_) => yaml.storage.backend,
        };

        Ok(Self {
            data_dir: std::env::var("PLANNER_DATA_DIR")
                .ok()
                .or(yaml.storage.data_dir)
                .map(PathBuf::from)
                .unwrap_or_else(default_data_dir),
            storage_backend,
            history_limit: std::env::var("PLANNER_HISTORY_LIMIT")
                .ok()
                .and_then(|s| s.parse().ok())
                .or(yaml.history.max_entries)
                .filter(|&n: &usize| n > 0),
        })
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

/// Application state: storage, the planner and its event bus, wired together
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn KeyValueStore>,
    pub events: Arc<EventBus>,
    pub planner: PlannerManager,
}

impl AppState {
    /// Open storage, load persisted state and attach persistence
    pub fn new(config: Config) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = match config.storage_backend {
            StorageBackend::File => Arc::new(
                FileStore::open(&config.data_dir).with_context(|| {
                    format!("Failed to open data directory {}", config.data_dir.display())
                })?,
            ),
            StorageBackend::Memory => Arc::new(MemoryStore::new()),
        };
        tracing::debug!(
            backend = %config.storage_backend,
            data_dir = %config.data_dir.display(),
            "Storage ready"
        );
        Ok(Self::with_store(config, store))
    }

    /// Build state over an existing store
    pub fn with_store(config: Config, store: Arc<dyn KeyValueStore>) -> Self {
        let events = Arc::new(EventBus::default());
        let snapshot = persistence::load_state(store.as_ref());
        let mut planner = PlannerManager::from_snapshot(snapshot, Arc::new(UuidIdGenerator))
            .with_history_limit(config.history_limit)
            .with_event_emitter(events.clone());
        planner.add_listener(Arc::new(persistence::StatePersister::new(store.clone())));

        Self {
            config: Arc::new(config),
            store,
            events,
            planner,
        }
    }

    /// Snapshot every stored planner key
    pub fn export_backup(&self) -> Result<persistence::BackupDocument> {
        persistence::export(self.store.as_ref()).context("Failed to read stored data for export")
    }

    /// Replace stored data with a parsed backup and reload the planner from it
    ///
    /// The planner is reloaded even when the backend fails part-way, so memory
    /// never disagrees with what is stored.
    pub fn import_backup(&mut self, plan: &ImportPlan) -> Result<ImportSummary, ImportError> {
        let result = plan.apply(self.store.as_ref());
        if let Err(e) = &result {
            tracing::error!(error = %e, "Backup import failed, reloading stored state");
        }
        self.planner
            .load(persistence::load_state(self.store.as_ref()));
        result
    }
}

// ============================================================================
// Tests
// ============================================================================
