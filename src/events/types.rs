//! Change event types emitted after planner mutations

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The type of entity that was mutated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Goal,
    Step,
    Task,
    Vision,
    Preferences,
    /// The goal collection as a whole (undo, redo, import, reset)
    Planner,
}

impl FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "goal" => Ok(Self::Goal),
            "step" => Ok(Self::Step),
            "task" => Ok(Self::Task),
            "vision" => Ok(Self::Vision),
            "preferences" => Ok(Self::Preferences),
            "planner" => Ok(Self::Planner),
            _ => Err(format!("Unknown entity type: {}", s)),
        }
    }
}

/// The action performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
    /// State replaced wholesale from a snapshot or backup
    Restored,
}

/// A related entity, e.g. the goal a step belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedEntity {
    pub entity_type: EntityType,
    pub entity_id: String,
}

/// A change event emitted after a committed mutation
///
/// Must be Clone for `tokio::sync::broadcast`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// The type of entity that was mutated
    pub entity_type: EntityType,
    /// The action performed
    pub action: ChangeAction,
    /// The ID of the mutated entity
    pub entity_id: String,
    /// Owning or mirrored entity, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related: Option<RelatedEntity>,
    /// Optional payload with entity data (e.g. new status, title)
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,
    /// ISO 8601 timestamp
    pub timestamp: String,
}

impl ChangeEvent {
    /// Create a new ChangeEvent with the current timestamp
    pub fn new(entity_type: EntityType, action: ChangeAction, entity_id: impl Into<String>) -> Self {
        Self {
            entity_type,
            action,
            entity_id: entity_id.into(),
            related: None,
            payload: serde_json::Value::Null,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Set the related entity
    pub fn with_related(mut self, entity_type: EntityType, entity_id: impl Into<String>) -> Self {
        self.related = Some(RelatedEntity {
            entity_type,
            entity_id: entity_id.into(),
        });
        self
    }

    /// Set the payload
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Sink for change events. Emitting is fire-and-forget and must never fail
/// the mutation that produced the event.
pub trait EventEmitter: Send + Sync {
    fn emit(&self, event: ChangeEvent);
}
