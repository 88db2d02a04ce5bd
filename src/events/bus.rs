//! Broadcast bus for planner change events
//!
//! Subscribers get an [`EventStream`], optionally narrowed to some entity
//! types. A stream that falls behind skips the overwritten events, counts
//! them and keeps going.

use super::{ChangeEvent, EntityType, EventEmitter};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, warn};

/// Default broadcast channel capacity
const DEFAULT_CAPACITY: usize = 1024;

/// Fan-out of change events. Emitting never blocks and never fails; with no
/// subscribers the event is dropped.
#[derive(Debug)]
pub struct EventBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Stream of every event
    pub fn subscribe(&self) -> EventStream {
        EventStream {
            receiver: self.sender.subscribe(),
            entity_types: Vec::new(),
            missed: 0,
        }
    }

    /// Stream of events about the given entity types. An empty list means
    /// every type.
    pub fn subscribe_to(&self, entity_types: &[EntityType]) -> EventStream {
        EventStream {
            entity_types: entity_types.to_vec(),
            ..self.subscribe()
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventEmitter for EventBus {
    fn emit(&self, event: ChangeEvent) {
        let (entity_type, action) = (event.entity_type, event.action);
        let entity_id = event.entity_id.clone();
        if let Ok(subscribers) = self.sender.send(event) {
            debug!(?entity_type, ?action, %entity_id, subscribers, "Change event published");
        }
    }
}

/// One subscriber's view of the bus
#[derive(Debug)]
pub struct EventStream {
    receiver: broadcast::Receiver<ChangeEvent>,
    entity_types: Vec<EntityType>,
    missed: u64,
}

impl EventStream {
    fn accepts(&self, event: &ChangeEvent) -> bool {
        self.entity_types.is_empty() || self.entity_types.contains(&event.entity_type)
    }

    fn record_lag(&mut self, skipped: u64) {
        self.missed += skipped;
        warn!(skipped, total = self.missed, "Event subscriber lagged, events dropped");
    }

    /// Wait for the next matching event. `None` once the bus is gone and the
    /// backlog is drained.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.accepts(&event) => return Some(event),
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => self.record_lag(skipped),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next matching event already queued, without waiting
    pub fn try_next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if self.accepts(&event) => return Some(event),
                Ok(_) => {}
                Err(TryRecvError::Lagged(skipped)) => self.record_lag(skipped),
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Every matching event already queued
    pub fn drain(&mut self) -> Vec<ChangeEvent> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// Events lost because this stream fell behind
    pub fn missed(&self) -> u64 {
        self.missed
    }
}
