//! Event fan-out to observers
//!
//! Two delivery paths share one ordering: synchronous callbacks run in
//! registration order, and a broadcast channel feeds async consumers.
//! A panicking callback is logged and skipped; the rest still run.

use crate::games::types::GameEvent;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

/// Observer callback registered with `subscribe`
pub type EventCallback = Arc<dyn Fn(&GameEvent) + Send + Sync>;

pub struct EventBus {
    callbacks: RwLock<Vec<EventCallback>>,
    tx: broadcast::Sender<GameEvent>,
}

impl EventBus {
    pub fn new(channel_capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(channel_capacity.max(1));
        Self {
            callbacks: RwLock::new(Vec::new()),
            tx,
        }
    }

    /// Register a callback for every future event
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&GameEvent) + Send + Sync + 'static,
    {
        self.callbacks
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Arc::new(callback));
    }

    /// Receive every future event on a broadcast channel
    pub fn subscribe_channel(&self) -> broadcast::Receiver<GameEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.callbacks
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Deliver one event to every observer
    pub fn emit(&self, event: GameEvent) {
        // Snapshot so callbacks may subscribe without deadlocking
        let callbacks: Vec<EventCallback> = self
            .callbacks
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();

        for (index, callback) in callbacks.iter().enumerate() {
            if catch_unwind(AssertUnwindSafe(|| callback(&event))).is_err() {
                tracing::warn!(
                    "Observer {} panicked handling event for game {}; continuing delivery",
                    index,
                    event.game_id()
                );
            }
        }

        // No receivers is fine
        let _ = self.tx.send(event);
    }
}
