use crate::event::{CacheEvent, EventType};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Subscriber callback
pub type EventCallback = Arc<dyn Fn(&CacheEvent) + Send + Sync>;

struct Subscription {
    filter: Option<EventType>,
    callback: EventCallback,
}

/// Snapshot of signal manager counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignalStats {
    pub callbacks: usize,
    pub events_emitted: u64,
}

/// Signal manager for cache change notifications
pub struct SignalManager {
    callbacks: std::sync::RwLock<Vec<Subscription>>,
    events_emitted: AtomicU64,
}

impl std::fmt::Debug for SignalManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalManager")
            .field("callback_count", &self.callback_count())
            .field("events_emitted", &self.events_emitted.load(Ordering::Relaxed))
            .finish()
    }
}

impl SignalManager {
    pub fn new() -> Self {
        Self {
            callbacks: std::sync::RwLock::new(Vec::new()),
            events_emitted: AtomicU64::new(0),
        }
    }

    /// Add event callback for every event
    pub fn add_callback<F>(&self, callback: F)
    where
        F: Fn(&CacheEvent) + Send + Sync + 'static,
    {
        self.subscribe(None, Arc::new(callback));
    }

    /// Add event callback that only sees events of `event_type`
    pub fn add_callback_for<F>(&self, event_type: EventType, callback: F)
    where
        F: Fn(&CacheEvent) + Send + Sync + 'static,
    {
        self.subscribe(Some(event_type), Arc::new(callback));
    }

    fn subscribe(&self, filter: Option<EventType>, callback: EventCallback) {
        if let Ok(mut callbacks) = self.callbacks.write() {
            callbacks.push(Subscription { filter, callback });
        }
    }

    /// Emit event to all matching subscribers
    ///
    /// Callbacks run after the subscriber lock is released, so a callback may
    /// subscribe or clear callbacks on this manager.
    pub fn emit(&self, event: CacheEvent) {
        self.events_emitted.fetch_add(1, Ordering::Relaxed);
        let matching: Vec<EventCallback> = match self.callbacks.read() {
            Ok(callbacks) => callbacks
                .iter()
                .filter(|subscription| {
                    subscription
                        .filter
                        .is_none_or(|event_type| event_type == event.event_type)
                })
                .map(|subscription| subscription.callback.clone())
                .collect(),
            Err(_) => {
                tracing::warn!(key = %event.key, "Signal callbacks poisoned, event dropped");
                return;
            }
        };

        for callback in matching {
            callback(&event);
        }
    }

    /// Clear all callbacks
    pub fn clear_callbacks(&self) {
        if let Ok(mut callbacks) = self.callbacks.write() {
            callbacks.clear();
        }
    }

    /// Get number of registered callbacks
    pub fn callback_count(&self) -> usize {
        self.callbacks.read().map(|c| c.len()).unwrap_or(0)
    }

    pub fn stats(&self) -> SignalStats {
        SignalStats {
            callbacks: self.callback_count(),
            events_emitted: self.events_emitted.load(Ordering::Relaxed),
        }
    }
}

impl Default for SignalManager {
    fn default() -> Self {
        Self::new()
    }
}
