//! ChangeHub: catalog change notification
//!
//! Observers register a callback and get a [`Subscription`] back. Cancelling
//! (or dropping) the subscription unregisters the callback exactly once.
//!
//! ```text
//! flavor / settings mutation
//!       │ publish(CatalogEvent)
//!       ▼
//! ChangeHub ── callbacks ──► SSE stream per client
//! ```

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CatalogEvent {
    /// A flavor was created, updated, deactivated or deleted
    FlavorsChanged,
    /// Price or PIX configuration changed
    SettingsChanged,
}

impl CatalogEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FlavorsChanged => "flavors_changed",
            Self::SettingsChanged => "settings_changed",
        }
    }
}

type Callback = Arc<dyn Fn(CatalogEvent) + Send + Sync>;

#[derive(Default)]
struct HubInner {
    next_id: AtomicU64,
    subscribers: DashMap<u64, Callback>,
}

#[derive(Clone, Default)]
pub struct ChangeHub {
    inner: Arc<HubInner>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, on_change: F) -> Subscription
    where
        F: Fn(CatalogEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.subscribers.insert(id, Arc::new(on_change));
        Subscription {
            id,
            hub: Arc::downgrade(&self.inner),
            active: AtomicBool::new(true),
        }
    }

    /// Invoke every registered callback
    pub fn publish(&self, event: CatalogEvent) {
        // Snapshot first so callbacks may (un)subscribe without deadlocking a shard
        let callbacks: Vec<Callback> = self
            .inner
            .subscribers
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        tracing::debug!(event = event.name(), subscribers = callbacks.len(), "Publishing catalog event");
        for callback in callbacks {
            callback(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }
}

/// Registration handle; unregisters on `cancel()` or drop
pub struct Subscription {
    id: u64,
    hub: Weak<HubInner>,
    active: AtomicBool,
}

impl Subscription {
    /// Unregister the callback. Returns `false` if already cancelled.
    pub fn cancel(&self) -> bool {
        if !self.active.swap(false, Ordering::AcqRel) {
            return false;
        }
        if let Some(hub) = self.hub.upgrade() {
            hub.subscribers.remove(&self.id);
        }
        true
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
