//! Local event fan-out.
//!
//! Observers are called in subscription order, on whichever thread applied
//! the triggering change, after the cache has been updated. Async consumers
//! can use the broadcast receiver instead.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;

use syncbridge_core::FileStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    StatusChanged { path: PathBuf, status: FileStatus },
    AvailabilityChanged(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Arc<dyn Fn(&ClientEvent) + Send + Sync>;

pub(crate) struct EventHub {
    next_id: AtomicU64,
    observers: Mutex<Vec<(SubscriptionId, Observer)>>,
    broadcast: broadcast::Sender<ClientEvent>,
}

impl EventHub {
    pub(crate) fn new() -> Self {
        let (broadcast, _) = broadcast::channel(256);
        Self {
            next_id: AtomicU64::new(1),
            observers: Mutex::new(Vec::new()),
            broadcast,
        }
    }

    pub(crate) fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&ClientEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(observer)));
        id
    }

    /// Returns whether `id` was still subscribed.
    pub(crate) fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.lock().unwrap_or_else(PoisonError::into_inner);
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    pub(crate) fn receiver(&self) -> broadcast::Receiver<ClientEvent> {
        self.broadcast.subscribe()
    }

    pub(crate) fn emit(&self, event: ClientEvent) {
        // Snapshot so observers may (un)subscribe from inside a callback.
        let observers: Vec<Observer> = self
            .observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, observer)| observer.clone())
            .collect();
        for observer in observers {
            observer(&event);
        }
        let _ = self.broadcast.send(event);
    }
}
