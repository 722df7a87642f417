//! Change notification for record store subscriptions.
//!
//! One `tokio::sync::broadcast` channel per collection, created lazily on
//! first subscribe. Backends call [`ChangeFeed::publish`] after every
//! committed write.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use crate::Snapshot;

/// Default number of buffered snapshots per collection.
pub const DEFAULT_FEED_CAPACITY: usize = 64;

/// Fan-out of committed writes to live subscriptions.
pub struct ChangeFeed {
    channels: Mutex<HashMap<String, broadcast::Sender<Snapshot>>>,
    capacity: usize,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Open a subscription to `collection`.
    pub fn subscribe(&self, collection: &str) -> Subscription {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        let tx = channels
            .entry(collection.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0);
        Subscription {
            collection: collection.to_string(),
            rx: tx.subscribe(),
        }
    }

    /// Deliver `snapshot` to every subscription on its collection.
    pub fn publish(&self, snapshot: &Snapshot) {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = channels.get(&snapshot.collection) else {
            return;
        };
        if tx.send(snapshot.clone()).is_err() {
            // Every subscription was dropped.
            channels.remove(&snapshot.collection);
        }
    }

    /// Live subscriptions on `collection`.
    pub fn subscriber_count(&self, collection: &str) -> usize {
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(collection)
            .map_or(0, |tx| tx.receiver_count())
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}

/// A live stream of snapshots for one collection.
///
/// Dropping the subscription (or calling [`Subscription::unsubscribe`]) stops
/// delivery.
pub struct Subscription {
    collection: String,
    rx: broadcast::Receiver<Snapshot>,
}

impl Subscription {
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Wait for the next snapshot. `None` once the store is gone.
    ///
    /// A subscriber that falls behind the feed capacity skips the missed
    /// snapshots.
    pub async fn next(&mut self) -> Option<Snapshot> {
        loop {
            match self.rx.recv().await {
                Ok(snapshot) => return Some(snapshot),
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(collection = %self.collection, missed, "subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// The next snapshot if one is already buffered.
    pub fn try_next(&mut self) -> Option<Snapshot> {
        loop {
            match self.rx.try_recv() {
                Ok(snapshot) => return Some(snapshot),
                Err(TryRecvError::Lagged(missed)) => {
                    tracing::warn!(collection = %self.collection, missed, "subscriber lagged");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {}
}
