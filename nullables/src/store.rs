//! Nullable record store: in-memory documents with a write log.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use votecheck_store::{
    validate_path, ChangeFeed, Document, RecordStore, Snapshot, StoreError, Subscription,
};
use votecheck_types::Timestamp;

use crate::NullClock;

/// One call to [`RecordStore::write`], successful or not.
#[derive(Clone, Debug, PartialEq)]
pub struct WriteAttempt {
    pub collection: String,
    pub key: String,
    pub document: Document,
    pub succeeded: bool,
}

/// An in-memory record store for testing.
///
/// Every write attempt is logged. Writes can be made to fail on demand to
/// exercise persistence error handling.
pub struct NullRecordStore {
    documents: Mutex<BTreeMap<(String, String), Snapshot>>,
    attempts: Mutex<Vec<WriteAttempt>>,
    fail_writes: AtomicBool,
    clock: NullClock,
    feed: ChangeFeed,
}

impl NullRecordStore {
    pub fn new() -> Self {
        Self::with_clock(NullClock::default())
    }

    /// Stamp writes with `clock` instead of a private default clock.
    pub fn with_clock(clock: NullClock) -> Self {
        Self {
            documents: Mutex::new(BTreeMap::new()),
            attempts: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
            clock,
            feed: ChangeFeed::default(),
        }
    }

    /// Make subsequent writes fail with a backend error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Every write attempt so far, in order.
    pub fn write_attempts(&self) -> Vec<WriteAttempt> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    /// Stored documents across all collections.
    pub fn document_count(&self) -> usize {
        self.documents.lock().unwrap().len()
    }
}

impl Default for NullRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for NullRecordStore {
    async fn write(
        &self,
        collection: &str,
        key: &str,
        document: Document,
    ) -> Result<Timestamp, StoreError> {
        validate_path(collection, Some(key))?;
        let failing = self.fail_writes.load(Ordering::SeqCst);
        self.attempts.lock().unwrap().push(WriteAttempt {
            collection: collection.to_string(),
            key: key.to_string(),
            document: document.clone(),
            succeeded: !failing,
        });
        if failing {
            return Err(StoreError::Backend("null store configured to fail".to_string()));
        }

        let snapshot = Snapshot {
            collection: collection.to_string(),
            key: key.to_string(),
            data: document,
            update_time: self.clock.now(),
        };
        self.documents
            .lock()
            .unwrap()
            .insert((collection.to_string(), key.to_string()), snapshot.clone());
        self.feed.publish(&snapshot);
        Ok(snapshot.update_time)
    }

    async fn read(&self, collection: &str, key: &str) -> Result<Snapshot, StoreError> {
        validate_path(collection, Some(key))?;
        self.documents
            .lock()
            .unwrap()
            .get(&(collection.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("{collection}/{key}")))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Snapshot>, StoreError> {
        validate_path(collection, None)?;
        Ok(self
            .documents
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.collection == collection)
            .cloned()
            .collect())
    }

    fn subscribe(&self, collection: &str) -> Result<Subscription, StoreError> {
        validate_path(collection, None)?;
        Ok(self.feed.subscribe(collection))
    }
}
