//! LMDB implementation of RecordStore.
//!
//! Values are JSON `{ "update_time": secs, "data": <document> }`. The update
//! time is read from the system clock once the write transaction is open.
//! Transactions run on the blocking pool.

use std::sync::Arc;

use async_trait::async_trait;
use heed::types::Bytes;
use heed::{Database, Env};
use serde::{Deserialize, Serialize};

use votecheck_store::{
    validate_path, ChangeFeed, Document, RecordStore, Snapshot, StoreError, Subscription,
};
use votecheck_types::Timestamp;

use crate::LmdbError;

const SEPARATOR: u8 = 0;

#[derive(Serialize, Deserialize)]
pub(crate) struct StoredDocument {
    pub(crate) update_time: Timestamp,
    pub(crate) data: Document,
}

#[derive(Clone)]
pub struct LmdbRecordStore {
    pub(crate) env: Arc<Env>,
    pub(crate) documents_db: Database<Bytes, Bytes>,
    pub(crate) feed: Arc<ChangeFeed>,
}

/// Build composite key `collection ++ 0x00 ++ key`.
fn composite_key(collection: &str, key: &str) -> Vec<u8> {
    let mut out = collection_prefix(collection);
    out.extend_from_slice(key.as_bytes());
    out
}

fn collection_prefix(collection: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(collection.len() + 1);
    out.extend_from_slice(collection.as_bytes());
    out.push(SEPARATOR);
    out
}

/// Split a composite key back into `(collection, key)`.
pub(crate) fn split_key(raw: &[u8]) -> Option<(&str, &str)> {
    let pos = raw.iter().position(|b| *b == SEPARATOR)?;
    let collection = std::str::from_utf8(&raw[..pos]).ok()?;
    let key = std::str::from_utf8(&raw[pos + 1..]).ok()?;
    Some((collection, key))
}

impl LmdbRecordStore {
    fn put(&self, collection: &str, key: &str, document: Document) -> Result<Snapshot, LmdbError> {
        let mut wtxn = self.env.write_txn()?;
        let update_time = Timestamp::now();
        let stored = StoredDocument {
            update_time,
            data: document,
        };
        let bytes = serde_json::to_vec(&stored)?;
        self.documents_db
            .put(&mut wtxn, &composite_key(collection, key), &bytes)?;
        wtxn.commit()?;
        Ok(Snapshot {
            collection: collection.to_string(),
            key: key.to_string(),
            data: stored.data,
            update_time,
        })
    }

    fn get(&self, collection: &str, key: &str) -> Result<Option<Snapshot>, LmdbError> {
        let rtxn = self.env.read_txn()?;
        let Some(bytes) = self.documents_db.get(&rtxn, &composite_key(collection, key))? else {
            return Ok(None);
        };
        let stored: StoredDocument = serde_json::from_slice(bytes)?;
        Ok(Some(Snapshot {
            collection: collection.to_string(),
            key: key.to_string(),
            data: stored.data,
            update_time: stored.update_time,
        }))
    }

    fn scan(&self, collection: &str) -> Result<Vec<Snapshot>, LmdbError> {
        let rtxn = self.env.read_txn()?;
        let prefix = collection_prefix(collection);
        let mut out = Vec::new();
        for entry in self.documents_db.prefix_iter(&rtxn, &prefix)? {
            let (raw_key, bytes) = entry?;
            let Some((_, key)) = split_key(raw_key) else {
                return Err(LmdbError::Serialization(format!(
                    "malformed key in collection {collection}"
                )));
            };
            let stored: StoredDocument = serde_json::from_slice(bytes)?;
            out.push(Snapshot {
                collection: collection.to_string(),
                key: key.to_string(),
                data: stored.data,
                update_time: stored.update_time,
            });
        }
        Ok(out)
    }

    /// Run a transaction on the blocking pool; commits fsync.
    async fn blocking<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&LmdbRecordStore) -> Result<T, LmdbError> + Send + 'static,
    {
        let store = self.clone();
        let result = tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| StoreError::Backend(format!("lmdb task failed: {e}")))?;
        Ok(result?)
    }
}

#[async_trait]
impl RecordStore for LmdbRecordStore {
    async fn write(
        &self,
        collection: &str,
        key: &str,
        document: Document,
    ) -> Result<Timestamp, StoreError> {
        validate_path(collection, Some(key))?;
        let (c, k) = (collection.to_string(), key.to_string());
        let snapshot = self.blocking(move |store| store.put(&c, &k, document)).await?;
        tracing::debug!(collection, key, update_time = %snapshot.update_time, "document written");
        let update_time = snapshot.update_time;
        self.feed.publish(&snapshot);
        Ok(update_time)
    }

    async fn read(&self, collection: &str, key: &str) -> Result<Snapshot, StoreError> {
        validate_path(collection, Some(key))?;
        let (c, k) = (collection.to_string(), key.to_string());
        self.blocking(move |store| store.get(&c, &k))
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("{collection}/{key}")))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Snapshot>, StoreError> {
        validate_path(collection, None)?;
        let c = collection.to_string();
        self.blocking(move |store| store.scan(&c)).await
    }

    fn subscribe(&self, collection: &str) -> Result<Subscription, StoreError> {
        validate_path(collection, None)?;
        Ok(self.feed.subscribe(collection))
    }
}
