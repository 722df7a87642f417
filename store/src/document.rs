//! Documents, snapshots and the record store trait.

use async_trait::async_trait;
use votecheck_types::Timestamp;

use crate::{StoreError, Subscription};

/// A schemaless JSON document body.
pub type Document = serde_json::Value;

/// A document as read back from the store.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub collection: String,
    pub key: String,
    pub data: Document,
    /// Assigned by the store on every write.
    pub update_time: Timestamp,
}

/// Document-oriented persistence keyed by `(collection, key)`.
///
/// Writes are create-or-overwrite with last-write-wins semantics; there is no
/// merge and no compare-and-swap.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Create or overwrite the document at `key` within `collection`.
    ///
    /// Returns the update time the store assigned.
    async fn write(
        &self,
        collection: &str,
        key: &str,
        document: Document,
    ) -> Result<Timestamp, StoreError>;

    /// Read one document; [`StoreError::NotFound`] when absent.
    async fn read(&self, collection: &str, key: &str) -> Result<Snapshot, StoreError>;

    /// All documents in `collection`, in key order.
    async fn list(&self, collection: &str) -> Result<Vec<Snapshot>, StoreError>;

    /// Receive a snapshot for every subsequent write to `collection`.
    fn subscribe(&self, collection: &str) -> Result<Subscription, StoreError>;
}

/// Reject empty path segments and the NUL byte backends use as a separator.
pub fn validate_path(collection: &str, key: Option<&str>) -> Result<(), StoreError> {
    if collection.is_empty() || collection.contains('\0') {
        return Err(StoreError::InvalidPath(format!("collection {collection:?}")));
    }
    if let Some(key) = key {
        if key.is_empty() || key.contains('\0') {
            return Err(StoreError::InvalidPath(format!("key {key:?} in {collection}")));
        }
    }
    Ok(())
}
