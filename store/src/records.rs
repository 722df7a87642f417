//! Typed access to the `voter_verifications` collection.

use votecheck_types::{RecordDraft, Timestamp, VerificationRecord, VoterId};

use crate::{RecordStore, Snapshot, StoreError};

/// Collection holding one verification record per voter id.
pub const VERIFICATION_COLLECTION: &str = "voter_verifications";

/// Write `draft` keyed by its voter id, overwriting any earlier record.
pub async fn put_verification_record(
    store: &dyn RecordStore,
    draft: &RecordDraft,
) -> Result<Timestamp, StoreError> {
    let body = serde_json::to_value(draft)?;
    store
        .write(VERIFICATION_COLLECTION, draft.voter_id.as_str(), body)
        .await
}

pub async fn get_verification_record(
    store: &dyn RecordStore,
    voter_id: &VoterId,
) -> Result<VerificationRecord, StoreError> {
    let snapshot = store.read(VERIFICATION_COLLECTION, voter_id.as_str()).await?;
    record_from_snapshot(&snapshot)
}

pub async fn list_verification_records(
    store: &dyn RecordStore,
) -> Result<Vec<VerificationRecord>, StoreError> {
    store
        .list(VERIFICATION_COLLECTION)
        .await?
        .iter()
        .map(record_from_snapshot)
        .collect()
}

/// Decode a stored record, taking the timestamp from the snapshot.
pub fn record_from_snapshot(snapshot: &Snapshot) -> Result<VerificationRecord, StoreError> {
    let draft: RecordDraft = serde_json::from_value(snapshot.data.clone())?;
    Ok(VerificationRecord::from_draft(draft, snapshot.update_time))
}
