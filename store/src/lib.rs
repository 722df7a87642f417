//! Abstract document storage for votecheck.
//!
//! The workflow and the command-line front end depend only on the
//! [`RecordStore`] trait. Backends (LMDB, in-memory for testing) implement it
//! and use [`ChangeFeed`] to serve subscriptions.

pub mod document;
pub mod error;
pub mod feed;
pub mod records;

pub use document::{validate_path, Document, RecordStore, Snapshot};
pub use error::StoreError;
pub use feed::{ChangeFeed, Subscription};
pub use records::{
    get_verification_record, list_verification_records, put_verification_record,
    record_from_snapshot, VERIFICATION_COLLECTION,
};
