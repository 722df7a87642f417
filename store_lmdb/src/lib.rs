//! LMDB storage backend for votecheck.
//!
//! Implements the [`votecheck_store::RecordStore`] trait with the `heed` LMDB
//! bindings. All collections share one `documents` database; keys are
//! `collection ++ 0x00 ++ key`, so listing a collection is a prefix scan.

pub mod documents;
pub mod environment;
pub mod error;
pub mod integrity;

pub use documents::LmdbRecordStore;
pub use environment::LmdbEnvironment;
pub use error::LmdbError;
pub use integrity::{check_data_dir, check_integrity, IntegrityReport};
