//! LMDB store integrity checks.
//!
//! Run on startup to detect corrupt documents early, before a workflow tries
//! to read them back.

use std::path::Path;

use crate::documents::{split_key, StoredDocument};
use crate::{LmdbEnvironment, LmdbError};

/// Summary of an integrity check run.
#[derive(Debug, Default)]
pub struct IntegrityReport {
    pub total_entries: u64,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    /// Returns `true` if no errors were detected.
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Walk every stored document and check that its key and body decode.
///
/// Undecodable entries are recorded in the report rather than causing a hard
/// error.
pub fn check_integrity(env: &LmdbEnvironment) -> Result<IntegrityReport, LmdbError> {
    let mut report = IntegrityReport::default();
    let store = env.record_store();
    let rtxn = env.env().read_txn()?;

    for entry in store.documents_db.iter(&rtxn)? {
        let (raw_key, bytes) = entry?;
        report.total_entries += 1;
        let Some((collection, key)) = split_key(raw_key) else {
            report
                .errors
                .push(format!("malformed key of {} bytes", raw_key.len()));
            continue;
        };
        if let Err(e) = serde_json::from_slice::<StoredDocument>(bytes) {
            report
                .errors
                .push(format!("undecodable document {collection}/{key}: {e}"));
        }
    }

    Ok(report)
}

/// Check if the LMDB data directory looks valid before opening.
///
/// Returns `Ok(())` for a fresh (nonexistent) directory. Returns an error
/// if the directory exists but `data.mdb` is missing, which suggests
/// the wrong directory was configured.
pub fn check_data_dir(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Ok(());
    }
    let data_file = path.join("data.mdb");
    if !data_file.exists() {
        return Err(format!(
            "data directory exists but data.mdb is missing at {}",
            path.display()
        ));
    }
    Ok(())
}
