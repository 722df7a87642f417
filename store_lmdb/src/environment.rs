//! LMDB environment setup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use votecheck_store::ChangeFeed;

use crate::{LmdbError, LmdbRecordStore};

/// Name of the single database holding every collection.
pub(crate) const DOCUMENTS_DB: &str = "documents";

const MAX_DBS: u32 = 4;

/// Wraps the LMDB environment, its database handle and the change feed
/// shared by every store handle opened from it.
pub struct LmdbEnvironment {
    path: PathBuf,
    env: Arc<Env>,
    documents_db: Database<Bytes, Bytes>,
    feed: Arc<ChangeFeed>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at `path` with the given map size.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per process for this path and
        // the data file is not modified by anything other than LMDB.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let documents_db: Database<Bytes, Bytes> =
            env.create_database(&mut wtxn, Some(DOCUMENTS_DB))?;
        wtxn.commit()?;

        tracing::info!(path = %path.display(), map_size, "opened LMDB environment");

        Ok(Self {
            path: path.to_path_buf(),
            env: Arc::new(env),
            documents_db,
            feed: Arc::new(ChangeFeed::default()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A record store handle; all handles share one change feed.
    pub fn record_store(&self) -> LmdbRecordStore {
        LmdbRecordStore {
            env: Arc::clone(&self.env),
            documents_db: self.documents_db,
            feed: Arc::clone(&self.feed),
        }
    }

    pub(crate) fn env(&self) -> &Arc<Env> {
        &self.env
    }
}
