//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};

use crate::LmdbError;

/// Name of the database holding attempt records.
const ATTEMPTS_DB: &str = "attempts";

/// Number of named databases the environment is opened with.
const MAX_DBS: u32 = 4;

/// Wraps the LMDB environment and all database handles.
pub struct LmdbEnvironment {
    env: Arc<Env>,
    pub(crate) attempts_db: Database<Bytes, Bytes>,
}

impl LmdbEnvironment {
    /// Open or create an LMDB environment at the given directory.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;

        // SAFETY: the environment is opened once per process per path and
        // never mapped twice; heed requires callers to uphold this.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let attempts_db: Database<Bytes, Bytes> =
            env.create_database(&mut wtxn, Some(ATTEMPTS_DB))?;
        wtxn.commit()?;

        tracing::info!(path = %path.display(), map_size, "LMDB environment opened");

        Ok(Self {
            env: Arc::new(env),
            attempts_db,
        })
    }

    pub(crate) fn env(&self) -> Arc<Env> {
        Arc::clone(&self.env)
    }
}
