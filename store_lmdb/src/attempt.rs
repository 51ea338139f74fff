//! LMDB implementation of AttemptLedger.
//!
//! Records are bincode-encoded under the email's UTF-8 bytes. The
//! read-check-write of `record_attempt` happens inside one write
//! transaction; LMDB allows a single writer at a time, which makes the
//! conditional insert atomic.

use std::sync::Arc;

use async_trait::async_trait;
use heed::types::Bytes;
use heed::{Database, Env};

use kyc_store::{check_overwrite, AttemptLedger, AttemptRecord, StoreError};
use kyc_types::{Clock, Email, SystemClock};

use crate::{LmdbEnvironment, LmdbError};

pub struct LmdbAttemptLedger {
    env: Arc<Env>,
    attempts_db: Database<Bytes, Bytes>,
    clock: Arc<dyn Clock>,
}

impl LmdbAttemptLedger {
    pub fn new(environment: &LmdbEnvironment) -> Self {
        Self::with_clock(environment, Arc::new(SystemClock))
    }

    pub fn with_clock(environment: &LmdbEnvironment, clock: Arc<dyn Clock>) -> Self {
        Self {
            env: environment.env(),
            attempts_db: environment.attempts_db,
            clock,
        }
    }

    /// Run blocking LMDB work off the async executor.
    async fn blocking<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Env, Database<Bytes, Bytes>) -> Result<T, StoreError> + Send + 'static,
    {
        let env = Arc::clone(&self.env);
        let db = self.attempts_db;
        tokio::task::spawn_blocking(move || f(&env, db))
            .await
            .map_err(|e| StoreError::Backend(format!("LMDB task failed: {e}")))?
    }
}

fn decode(bytes: &[u8]) -> Result<AttemptRecord, LmdbError> {
    Ok(bincode::deserialize(bytes)?)
}

fn read_record(
    env: &Env,
    db: Database<Bytes, Bytes>,
    email: &Email,
) -> Result<Option<AttemptRecord>, LmdbError> {
    let rtxn = env.read_txn()?;
    let record = db
        .get(&rtxn, email.as_str().as_bytes())?
        .map(decode)
        .transpose()?;
    Ok(record)
}

#[async_trait]
impl AttemptLedger for LmdbAttemptLedger {
    async fn get_record(&self, email: &Email) -> Result<AttemptRecord, StoreError> {
        let email = email.clone();
        self.blocking(move |env, db| {
            read_record(env, db, &email)?.ok_or_else(|| StoreError::NotFound(email.to_string()))
        })
        .await
    }

    async fn record_attempt(
        &self,
        email: &Email,
        success: bool,
    ) -> Result<AttemptRecord, StoreError> {
        let record = AttemptRecord {
            email: email.clone(),
            attempted_at: self.clock.now(),
            processed: success,
        };

        self.blocking(move |env, db| {
            let key = record.email.as_str().as_bytes().to_vec();
            let mut wtxn = env.write_txn().map_err(LmdbError::from)?;

            let existing = db
                .get(&wtxn, &key)
                .map_err(LmdbError::from)?
                .map(decode)
                .transpose()?;
            // Dropping the txn without commit aborts it.
            check_overwrite(existing.as_ref())?;

            let value = bincode::serialize(&record).map_err(LmdbError::from)?;
            db.put(&mut wtxn, &key, &value).map_err(LmdbError::from)?;
            wtxn.commit().map_err(LmdbError::from)?;

            tracing::debug!(
                email = %record.email,
                processed = record.processed,
                replaced = existing.is_some(),
                "attempt recorded"
            );
            Ok(record)
        })
        .await
    }

    async fn delete_record(&self, email: &Email) -> Result<bool, StoreError> {
        let email = email.clone();
        self.blocking(move |env, db| {
            let mut wtxn = env.write_txn().map_err(LmdbError::from)?;
            let existed = db
                .delete(&mut wtxn, email.as_str().as_bytes())
                .map_err(LmdbError::from)?;
            wtxn.commit().map_err(LmdbError::from)?;
            Ok(existed)
        })
        .await
    }
}
