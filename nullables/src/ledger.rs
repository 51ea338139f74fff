//! Nullable ledger — thread-safe in-memory attempt ledger for testing.

use async_trait::async_trait;
use kyc_store::{check_overwrite, AttemptLedger, AttemptRecord, StoreError};
use kyc_types::{Clock, Email};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::NullClock;

/// An in-memory attempt ledger with the same write policy as the real
/// backends. Thread-safe for use with tokio's multi-threaded runtime.
pub struct NullAttemptLedger {
    records: Mutex<HashMap<String, AttemptRecord>>,
    clock: Arc<NullClock>,
    unavailable: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl NullAttemptLedger {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(NullClock::new(1_700_000_000)))
    }

    pub fn with_clock(clock: Arc<NullClock>) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            clock,
            unavailable: AtomicBool::new(false),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    /// Seed a record directly, bypassing the write policy.
    pub fn insert(&self, record: AttemptRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(record.email.to_string(), record);
    }

    /// Make every subsequent call fail with a backend error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Snapshot of a stored record.
    pub fn record(&self, email: &str) -> Option<AttemptRecord> {
        self.records.lock().unwrap().get(email).cloned()
    }

    /// Number of lookups served.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `record_attempt` calls received.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Backend("null ledger unavailable".into()))
        } else {
            Ok(())
        }
    }
}

impl Default for NullAttemptLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AttemptLedger for NullAttemptLedger {
    async fn get_record(&self, email: &Email) -> Result<AttemptRecord, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.records
            .lock()
            .unwrap()
            .get(email.as_str())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(email.to_string()))
    }

    async fn record_attempt(
        &self,
        email: &Email,
        success: bool,
    ) -> Result<AttemptRecord, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        let mut records = self.records.lock().unwrap();
        check_overwrite(records.get(email.as_str()))?;
        let record = AttemptRecord {
            email: email.clone(),
            attempted_at: self.clock.now(),
            processed: success,
        };
        records.insert(email.to_string(), record.clone());
        Ok(record)
    }

    async fn delete_record(&self, email: &Email) -> Result<bool, StoreError> {
        self.check_available()?;
        Ok(self.records.lock().unwrap().remove(email.as_str()).is_some())
    }
}
