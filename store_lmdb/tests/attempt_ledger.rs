//! LMDB attempt ledger against a real environment in a temp directory.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use kyc_store::{AttemptLedger, StoreError};
use kyc_store_lmdb::{LmdbAttemptLedger, LmdbEnvironment};
use kyc_types::{Clock, Email, Timestamp};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct FixedClock(AtomicU64);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.0.load(Ordering::SeqCst))
    }
}

fn temp_ledger() -> (tempfile::TempDir, LmdbAttemptLedger, Arc<FixedClock>) {
    let dir = tempfile::tempdir().expect("temp dir");
    let env = LmdbEnvironment::open(dir.path(), 16 * 1024 * 1024).expect("open env");
    let clock = Arc::new(FixedClock(AtomicU64::new(1_700_000_000)));
    let ledger = LmdbAttemptLedger::with_clock(&env, clock.clone());
    (dir, ledger, clock)
}

fn email(raw: &str) -> Email {
    Email::parse(raw).unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_email_is_not_found() {
    let (_dir, ledger, _) = temp_ledger();
    let err = ledger.get_status(&email("a@x.com")).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn successful_attempt_is_persisted() {
    let (_dir, ledger, _) = temp_ledger();
    let record = ledger.record_attempt(&email("a@x.com"), true).await.unwrap();
    assert!(record.processed);
    assert_eq!(record.attempted_at, Timestamp::new(1_700_000_000));

    assert!(ledger.get_status(&email("a@x.com")).await.unwrap());
    assert_eq!(ledger.get_record(&email("a@x.com")).await.unwrap(), record);
}

#[tokio::test]
async fn failed_attempt_can_be_upgraded() {
    let (_dir, ledger, clock) = temp_ledger();
    ledger.record_attempt(&email("a@x.com"), false).await.unwrap();
    assert!(!ledger.get_status(&email("a@x.com")).await.unwrap());

    clock.0.store(1_700_000_500, Ordering::SeqCst);
    let record = ledger.record_attempt(&email("a@x.com"), true).await.unwrap();
    assert!(record.processed);
    assert_eq!(record.attempted_at, Timestamp::new(1_700_000_500));
}

#[tokio::test]
async fn verified_record_is_never_overwritten() {
    let (_dir, ledger, _) = temp_ledger();
    ledger.record_attempt(&email("a@x.com"), true).await.unwrap();

    let err = ledger.record_attempt(&email("a@x.com"), false).await.unwrap_err();
    assert!(matches!(err, StoreError::AlreadyRecorded(_)));
    assert!(ledger.get_status(&email("a@x.com")).await.unwrap());
}

#[tokio::test]
async fn delete_allows_fresh_attempt() {
    let (_dir, ledger, _) = temp_ledger();
    ledger.record_attempt(&email("a@x.com"), true).await.unwrap();

    assert!(ledger.delete_record(&email("a@x.com")).await.unwrap());
    assert!(!ledger.delete_record(&email("a@x.com")).await.unwrap());
    assert!(ledger.record_attempt(&email("a@x.com"), true).await.is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_successes_admit_exactly_one() {
    let (_dir, ledger, _) = temp_ledger();
    let ledger = Arc::new(ledger);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let ledger = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move {
            ledger.record_attempt(&email("race@x.com"), true).await
        }));
    }

    let mut ok = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(StoreError::AlreadyRecorded(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(conflicts, 7);
}

#[tokio::test]
async fn records_survive_reopen() {
    let dir = tempfile::tempdir().expect("temp dir");
    {
        let env = LmdbEnvironment::open(dir.path(), 16 * 1024 * 1024).unwrap();
        let ledger = LmdbAttemptLedger::new(&env);
        ledger.record_attempt(&email("a@x.com"), true).await.unwrap();
    }
    let env = LmdbEnvironment::open(dir.path(), 16 * 1024 * 1024).unwrap();
    let ledger = LmdbAttemptLedger::new(&env);
    assert!(ledger.get_status(&email("a@x.com")).await.unwrap());
}
