//! Attempt ledger trait.
//!
//! One record per email. `processed == true` means a verification for that
//! email already succeeded and further submissions are refused.
//!
//! Write policy shared by every backend:
//! - no record: insert
//! - record with `processed == false`: replace
//! - record with `processed == true`: refuse with [`StoreError::AlreadyRecorded`]
//!
//! Backends must apply this as one atomic conditional write so that two
//! concurrent writers for the same email can never both succeed over a
//! verified record.

use crate::StoreError;
use async_trait::async_trait;
use kyc_types::{Email, Timestamp};
use serde::{Deserialize, Serialize};

/// Persisted per-identity verification state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub email: Email,
    pub attempted_at: Timestamp,
    /// True once a verification for this email has succeeded.
    pub processed: bool,
}

/// Apply the write policy against the currently stored record.
pub fn check_overwrite(existing: Option<&AttemptRecord>) -> Result<(), StoreError> {
    match existing {
        Some(record) if record.processed => {
            Err(StoreError::AlreadyRecorded(record.email.to_string()))
        }
        _ => Ok(()),
    }
}

/// Durable mapping from email to prior-verification state.
#[async_trait]
pub trait AttemptLedger: Send + Sync {
    /// Fetch the full record, or [`StoreError::NotFound`].
    async fn get_record(&self, email: &Email) -> Result<AttemptRecord, StoreError>;

    /// Whether a prior verification for `email` succeeded.
    ///
    /// Returns [`StoreError::NotFound`] when the email was never recorded.
    async fn get_status(&self, email: &Email) -> Result<bool, StoreError> {
        self.get_record(email).await.map(|r| r.processed)
    }

    /// Record the outcome of a completed verification, stamped with the
    /// backend's current time.
    async fn record_attempt(
        &self,
        email: &Email,
        success: bool,
    ) -> Result<AttemptRecord, StoreError>;

    /// Remove a record so the email may verify again. Returns whether a
    /// record existed.
    async fn delete_record(&self, email: &Email) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(processed: bool) -> AttemptRecord {
        AttemptRecord {
            email: Email::parse("a@x.com").unwrap(),
            attempted_at: Timestamp::new(1_700_000_000),
            processed,
        }
    }

    #[test]
    fn absent_record_admits_write() {
        assert!(check_overwrite(None).is_ok());
    }

    #[test]
    fn failed_record_admits_overwrite() {
        assert!(check_overwrite(Some(&record(false))).is_ok());
    }

    #[test]
    fn verified_record_refuses_overwrite() {
        let err = check_overwrite(Some(&record(true))).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyRecorded(ref e) if e == "a@x.com"));
    }
}
