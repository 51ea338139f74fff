//! Duplicate-prevention wrapper around the policy engine.

use std::sync::Arc;

use kyc_store::{AttemptLedger, StoreError};
use kyc_types::{Email, KycError, VerificationResult};
use tracing::{info, warn};

use crate::{KycSubmission, PolicyEngine, VerificationError};

pub struct VerificationOrchestrator {
    ledger: Arc<dyn AttemptLedger>,
    engine: PolicyEngine,
}

impl VerificationOrchestrator {
    pub fn new(ledger: Arc<dyn AttemptLedger>, engine: PolicyEngine) -> Self {
        Self { ledger, engine }
    }

    pub fn engine(&self) -> &PolicyEngine {
        &self.engine
    }

    pub fn ledger(&self) -> &Arc<dyn AttemptLedger> {
        &self.ledger
    }

    /// Process one submission end to end.
    ///
    /// An email that already verified is refused before any image is
    /// looked at. A completed decision, pass or fail, is recorded; a policy
    /// failure leaves the ledger untouched.
    pub async fn handle(
        &self,
        submission: KycSubmission,
    ) -> Result<VerificationResult, VerificationError> {
        let email = parse_email(&submission.email)?;

        match self.ledger.get_status(&email).await {
            Ok(true) => {
                info!(%email, "refusing already verified email");
                return Err(VerificationError::AlreadyVerified(email.to_string()));
            }
            Ok(false) | Err(StoreError::NotFound(_)) => {}
            Err(e) => {
                warn!(%email, error = %e, "ledger status lookup failed");
                return Err(VerificationError::Ledger(e));
            }
        }

        let (id_image, selfie) = submission.images()?;
        info!(%email, "starting KYC verification");
        let result = self.engine.verify(&id_image.bytes, &selfie.bytes).await?;

        match self.ledger.record_attempt(&email, result.verified).await {
            Ok(_) => Ok(result),
            Err(StoreError::AlreadyRecorded(_)) => {
                // A concurrent submission for the same email verified first.
                info!(%email, "lost race to a concurrent successful verification");
                Err(VerificationError::AlreadyRecorded(email.to_string()))
            }
            Err(e) => {
                warn!(%email, error = %e, "failed to record attempt");
                Err(VerificationError::Ledger(e))
            }
        }
    }
}

fn parse_email(raw: &str) -> Result<Email, VerificationError> {
    Email::parse(raw).map_err(|e| match e {
        KycError::EmptyEmail => VerificationError::MissingEmail,
        other => VerificationError::InvalidEmail(other.to_string()),
    })
}
