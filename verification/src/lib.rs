//! KYC verification core.
//!
//! Two pieces:
//! 1. **Policy engine**: runs document analysis, face detection and face
//!    comparison against the vision provider in a fixed order, gates the
//!    selfie on face count and quality, and turns the similarity score into
//!    a pass/fail decision.
//! 2. **Orchestrator**: wraps the policy engine with duplicate prevention.
//!    It refuses emails that already verified, validates the uploaded
//!    payloads, and records each completed decision in the attempt ledger.

pub mod error;
pub mod orchestrator;
pub mod policy;
pub mod submission;

pub use error::{ErrorClass, VerificationError};
pub use orchestrator::VerificationOrchestrator;
pub use policy::PolicyEngine;
pub use submission::{ImagePayload, KycSubmission, ID_IMAGE_FIELD, SELFIE_FIELD};
