//! The outcome of a completed verification decision.

use serde::{Deserialize, Serialize};

/// Result of a verification that ran to completion.
///
/// `verified == false` is still a completed decision, not an error.
/// Built once per request and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub verified: bool,
    /// Similarity reported by the face comparison, 0–100.
    pub similarity: f32,
    /// Human-readable summary of the decision.
    pub message: String,
}
