//! Fundamental types for the KYC gateway.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! identity keys, timestamps, validation criteria, and verification results.

pub mod criteria;
pub mod email;
pub mod error;
pub mod result;
pub mod time;

pub use criteria::ValidationCriteria;
pub use email::Email;
pub use error::KycError;
pub use result::VerificationResult;
pub use time::{Clock, SystemClock, Timestamp};
