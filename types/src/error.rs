//! Top-level error type shared across crates.

use thiserror::Error;

/// Common error type for value validation in the gateway.
#[derive(Debug, Error, PartialEq)]
pub enum KycError {
    #[error("email is required")]
    EmptyEmail,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("invalid validation criteria: {0}")]
    InvalidCriteria(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
