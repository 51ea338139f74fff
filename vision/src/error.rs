use thiserror::Error;

/// Failures talking to the vision provider.
///
/// None of these are retried by the gateway.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum VisionError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("provider call timed out")]
    Timeout,

    #[error("provider rejected credentials: {0}")]
    Auth(String),

    #[error("provider throttled the request: {0}")]
    Throttled(String),

    #[error("provider error {code}: {message}")]
    Provider { code: String, message: String },

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}
