use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("gateway unreachable: {0}")]
    Transport(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("invalid gateway response: {0}")]
    InvalidResponse(String),

    /// The gateway answered with a non-success status and an error body.
    #[error("gateway rejected request (HTTP {status}): {error}")]
    Rejected { status: u16, error: String },
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::Timeout(e.to_string())
        } else if e.is_decode() {
            ClientError::InvalidResponse(e.to_string())
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}
