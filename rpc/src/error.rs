//! RPC error types and their HTTP rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use kyc_verification::{ErrorClass, VerificationError, ID_IMAGE_FIELD};
use serde::Serialize;
use thiserror::Error;

use crate::KycResponse;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Failed to parse request body: {0}")]
    BadRequest(String),

    #[error("upload exceeds the {0} byte limit")]
    PayloadTooLarge(usize),

    #[error("Missing or invalid Authorization header")]
    MissingAuthorization,

    #[error("invalid API key: {0}")]
    InvalidToken(String),

    #[error("token error: {0}")]
    Token(String),

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error("server error: {0}")]
    Server(String),
}

/// Body of every non-`/kyc` error.
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::MissingAuthorization | Self::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Token(_) | Self::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Verification(e) => match e.status_class() {
                ErrorClass::Client => StatusCode::BAD_REQUEST,
                ErrorClass::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// The `error` string returned to callers.
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidToken(_) => "Invalid or expired API key".to_string(),
            Self::Token(_) => "Failed to generate API key".to_string(),
            Self::Verification(e) => verification_message(e),
            other => other.to_string(),
        }
    }
}

fn verification_message(e: &VerificationError) -> String {
    match e {
        VerificationError::MissingEmail => "Email is required".to_string(),
        VerificationError::InvalidEmail(_) => e.to_string(),
        VerificationError::AlreadyVerified(_) | VerificationError::AlreadyRecorded(_) => {
            e.to_string()
        }
        VerificationError::MissingOrInvalidFile { field, reason } => {
            let what = if field == ID_IMAGE_FIELD { "ID image" } else { "selfie" };
            format!("Failed to process {what}: {reason}")
        }
        VerificationError::Ledger(_) => format!("Failed to check email status: {e}"),
        other => format!("KYC verification failed: {other}"),
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.public_message();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "request failed: {self}");
        }
        match self {
            Self::Verification(_) => (status, Json(KycResponse::failure(error))).into_response(),
            _ => (
                status,
                Json(ErrorResponse {
                    success: false,
                    error,
                }),
            )
                .into_response(),
        }
    }
}
