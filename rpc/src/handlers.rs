//! Route handlers.

use std::sync::Arc;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use kyc_types::VerificationResult;
use kyc_verification::{
    ImagePayload, KycSubmission, VerificationError, ID_IMAGE_FIELD, SELFIE_FIELD,
};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, Instrument};

use crate::{RpcError, RpcState};

// ── Verification ─────────────────────────────────────────────────────────

/// Body of every `/kyc` response, success or failure.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KycResponse {
    pub success: bool,
    pub verified: bool,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub similarity: f32,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

fn is_zero(v: &f32) -> bool {
    *v == 0.0
}

impl KycResponse {
    pub fn failure(error: String) -> Self {
        Self {
            error,
            ..Self::default()
        }
    }
}

impl From<VerificationResult> for KycResponse {
    fn from(result: VerificationResult) -> Self {
        Self {
            success: true,
            verified: result.verified,
            similarity: result.similarity,
            message: result.message,
            error: String::new(),
        }
    }
}

pub async fn kyc(
    State(state): State<Arc<RpcState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<KycResponse>, RpcError> {
    state.metrics.submissions.inc();
    let timer = state.metrics.verification_seconds.start_timer();
    let outcome = submit(&state, multipart).await;
    timer.observe_duration();

    match &outcome {
        Ok(result) if result.verified => state.metrics.verified.inc(),
        Ok(_) => state.metrics.rejected.inc(),
        Err(e) => state
            .metrics
            .failures
            .with_label_values(&[failure_kind(e)])
            .inc(),
    }
    outcome.map(|result| Json(result.into()))
}

async fn submit(
    state: &RpcState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<VerificationResult, RpcError> {
    let multipart = multipart.map_err(|e| RpcError::BadRequest(e.body_text()))?;
    let submission = read_submission(multipart, state.settings.max_upload_bytes).await?;

    let span = info_span!("kyc_request", email = %submission.email.trim());
    let deadline = state.settings.request_timeout;
    let handled = tokio::time::timeout(deadline, state.orchestrator.handle(submission))
        .instrument(span)
        .await;

    match handled {
        Ok(result) => {
            let result = result?;
            info!(verified = result.verified, similarity = result.similarity, "KYC response sent");
            Ok(result)
        }
        Err(_) => Err(VerificationError::Timeout(deadline.as_secs()).into()),
    }
}

/// Collect the form fields. Unknown fields are skipped; a repeated field
/// keeps its last value.
async fn read_submission(
    mut multipart: Multipart,
    limit: usize,
) -> Result<KycSubmission, RpcError> {
    let mut submission = KycSubmission::default();
    let field_error = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            RpcError::PayloadTooLarge(limit)
        } else {
            RpcError::BadRequest(e.body_text())
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(field_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "email" => submission.email = field.text().await.map_err(field_error)?,
            ID_IMAGE_FIELD | SELFIE_FIELD => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(field_error)?.to_vec();
                let payload = ImagePayload {
                    content_type,
                    bytes,
                };
                if name == ID_IMAGE_FIELD {
                    submission.id_image = Some(payload);
                } else {
                    submission.selfie = Some(payload);
                }
            }
            _ => {}
        }
    }
    Ok(submission)
}

fn failure_kind(e: &RpcError) -> &'static str {
    match e {
        RpcError::Verification(v) => v.kind(),
        RpcError::PayloadTooLarge(_) => "payload_too_large",
        _ => "bad_request",
    }
}

// ── API keys ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ApiKeyResponse {
    pub success: bool,
    pub api_key: String,
    /// RFC 3339 expiry.
    pub expires: String,
}

pub async fn api_key(State(state): State<Arc<RpcState>>) -> Result<Json<ApiKeyResponse>, RpcError> {
    let issued = state.tokens.issue()?;
    state.metrics.api_keys_issued.inc();
    info!(expires = %issued.expires.to_rfc3339(), "API key issued");
    Ok(Json(ApiKeyResponse {
        success: true,
        api_key: issued.token,
        expires: issued.expires.to_rfc3339(),
    }))
}

// ── Health / metrics ─────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "kyc-verification",
    })
}

pub async fn metrics(State(state): State<Arc<RpcState>>) -> Result<impl IntoResponse, RpcError> {
    let body = state
        .metrics
        .encode()
        .map_err(|e| RpcError::Server(format!("failed to encode metrics: {e}")))?;
    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_body_omits_error() {
        let body = serde_json::to_value(KycResponse::from(VerificationResult {
            verified: true,
            similarity: 85.0,
            message: "KYC verification successful with 85.00% similarity".into(),
        }))
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "success": true,
                "verified": true,
                "similarity": 85.0,
                "message": "KYC verification successful with 85.00% similarity"
            })
        );
    }

    #[test]
    fn failure_body_omits_similarity() {
        let body = serde_json::to_value(KycResponse::failure("Email is required".into())).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "success": false,
                "verified": false,
                "message": "",
                "error": "Email is required"
            })
        );
    }
}
