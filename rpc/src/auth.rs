//! API-key issuance and the bearer-token gate.
//!
//! API keys are compact HS256 JWTs carrying only `iat` and `exp`. Holding a
//! valid, unexpired token signed with the gateway secret is the whole
//! authorization model; there is no per-key identity or revocation.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use kyc_types::{Clock, SystemClock, Timestamp};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::{RpcError, RpcState};

type HmacSha256 = Hmac<Sha256>;

/// Lifetime of an issued key: 30 days.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;

const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub iat: u64,
    pub exp: u64,
}

#[derive(Deserialize)]
struct TokenHeader {
    alg: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires: Timestamp,
}

pub struct TokenIssuer {
    secret: Vec<u8>,
    ttl_secs: u64,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self::with_clock(secret, DEFAULT_TOKEN_TTL_SECS, Arc::new(SystemClock))
    }

    pub fn with_clock(secret: impl AsRef<[u8]>, ttl_secs: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            ttl_secs,
            clock,
        }
    }

    pub fn issue(&self) -> Result<IssuedToken, RpcError> {
        let now = self.clock.now();
        let expires = now.plus_secs(self.ttl_secs);
        let claims = TokenClaims {
            iat: now.as_secs(),
            exp: expires.as_secs(),
        };
        let payload =
            serde_json::to_vec(&claims).map_err(|e| RpcError::Token(e.to_string()))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(HEADER.as_bytes()),
            URL_SAFE_NO_PAD.encode(&payload)
        );
        let signature = self.mac(signing_input.as_bytes())?.finalize().into_bytes();

        Ok(IssuedToken {
            token: format!("{signing_input}.{}", URL_SAFE_NO_PAD.encode(&signature)),
            expires,
        })
    }

    /// Check signature, algorithm and expiry.
    pub fn validate(&self, token: &str) -> Result<TokenClaims, RpcError> {
        let invalid = |reason: &str| RpcError::InvalidToken(reason.to_string());

        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid("malformed token"));
        };

        let header: TokenHeader = URL_SAFE_NO_PAD.decode(header)
            .ok()
            .and_then(|b| serde_json::from_slice(&b).ok())
            .ok_or_else(|| invalid("malformed header"))?;
        if header.alg != "HS256" {
            return Err(invalid("unexpected signing algorithm"));
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| invalid("malformed signature"))?;
        let signing_input_len = token.len() - signature_segment_len(token);
        self.mac(token[..signing_input_len].as_bytes())?
            .verify_slice(&signature)
            .map_err(|_| invalid("bad signature"))?;

        let claims: TokenClaims = URL_SAFE_NO_PAD.decode(payload)
            .ok()
            .and_then(|b| serde_json::from_slice(&b).ok())
            .ok_or_else(|| invalid("malformed claims"))?;
        if claims.exp <= self.clock.now().as_secs() {
            return Err(invalid("expired"));
        }
        Ok(claims)
    }

    fn mac(&self, data: &[u8]) -> Result<HmacSha256, RpcError> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|e| RpcError::Token(e.to_string()))?;
        mac.update(data);
        Ok(mac)
    }
}

/// Length of `.signature` at the end of the token.
fn signature_segment_len(token: &str) -> usize {
    token.rfind('.').map(|i| token.len() - i).unwrap_or(0)
}

/// Middleware guarding a route with `Authorization: Bearer <api key>`.
pub async fn require_api_key(
    State(state): State<Arc<RpcState>>,
    request: Request,
    next: Next,
) -> Result<Response, RpcError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let Some(token) = header.strip_prefix("Bearer ") else {
        state.metrics.auth_failures.inc();
        return Err(RpcError::MissingAuthorization);
    };

    if let Err(e) = state.tokens.validate(token) {
        state.metrics.auth_failures.inc();
        tracing::warn!(error = %e, "rejected API key");
        return Err(e);
    }
    Ok(next.run(request).await)
}
