//! HTTP surface for the KYC gateway.
//!
//! Routes:
//! - `POST /kyc`: multipart verification submission
//! - `POST /api-key`: issue a signed bearer token
//! - `GET /health`: liveness
//! - `GET /metrics`: Prometheus text exposition
//!
//! Every route sits behind permissive CORS and a per-client-IP rate limit.
//! `/kyc` optionally requires a bearer token issued by `/api-key`.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod rate_limit;
pub mod server;

pub use auth::{IssuedToken, TokenClaims, TokenIssuer};
pub use error::RpcError;
pub use handlers::KycResponse;
pub use metrics::RpcMetrics;
pub use rate_limit::{RateLimiter, DEFAULT_MAX_TRACKED_IPS};
pub use server::{router, RpcServer, RpcSettings, RpcState};
