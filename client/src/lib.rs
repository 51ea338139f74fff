//! Client for the KYC verification gateway.
//!
//! Wraps the gateway's HTTP API: multipart submissions on `/kyc`, API key
//! issuance on `/api-key` and the `/health` probe.

pub mod client;
pub mod error;

pub use client::{ApiKey, HealthStatus, KycClient, KycResponse, KycSubmissionRequest};
pub use error::ClientError;
