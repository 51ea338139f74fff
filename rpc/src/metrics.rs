//! Prometheus metrics for the gateway.
//!
//! [`RpcMetrics`] owns a dedicated [`Registry`] that `GET /metrics` encodes
//! into the Prometheus text exposition format.

use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_counter_with_registry, Encoder, Histogram, HistogramOpts, IntCounter,
    IntCounterVec, Opts, Registry, TextEncoder,
};

pub struct RpcMetrics {
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Submissions received on `/kyc`.
    pub submissions: IntCounter,
    /// Completed decisions with `verified == true`.
    pub verified: IntCounter,
    /// Completed decisions with `verified == false`.
    pub rejected: IntCounter,
    /// Failed submissions, by error kind.
    pub failures: IntCounterVec,
    pub api_keys_issued: IntCounter,
    pub auth_failures: IntCounter,
    pub rate_limited: IntCounter,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Wall time of a `/kyc` submission, in seconds.
    pub verification_seconds: Histogram,
}

impl RpcMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let submissions = register_int_counter_with_registry!(
            Opts::new("kyc_submissions_total", "Total KYC submissions received"),
            registry
        )
        .expect("failed to register submissions counter");

        let verified = register_int_counter_with_registry!(
            Opts::new("kyc_verified_total", "Total submissions that verified"),
            registry
        )
        .expect("failed to register verified counter");

        let rejected = register_int_counter_with_registry!(
            Opts::new(
                "kyc_rejected_total",
                "Total completed decisions below the similarity threshold"
            ),
            registry
        )
        .expect("failed to register rejected counter");

        let failures = register_int_counter_vec_with_registry!(
            Opts::new("kyc_failures_total", "Total failed submissions by error kind"),
            &["kind"],
            registry
        )
        .expect("failed to register failures counter");

        let api_keys_issued = register_int_counter_with_registry!(
            Opts::new("kyc_api_keys_issued_total", "Total API keys issued"),
            registry
        )
        .expect("failed to register api_keys_issued counter");

        let auth_failures = register_int_counter_with_registry!(
            Opts::new("kyc_auth_failures_total", "Total requests rejected by the API key gate"),
            registry
        )
        .expect("failed to register auth_failures counter");

        let rate_limited = register_int_counter_with_registry!(
            Opts::new("kyc_rate_limited_total", "Total requests rejected by the rate limiter"),
            registry
        )
        .expect("failed to register rate_limited counter");

        let verification_seconds = register_histogram_with_registry!(
            HistogramOpts::new(
                "kyc_verification_seconds",
                "Time to process a KYC submission"
            )
            .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
            registry
        )
        .expect("failed to register verification_seconds histogram");

        Self {
            registry,
            submissions,
            verified,
            rejected,
            failures,
            api_keys_issued,
            auth_failures,
            rate_limited,
            verification_seconds,
        }
    }

    /// Encode every registered metric in the text exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl Default for RpcMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_registered_metrics() {
        let metrics = RpcMetrics::new();
        metrics.submissions.inc();
        metrics.failures.with_label_values(&["no_face_match"]).inc();

        let text = metrics.encode().unwrap();
        assert!(text.contains("kyc_submissions_total 1"));
        assert!(text.contains("kyc_failures_total{kind=\"no_face_match\"} 1"));
    }
}
