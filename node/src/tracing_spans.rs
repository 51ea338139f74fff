//! Span constructors shared by the gateway's components.

use tracing::{info_span, Span};

/// Root span of a running gateway.
pub fn gateway_span(port: u16) -> Span {
    info_span!("gateway", port = port)
}

/// Parent span handed to the policy engine; each verification run opens a
/// child of it.
pub fn policy_span(provider: &str) -> Span {
    info_span!("policy", provider = %provider)
}
