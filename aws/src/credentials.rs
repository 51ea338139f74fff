//! Static credentials and endpoint selection.

use std::fmt;

#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl AwsCredentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }
}

// Secrets stay out of logs.
impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct AwsConfig {
    pub credentials: AwsCredentials,
    pub region: String,
    /// Base URL used instead of the regional endpoint, e.g. a local stand-in.
    pub endpoint_override: Option<String>,
}

impl AwsConfig {
    pub fn new(credentials: AwsCredentials, region: impl Into<String>) -> Self {
        Self {
            credentials,
            region: region.into(),
            endpoint_override: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint_override = Some(endpoint.into());
        self
    }

    /// Base URL for `service`: the override if set, otherwise
    /// `https://{service}.{region}.amazonaws.com`.
    pub fn endpoint_for(&self, service: &str) -> String {
        match &self.endpoint_override {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{service}.{}.amazonaws.com", self.region),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regional_endpoint() {
        let config = AwsConfig::new(AwsCredentials::new("AKID", "secret"), "eu-west-1");
        assert_eq!(
            config.endpoint_for("rekognition"),
            "https://rekognition.eu-west-1.amazonaws.com"
        );
    }

    #[test]
    fn override_wins() {
        let config = AwsConfig::new(AwsCredentials::new("AKID", "secret"), "us-east-1")
            .with_endpoint("http://127.0.0.1:4566/");
        assert_eq!(config.endpoint_for("dynamodb"), "http://127.0.0.1:4566");
    }

    #[test]
    fn debug_redacts_secret() {
        let creds = AwsCredentials::new("AKID", "topsecret").with_session_token("tok");
        let shown = format!("{creds:?}");
        assert!(!shown.contains("topsecret"));
        assert!(!shown.contains("tok\""));
        assert!(shown.contains("AKID"));
    }
}
