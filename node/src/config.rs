//! Gateway configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use kyc_aws::{AwsConfig, AwsCredentials};
use kyc_types::ValidationCriteria;

use crate::{LogFormat, NodeError};

/// Where attempt records are kept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerBackend {
    /// Local LMDB environment under `data_dir`.
    Lmdb,
    /// DynamoDB table `ledger_table`.
    #[default]
    Dynamodb,
}

/// Configuration for a KYC gateway.
///
/// Can be loaded from a TOML file via [`GatewayConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). The daemon layers CLI flags and
/// environment variables on top.
#[derive(Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// HTTP listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_aws_region")]
    pub aws_region: String,

    #[serde(default)]
    pub aws_access_key_id: Option<String>,

    #[serde(default)]
    pub aws_secret_access_key: Option<String>,

    #[serde(default)]
    pub aws_session_token: Option<String>,

    /// Base URL replacing every regional AWS endpoint.
    #[serde(default)]
    pub aws_endpoint_override: Option<String>,

    #[serde(default)]
    pub ledger_backend: LedgerBackend,

    /// DynamoDB table name.
    #[serde(default = "default_ledger_table")]
    pub ledger_table: String,

    /// Data directory for the LMDB ledger.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_lmdb_map_size")]
    pub lmdb_map_size: usize,

    /// HS256 secret for API keys.
    #[serde(default)]
    pub jwt_secret: String,

    /// Require a bearer API key on `/kyc`.
    #[serde(default)]
    pub require_api_key: bool,

    /// Requests allowed per client IP per window.
    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max: u32,

    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,

    /// Distinct client addresses the rate limiter tracks at once.
    #[serde(default = "default_rate_limit_max_tracked_ips")]
    pub rate_limit_max_tracked_ips: usize,

    /// Deadline for one `/kyc` submission.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Timeout for one AWS call.
    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter, e.g. "info" or "debug,kyc_verification=trace".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub criteria: ValidationCriteria,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_port() -> u16 {
    3001
}

fn default_aws_region() -> String {
    "us-east-1".to_string()
}

fn default_ledger_table() -> String {
    "kyc-records".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./kyc_data")
}

fn default_lmdb_map_size() -> usize {
    256 * 1024 * 1024
}

fn default_rate_limit_max() -> u32 {
    10
}

fn default_rate_limit_window_secs() -> u64 {
    60
}

fn default_rate_limit_max_tracked_ips() -> usize {
    kyc_rpc::DEFAULT_MAX_TRACKED_IPS
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_provider_timeout_secs() -> u64 {
    10
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GatewayConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, NodeError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| NodeError::Config(format!("{path}: {e}")))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, NodeError> {
        toml::from_str(s).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, NodeError> {
        toml::to_string_pretty(self).map_err(|e| NodeError::Config(e.to_string()))
    }

    /// Check everything that can be checked without touching the network.
    pub fn validate(&self) -> Result<(), NodeError> {
        self.criteria
            .validate()
            .map_err(|e| NodeError::Config(e.to_string()))?;
        if self.jwt_secret.trim().is_empty() {
            return Err(NodeError::Config("jwt_secret must be set".into()));
        }
        if self.rate_limit_max == 0
            || self.rate_limit_window_secs == 0
            || self.rate_limit_max_tracked_ips == 0
        {
            return Err(NodeError::Config(
                "rate_limit_max, rate_limit_window_secs and rate_limit_max_tracked_ips must be positive"
                    .into(),
            ));
        }
        if self.request_timeout_secs == 0 || self.provider_timeout_secs == 0 {
            return Err(NodeError::Config("timeouts must be positive".into()));
        }
        if self.max_upload_bytes == 0 {
            return Err(NodeError::Config("max_upload_bytes must be positive".into()));
        }
        self.log_format()?;
        self.aws_config()?;
        Ok(())
    }

    pub fn log_format(&self) -> Result<LogFormat, NodeError> {
        self.log_format.parse()
    }

    /// AWS settings for the vision provider and the DynamoDB ledger.
    pub fn aws_config(&self) -> Result<AwsConfig, NodeError> {
        let non_empty = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_string);
        let (Some(access_key_id), Some(secret)) = (
            non_empty(&self.aws_access_key_id),
            non_empty(&self.aws_secret_access_key),
        ) else {
            return Err(NodeError::Config(
                "aws_access_key_id and aws_secret_access_key must be set".into(),
            ));
        };

        let mut credentials = AwsCredentials::new(access_key_id, secret);
        if let Some(token) = non_empty(&self.aws_session_token) {
            credentials = credentials.with_session_token(token);
        }
        let mut config = AwsConfig::new(credentials, &self.aws_region);
        if let Some(endpoint) = non_empty(&self.aws_endpoint_override) {
            config = config.with_endpoint(endpoint);
        }
        Ok(config)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            aws_region: default_aws_region(),
            aws_access_key_id: None,
            aws_secret_access_key: None,
            aws_session_token: None,
            aws_endpoint_override: None,
            ledger_backend: LedgerBackend::default(),
            ledger_table: default_ledger_table(),
            data_dir: default_data_dir(),
            lmdb_map_size: default_lmdb_map_size(),
            jwt_secret: String::new(),
            require_api_key: false,
            rate_limit_max: default_rate_limit_max(),
            rate_limit_window_secs: default_rate_limit_window_secs(),
            rate_limit_max_tracked_ips: default_rate_limit_max_tracked_ips(),
            request_timeout_secs: default_request_timeout_secs(),
            provider_timeout_secs: default_provider_timeout_secs(),
            max_upload_bytes: default_max_upload_bytes(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            criteria: ValidationCriteria::default(),
        }
    }
}

// Secrets stay out of logs.
impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("GatewayConfig")
            .field("port", &self.port)
            .field("aws_region", &self.aws_region)
            .field("aws_access_key_id", &self.aws_access_key_id)
            .field("aws_secret_access_key", &redacted(&self.aws_secret_access_key))
            .field("aws_session_token", &redacted(&self.aws_session_token))
            .field("aws_endpoint_override", &self.aws_endpoint_override)
            .field("ledger_backend", &self.ledger_backend)
            .field("ledger_table", &self.ledger_table)
            .field("data_dir", &self.data_dir)
            .field("require_api_key", &self.require_api_key)
            .field("rate_limit_max", &self.rate_limit_max)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .field("rate_limit_max_tracked_ips", &self.rate_limit_max_tracked_ips)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("log_format", &self.log_format)
            .field("log_level", &self.log_level)
            .field("criteria", &self.criteria)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> GatewayConfig {
        GatewayConfig {
            aws_access_key_id: Some("AKID".into()),
            aws_secret_access_key: Some("secret".into()),
            jwt_secret: "jwt".into(),
            ..GatewayConfig::default()
        }
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = GatewayConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.port, 3001);
        assert_eq!(config.aws_region, "us-east-1");
        assert_eq!(config.ledger_backend, LedgerBackend::Dynamodb);
        assert_eq!(config.ledger_table, "kyc-records");
        assert_eq!(config.rate_limit_max, 10);
        assert_eq!(config.rate_limit_max_tracked_ips, 10_000);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.criteria, ValidationCriteria::default());
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            port = 8080
            ledger_backend = "lmdb"

            [criteria]
            min_similarity = 80.0
        "#;
        let config = GatewayConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.port, 8080);
        assert_eq!(config.ledger_backend, LedgerBackend::Lmdb);
        assert_eq!(config.criteria.min_similarity, 80.0);
        assert_eq!(config.criteria.min_confidence, 90.0);
        assert_eq!(config.log_format, "human");
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = valid();
        let parsed = GatewayConfig::from_toml_str(&config.to_toml_string().unwrap()).unwrap();
        assert_eq!(parsed.port, config.port);
        assert_eq!(parsed.jwt_secret, "jwt");
        assert_eq!(parsed.aws_access_key_id.as_deref(), Some("AKID"));
    }

    #[test]
    fn validation() {
        assert!(valid().validate().is_ok());

        let no_secret = GatewayConfig {
            jwt_secret: " ".into(),
            ..valid()
        };
        assert!(no_secret.validate().is_err());

        let no_aws = GatewayConfig {
            aws_secret_access_key: Some(String::new()),
            ..valid()
        };
        assert!(no_aws.validate().is_err());

        let mut bad_criteria = valid();
        bad_criteria.criteria.min_similarity = 120.0;
        assert!(bad_criteria.validate().is_err());

        let no_tracking = GatewayConfig {
            rate_limit_max_tracked_ips: 0,
            ..valid()
        };
        assert!(no_tracking.validate().is_err());

        let bad_format = GatewayConfig {
            log_format: "xml".into(),
            ..valid()
        };
        assert!(bad_format.validate().is_err());
    }

    #[test]
    fn aws_config_carries_overrides() {
        let config = GatewayConfig {
            aws_session_token: Some("tok".into()),
            aws_endpoint_override: Some("http://localhost:4566".into()),
            aws_region: "eu-central-1".into(),
            ..valid()
        };
        let aws = config.aws_config().unwrap();
        assert_eq!(aws.region, "eu-central-1");
        assert_eq!(aws.credentials.session_token.as_deref(), Some("tok"));
        assert_eq!(aws.endpoint_for("rekognition"), "http://localhost:4566");
    }

    #[test]
    fn debug_hides_secrets() {
        let shown = format!("{:?}", valid());
        assert!(!shown.contains("\"secret\""));
        assert!(!shown.contains("jwt"));
    }
}
