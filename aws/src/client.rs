//! AWS JSON protocol client.

use std::time::Duration;

use chrono::Utc;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::sigv4::SigV4Signer;
use crate::{AwsConfig, AwsError};

/// Default timeout for one provider call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Services reached through [`AwsJsonClient`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AwsService {
    Rekognition,
    Textract,
    DynamoDb,
}

impl AwsService {
    /// Name used in the endpoint host and the credential scope.
    pub fn signing_name(self) -> &'static str {
        match self {
            Self::Rekognition => "rekognition",
            Self::Textract => "textract",
            Self::DynamoDb => "dynamodb",
        }
    }

    fn target_prefix(self) -> &'static str {
        match self {
            Self::Rekognition => "RekognitionService",
            Self::Textract => "Textract",
            Self::DynamoDb => "DynamoDB_20120810",
        }
    }

    fn content_type(self) -> &'static str {
        match self {
            Self::DynamoDb => "application/x-amz-json-1.0",
            Self::Rekognition | Self::Textract => "application/x-amz-json-1.1",
        }
    }
}

/// Error body shape shared by the JSON protocol services.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type", default)]
    error_type: Option<String>,
    #[serde(alias = "Message", default)]
    message: Option<String>,
}

/// Signed POST client for one AWS service.
#[derive(Clone)]
pub struct AwsJsonClient {
    http: reqwest::Client,
    service: AwsService,
    url: Url,
    host: String,
    signer: SigV4Signer,
}

impl AwsJsonClient {
    pub fn new(config: &AwsConfig, service: AwsService) -> Result<Self, AwsError> {
        Self::with_timeout(config, service, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        config: &AwsConfig,
        service: AwsService,
        timeout: Duration,
    ) -> Result<Self, AwsError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| AwsError::Transport(e.to_string()))?;

        let endpoint = config.endpoint_for(service.signing_name());
        let url = Url::parse(&format!("{endpoint}/"))
            .map_err(|e| AwsError::Endpoint(format!("{endpoint}: {e}")))?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(AwsError::Endpoint(format!("{endpoint}: missing host"))),
        };

        Ok(Self {
            http,
            service,
            url,
            host,
            signer: SigV4Signer::new(
                config.credentials.clone(),
                &config.region,
                service.signing_name(),
            ),
        })
    }

    pub fn service(&self) -> AwsService {
        self.service
    }

    /// Invoke `operation` with a JSON request body.
    pub async fn call<Req, Resp>(&self, operation: &str, request: &Req) -> Result<Resp, AwsError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let body = serde_json::to_vec(request)
            .map_err(|e| AwsError::InvalidResponse(format!("failed to encode request: {e}")))?;
        let target = format!("{}.{operation}", self.service.target_prefix());
        let content_type = self.service.content_type();

        let signed = self.signer.sign(
            "POST",
            self.url.path(),
            &[
                ("content-type", content_type),
                ("host", &self.host),
                ("x-amz-target", &target),
            ],
            &body,
            Utc::now(),
        )?;

        let mut builder = self
            .http
            .post(self.url.clone())
            .header(CONTENT_TYPE, content_type)
            .header("x-amz-target", &target)
            .header("x-amz-date", &signed.amz_date)
            .header("authorization", &signed.authorization);
        if let Some(token) = &signed.security_token {
            builder = builder.header("x-amz-security-token", token);
        }

        tracing::trace!(service = self.service.signing_name(), %target, bytes = body.len(), "aws call");
        let response = builder.body(body).send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let err = decode_error(status.as_u16(), &headers, &bytes);
            tracing::debug!(%target, error = %err, "aws call failed");
            return Err(err);
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            AwsError::InvalidResponse(format!("failed to parse {operation} response: {e}"))
        })
    }
}

fn decode_error(status: u16, headers: &HeaderMap, body: &[u8]) -> AwsError {
    let parsed: Option<ErrorBody> = serde_json::from_slice(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|b| b.message.clone())
        .unwrap_or_default();

    let code = parsed
        .and_then(|b| b.error_type)
        .or_else(|| {
            headers
                .get("x-amzn-errortype")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .map(|raw| normalize_code(&raw))
        .unwrap_or_else(|| format!("HTTP{status}"));

    AwsError::from_code(status, code, message)
}

/// `com.amazonaws.dynamodb.v20120810#ConditionalCheckFailedException` and
/// `ThrottlingException:http://internal...` both become the bare name.
fn normalize_code(raw: &str) -> String {
    let after_hash = raw.rsplit('#').next().unwrap_or(raw);
    after_hash
        .split(':')
        .next()
        .unwrap_or(after_hash)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AwsCredentials;

    #[test]
    fn normalizes_error_codes() {
        assert_eq!(
            normalize_code("com.amazonaws.dynamodb.v20120810#ConditionalCheckFailedException"),
            "ConditionalCheckFailedException"
        );
        assert_eq!(
            normalize_code("ThrottlingException:http://internal.amazon.com/"),
            "ThrottlingException"
        );
        assert_eq!(normalize_code("AccessDeniedException"), "AccessDeniedException");
    }

    #[test]
    fn decodes_body_error() {
        let body = br#"{"__type":"com.amazon.coral.service#ExpiredTokenException","message":"expired"}"#;
        let err = decode_error(400, &HeaderMap::new(), body);
        assert_eq!(
            err,
            AwsError::Auth {
                code: "ExpiredTokenException".into(),
                message: "expired".into()
            }
        );
    }

    #[test]
    fn falls_back_to_status_code() {
        let err = decode_error(503, &HeaderMap::new(), b"<html>");
        assert_eq!(err.code(), Some("HTTP503"));
    }

    #[test]
    fn host_includes_non_default_port() {
        let config = AwsConfig::new(AwsCredentials::new("AKID", "secret"), "us-east-1")
            .with_endpoint("http://127.0.0.1:4566");
        let client = AwsJsonClient::new(&config, AwsService::DynamoDb).unwrap();
        assert_eq!(client.host, "127.0.0.1:4566");
        assert_eq!(client.url.as_str(), "http://127.0.0.1:4566/");
    }

    #[test]
    fn rejects_unparseable_endpoint() {
        let config = AwsConfig::new(AwsCredentials::new("AKID", "secret"), "us-east-1")
            .with_endpoint("not a url");
        assert!(matches!(
            AwsJsonClient::new(&config, AwsService::Textract),
            Err(AwsError::Endpoint(_))
        ));
    }
}
