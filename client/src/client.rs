//! HTTP client for the gateway endpoints.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::ClientError;

/// Default timeout for one gateway request. Verification calls out to the
/// vision provider several times, so this is generous.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// One identity to verify.
#[derive(Clone, Debug)]
pub struct KycSubmissionRequest {
    pub email: String,
    /// JPEG bytes of the identity document.
    pub id_image: Vec<u8>,
    /// JPEG bytes of the live selfie.
    pub selfie: Vec<u8>,
}

/// Body of a `/kyc` response. Failures carry `success == false` and `error`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KycResponse {
    pub success: bool,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub similarity: f32,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ApiKey {
    pub api_key: String,
    /// RFC 3339 expiry.
    pub expires: String,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: String,
}

pub struct KycClient {
    base_url: String,
    api_key: Option<String>,
    http_client: reqwest::Client,
}

impl KycClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            http_client: build_http_client(DEFAULT_TIMEOUT),
        }
    }

    /// Send `Authorization: Bearer <key>` with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http_client = build_http_client(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit one verification.
    ///
    /// Verification failures come back as `Ok` with `success == false`;
    /// `Err` means no gateway response could be read at all.
    pub async fn submit_kyc(
        &self,
        request: &KycSubmissionRequest,
    ) -> Result<KycResponse, ClientError> {
        let form = Form::new()
            .text("email", request.email.clone())
            .part("id_image", jpeg_part(&request.id_image, "id_image.jpeg")?)
            .part("selfie", jpeg_part(&request.selfie, "selfie.jpeg")?);

        let response = self
            .authorized(self.http_client.post(self.url("/kyc")))
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let body: KycResponse = read_json(response).await?;

        tracing::debug!(
            status = status.as_u16(),
            success = body.success,
            verified = body.verified,
            "KYC submission answered"
        );
        Ok(body)
    }

    /// Ask the gateway for a fresh API key.
    pub async fn request_api_key(&self) -> Result<ApiKey, ClientError> {
        let response = self
            .authorized(self.http_client.post(self.url("/api-key")))
            .send()
            .await?;
        expect_success(response).await
    }

    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let response = self.http_client.get(self.url("/health")).send().await?;
        expect_success(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }
}

fn build_http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
        .build()
        .unwrap_or_default()
}

fn jpeg_part(bytes: &[u8], file_name: &'static str) -> Result<Part, ClientError> {
    Part::bytes(bytes.to_vec())
        .file_name(file_name)
        .mime_str("image/jpeg")
        .map_err(|e| ClientError::Transport(format!("failed to build multipart body: {e}")))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| {
        ClientError::InvalidResponse(format!("HTTP {status}: failed to parse body: {e}"))
    })
}

async fn expect_success<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return read_json(response).await;
    }
    let bytes = response.bytes().await?;
    let error = serde_json::from_slice::<ErrorBody>(&bytes)
        .map(|body| body.error)
        .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
    Err(ClientError::Rejected {
        status: status.as_u16(),
        error,
    })
}
