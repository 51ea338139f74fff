//! Client behaviour against an in-process stand-in for the gateway.

use std::net::SocketAddr;
use std::time::Duration;

use axum::extract::Multipart;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use kyc_client::{ClientError, KycClient, KycSubmissionRequest};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Echoes what it received so tests can check the wire format.
async fn kyc(headers: HeaderMap, mut multipart: Multipart) -> (StatusCode, Json<Value>) {
    let mut email = String::new();
    let mut files = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.unwrap_or_default();
        if name == "email" {
            email = String::from_utf8_lossy(&bytes).into_owned();
        } else {
            files.push(format!(
                "{name}:{}:{}:{}",
                file_name.unwrap_or_default(),
                content_type.unwrap_or_default(),
                bytes.len()
            ));
        }
    }

    if email == "done@example.com" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "success": false,
                "verified": false,
                "message": "",
                "error": "KYC with this email is already done successfully",
            })),
        );
    }

    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("none")
        .to_string();
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "verified": true,
            "similarity": 91.25,
            "message": format!("{email}|{}|{auth}", files.join(",")),
        })),
    )
}

async fn api_key() -> Json<Value> {
    Json(json!({
        "success": true,
        "api_key": "header.claims.sig",
        "expires": "2026-11-17T00:00:00+00:00",
    }))
}

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn gateway() -> Router {
    Router::new()
        .route("/kyc", post(kyc))
        .route("/api-key", post(api_key))
        .route(
            "/health",
            get(|| async { Json(json!({"status": "healthy", "service": "kyc-verification"})) }),
        )
}

fn submission(email: &str) -> KycSubmissionRequest {
    KycSubmissionRequest {
        email: email.into(),
        id_image: vec![0xFF; 12],
        selfie: vec![0xFF; 7],
    }
}

#[tokio::test]
async fn submit_sends_jpeg_parts_and_bearer() {
    let base = spawn(gateway()).await;
    let client = KycClient::new(&base).with_api_key("tok");

    let response = client.submit_kyc(&submission("a@example.com")).await.unwrap();

    assert!(response.success && response.verified);
    assert_eq!(response.similarity, 91.25);
    assert_eq!(
        response.message,
        "a@example.com|id_image:id_image.jpeg:image/jpeg:12,selfie:selfie.jpeg:image/jpeg:7|Bearer tok"
    );
}

#[tokio::test]
async fn error_status_body_is_returned_as_response() {
    let base = spawn(gateway()).await;
    let response = KycClient::new(&base)
        .submit_kyc(&submission("done@example.com"))
        .await
        .unwrap();

    assert!(!response.success);
    assert_eq!(
        response.error.as_deref(),
        Some("KYC with this email is already done successfully")
    );
}

#[tokio::test]
async fn api_key_and_health() {
    let base = spawn(gateway()).await;
    let client = KycClient::new(&base);

    let key = client.request_api_key().await.unwrap();
    assert_eq!(key.api_key, "header.claims.sig");

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.service, "kyc-verification");
}

#[tokio::test]
async fn api_key_failure_is_rejected() {
    let app = Router::new().route(
        "/api-key",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"success": false, "error": "Failed to generate API key"})),
            )
        }),
    );
    let base = spawn(app).await;

    match KycClient::new(&base).request_api_key().await {
        Err(ClientError::Rejected { status, error }) => {
            assert_eq!(status, 500);
            assert_eq!(error, "Failed to generate API key");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_body_is_invalid_response() {
    let app = Router::new().route("/kyc", post(|| async { "<html>bad gateway</html>" }));
    let base = spawn(app).await;

    let err = KycClient::new(&base)
        .submit_kyc(&submission("a@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse(_)), "{err:?}");
}

#[tokio::test]
async fn slow_gateway_times_out() {
    let app = Router::new().route(
        "/health",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "late"
        }),
    );
    let base = spawn(app).await;

    let err = KycClient::new(&base)
        .with_timeout(Duration::from_millis(100))
        .health()
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Timeout(_)), "{err:?}");
}

#[tokio::test]
async fn unreachable_gateway_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = KycClient::new(format!("http://{addr}"))
        .health()
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)), "{err:?}");
}
