//! A full gateway on a real socket, backed by nullable components.

use std::sync::Arc;
use std::time::Duration;

use kyc_node::{GatewayConfig, KycNode};
use kyc_nullables::{NullAttemptLedger, NullVisionService};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tokio::net::TcpListener;

async fn spawn_gateway(config: GatewayConfig) -> (Arc<KycNode>, String, tokio::task::JoinHandle<()>) {
    let node = Arc::new(KycNode::with_components(
        config,
        Arc::new(NullVisionService::new()),
        Arc::new(NullAttemptLedger::new()),
    ));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());

    let serving = node.clone();
    let handle = tokio::spawn(async move {
        serving.serve(listener).await.unwrap();
    });
    (node, base, handle)
}

fn config() -> GatewayConfig {
    GatewayConfig {
        jwt_secret: "integration".into(),
        ..GatewayConfig::default()
    }
}

fn form(email: &str) -> Form {
    let image = |name: &str| {
        Part::bytes(vec![0xFF, 0xD8, 0xFF])
            .file_name(format!("{name}.jpeg"))
            .mime_str("image/jpeg")
            .unwrap()
    };
    Form::new()
        .text("email", email.to_string())
        .part("id_image", image("id_image"))
        .part("selfie", image("selfie"))
}

#[tokio::test]
async fn serves_verification_and_shuts_down() {
    let (node, base, handle) = spawn_gateway(config()).await;
    let http = reqwest::Client::new();

    let health: Value = http
        .get(format!("{base}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "healthy");

    let response = http
        .post(format!("{base}/kyc"))
        .multipart(form("a@x.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["verified"], true);

    let email = kyc_types::Email::parse("a@x.com").unwrap();
    assert!(node.ledger().get_status(&email).await.unwrap());

    let again = http
        .post(format!("{base}/kyc"))
        .multipart(form("a@x.com"))
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), 400);

    node.shutdown_controller().shutdown();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server should stop after shutdown")
        .unwrap();
}

#[tokio::test]
async fn rate_limit_uses_peer_address() {
    let (node, base, handle) = spawn_gateway(GatewayConfig {
        rate_limit_max: 1,
        ..config()
    })
    .await;
    let http = reqwest::Client::new();

    let first = http.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(first.status(), 200);
    let second = http.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(second.status(), 429);

    node.shutdown_controller().shutdown();
    let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
}
