//! Axum router and listener.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{middleware, Router};
use kyc_verification::VerificationOrchestrator;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::{auth, handlers, rate_limit, RateLimiter, RpcError, RpcMetrics, TokenIssuer};

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct RpcSettings {
    /// Gate `/kyc` behind a bearer API key.
    pub require_api_key: bool,
    /// Deadline for one `/kyc` submission, provider calls included.
    pub request_timeout: Duration,
    pub max_upload_bytes: usize,
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            require_api_key: false,
            request_timeout: Duration::from_secs(30),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// Shared state behind every handler.
pub struct RpcState {
    pub orchestrator: Arc<VerificationOrchestrator>,
    pub tokens: TokenIssuer,
    pub limiter: RateLimiter,
    pub metrics: RpcMetrics,
    pub settings: RpcSettings,
}

pub fn router(state: Arc<RpcState>) -> Router {
    let mut kyc = Router::new().route("/kyc", post(handlers::kyc));
    if state.settings.require_api_key {
        kyc = kyc.route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_key,
        ));
    }

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api-key", post(handlers::api_key))
        .route("/metrics", get(handlers::metrics))
        .merge(kyc)
        .layer(DefaultBodyLimit::max(state.settings.max_upload_bytes))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::limit_by_ip,
        ))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub struct RpcServer {
    pub port: u16,
    pub state: Arc<RpcState>,
}

impl RpcServer {
    pub fn with_state(port: u16, state: Arc<RpcState>) -> Self {
        Self { port, state }
    }

    /// Bind `0.0.0.0:{port}` and serve until `shutdown` resolves.
    pub async fn start<F>(&self, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| RpcError::Server(format!("failed to bind {addr}: {e}")))?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener. In-flight requests are drained
    /// after `shutdown` resolves.
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<(), RpcError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if let Ok(addr) = listener.local_addr() {
            info!("KYC gateway listening on {}", addr);
        }
        let app = router(self.state.clone());
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| RpcError::Server(e.to_string()))
    }
}
