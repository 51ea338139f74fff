//! The gateway node: builds every component from configuration and runs the
//! HTTP server until shutdown.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use kyc_aws::{AwsConfig, AwsVisionService, DynamoAttemptLedger};
use kyc_rpc::{router, RateLimiter, RpcMetrics, RpcServer, RpcSettings, RpcState, TokenIssuer};
use kyc_store::AttemptLedger;
use kyc_store_lmdb::{LmdbAttemptLedger, LmdbEnvironment};
use kyc_verification::{PolicyEngine, VerificationOrchestrator};
use kyc_vision::VisionService;
use tokio::net::TcpListener;
use tracing::Instrument;

use crate::tracing_spans::{gateway_span, policy_span};
use crate::{GatewayConfig, LedgerBackend, NodeError, ShutdownController};

pub struct KycNode {
    config: GatewayConfig,
    ledger: Arc<dyn AttemptLedger>,
    state: Arc<RpcState>,
    shutdown: Arc<ShutdownController>,
}

impl KycNode {
    /// Validate `config` and build the AWS vision provider and the configured
    /// ledger backend.
    pub fn new(config: GatewayConfig) -> Result<Self, NodeError> {
        config.validate()?;
        let aws = config.aws_config()?;
        let provider_timeout = Duration::from_secs(config.provider_timeout_secs);

        let vision: Arc<dyn VisionService> =
            Arc::new(AwsVisionService::with_timeout(&aws, provider_timeout)?);
        let ledger = open_ledger(&config, &aws, provider_timeout)?;

        tracing::info!(
            region = %config.aws_region,
            ledger = ?config.ledger_backend,
            require_api_key = config.require_api_key,
            "gateway components initialised"
        );
        Ok(Self::with_components(config, vision, ledger))
    }

    /// Assemble a node from ready-made components. Only the RPC-level
    /// settings of `config` are used.
    pub fn with_components(
        config: GatewayConfig,
        vision: Arc<dyn VisionService>,
        ledger: Arc<dyn AttemptLedger>,
    ) -> Self {
        let engine = PolicyEngine::new(
            vision.clone(),
            config.criteria,
            policy_span(vision.name()),
        );
        let orchestrator = Arc::new(VerificationOrchestrator::new(ledger.clone(), engine));

        let state = Arc::new(RpcState {
            orchestrator,
            tokens: TokenIssuer::new(&config.jwt_secret),
            limiter: RateLimiter::new(
                config.rate_limit_max,
                Duration::from_secs(config.rate_limit_window_secs),
            )
            .with_max_tracked_ips(config.rate_limit_max_tracked_ips),
            metrics: RpcMetrics::new(),
            settings: RpcSettings {
                require_api_key: config.require_api_key,
                request_timeout: Duration::from_secs(config.request_timeout_secs),
                max_upload_bytes: config.max_upload_bytes,
            },
        });

        Self {
            config,
            ledger,
            state,
            shutdown: Arc::new(ShutdownController::new()),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<dyn AttemptLedger> {
        &self.ledger
    }

    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        self.shutdown.clone()
    }

    /// The HTTP application, for in-process use.
    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// Bind the configured port and serve until SIGINT/SIGTERM or a
    /// programmatic shutdown.
    pub async fn start(&self) -> Result<(), NodeError> {
        let addr = format!("0.0.0.0:{}", self.config.port);
        let listener = TcpListener::bind(&addr).await?;

        let signals = self.shutdown.clone();
        let signal_task = tokio::spawn(async move { signals.wait_for_signal().await });

        let result = self.serve(listener).await;
        signal_task.abort();
        result
    }

    /// Serve on an already bound listener until shutdown is triggered, then
    /// let in-flight requests finish.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), NodeError> {
        let server = RpcServer::with_state(self.config.port, self.state.clone());
        server
            .serve(listener, self.shutdown.notified())
            .instrument(gateway_span(self.config.port))
            .await?;
        tracing::info!("gateway stopped");
        Ok(())
    }
}

fn open_ledger(
    config: &GatewayConfig,
    aws: &AwsConfig,
    timeout: Duration,
) -> Result<Arc<dyn AttemptLedger>, NodeError> {
    match config.ledger_backend {
        LedgerBackend::Lmdb => {
            let path = config.data_dir.join("ledger");
            let env = LmdbEnvironment::open(&path, config.lmdb_map_size)?;
            tracing::info!(path = %path.display(), "opened LMDB attempt ledger");
            Ok(Arc::new(LmdbAttemptLedger::new(&env)))
        }
        LedgerBackend::Dynamodb => Ok(Arc::new(DynamoAttemptLedger::with_timeout(
            aws,
            config.ledger_table.clone(),
            timeout,
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &std::path::Path) -> GatewayConfig {
        GatewayConfig {
            aws_access_key_id: Some("AKID".into()),
            aws_secret_access_key: Some("secret".into()),
            jwt_secret: "jwt".into(),
            ledger_backend: LedgerBackend::Lmdb,
            data_dir: dir.to_path_buf(),
            lmdb_map_size: 10 * 1024 * 1024,
            ..GatewayConfig::default()
        }
    }

    #[test]
    fn builds_with_lmdb_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let node = KycNode::new(config(dir.path())).unwrap();
        assert_eq!(node.config().port, 3001);
        assert!(dir.path().join("ledger").exists());
    }

    #[test]
    fn rejects_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut bad = config(dir.path());
        bad.jwt_secret.clear();
        assert!(matches!(KycNode::new(bad), Err(NodeError::Config(_))));
    }
}
