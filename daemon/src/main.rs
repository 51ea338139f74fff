//! KYC gateway daemon — entry point for running the verification gateway.

use anyhow::Context;
use clap::Parser;
use kyc_node::{init_logging, GatewayConfig, KycNode, LedgerBackend};
use kyc_rpc::TokenIssuer;
use kyc_store::StoreError;
use kyc_types::Email;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kyc-gateway", about = "KYC verification gateway", version)]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "KYC_CONFIG")]
    config: Option<PathBuf>,

    /// HTTP listen port.
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    #[arg(long, env = "AWS_REGION")]
    aws_region: Option<String>,

    #[arg(long, env = "AWS_ACCESS_KEY_ID", hide_env_values = true)]
    aws_access_key_id: Option<String>,

    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)]
    aws_secret_access_key: Option<String>,

    #[arg(long, env = "AWS_SESSION_TOKEN", hide_env_values = true)]
    aws_session_token: Option<String>,

    /// Base URL replacing every regional AWS endpoint (e.g. a local stand-in).
    #[arg(long, env = "KYC_AWS_ENDPOINT")]
    aws_endpoint: Option<String>,

    /// Attempt ledger backend: "dynamodb" or "lmdb".
    #[arg(long, env = "KYC_LEDGER_BACKEND", value_parser = parse_backend)]
    ledger_backend: Option<LedgerBackend>,

    /// DynamoDB table holding attempt records.
    #[arg(long, env = "KYC_RECORD")]
    ledger_table: Option<String>,

    /// Data directory for the LMDB ledger.
    #[arg(long, env = "KYC_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// HS256 secret for API keys.
    #[arg(long, env = "JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Require a bearer API key on /kyc.
    #[arg(long, env = "KYC_REQUIRE_API_KEY")]
    require_api_key: Option<bool>,

    /// Requests allowed per client IP per window.
    #[arg(long, env = "KYC_RATE_LIMIT_MAX")]
    rate_limit_max: Option<u32>,

    #[arg(long, env = "KYC_RATE_LIMIT_WINDOW_SECS")]
    rate_limit_window_secs: Option<u64>,

    /// Distinct client addresses the rate limiter tracks at once.
    #[arg(long, env = "KYC_RATE_LIMIT_MAX_TRACKED_IPS")]
    rate_limit_max_tracked_ips: Option<usize>,

    /// Deadline for one /kyc submission, in seconds.
    #[arg(long, env = "KYC_REQUEST_TIMEOUT_SECS")]
    request_timeout_secs: Option<u64>,

    /// Timeout for one AWS call, in seconds.
    #[arg(long, env = "KYC_PROVIDER_TIMEOUT_SECS")]
    provider_timeout_secs: Option<u64>,

    #[arg(long, env = "KYC_MAX_UPLOAD_BYTES")]
    max_upload_bytes: Option<usize>,

    #[arg(long, env = "KYC_MIN_CONFIDENCE")]
    min_confidence: Option<f32>,

    #[arg(long, env = "KYC_MIN_BRIGHTNESS")]
    min_brightness: Option<f32>,

    #[arg(long, env = "KYC_MIN_SHARPNESS")]
    min_sharpness: Option<f32>,

    #[arg(long, env = "KYC_MIN_SIMILARITY")]
    min_similarity: Option<f32>,

    /// Log format: "human" or "json".
    #[arg(long, env = "KYC_LOG_FORMAT")]
    log_format: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "KYC_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the HTTP gateway.
    Serve,

    /// Inspect or reset attempt records.
    Ledger {
        #[command(subcommand)]
        action: LedgerAction,
    },

    /// Print a freshly signed API key.
    ApiKey,
}

#[derive(clap::Subcommand)]
enum LedgerAction {
    /// Show the stored record for an email.
    Status {
        #[arg(long)]
        email: String,
    },
    /// Delete the record for an email so it may verify again.
    Reset {
        #[arg(long)]
        email: String,
    },
}

fn parse_backend(s: &str) -> Result<LedgerBackend, String> {
    match s.to_ascii_lowercase().as_str() {
        "dynamodb" => Ok(LedgerBackend::Dynamodb),
        "lmdb" => Ok(LedgerBackend::Lmdb),
        other => Err(format!("unknown ledger backend {other:?}")),
    }
}

impl Cli {
    /// File settings (or defaults) with every flag and env var applied.
    fn gateway_config(&self) -> anyhow::Result<GatewayConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let path = path.to_string_lossy();
                GatewayConfig::from_toml_file(&path)
                    .with_context(|| format!("failed to load config file {path}"))?
            }
            None => GatewayConfig::default(),
        };

        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        fn set_opt<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *target = value.clone();
            }
        }

        set(&mut config.port, &self.port);
        set(&mut config.aws_region, &self.aws_region);
        set_opt(&mut config.aws_access_key_id, &self.aws_access_key_id);
        set_opt(&mut config.aws_secret_access_key, &self.aws_secret_access_key);
        set_opt(&mut config.aws_session_token, &self.aws_session_token);
        set_opt(&mut config.aws_endpoint_override, &self.aws_endpoint);
        set(&mut config.ledger_backend, &self.ledger_backend);
        set(&mut config.ledger_table, &self.ledger_table);
        set(&mut config.data_dir, &self.data_dir);
        set(&mut config.jwt_secret, &self.jwt_secret);
        set(&mut config.require_api_key, &self.require_api_key);
        set(&mut config.rate_limit_max, &self.rate_limit_max);
        set(&mut config.rate_limit_window_secs, &self.rate_limit_window_secs);
        set(&mut config.rate_limit_max_tracked_ips, &self.rate_limit_max_tracked_ips);
        set(&mut config.request_timeout_secs, &self.request_timeout_secs);
        set(&mut config.provider_timeout_secs, &self.provider_timeout_secs);
        set(&mut config.max_upload_bytes, &self.max_upload_bytes);
        set(&mut config.criteria.min_confidence, &self.min_confidence);
        set(&mut config.criteria.min_brightness, &self.min_brightness);
        set(&mut config.criteria.min_sharpness, &self.min_sharpness);
        set(&mut config.criteria.min_similarity, &self.min_similarity);
        set(&mut config.log_format, &self.log_format);
        set(&mut config.log_level, &self.log_level);
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.gateway_config()?;
    init_logging(config.log_format()?, &config.log_level)?;

    match cli.command {
        Command::Serve => {
            tracing::info!(
                "Starting KYC gateway on port {} (ledger: {:?}, API key required: {})",
                config.port,
                config.ledger_backend,
                config.require_api_key,
            );
            let node = KycNode::new(config)?;
            node.start().await?;
            tracing::info!("KYC gateway exited cleanly");
        }
        Command::Ledger { action } => {
            let node = KycNode::new(config)?;
            match action {
                LedgerAction::Status { email } => {
                    let email = Email::parse(&email)?;
                    match node.ledger().get_record(&email).await {
                        Ok(record) => println!(
                            "{} processed={} attempted_at={}",
                            record.email,
                            record.processed,
                            record.attempted_at.to_rfc3339()
                        ),
                        Err(StoreError::NotFound(_)) => println!("{email} has no attempt record"),
                        Err(e) => return Err(e.into()),
                    }
                }
                LedgerAction::Reset { email } => {
                    let email = Email::parse(&email)?;
                    if node.ledger().delete_record(&email).await? {
                        tracing::info!(%email, "attempt record deleted");
                        println!("{email} reset");
                    } else {
                        println!("{email} has no attempt record");
                    }
                }
            }
        }
        Command::ApiKey => {
            if config.jwt_secret.trim().is_empty() {
                anyhow::bail!("jwt_secret must be set to issue API keys");
            }
            let issued = TokenIssuer::new(&config.jwt_secret).issue()?;
            println!("{}", issued.token);
            println!("expires {}", issued.expires.to_rfc3339());
        }
    }

    Ok(())
}
