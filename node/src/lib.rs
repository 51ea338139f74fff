//! KYC gateway node: turns a [`GatewayConfig`] into a running HTTP service.
//!
//! The node owns component construction. It picks the vision provider and
//! the attempt-ledger backend, builds the policy engine and orchestrator,
//! and hands the assembled state to the RPC server. It also owns process
//! concerns: logging initialisation and graceful shutdown.

pub mod config;
pub mod error;
pub mod logging;
pub mod node;
pub mod shutdown;
pub mod tracing_spans;

pub use config::{GatewayConfig, LedgerBackend};
pub use error::NodeError;
pub use logging::{init_logging, LogFormat};
pub use node::KycNode;
pub use shutdown::ShutdownController;
