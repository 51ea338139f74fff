use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error("config error: {0}")]
    Config(String),

    #[error("AWS error: {0}")]
    Aws(#[from] kyc_aws::AwsError),

    #[error("LMDB error: {0}")]
    Lmdb(#[from] kyc_store_lmdb::LmdbError),

    #[error("store error: {0}")]
    Store(#[from] kyc_store::StoreError),

    #[error("RPC server error: {0}")]
    Rpc(#[from] kyc_rpc::RpcError),

    #[error("logging error: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
