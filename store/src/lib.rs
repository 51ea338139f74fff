//! Abstract storage traits for the KYC gateway.
//!
//! Every ledger backend (LMDB, DynamoDB, in-memory for testing) implements
//! these traits. The rest of the codebase depends only on the traits.

pub mod attempt;
pub mod error;

pub use attempt::{check_overwrite, AttemptLedger, AttemptRecord};
pub use error::StoreError;
