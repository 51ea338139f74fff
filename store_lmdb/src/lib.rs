//! LMDB storage backend for the KYC attempt ledger.
//!
//! Implements [`kyc_store::AttemptLedger`] using the `heed` LMDB bindings.
//! Records live in a single `attempts` database keyed by email.

pub mod attempt;
pub mod environment;
pub mod error;

pub use attempt::LmdbAttemptLedger;
pub use environment::LmdbEnvironment;
pub use error::LmdbError;
