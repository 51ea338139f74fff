//! Nullable infrastructure for deterministic testing.
//!
//! All external dependencies (clock, vision provider, ledger) are abstracted
//! behind traits. This crate provides test-friendly implementations that:
//! - Return scripted, deterministic values
//! - Record what was asked of them
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod ledger;
pub mod vision;

pub use clock::NullClock;
pub use ledger::NullAttemptLedger;
pub use vision::{NullVisionService, VisionCall};
