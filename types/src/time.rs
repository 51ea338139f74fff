//! Timestamp type used throughout the gateway.
//!
//! Timestamps are Unix epoch seconds (UTC). Ledger backends that store
//! human-readable times use the RFC 3339 rendering.

use crate::KycError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// A Unix timestamp in seconds since epoch (UTC).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The epoch (time zero).
    pub const EPOCH: Self = Self(0);

    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Get the current system time as a `Timestamp`.
    ///
    /// A system clock set before the epoch reads as [`Timestamp::EPOCH`].
    pub fn now() -> Self {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self(secs)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// This timestamp shifted forward by `secs`, saturating at `u64::MAX`.
    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }

    /// Seconds elapsed since this timestamp (relative to `now`).
    pub fn elapsed_since(&self, now: Timestamp) -> u64 {
        now.0.saturating_sub(self.0)
    }

    /// RFC 3339 rendering in UTC with second precision, e.g. `2024-05-01T12:00:00Z`.
    pub fn to_rfc3339(&self) -> String {
        let secs = i64::try_from(self.0).unwrap_or(i64::MAX);
        DateTime::<Utc>::from_timestamp(secs, 0)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Parse an RFC 3339 string. Sub-second precision is truncated and
    /// pre-epoch times are rejected.
    pub fn from_rfc3339(s: &str) -> Result<Self, KycError> {
        let parsed = DateTime::parse_from_rfc3339(s)
            .map_err(|e| KycError::InvalidTimestamp(format!("{s}: {e}")))?;
        let secs = u64::try_from(parsed.timestamp())
            .map_err(|_| KycError::InvalidTimestamp(format!("{s}: before Unix epoch")))?;
        Ok(Self(secs))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// Source of the current time.
///
/// Ledger backends stamp records through this so tests can pin time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The real wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rfc3339_rendering() {
        assert_eq!(Timestamp::EPOCH.to_rfc3339(), "1970-01-01T00:00:00Z");
        assert_eq!(Timestamp::new(1_700_000_000).to_rfc3339(), "2023-11-14T22:13:20Z");
    }

    #[test]
    fn rfc3339_parse_accepts_offsets_and_fractions() {
        let ts = Timestamp::from_rfc3339("2023-11-14T23:13:20.75+01:00").unwrap();
        assert_eq!(ts.as_secs(), 1_700_000_000);
    }

    #[test]
    fn rfc3339_parse_rejects_garbage_and_pre_epoch() {
        assert!(Timestamp::from_rfc3339("yesterday").is_err());
        assert!(Timestamp::from_rfc3339("1969-12-31T23:59:59Z").is_err());
    }

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now().as_secs() > 1_577_836_800);
    }
}
