//! Email identity key.

use crate::KycError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The identity key for a KYC submission.
///
/// Always trimmed and non-empty, with exactly one `@` separating a
/// non-empty local part from a non-empty domain. The domain is stored
/// lowercased, so `a@X.com` and `a@x.com` are the same identity; the local
/// part keeps its case.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Parse a raw email string, trimming it and lowercasing the domain.
    pub fn parse(raw: &str) -> Result<Self, KycError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(KycError::EmptyEmail);
        }

        let mut parts = trimmed.split('@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();
        if local.is_empty() || domain.is_empty() || parts.next().is_some() {
            return Err(KycError::InvalidEmail(trimmed.to_string()));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(KycError::InvalidEmail(trimmed.to_string()));
        }

        Ok(Self(format!("{local}@{}", domain.to_ascii_lowercase())))
    }

    /// Return the raw email string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Email {
    type Error = KycError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}
