//! Server-issued identifiers.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a user as issued by the remote API.
///
/// The backend may send either a number or a string; both forms are kept
/// verbatim so the cached profile round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Numeric(u64),
    Text(String),
}

impl UserId {
    /// Whether this id identifies anybody.
    ///
    /// `0` and blank strings are placeholders, not identities.
    pub fn is_present(&self) -> bool {
        match self {
            UserId::Numeric(n) => *n != 0,
            UserId::Text(s) => !s.trim().is_empty(),
        }
    }
}

impl core::fmt::Display for UserId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UserId::Numeric(n) => write!(f, "{n}"),
            UserId::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for UserId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DomainError::invalid_id("UserId: empty"));
        }
        match s.parse::<u64>() {
            Ok(n) => Ok(Self::Numeric(n)),
            Err(_) => Ok(Self::Text(s.to_string())),
        }
    }
}
