// src/types/identity.rs

use std::fmt;

/// Stable identity of an item within its collection.
///
/// Feeds deduplicate on this key, and the in-memory source uses it as the
/// deterministic tiebreaker for equal sort values, so it must not change
/// across fetches of the same underlying record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for IdentityKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for IdentityKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The ability to name a stable identity for an item.
///
/// Required of feed items so accumulation can drop duplicates even when the
/// server returns overlapping batches.
pub trait Identify {
    fn identity(&self) -> IdentityKey;
}
