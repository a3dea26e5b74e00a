// src/types/filters.rs
//! Filter sets and their fingerprints.
//!
//! A [`FilterSet`] is the engine's view of "what the user is currently
//! filtering on": a map from field name to constraint. The engine never
//! evaluates filters itself — sources do — but it needs a canonical,
//! order-independent digest of them to know when accumulated pagination
//! state has become meaningless. That digest is the [`FilterFingerprint`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single comparable filter operand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterValue {
    Text(String),
    Flag(bool),
    Integer(i64),
    Timestamp(DateTime<Utc>),
}

impl PartialOrd for FilterValue {
    /// Values of different kinds are incomparable — a constraint over one
    /// kind never admits an operand of another.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.partial_cmp(b),
            (Self::Flag(a), Self::Flag(b)) => a.partial_cmp(b),
            (Self::Integer(a), Self::Integer(b)) => a.partial_cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

/// Constraint applied to one field.
///
/// The vocabulary the console's query builders actually use: equality
/// filters plus inclusive range bounds for date windows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    Equals(FilterValue),
    AtLeast(FilterValue),
    AtMost(FilterValue),
    Between(FilterValue, FilterValue),
}

impl Constraint {
    /// Whether `value` satisfies this constraint. Bounds are inclusive.
    ///
    /// Operands of a different kind than the constraint never match.
    pub fn admits(&self, value: &FilterValue) -> bool {
        match self {
            Self::Equals(expected) => value == expected,
            Self::AtLeast(lower) => {
                matches!(value.partial_cmp(lower), Some(Ordering::Greater | Ordering::Equal))
            }
            Self::AtMost(upper) => {
                matches!(value.partial_cmp(upper), Some(Ordering::Less | Ordering::Equal))
            }
            Self::Between(lower, upper) => {
                matches!(value.partial_cmp(lower), Some(Ordering::Greater | Ordering::Equal))
                    && matches!(value.partial_cmp(upper), Some(Ordering::Less | Ordering::Equal))
            }
        }
    }
}

/// The active filter set of one list view.
///
/// Backed by a `BTreeMap`, so iteration order — and therefore the canonical
/// serialization the fingerprint hashes — is independent of the order the
/// clauses were added in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterSet {
    clauses: BTreeMap<String, Constraint>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, constraint: Constraint) -> Self {
        self.insert(field, constraint);
        self
    }

    /// Shorthand for the common equality clause.
    pub fn equals(self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.with(field, Constraint::Equals(value.into()))
    }

    /// Shorthand for an inclusive lower bound.
    pub fn at_least(self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.with(field, Constraint::AtLeast(value.into()))
    }

    /// Shorthand for an inclusive upper bound.
    pub fn at_most(self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.with(field, Constraint::AtMost(value.into()))
    }

    /// Shorthand for an inclusive range, e.g. a date window.
    pub fn between(
        self,
        field: impl Into<String>,
        lower: impl Into<FilterValue>,
        upper: impl Into<FilterValue>,
    ) -> Self {
        self.with(field, Constraint::Between(lower.into(), upper.into()))
    }

    pub fn insert(&mut self, field: impl Into<String>, constraint: Constraint) {
        self.clauses.insert(field.into(), constraint);
    }

    pub fn get(&self, field: &str) -> Option<&Constraint> {
        self.clauses.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Constraint)> {
        self.clauses.iter().map(|(field, c)| (field.as_str(), c))
    }

    /// Canonical digest of this filter set.
    ///
    /// Two filter sets with the same clauses produce the same fingerprint
    /// regardless of insertion order.
    pub fn fingerprint(&self) -> FilterFingerprint {
        // Serialization of plain enums over a BTreeMap cannot fail.
        let canonical = serde_json::to_string(self).unwrap_or_default();
        let mut hasher = DefaultHasher::new();
        canonical.hash(&mut hasher);
        FilterFingerprint(hasher.finish())
    }
}

/// Canonical digest of a [`FilterSet`].
///
/// Cursors are stamped with the fingerprint active when they were issued;
/// any fingerprint change invalidates every cursor and boundary derived
/// under the old one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterFingerprint(u64);

impl fmt::Display for FilterFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
