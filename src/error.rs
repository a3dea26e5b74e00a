// src/error.rs
//! Engine error types with structured error handling.
//!
//! Error types form the vocabulary for failure modes in the system. The
//! split matters: [`SourceError`] is what a remote collection can do to
//! you at runtime, [`PagingError`] adds the failures the engine itself
//! can detect. Only source failures are ever surfaced to a view; internal
//! invariant violations fail loudly instead of being swallowed.

use crate::types::FilterFingerprint;
use thiserror::Error;

/// Failure reported by a [`QuerySource`](crate::QuerySource) implementation.
///
/// The engine performs no automatic retry on any of these — retry is a
/// caller decision, informed by [`is_retryable`](Self::is_retryable).
/// `Clone` is deliberate: the last failure is kept in controller state and
/// republished through the view model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The request never produced a response (timeout, connection reset).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The store answered but is temporarily unable to serve the query.
    #[error("collection store unavailable: {0}")]
    Unavailable(String),

    /// The store rejected the query outright (bad filter field, missing
    /// index, permission denied).
    #[error("store rejected the query ({code}): {message}")]
    Rejected { code: String, message: String },

    /// The response arrived but could not be interpreted as a page.
    #[error("malformed page response: {0}")]
    Malformed(String),
}

impl SourceError {
    /// Whether re-issuing the same operation has a chance of succeeding.
    ///
    /// Transient transport and availability failures are worth a retry;
    /// a rejected or malformed query will fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Unavailable(_))
    }
}

/// Main error type returned by controller operations.
#[derive(Debug, Error)]
pub enum PagingError {
    /// The underlying fetch failed; controller state keeps the last
    /// successfully loaded page and reports the failure via its phase.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// A cursor crossed a filter-fingerprint boundary.
    ///
    /// This is an internal invariant violation, not a runtime condition a
    /// view should handle: cursors are only valid against the filter set
    /// active when they were issued.
    #[error("cursor issued under fingerprint {issued} cannot be used under fingerprint {active}")]
    CursorMismatch {
        issued: FilterFingerprint,
        active: FilterFingerprint,
    },

    /// A page or batch size of zero was requested.
    #[error("page size must be greater than zero")]
    ZeroPageSize,
}

/// Result type alias for convenience
pub type Result<T, E = PagingError> = std::result::Result<T, E>;
