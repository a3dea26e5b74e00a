// src/engine/mod.rs
//! The controllers and their supporting state machinery.
//!
//! One controller instance exists per list view, created when the view
//! mounts and dropped when it unmounts. Both controllers share the same
//! discipline: one logical operation at a time, a generation tag on every
//! outbound fetch, and short lock-only critical sections — never a lock
//! held across an await.

pub mod feed;
mod generation;
pub mod page_stack;
pub mod paginator;

use crate::error::PagingError;
use crate::types::{Cursor, FilterFingerprint};

/// Lifecycle phase of a controller.
///
/// `Error` is never sticky: any subsequent operation moves back through
/// `Loading`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Error,
}

/// Checks that a cursor is being replayed under the fingerprint it was
/// issued for. A mismatch is a programming error inside the engine, so it
/// trips a debug assertion and still hard-errors in release builds.
pub(crate) fn guard_cursor(
    cursor: &Cursor,
    active: &FilterFingerprint,
) -> Result<(), PagingError> {
    if cursor.valid_for(active) {
        return Ok(());
    }
    debug_assert!(
        false,
        "cursor issued under {} replayed under {}",
        cursor.fingerprint(),
        active
    );
    Err(PagingError::CursorMismatch {
        issued: cursor.fingerprint(),
        active: *active,
    })
}

pub use feed::{FeedView, IncrementalFeedController};
pub use page_stack::PageStack;
pub use paginator::{PaginationController, TableView};
