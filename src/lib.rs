// src/lib.rs
//! pagewise — bidirectional paging and incremental loading over cursor-only
//! collection APIs.
//!
//! A cursor-only source can answer exactly one question: "the next N items
//! after opaque position X, matching filter Q." This crate builds the two
//! list-view behaviors every console needs on top of that single
//! primitive:
//!
//! - [`PaginationController`] — discrete Next/Previous table pages, with
//!   backward navigation reconstructed by replaying forward queries from
//!   recorded page boundaries (no native backward cursor is ever used).
//! - [`IncrementalFeedController`] — infinite-scroll accumulation behind a
//!   single trailing cursor, duplicate-safe by identity key.
//!
//! Both invalidate all derived state on any filter or page-size change and
//! tag every fetch with a generation so responses from superseded requests
//! are discarded instead of overwriting newer state.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling** — `PagingError`, `SourceError`
//! - **Domain types** — `Cursor`, `SortValue`, `FilterSet`, `Constraint`,
//!   `FilterFingerprint`, `IdentityKey`, `PageBoundary`, `RowRange`
//! - **Query sources** — `QuerySource`, `PageBatch`, `MemorySource`,
//!   `CountCachedSource`
//! - **Controllers** — `PaginationController`, `IncrementalFeedController`
//!   and their view models
//! - **Time** — `Clock`, `SystemClock`, `ManualClock`

mod clock;
mod constants;
mod engine;
mod error;
mod source;
mod types;

// --- Error Handling ---
pub use crate::error::{PagingError, Result, SourceError};

// --- Domain Types ---
pub use crate::types::{
    Constraint, Cursor, FilterFingerprint, FilterSet, FilterValue, Identify, IdentityKey,
    PageBoundary, RowRange, SortValue,
};

// --- Query Sources ---
pub use crate::source::{CountCachedSource, MemoryRow, MemorySource, PageBatch, QuerySource};

// --- Controllers ---
pub use crate::engine::{
    FeedView, IncrementalFeedController, PageStack, PaginationController, Phase, TableView,
};

// --- Time ---
pub use crate::clock::{Clock, ManualClock, SystemClock};

// --- Operational Boundaries ---
pub use crate::constants::{DEFAULT_COUNT_TTL_SECS, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
