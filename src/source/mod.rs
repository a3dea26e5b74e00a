// src/source/mod.rs
//! The query boundary — the one primitive the engine consumes.
//!
//! Everything a controller does reduces to "give me the next N items after
//! opaque position X matching filter Q". One [`QuerySource`] implementation
//! exists per remote collection; the controllers are generic over it and
//! never see HTTP, SDK, or wire-format details.

pub mod cached;
pub mod memory;

use crate::error::SourceError;
use crate::types::{Cursor, FilterSet};
use async_trait::async_trait;

/// One fetched page of an ordered collection.
///
/// The cursors are absent exactly when `items` is empty: an empty page has
/// no positions to continue from.
#[derive(Debug, Clone, PartialEq)]
pub struct PageBatch<T> {
    pub items: Vec<T>,
    pub first_cursor: Option<Cursor>,
    pub last_cursor: Option<Cursor>,
}

impl<T> PageBatch<T> {
    /// The batch an exhausted query returns.
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            first_cursor: None,
            last_cursor: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<T> Default for PageBatch<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// The ability to answer forward page queries over one remote collection.
///
/// This is the fundamental algebra the controllers depend on. Controllers
/// never construct cursors; they only pass back cursors this source issued.
///
/// # Laws
///
/// All implementations must satisfy these laws for a stationary collection
/// and a fixed `filters` value:
///
/// - **L1 (Fixed order)**: results are sorted by the collection's sort key,
///   descending, with a deterministic tiebreaker, so the item sequence is
///   identical across repeated queries.
/// - **L2 (Continuity)**: fetching with `start_after = last_cursor` of page
///   K yields page K+1 — no gaps, no overlaps.
/// - **L3 (Cursor provenance)**: every returned cursor is stamped with the
///   fingerprint of the `filters` it was issued under.
#[async_trait]
pub trait QuerySource: Send + Sync {
    type Item: Clone + Send + Sync + 'static;

    /// Fetches up to `limit` items after `start_after` (from the top of the
    /// collection when absent).
    async fn fetch_page(
        &self,
        filters: &FilterSet,
        start_after: Option<&Cursor>,
        limit: usize,
    ) -> Result<PageBatch<Self::Item>, SourceError>;

    /// Counts all items matching `filters`.
    ///
    /// Expensive on most stores — the engine calls it only when the filter
    /// fingerprint changes, and [`CountCachedSource`] can absorb even that.
    async fn fetch_total_count(&self, filters: &FilterSet) -> Result<u64, SourceError>;
}

// Re-export the public interface
pub use cached::CountCachedSource;
pub use memory::{MemoryRow, MemorySource};
