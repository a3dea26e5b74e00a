// src/source/memory.rs
//! In-memory reference source.
//!
//! Serves pages out of a `Vec` snapshot, sorted newest-first. This is the
//! executable statement of the `QuerySource` laws: integration tests run
//! the controllers against it, and adapter authors can diff their remote
//! implementation's behavior against it. Failure injection and call
//! counters exist for exactly that purpose.

use super::{PageBatch, QuerySource};
use crate::error::SourceError;
use crate::types::{Cursor, FilterSet, Identify, IdentityKey, SortValue};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Row stored in a [`MemorySource`].
pub trait MemoryRow: Identify + Clone + Send + Sync + 'static {
    /// The value of the collection's fixed sort key for this row.
    fn sort_value(&self) -> SortValue;

    /// Whether the row satisfies the active filter set.
    ///
    /// The default admits every row, for collections queried unfiltered.
    fn matches(&self, filters: &FilterSet) -> bool {
        let _ = filters;
        true
    }
}

/// [`QuerySource`] over an in-memory collection.
pub struct MemorySource<T> {
    rows: Mutex<Vec<T>>,
    fail_next: Mutex<Option<SourceError>>,
    page_calls: AtomicUsize,
    count_calls: AtomicUsize,
}

impl<T: MemoryRow> MemorySource<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows: Mutex::new(rows),
            fail_next: Mutex::new(None),
            page_calls: AtomicUsize::new(0),
            count_calls: AtomicUsize::new(0),
        }
    }

    /// Replaces the whole collection, simulating remote mutation between
    /// fetches.
    pub fn replace_rows(&self, rows: Vec<T>) {
        *self.rows.lock() = rows;
    }

    /// Removes one row by identity, simulating a remote deletion.
    pub fn remove(&self, key: &IdentityKey) {
        self.rows.lock().retain(|row| row.identity() != *key);
    }

    /// Makes the next `fetch_page` call fail with `error`.
    pub fn fail_next(&self, error: SourceError) {
        *self.fail_next.lock() = Some(error);
    }

    /// How many page fetches have been served.
    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::Relaxed)
    }

    /// How many count queries have been served.
    pub fn count_calls(&self) -> usize {
        self.count_calls.load(Ordering::Relaxed)
    }

    /// Matching rows, newest first. The row identity breaks ties so rows
    /// with equal sort values can neither repeat nor vanish across page
    /// boundaries.
    fn ordered_matches(&self, filters: &FilterSet) -> Vec<T> {
        let mut rows: Vec<T> = self
            .rows
            .lock()
            .iter()
            .filter(|row| row.matches(filters))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            (b.sort_value(), b.identity()).cmp(&(a.sort_value(), a.identity()))
        });
        rows
    }
}

#[async_trait]
impl<T: MemoryRow> QuerySource for MemorySource<T> {
    type Item = T;

    async fn fetch_page(
        &self,
        filters: &FilterSet,
        start_after: Option<&Cursor>,
        limit: usize,
    ) -> Result<PageBatch<T>, SourceError> {
        if let Some(error) = self.fail_next.lock().take() {
            return Err(error);
        }
        self.page_calls.fetch_add(1, Ordering::Relaxed);

        let rows = self.ordered_matches(filters);
        let start = match start_after {
            None => 0,
            // First position strictly below the cursor's sort key. When the
            // cursor's row was deleted in the meantime, this degrades to
            // resuming at the nearest surviving position instead of failing.
            Some(cursor) => {
                let key = (
                    cursor.sort_value().clone(),
                    IdentityKey::new(cursor.token()),
                );
                rows.partition_point(|row| (row.sort_value(), row.identity()) >= key)
            }
        };

        let page: Vec<T> = rows.into_iter().skip(start).take(limit).collect();
        let fingerprint = filters.fingerprint();
        // The token is the row identity — opaque to callers, position to us.
        let first_cursor = page
            .first()
            .map(|row| Cursor::issue(row.identity().as_str(), row.sort_value(), fingerprint));
        let last_cursor = page
            .last()
            .map(|row| Cursor::issue(row.identity().as_str(), row.sort_value(), fingerprint));

        Ok(PageBatch {
            items: page,
            first_cursor,
            last_cursor,
        })
    }

    async fn fetch_total_count(&self, filters: &FilterSet) -> Result<u64, SourceError> {
        self.count_calls.fetch_add(1, Ordering::Relaxed);
        let count = self
            .rows
            .lock()
            .iter()
            .filter(|row| row.matches(filters))
            .count();
        Ok(count as u64)
    }
}
