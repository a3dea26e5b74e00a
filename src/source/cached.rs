// src/source/cached.rs
//! TTL-cached total counts.
//!
//! Aggregate counts are the one expensive query the engine tolerates, and
//! even those only on fingerprint change. This decorator absorbs repeated
//! fingerprint flips (a user toggling between two filter presets) behind a
//! bounded, TTL-expiring cache. Page fetches are never cached — page data
//! must stay fresh.

use super::{PageBatch, QuerySource};
use crate::clock::{Clock, SystemClock};
use crate::constants::{COUNT_CACHE_CAPACITY, DEFAULT_COUNT_TTL_SECS};
use crate::error::SourceError;
use crate::types::{Cursor, FilterFingerprint, FilterSet};
use async_trait::async_trait;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

struct CountEntry {
    count: u64,
    cached_at: Instant,
}

/// Decorator that caches `fetch_total_count` results per filter
/// fingerprint, expiring them after a TTL.
///
/// The cache is owned by this source and guarded by a mutex, never shared
/// mutable state between controllers. Entries are keyed by fingerprint, so
/// a count can never be served for the wrong filter set.
pub struct CountCachedSource<S> {
    inner: S,
    counts: Mutex<LruCache<FilterFingerprint, CountEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<S> CountCachedSource<S> {
    /// Wraps `inner` with the default TTL and the system clock.
    pub fn new(inner: S) -> Self {
        Self::with_clock(
            inner,
            Duration::from_secs(DEFAULT_COUNT_TTL_SECS),
            Arc::new(SystemClock),
        )
    }

    /// Wraps `inner` with an explicit TTL and clock.
    pub fn with_clock(inner: S, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(COUNT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            counts: Mutex::new(LruCache::new(capacity)),
            ttl,
            clock,
        }
    }

    /// Drops every cached count, forcing fresh aggregates on next use.
    pub fn invalidate(&self) {
        self.counts.lock().clear();
    }
}

#[async_trait]
impl<S: QuerySource> QuerySource for CountCachedSource<S> {
    type Item = S::Item;

    async fn fetch_page(
        &self,
        filters: &FilterSet,
        start_after: Option<&Cursor>,
        limit: usize,
    ) -> Result<PageBatch<S::Item>, SourceError> {
        self.inner.fetch_page(filters, start_after, limit).await
    }

    async fn fetch_total_count(&self, filters: &FilterSet) -> Result<u64, SourceError> {
        let fingerprint = filters.fingerprint();
        let now = self.clock.now();

        {
            let mut counts = self.counts.lock();
            let entry = counts
                .get(&fingerprint)
                .map(|e| (e.count, now.saturating_duration_since(e.cached_at) <= self.ttl));
            match entry {
                Some((count, true)) => {
                    log::debug!("count cache hit for fingerprint {}", fingerprint);
                    return Ok(count);
                }
                Some((_, false)) => {
                    log::debug!("count cache entry expired for fingerprint {}", fingerprint);
                    counts.pop(&fingerprint);
                }
                None => {}
            }
        }

        let count = self.inner.fetch_total_count(filters).await?;
        self.counts.lock().put(
            fingerprint,
            CountEntry {
                count,
                cached_at: now,
            },
        );
        Ok(count)
    }
}
