// tests/support/mod.rs
//! Shared fixtures and instrumented sources for the integration suites.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use pagewise::{
    Cursor, FilterFingerprint, FilterSet, FilterValue, Identify, IdentityKey, MemoryRow,
    MemorySource, PageBatch, QuerySource, SortValue, SourceError,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::oneshot;
use tokio::sync::Notify;

/// A generic collection record: newest-first by creation time, with a
/// region field the filtered tests slice on.
#[derive(Debug, Clone, PartialEq)]
pub struct Doc {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub region: String,
}

impl Identify for Doc {
    fn identity(&self) -> IdentityKey {
        IdentityKey::new(self.id.clone())
    }
}

impl MemoryRow for Doc {
    fn sort_value(&self) -> SortValue {
        SortValue::Timestamp(self.created_at)
    }

    fn matches(&self, filters: &FilterSet) -> bool {
        filters.iter().all(|(field, constraint)| match field {
            "region" => constraint.admits(&FilterValue::Text(self.region.clone())),
            "created_at" => constraint.admits(&FilterValue::Timestamp(self.created_at)),
            _ => false,
        })
    }
}

/// `n` docs named `doc-001..doc-n`, `doc-001` newest, regions alternating
/// north/south (odd numbers north).
pub fn docs(n: usize) -> Vec<Doc> {
    let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    (1..=n)
        .map(|i| Doc {
            id: format!("doc-{:03}", i),
            created_at: base - Duration::minutes(i as i64),
            region: if i % 2 == 1 { "north" } else { "south" }.to_string(),
        })
        .collect()
}

pub fn doc_ids(items: &[Doc]) -> Vec<String> {
    items.iter().map(|d| d.id.clone()).collect()
}

pub fn expected_ids(numbers: impl IntoIterator<Item = usize>) -> Vec<String> {
    numbers.into_iter().map(|i| format!("doc-{:03}", i)).collect()
}

/// Builds a batch the way a well-behaved source would, cursors stamped
/// with `fingerprint`.
pub fn batch_of(docs: &[Doc], fingerprint: FilterFingerprint) -> PageBatch<Doc> {
    PageBatch {
        items: docs.to_vec(),
        first_cursor: docs
            .first()
            .map(|d| Cursor::issue(d.id.as_str(), SortValue::Timestamp(d.created_at), fingerprint)),
        last_cursor: docs
            .last()
            .map(|d| Cursor::issue(d.id.as_str(), SortValue::Timestamp(d.created_at), fingerprint)),
    }
}

/// Source that replays a fixed script of page responses, then empty pages.
pub struct ScriptedSource<T> {
    batches: Mutex<VecDeque<Result<PageBatch<T>, SourceError>>>,
    total: u64,
    page_calls: AtomicUsize,
}

impl<T> ScriptedSource<T> {
    pub fn new(batches: Vec<Result<PageBatch<T>, SourceError>>, total: u64) -> Self {
        Self {
            batches: Mutex::new(batches.into()),
            total,
            page_calls: AtomicUsize::new(0),
        }
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> QuerySource for ScriptedSource<T> {
    type Item = T;

    async fn fetch_page(
        &self,
        _filters: &FilterSet,
        _start_after: Option<&Cursor>,
        _limit: usize,
    ) -> Result<PageBatch<T>, SourceError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.batches
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(PageBatch::empty()))
    }

    async fn fetch_total_count(&self, _filters: &FilterSet) -> Result<u64, SourceError> {
        Ok(self.total)
    }
}

/// Source wrapper that counts cursors replayed under the wrong filter
/// fingerprint. A correct engine never produces one.
pub struct FingerprintAuditSource<S> {
    inner: S,
    mismatches: AtomicUsize,
}

impl<S> FingerprintAuditSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            mismatches: AtomicUsize::new(0),
        }
    }

    pub fn mismatches(&self) -> usize {
        self.mismatches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: QuerySource> QuerySource for FingerprintAuditSource<S> {
    type Item = S::Item;

    async fn fetch_page(
        &self,
        filters: &FilterSet,
        start_after: Option<&Cursor>,
        limit: usize,
    ) -> Result<PageBatch<S::Item>, SourceError> {
        if let Some(cursor) = start_after {
            if !cursor.valid_for(&filters.fingerprint()) {
                self.mismatches.fetch_add(1, Ordering::SeqCst);
            }
        }
        self.inner.fetch_page(filters, start_after, limit).await
    }

    async fn fetch_total_count(&self, filters: &FilterSet) -> Result<u64, SourceError> {
        self.inner.fetch_total_count(filters).await
    }
}

/// Source whose page fetches block until the test releases them, for
/// exercising in-flight and stale-response behavior.
///
/// While closed, each `fetch_page` parks on its own release handle and the
/// test resolves them one by one, in any order. `release(i)` indexes into
/// the currently parked calls in arrival order and shifts later entries
/// down, like `Vec::remove`.
pub struct GatedSource {
    inner: MemorySource<Doc>,
    open: AtomicBool,
    waiters: Mutex<Vec<oneshot::Sender<()>>>,
    arrivals: AtomicUsize,
    arrived: Notify,
}

impl GatedSource {
    pub fn new(rows: Vec<Doc>) -> Self {
        Self {
            inner: MemorySource::new(rows),
            open: AtomicBool::new(false),
            waiters: Mutex::new(Vec::new()),
            arrivals: AtomicUsize::new(0),
            arrived: Notify::new(),
        }
    }

    /// While open, page fetches pass straight through.
    pub fn set_open(&self, open: bool) {
        self.open.store(open, Ordering::SeqCst);
    }

    pub fn inner(&self) -> &MemorySource<Doc> {
        &self.inner
    }

    /// Total gated calls seen so far.
    pub fn arrivals(&self) -> usize {
        self.arrivals.load(Ordering::SeqCst)
    }

    /// Waits until at least `n` gated calls have arrived.
    pub async fn wait_for_arrivals(&self, n: usize) {
        loop {
            let notified = self.arrived.notified();
            if self.arrivals() >= n {
                return;
            }
            notified.await;
        }
    }

    /// Unblocks the parked call at `index` (arrival order).
    pub fn release(&self, index: usize) {
        let sender = self.waiters.lock().remove(index);
        let _ = sender.send(());
    }
}

#[async_trait]
impl QuerySource for GatedSource {
    type Item = Doc;

    async fn fetch_page(
        &self,
        filters: &FilterSet,
        start_after: Option<&Cursor>,
        limit: usize,
    ) -> Result<PageBatch<Doc>, SourceError> {
        if !self.open.load(Ordering::SeqCst) {
            let (sender, receiver) = oneshot::channel();
            self.waiters.lock().push(sender);
            self.arrivals.fetch_add(1, Ordering::SeqCst);
            self.arrived.notify_waiters();
            let _ = receiver.await;
        }
        self.inner.fetch_page(filters, start_after, limit).await
    }

    async fn fetch_total_count(&self, filters: &FilterSet) -> Result<u64, SourceError> {
        self.inner.fetch_total_count(filters).await
    }
}
