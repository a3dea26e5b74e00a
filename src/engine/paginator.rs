// src/engine/paginator.rs
//! Bidirectional table paging.
//!
//! The controller owns one page of items plus the [`PageStack`] describing
//! how the user got there. Forward motion uses the current page's last
//! cursor as the start-after position; backward motion never uses a native
//! "previous" primitive — it pops the boundary of the page being left and
//! replays a forward query from the boundary underneath. Replay costs one
//! extra round trip per step back and in exchange behaves exactly like
//! forward navigation on every store.
//!
//! Every fetch is tagged with a generation; a response whose generation no
//! longer matches is discarded without touching state. While a fetch is in
//! flight, navigation calls are ignored and only `reset` / `set_page_size`
//! may supersede it.

use super::generation::{Generation, GenerationCounter};
use super::page_stack::PageStack;
use super::{guard_cursor, Phase};
use crate::constants::MAX_PAGE_SIZE;
use crate::error::{PagingError, SourceError};
use crate::source::{PageBatch, QuerySource};
use crate::types::{Cursor, FilterFingerprint, FilterSet, PageBoundary, RowRange};
use parking_lot::Mutex;
use std::sync::Arc;

/// Snapshot republished to the view layer after every operation.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView<T> {
    pub items: Vec<T>,
    pub has_next: bool,
    pub has_prev: bool,
    /// 1-based row range of the current page; `None` while no rows are
    /// loaded.
    pub range: Option<RowRange>,
    pub total_count: u64,
    pub phase: Phase,
    /// The failure behind an `Error` phase, for the view's error indicator.
    pub error: Option<SourceError>,
}

struct PaginationState<T> {
    filters: FilterSet,
    fingerprint: FilterFingerprint,
    page_size: usize,
    items: Vec<T>,
    first_cursor: Option<Cursor>,
    last_cursor: Option<Cursor>,
    page_stack: PageStack,
    /// 1-based offset of the current page's first row.
    start_offset: u64,
    total_count: u64,
    /// Fingerprint the total count was computed under, if any.
    counted: Option<FilterFingerprint>,
    /// Set when a forward fetch came back empty: the collection ends here
    /// even though the current page is full.
    exhausted: bool,
    phase: Phase,
    error: Option<SourceError>,
    generation: Generation,
}

/// Bidirectional paging controller for one table view.
///
/// Create one per table, drive it with `reset` / `go_next` / `go_prev` /
/// `set_page_size`, and render from [`current_view`](Self::current_view).
/// All operations take `&self`; a view layer holds the controller behind
/// an `Arc` and may call it from event handlers freely — overlapping calls
/// are serialized by the rules above, never by blocking.
pub struct PaginationController<S: QuerySource> {
    source: Arc<S>,
    state: Mutex<PaginationState<S::Item>>,
    generations: GenerationCounter,
}

impl<S: QuerySource> std::fmt::Debug for PaginationController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationController").finish_non_exhaustive()
    }
}

impl<S: QuerySource> PaginationController<S> {
    /// Creates an idle controller. No fetch is issued until the first
    /// `reset` call.
    pub fn new(source: Arc<S>, page_size: usize) -> Result<Self, PagingError> {
        let page_size = validate_page_size(page_size)?;
        let filters = FilterSet::new();
        let fingerprint = filters.fingerprint();
        Ok(Self {
            source,
            state: Mutex::new(PaginationState {
                filters,
                fingerprint,
                page_size,
                items: Vec::new(),
                first_cursor: None,
                last_cursor: None,
                page_stack: PageStack::new(),
                start_offset: 1,
                total_count: 0,
                counted: None,
                exhausted: false,
                phase: Phase::Idle,
                error: None,
                generation: Generation::initial(),
            }),
            generations: GenerationCounter::new(),
        })
    }

    /// Replaces the filter set and reloads from the first page.
    ///
    /// Clears all navigation history — no cursor survives a fingerprint
    /// change. The total count is recomputed only when the fingerprint
    /// actually changed; that aggregate is the one expensive source query
    /// the engine tolerates. May be called while a previous fetch is still
    /// in flight: the older response is discarded on arrival.
    pub async fn reset(&self, filters: FilterSet) -> Result<(), PagingError> {
        let fingerprint = filters.fingerprint();
        let generation = self.generations.next();
        let (page_size, need_count) = {
            let mut state = self.state.lock();
            log::debug!(
                "reset to fingerprint {} (generation {})",
                fingerprint,
                generation
            );
            let need_count = state.counted != Some(fingerprint);
            if need_count {
                state.total_count = 0;
                state.counted = None;
            }
            state.generation = generation;
            state.phase = Phase::Loading;
            state.error = None;
            state.filters = filters.clone();
            state.fingerprint = fingerprint;
            state.page_stack.clear();
            state.items.clear();
            state.first_cursor = None;
            state.last_cursor = None;
            state.start_offset = 1;
            state.exhausted = false;
            (state.page_size, need_count)
        };

        let outcome = self
            .fetch_first_page(&filters, page_size, need_count)
            .await;

        let mut state = self.state.lock();
        if state.generation != generation {
            log::debug!("discarding stale reset response (generation {})", generation);
            return Ok(());
        }
        match outcome {
            Ok((total, batch)) => {
                if let Some(total) = total {
                    state.total_count = total;
                    state.counted = Some(fingerprint);
                }
                apply_batch(&mut state, batch);
                Ok(())
            }
            Err(error) => {
                // A fresh reset has no prior page to fall back to; the view
                // stays empty and shows the failure.
                state.phase = Phase::Error;
                state.error = Some(error.clone());
                Err(error.into())
            }
        }
    }

    /// Changes the page length and restarts from the first row.
    ///
    /// Row alignment across different page sizes is not expressible from
    /// opaque cursors alone, so no attempt is made to preserve position.
    /// The total count is reused — the fingerprint did not change.
    pub async fn set_page_size(&self, page_size: usize) -> Result<(), PagingError> {
        let page_size = validate_page_size(page_size)?;
        let generation = self.generations.next();
        let filters = {
            let mut state = self.state.lock();
            log::debug!(
                "page size change to {} (generation {})",
                page_size,
                generation
            );
            state.generation = generation;
            state.phase = Phase::Loading;
            state.error = None;
            state.page_size = page_size;
            state.page_stack.clear();
            state.items.clear();
            state.first_cursor = None;
            state.last_cursor = None;
            state.start_offset = 1;
            state.exhausted = false;
            state.filters.clone()
        };

        let outcome = self.source.fetch_page(&filters, None, page_size).await;

        let mut state = self.state.lock();
        if state.generation != generation {
            log::debug!(
                "discarding stale page-size response (generation {})",
                generation
            );
            return Ok(());
        }
        match outcome {
            Ok(batch) => {
                apply_batch(&mut state, batch);
                Ok(())
            }
            Err(error) => {
                state.phase = Phase::Error;
                state.error = Some(error.clone());
                Err(error.into())
            }
        }
    }

    /// Advances to the next page.
    ///
    /// A no-op unless the current page is full — a short page is the only
    /// reliable end-of-data signal a cursor-only source gives. On success
    /// the boundary of the page being left is pushed onto the stack; on
    /// failure the state is exactly as before the call apart from the
    /// error phase.
    pub async fn go_next(&self) -> Result<(), PagingError> {
        let generation;
        let (filters, page_size, after, boundary, advance) = {
            let mut state = self.state.lock();
            if state.phase == Phase::Loading {
                log::debug!("go_next ignored: a fetch is already in flight");
                return Ok(());
            }
            if state.exhausted || state.items.len() < state.page_size {
                log::debug!("go_next ignored: no further page is available");
                return Ok(());
            }
            let (Some(first), Some(last)) =
                (state.first_cursor.clone(), state.last_cursor.clone())
            else {
                return Ok(());
            };
            guard_cursor(&last, &state.fingerprint)?;

            generation = self.generations.next();
            state.generation = generation;
            state.phase = Phase::Loading;
            state.error = None;
            (
                state.filters.clone(),
                state.page_size,
                last.clone(),
                PageBoundary {
                    first_cursor: first,
                    last_cursor: last,
                    start_offset: state.start_offset,
                },
                state.items.len() as u64,
            )
        };

        let outcome = self
            .source
            .fetch_page(&filters, Some(&after), page_size)
            .await;

        let mut state = self.state.lock();
        if state.generation != generation {
            log::debug!(
                "discarding stale go_next response (generation {})",
                generation
            );
            return Ok(());
        }
        match outcome {
            Ok(batch) if batch.is_empty() => {
                // The collection ended right at the current page boundary
                // (it shrank since the page was fetched). Keep the page on
                // screen and close forward navigation.
                log::debug!("go_next found the end of the collection");
                state.exhausted = true;
                state.phase = Phase::Ready;
                Ok(())
            }
            Ok(batch) => {
                state.page_stack.push(boundary);
                state.start_offset += advance;
                apply_batch(&mut state, batch);
                Ok(())
            }
            Err(error) => {
                state.phase = Phase::Error;
                state.error = Some(error.clone());
                Err(error.into())
            }
        }
    }

    /// Returns to the previous page by replaying a forward query.
    ///
    /// The popped boundary describes the page being left; the start-after
    /// position comes from the boundary underneath it (or the collection
    /// head when returning to page one). The pop is committed only after
    /// the replay succeeds, so a failed fetch leaves navigation intact.
    pub async fn go_prev(&self) -> Result<(), PagingError> {
        let generation;
        let (filters, page_size, replay_after) = {
            let mut state = self.state.lock();
            if state.phase == Phase::Loading {
                log::debug!("go_prev ignored: a fetch is already in flight");
                return Ok(());
            }
            if state.page_stack.is_empty() {
                log::debug!("go_prev ignored: already on the first page");
                return Ok(());
            }
            let replay_after = state
                .page_stack
                .beneath_top()
                .map(|b| b.last_cursor.clone());
            if let Some(cursor) = replay_after.as_ref() {
                guard_cursor(cursor, &state.fingerprint)?;
            }

            generation = self.generations.next();
            state.generation = generation;
            state.phase = Phase::Loading;
            state.error = None;
            (state.filters.clone(), state.page_size, replay_after)
        };

        let outcome = self
            .source
            .fetch_page(&filters, replay_after.as_ref(), page_size)
            .await;

        let mut state = self.state.lock();
        if state.generation != generation {
            log::debug!(
                "discarding stale go_prev response (generation {})",
                generation
            );
            return Ok(());
        }
        match outcome {
            Ok(batch) => {
                if let Some(left) = state.page_stack.pop() {
                    state.start_offset = left.start_offset;
                }
                state.exhausted = false;
                apply_batch(&mut state, batch);
                Ok(())
            }
            Err(error) => {
                state.phase = Phase::Error;
                state.error = Some(error.clone());
                Err(error.into())
            }
        }
    }

    /// Pure read of the current view model.
    pub fn current_view(&self) -> TableView<S::Item> {
        let state = self.state.lock();
        let has_next =
            !state.exhausted && !state.items.is_empty() && state.items.len() == state.page_size;
        let range = if state.items.is_empty() {
            None
        } else {
            Some(RowRange {
                start: state.start_offset,
                end: state.start_offset + state.items.len() as u64 - 1,
            })
        };
        TableView {
            items: state.items.clone(),
            has_next,
            has_prev: !state.page_stack.is_empty(),
            range,
            total_count: state.total_count,
            phase: state.phase,
            error: state.error.clone(),
        }
    }

    /// The page length currently in effect (after clamping).
    pub fn page_size(&self) -> usize {
        self.state.lock().page_size
    }

    async fn fetch_first_page(
        &self,
        filters: &FilterSet,
        page_size: usize,
        need_count: bool,
    ) -> Result<(Option<u64>, PageBatch<S::Item>), SourceError> {
        let total = if need_count {
            Some(self.source.fetch_total_count(filters).await?)
        } else {
            None
        };
        let batch = self.source.fetch_page(filters, None, page_size).await?;
        Ok((total, batch))
    }
}

fn apply_batch<T>(state: &mut PaginationState<T>, batch: PageBatch<T>) {
    state.items = batch.items;
    state.first_cursor = batch.first_cursor;
    state.last_cursor = batch.last_cursor;
    state.phase = Phase::Ready;
}

pub(crate) fn validate_page_size(page_size: usize) -> Result<usize, PagingError> {
    if page_size == 0 {
        return Err(PagingError::ZeroPageSize);
    }
    if page_size > MAX_PAGE_SIZE {
        log::warn!(
            "page size {} exceeds the remote page cap {}; clamping",
            page_size,
            MAX_PAGE_SIZE
        );
        return Ok(MAX_PAGE_SIZE);
    }
    Ok(page_size)
}
