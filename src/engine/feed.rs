// src/engine/feed.rs
//! Forward-only accumulation for infinite-scroll feeds.
//!
//! Where a table replaces its page on every step, a feed only grows: each
//! `load_more` appends the next batch behind a single trailing cursor.
//! The merge is identity-keyed, so a visibility signal that fires twice
//! for the same scroll position — or a server that returns overlapping
//! batches — can never duplicate an entry.

use super::generation::{Generation, GenerationCounter};
use super::{guard_cursor, Phase};
use crate::error::{PagingError, SourceError};
use crate::source::{PageBatch, QuerySource};
use crate::types::{Cursor, FilterFingerprint, FilterSet, Identify, IdentityKey};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// Snapshot republished to the view layer after every operation.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedView<T> {
    /// Accumulated items, first-seen order, unique by identity key.
    pub items: Vec<T>,
    pub has_more: bool,
    pub phase: Phase,
    /// The failure behind an `Error` phase, for the view's error indicator.
    pub error: Option<SourceError>,
}

struct FeedState<T> {
    items: IndexMap<IdentityKey, T>,
    trailing_cursor: Option<Cursor>,
    has_more: bool,
    phase: Phase,
    error: Option<SourceError>,
    generation: Generation,
}

/// Accumulating controller for one scroll feed.
///
/// The filter set and batch size are fixed for the controller's lifetime;
/// a feed whose filters change is a new feed (the view recreates the
/// controller, exactly as it would remount the list).
pub struct IncrementalFeedController<S>
where
    S: QuerySource,
    S::Item: Identify,
{
    source: Arc<S>,
    filters: FilterSet,
    fingerprint: FilterFingerprint,
    batch_size: usize,
    state: Mutex<FeedState<S::Item>>,
    generations: GenerationCounter,
}

impl<S> IncrementalFeedController<S>
where
    S: QuerySource,
    S::Item: Identify,
{
    pub fn new(source: Arc<S>, filters: FilterSet, batch_size: usize) -> Result<Self, PagingError> {
        let batch_size = super::paginator::validate_page_size(batch_size)?;
        let fingerprint = filters.fingerprint();
        Ok(Self {
            source,
            filters,
            fingerprint,
            batch_size,
            state: Mutex::new(FeedState {
                items: IndexMap::new(),
                trailing_cursor: None,
                has_more: true,
                phase: Phase::Idle,
                error: None,
                generation: Generation::initial(),
            }),
            generations: GenerationCounter::new(),
        })
    }

    /// Drops all accumulated items and rewinds to the collection head.
    ///
    /// Also supersedes any in-flight `load_more`: its response will arrive
    /// under a stale generation and be discarded.
    pub fn reset(&self) {
        let generation = self.generations.next();
        let mut state = self.state.lock();
        log::debug!("feed reset (generation {})", generation);
        state.generation = generation;
        state.items.clear();
        state.trailing_cursor = None;
        state.has_more = true;
        state.phase = Phase::Idle;
        state.error = None;
    }

    /// Fetches and merges the next batch.
    ///
    /// Safe to call repeatedly from a visibility/intersection signal: a
    /// call while a fetch is in flight, or after the feed is fully loaded,
    /// is ignored. New entries append in arrival order; entries whose
    /// identity key is already present are dropped.
    pub async fn load_more(&self) -> Result<(), PagingError> {
        let generation;
        let after = {
            let mut state = self.state.lock();
            if state.phase == Phase::Loading {
                log::debug!("load_more ignored: a fetch is already in flight");
                return Ok(());
            }
            if !state.has_more {
                log::debug!("load_more ignored: feed is fully loaded");
                return Ok(());
            }
            let after = state.trailing_cursor.clone();
            if let Some(cursor) = after.as_ref() {
                guard_cursor(cursor, &self.fingerprint)?;
            }

            generation = self.generations.next();
            state.generation = generation;
            state.phase = Phase::Loading;
            state.error = None;
            after
        };

        let outcome = self
            .source
            .fetch_page(&self.filters, after.as_ref(), self.batch_size)
            .await;

        let mut state = self.state.lock();
        if state.generation != generation {
            log::debug!(
                "discarding stale feed batch (generation {})",
                generation
            );
            return Ok(());
        }
        match outcome {
            Ok(batch) => {
                let PageBatch {
                    items, last_cursor, ..
                } = batch;
                let fetched = items.len();
                let mut appended = 0usize;
                for item in items {
                    let key = item.identity();
                    if !state.items.contains_key(&key) {
                        state.items.insert(key, item);
                        appended += 1;
                    }
                }
                if fetched > appended {
                    log::debug!("dropped {} overlapping feed item(s)", fetched - appended);
                }
                // No items or no cursor to continue from: the feed ends here.
                state.has_more = fetched > 0 && last_cursor.is_some();
                if let Some(cursor) = last_cursor {
                    state.trailing_cursor = Some(cursor);
                }
                state.phase = Phase::Ready;
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
    pub fn current_view(&self) -> FeedView<S::Item> {
        let state = self.state.lock();
        FeedView {
            items: state.items.values().cloned().collect(),
            has_more: state.has_more,
            phase: state.phase,
            error: state.error.clone(),
        }
    }

    /// How many unique items have accumulated.
    pub fn loaded(&self) -> usize {
        self.state.lock().items.len()
    }
}
