// tests/feed_accumulation.rs
//! Infinite-scroll accumulation: ordering, dedup, and end-of-feed.

mod support;

use pagewise::{
    FilterSet, IncrementalFeedController, MemorySource, Phase, SourceError,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use support::{batch_of, doc_ids, docs, expected_ids, GatedSource, ScriptedSource};

#[tokio::test]
async fn accumulates_batches_until_the_source_runs_dry() {
    let source = Arc::new(MemorySource::new(docs(25)));
    let feed = IncrementalFeedController::new(source.clone(), FilterSet::new(), 10).unwrap();

    feed.load_more().await.unwrap();
    assert_eq!(feed.loaded(), 10);

    feed.load_more().await.unwrap();
    feed.load_more().await.unwrap();
    let view = feed.current_view();
    assert_eq!(doc_ids(&view.items), expected_ids(1..=25));
    // The last batch was short but still carried a cursor; only an empty
    // fetch proves the feed has ended.
    assert!(view.has_more);

    feed.load_more().await.unwrap();
    let ended = feed.current_view();
    assert_eq!(ended.items.len(), 25);
    assert!(!ended.has_more);
    assert_eq!(source.page_calls(), 4);

    // Fully loaded: further triggers do not reach the source.
    feed.load_more().await.unwrap();
    assert_eq!(source.page_calls(), 4);
}

#[tokio::test]
async fn overlapping_batches_keep_one_copy_in_first_seen_position() {
    let rows = docs(8);
    let fingerprint = FilterSet::new().fingerprint();
    // The server overlaps by one row across the two batches.
    let source = Arc::new(ScriptedSource::new(
        vec![
            Ok(batch_of(&rows[0..5], fingerprint)),
            Ok(batch_of(&rows[4..8], fingerprint)),
        ],
        8,
    ));
    let feed = IncrementalFeedController::new(source, FilterSet::new(), 5).unwrap();

    feed.load_more().await.unwrap();
    feed.load_more().await.unwrap();

    let view = feed.current_view();
    assert_eq!(doc_ids(&view.items), expected_ids(1..=8));
    assert_eq!(
        view.items.iter().filter(|d| d.id == "doc-005").count(),
        1
    );
}

#[tokio::test]
async fn a_batch_without_a_cursor_ends_the_feed() {
    let rows = docs(3);
    let fingerprint = FilterSet::new().fingerprint();
    let mut tail = batch_of(&rows, fingerprint);
    tail.last_cursor = None;
    let source = Arc::new(ScriptedSource::new(vec![Ok(tail)], 3));
    let feed = IncrementalFeedController::new(source, FilterSet::new(), 5).unwrap();

    feed.load_more().await.unwrap();
    let view = feed.current_view();
    assert_eq!(view.items.len(), 3);
    assert!(!view.has_more);
}

#[tokio::test]
async fn a_failed_batch_keeps_what_was_already_loaded() {
    let source = Arc::new(MemorySource::new(docs(15)));
    let feed = IncrementalFeedController::new(source.clone(), FilterSet::new(), 10).unwrap();

    feed.load_more().await.unwrap();
    source.fail_next(SourceError::Transport("timeout".into()));
    feed.load_more().await.unwrap_err();

    let view = feed.current_view();
    assert_eq!(view.phase, Phase::Error);
    assert_eq!(view.error, Some(SourceError::Transport("timeout".into())));
    assert_eq!(view.items.len(), 10);
    assert!(view.has_more);

    // The caller decides to retry; the same trigger works again.
    feed.load_more().await.unwrap();
    let retried = feed.current_view();
    assert_eq!(doc_ids(&retried.items), expected_ids(1..=15));
    assert_eq!(retried.phase, Phase::Ready);
}

#[tokio::test]
async fn reset_rewinds_to_the_collection_head() {
    let source = Arc::new(MemorySource::new(docs(12)));
    let feed = IncrementalFeedController::new(source, FilterSet::new(), 10).unwrap();

    feed.load_more().await.unwrap();
    feed.load_more().await.unwrap();
    assert_eq!(feed.loaded(), 12);

    feed.reset();
    let cleared = feed.current_view();
    assert!(cleared.items.is_empty());
    assert!(cleared.has_more);
    assert_eq!(cleared.phase, Phase::Idle);

    feed.load_more().await.unwrap();
    assert_eq!(doc_ids(&feed.current_view().items), expected_ids(1..=10));
}

#[tokio::test]
async fn a_refiring_scroll_trigger_does_not_stack_fetches() {
    let source = Arc::new(GatedSource::new(docs(20)));
    let feed = Arc::new(
        IncrementalFeedController::new(source.clone(), FilterSet::new(), 10).unwrap(),
    );

    let in_flight = {
        let feed = feed.clone();
        tokio::spawn(async move { feed.load_more().await })
    };
    source.wait_for_arrivals(1).await;

    // The intersection signal fires again for the same scroll position.
    feed.load_more().await.unwrap();
    assert_eq!(source.arrivals(), 1);

    source.release(0);
    in_flight.await.unwrap().unwrap();
    assert_eq!(feed.loaded(), 10);
    assert_eq!(source.inner().page_calls(), 1);
}
