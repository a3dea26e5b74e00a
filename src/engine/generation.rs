// src/engine/generation.rs
//! Monotonic generation tags for in-flight fetches.
//!
//! Every operation that issues a fetch first advances the controller's
//! generation and records it in state. When the response lands, it is
//! applied only if its generation still matches — a mismatch means a
//! newer operation superseded this one while it was in flight, and the
//! response is silently discarded.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Tag identifying which in-flight fetch may still apply its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Generation(u64);

impl Generation {
    /// The generation a freshly constructed controller starts in, before
    /// any fetch has been issued.
    pub(crate) const fn initial() -> Self {
        Self(0)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Issues strictly increasing [`Generation`] values.
#[derive(Debug, Default)]
pub(crate) struct GenerationCounter(AtomicU64);

impl GenerationCounter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn next(&self) -> Generation {
        Generation(self.0.fetch_add(1, Ordering::Relaxed) + 1)
    }
}
