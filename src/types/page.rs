// src/types/page.rs

use crate::types::Cursor;
use std::fmt;

/// Recorded description of one previously-displayed page.
///
/// Enough to reconstruct the page later by replaying a forward query:
/// the cursor below this boundary is the start-after position, the start
/// offset restores the row numbering.
#[derive(Debug, Clone, PartialEq)]
pub struct PageBoundary {
    pub first_cursor: Cursor,
    pub last_cursor: Cursor,
    /// 1-based offset of the page's first row within the filtered collection.
    pub start_offset: u64,
}

/// Inclusive 1-based row range of the current page, for "11–20 of 143"
/// style labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub start: u64,
    pub end: u64,
}

impl RowRange {
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

impl fmt::Display for RowRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
