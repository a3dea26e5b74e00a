// src/constants.rs
//! Domain constants that define the operational boundaries of the engine.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role. Reading these constants should tell you the story of
//! how the engine operates: how large a page may be, how long a total
//! count stays trustworthy, how much the count cache retains.

// ---------------------------------------------------------------------------
// Page boundaries
// ---------------------------------------------------------------------------

/// Default number of rows per table page.
///
/// The page length the console views start from. A view layer can override
/// it per table through the controller constructor.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest page length a controller will request from a source.
///
/// Cursor-only stores cap a single response (commonly at 100 rows). Asking
/// for more silently truncates on some backends, which would break the
/// full-page heuristic the controllers rely on, so oversized requests are
/// clamped here instead.
pub const MAX_PAGE_SIZE: usize = 100;

// ---------------------------------------------------------------------------
// Count caching
// ---------------------------------------------------------------------------

/// How long a cached total count stays valid, in seconds.
pub const DEFAULT_COUNT_TTL_SECS: u64 = 300;

/// How many filter fingerprints the count cache retains.
///
/// One entry per distinct filter combination. List views cycle through a
/// handful of filter presets; 32 covers that with room to spare.
pub const COUNT_CACHE_CAPACITY: usize = 32;
