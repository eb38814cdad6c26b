//! Scanning core for tracescan
//!
//! Everything needed to pull tokens out of large trace logs lives here.
//!
//! # Module Organization
//!
//! ## Byte Storage
//! - [`slice`] - Content-compared byte slices
//! - [`window`] - Resident windows and the [`WindowedSource`] trait
//! - [`paged`] - [`PagedSource`], a windowed source over any `Read + Seek`
//!
//! ## Searching
//! - [`search`] - Boyer–Moore [`BytePattern`] over buffers and windowed sources
//!
//! ## Token Reading
//! - [`cursor`] - [`Cursor`] for numbers, slices and strings
//! - [`preview`] - [`PreviewCursor`] for look-ahead with bounded rewind
//! - [`matcher`] - Regex capture groups read through the cursor
//! - [`regex_cache`] - Per-thread cache of compiled matcher patterns
//!
//! ## Reuse
//! - [`string_cache`] - [`StringCache`] interning of repeated tokens
//! - [`pool`] - [`ScopedPool`] of LIFO scratch objects
//!
//! ## Errors
//! - [`error`] - [`ScanError`] and [`ScanResult`]

// ============================================================================
// Module Declarations
// ============================================================================

pub mod cursor;
pub mod error;
pub mod matcher;
pub mod paged;
pub mod pool;
pub mod preview;
pub mod regex_cache;
pub mod search;
pub mod slice;
pub mod string_cache;
pub mod window;

// ============================================================================
// Byte Storage
// ============================================================================

pub use paged::{PagedSource, SourceStats, WindowConfig};
pub use slice::ByteSlice;
pub use window::{Window, WindowRef, WindowedSource};

// ============================================================================
// Searching
// ============================================================================

pub use search::{BytePattern, FindIter, MAX_PATTERN_LEN};

// ============================================================================
// Token Reading
// ============================================================================

pub use cursor::{Cursor, MAX_FRACTION_DIGITS};
pub use matcher::{CaptureGroup, MatchResult, PatternMatcher, RegexMatcher, TextView};
pub use preview::PreviewCursor;

// ============================================================================
// Reuse
// ============================================================================

pub use pool::ScopedPool;
pub use string_cache::{CacheStats, StringCache};

// ============================================================================
// Errors
// ============================================================================

pub use error::{ScanError, ScanResult};
