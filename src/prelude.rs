//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from
//! tracescan. Importing it with a wildcard brings the core types into scope:
//!
//! ```
//! use tracescan::prelude::*;
//!
//! let pattern = BytePattern::new(b"::").unwrap();
//! let mut cursor = Cursor::new(b"ns::name");
//! assert!(cursor.skip_to(&pattern));
//! ```
//!
//! # Re-exported Items
//!
//! ## Storage
//! - [`ByteSlice`] - Content-compared byte slice
//! - [`PagedSource`] - Windowed source over a `Read + Seek`
//! - [`WindowConfig`] - Window size and residency limits
//! - [`WindowedSource`] - Trait for windowed byte streams
//!
//! ## Search and Reading
//! - [`BytePattern`] - Boyer–Moore byte pattern
//! - [`Cursor`] - Token reader
//! - [`PreviewCursor`] - Look-ahead cursor
//! - [`RegexMatcher`] - Anchored regex matcher
//! - [`PatternMatcher`] - Trait for cursor matchers
//!
//! ## Reuse
//! - [`StringCache`] - Token interning
//! - [`ScopedPool`] - LIFO object pool
//!
//! ## Errors
//! - [`ScanError`] - Scanning error
//! - [`ScanResult`] - Result alias

pub use crate::scan::{
    ByteSlice, BytePattern, Cursor, PagedSource, PatternMatcher, PreviewCursor, RegexMatcher,
    ScanError, ScanResult, ScopedPool, StringCache, WindowConfig, WindowedSource,
};
