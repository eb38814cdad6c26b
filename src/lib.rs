//! Tracescan - Fast token scanning for large trace logs
//!
//! Tracescan is the low-level layer of a trace-file parser. It does not know
//! any trace format; it provides the pieces format parsers are built from:
//! - Paged access to inputs larger than memory through resident windows
//! - Boyer–Moore byte pattern search that works across window boundaries
//! - An allocation-free cursor for numbers, slices and delimited strings
//! - Look-ahead previews and regex capture groups read through the cursor
//! - String interning for repeated tokens
//! - A LIFO pool of reusable scratch objects
//!
//! ## Quick Start
//!
//! ```rust
//! use tracescan::{BytePattern, Cursor, StringCache};
//!
//! let line = b"thread=main;ts=1023.5;cat=gc";
//! let semi = BytePattern::new(b";").unwrap();
//! let cache = StringCache::new();
//! let mut cursor = Cursor::new(line).with_cache(&cache);
//!
//! cursor.skip_until(|b| b == b'=');
//! cursor.skip();
//! let thread = cursor
//!     .string_to(|p| {
//!         p.skip_to(&semi);
//!         Ok(())
//!     })
//!     .unwrap();
//! let ts = cursor.read_double().unwrap();
//!
//! assert_eq!(&*thread, "main");
//! assert_eq!(ts, 1023.5);
//! ```
//!
//! ## Large Inputs
//!
//! ```rust
//! use std::io::Cursor as IoCursor;
//! use tracescan::{BytePattern, PagedSource, WindowConfig};
//!
//! let data = b"....marker....".repeat(100);
//! let mut source = PagedSource::new(IoCursor::new(data), WindowConfig::new(64, 2)).unwrap();
//! let marker = BytePattern::new(b"marker").unwrap();
//! assert_eq!(marker.find_in(&mut source, 0, usize::MAX).unwrap(), Some(4));
//! ```
//!
//! ## Feature Flags
//!
//! - `logging` - Enable debug logging using the `log` crate

// Lint configuration for production quality
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all)]
#![allow(clippy::new_without_default)]
#![allow(clippy::module_inception)]

/// Logging macros - no-op when logging feature is disabled
#[cfg(not(feature = "logging"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        if false {
            let _ = ::std::format_args!($($arg)*);
        }
    }};
}

/// Logging macros - use log crate when logging feature is enabled
#[cfg(feature = "logging")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "logging"))]
macro_rules! log_trace {
    ($($arg:tt)*) => {{
        if false {
            let _ = ::std::format_args!($($arg)*);
        }
    }};
}

#[cfg(feature = "logging")]
macro_rules! log_trace {
    ($($arg:tt)*) => { log::trace!($($arg)*) };
}

// Prelude module for convenient imports
pub mod prelude;

// Scanning core
pub mod scan;

/// Re-export commonly used types for convenience
pub use scan::{
    // Storage
    ByteSlice,
    PagedSource,
    SourceStats,
    Window,
    WindowConfig,
    WindowRef,
    WindowedSource,
    // Search
    BytePattern,
    FindIter,
    // Reading
    CaptureGroup,
    Cursor,
    MatchResult,
    PatternMatcher,
    PreviewCursor,
    RegexMatcher,
    TextView,
    // Reuse
    CacheStats,
    ScopedPool,
    StringCache,
    // Errors
    ScanError,
    ScanResult,
};
