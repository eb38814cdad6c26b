//! Paged byte source for large inputs
//!
//! [`PagedSource`] presents a seekable reader as a sequence of fixed-size
//! windows addressable by global byte index. Windows are loaded on demand and
//! only a bounded number stay resident:
//!
//! ```text
//!  Stream:   [ W0 ][ W1 ][ W2 ][ W3 ][ W4 ] ...
//!                        │     │     │
//!                        ▼     ▼     ▼
//!  Resident (LRU):     [ W1 ][ W2 ][ W3 ]   <- least recently used first
//! ```
//!
//! Window `k` always covers `[k * window_size, (k + 1) * window_size)`, so a
//! reloaded window covers the same global range as the one it replaces.
//!
//! # Usage
//!
//! ```rust
//! use std::io::Cursor;
//! use tracescan::{PagedSource, WindowConfig, WindowedSource};
//!
//! let data = Cursor::new(b"name=worker-3;ts=1023.500;".to_vec());
//! let mut source = PagedSource::new(data, WindowConfig::new(8, 2)).unwrap();
//!
//! assert!(source.load_index(13).unwrap());
//! assert_eq!(source.byte_at(13), Some(b';'));
//! ```

use super::error::{ScanError, ScanResult};
use super::window::{Window, WindowRef, WindowedSource};
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io::{Read, Seek, SeekFrom};
use std::rc::Rc;

/// Configuration for window-based paging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Size of each window in bytes
    pub window_size: usize,

    /// Number of windows kept resident
    /// Larger values mean fewer reloads but more memory
    pub max_resident: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            window_size: 64 * 1024, // 64 KB
            max_resident: 3,        // ~192 KB resident
        }
    }
}

impl WindowConfig {
    /// Create a new window configuration
    #[inline]
    pub fn new(window_size: usize, max_resident: usize) -> Self {
        Self {
            window_size,
            max_resident,
        }
    }

    /// Parse a configuration from JSON
    ///
    /// Missing fields are an error; use [`WindowConfig::default`] for defaults.
    pub fn from_json(json: &str) -> ScanResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| ScanError::InvalidConfig {
            reason: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can page a stream
    pub fn validate(&self) -> ScanResult<()> {
        if self.window_size == 0 {
            return Err(ScanError::InvalidConfig {
                reason: "window_size must be at least 1".to_string(),
            });
        }
        if self.max_resident == 0 {
            return Err(ScanError::InvalidConfig {
                reason: "max_resident must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Get the maximum resident memory (approximate)
    #[inline]
    pub fn max_memory(&self) -> usize {
        self.window_size * self.max_resident
    }

    /// Configuration for small inputs (16 KB windows, 2 resident)
    #[inline]
    pub fn small() -> Self {
        Self::new(16 * 1024, 2)
    }

    /// Configuration for medium inputs (64 KB windows, 3 resident)
    #[inline]
    pub fn medium() -> Self {
        Self::default()
    }

    /// Configuration for large inputs (256 KB windows, 4 resident)
    #[inline]
    pub fn large() -> Self {
        Self::new(256 * 1024, 4)
    }

    /// Configuration for very large inputs (1 MB windows, 5 resident)
    #[inline]
    pub fn huge() -> Self {
        Self::new(1024 * 1024, 5)
    }
}

/// Paging statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStats {
    /// Windows read from the reader for the first time
    pub loads: u64,
    /// Windows read again after eviction
    pub reloads: u64,
    /// Windows dropped from the resident set
    pub evictions: u64,
    /// `load_index` calls satisfied by a resident window
    pub hits: u64,
    /// Total bytes read from the reader
    pub bytes_read: u64,
}

/// A [`WindowedSource`] backed by a seekable reader
pub struct PagedSource<R> {
    /// Underlying reader
    reader: R,

    /// Paging configuration
    config: WindowConfig,

    /// Resident windows, least recently used first
    resident: VecDeque<WindowRef>,

    /// One past the furthest byte ever read
    frontier: usize,

    /// Window numbers read at least once
    seen: HashSet<usize>,

    /// Whether we've reached EOF
    eof: bool,

    /// Paging statistics
    stats: SourceStats,
}

impl<R: Read + Seek> PagedSource<R> {
    /// Create a paged source over `reader`
    pub fn new(reader: R, config: WindowConfig) -> ScanResult<Self> {
        config.validate()?;
        Ok(Self::build(reader, config))
    }

    /// Create a paged source with the default configuration
    #[inline]
    pub fn with_defaults(reader: R) -> Self {
        Self::build(reader, WindowConfig::default())
    }

    fn build(reader: R, config: WindowConfig) -> Self {
        Self {
            reader,
            config,
            resident: VecDeque::with_capacity(config.max_resident),
            frontier: 0,
            seen: HashSet::new(),
            eof: false,
            stats: SourceStats::default(),
        }
    }

    /// The paging configuration
    #[inline]
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Paging statistics so far
    #[inline]
    pub fn stats(&self) -> SourceStats {
        self.stats
    }

    /// Number of windows currently resident
    #[inline]
    pub fn resident_count(&self) -> usize {
        self.resident.len()
    }

    /// Global ranges of the resident windows, least recently used first
    pub fn resident_ranges(&self) -> Vec<std::ops::Range<usize>> {
        self.resident.iter().map(|w| w.global_range()).collect()
    }

    /// Consume the source, returning the reader
    #[inline]
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Move a resident window to the most-recently-used end
    fn touch(&mut self, position: usize) {
        if position + 1 != self.resident.len() {
            if let Some(window) = self.resident.remove(position) {
                self.resident.push_back(window);
            }
        }
    }

    /// Read window `number` from the reader
    ///
    /// Returns `None` if the window starts at or past the end of the stream.
    fn read_window(&mut self, number: usize) -> ScanResult<Option<Window>> {
        let global_start = number * self.config.window_size;
        self.reader.seek(SeekFrom::Start(global_start as u64))?;

        let mut data = vec![0u8; self.config.window_size];
        let mut filled = 0;
        while filled < data.len() {
            match self.reader.read(&mut data[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.stats.bytes_read += filled as u64;

        if filled < data.len() {
            self.mark_eof(global_start, filled)?;
        }
        if filled == 0 {
            return Ok(None);
        }

        data.truncate(filled);
        Ok(Some(Window::new(global_start, data)))
    }

    /// Record the end of the stream after a short read at `global_start`
    fn mark_eof(&mut self, global_start: usize, filled: usize) -> ScanResult<()> {
        let length = if filled > 0 {
            global_start + filled
        } else {
            // Empty read past the end; take the exact length from the reader.
            self.reader.seek(SeekFrom::End(0))? as usize
        };
        if !self.eof {
            log_debug!("paged source reached EOF at byte {}", length);
        }
        self.eof = true;
        self.frontier = self.frontier.max(length);
        Ok(())
    }
}

impl<R: Read + Seek> WindowedSource for PagedSource<R> {
    fn load_index(&mut self, global_index: usize) -> ScanResult<bool> {
        if let Some(position) = self.resident.iter().position(|w| w.contains(global_index)) {
            self.stats.hits += 1;
            self.touch(position);
            return Ok(true);
        }

        if self.eof && global_index >= self.frontier {
            return Ok(false);
        }

        let number = global_index / self.config.window_size;
        let Some(window) = self.read_window(number)? else {
            return Ok(false);
        };

        if self.seen.insert(number) {
            self.stats.loads += 1;
            log_debug!("loaded window {} ({:?})", number, window.global_range());
        } else {
            self.stats.reloads += 1;
            log_debug!("reloaded window {} ({:?})", number, window.global_range());
        }
        self.frontier = self.frontier.max(window.global_end());

        while self.resident.len() >= self.config.max_resident {
            if let Some(evicted) = self.resident.pop_front() {
                self.stats.evictions += 1;
                log_debug!("evicted window {:?}", evicted.global_range());
            }
        }

        // A short final window may end before the requested index.
        let covered = window.contains(global_index);
        self.resident.push_back(Rc::new(window));
        Ok(covered)
    }

    fn window_for(&self, global_index: usize) -> Option<WindowRef> {
        self.resident
            .iter()
            .rev()
            .find(|w| w.contains(global_index))
            .cloned()
    }

    fn byte_at(&self, global_index: usize) -> Option<u8> {
        self.resident
            .iter()
            .rev()
            .find_map(|w| w.byte_at(global_index))
    }

    fn end_index(&self) -> usize {
        self.frontier
    }

    fn reached_eof(&self) -> bool {
        self.eof
    }
}
