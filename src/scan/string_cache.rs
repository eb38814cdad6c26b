//! String interning for repeated tokens
//!
//! Trace files repeat the same handful of names (thread names, event kinds,
//! categories) millions of times. [`StringCache`] turns each distinct byte
//! sequence into one shared [`Rc<str>`], so extracting a repeated token costs
//! a hash lookup instead of an allocation.
//!
//! The cache is single-threaded: it uses interior mutability so cursors can
//! share it by reference.

use super::slice::ByteSlice;
use ahash::RandomState;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Hit/miss counters for a [`StringCache`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups that hit, or 0 when there were none
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Maps byte contents to shared strings
#[derive(Debug, Default)]
pub struct StringCache {
    /// Keys are compacted, so they never borrow a scan buffer
    entries: RefCell<HashMap<ByteSlice<'static>, Rc<str>, RandomState>>,
    hits: Cell<u64>,
    misses: Cell<u64>,
}

impl StringCache {
    /// An empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty cache with room for `capacity` strings
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RefCell::new(HashMap::with_capacity_and_hasher(
                capacity,
                RandomState::new(),
            )),
            ..Self::default()
        }
    }

    /// The string for `slice`'s contents
    ///
    /// Returns the cached string when these bytes were seen before. Otherwise
    /// decodes them (invalid UTF-8 is replaced) and caches the result under a
    /// compacted copy of the slice.
    pub fn string_for(&self, slice: &ByteSlice<'_>) -> Rc<str> {
        let cached = self.entries.borrow().get(slice.as_bytes()).cloned();
        if let Some(string) = cached {
            self.hits.set(self.hits.get() + 1);
            return string;
        }

        self.misses.set(self.misses.get() + 1);
        let string: Rc<str> = Rc::from(slice.to_string_lossy().as_ref());
        log_trace!("interned {:?}", string);
        self.entries
            .borrow_mut()
            .insert(slice.compact(), Rc::clone(&string));
        string
    }

    /// The string for `bytes`
    #[inline]
    pub fn intern(&self, bytes: &[u8]) -> Rc<str> {
        self.string_for(&ByteSlice::from_bytes(bytes))
    }

    /// Whether these bytes already have a string
    pub fn contains(&self, bytes: &[u8]) -> bool {
        self.entries.borrow().contains_key(bytes)
    }

    #[inline]
    pub fn hits(&self) -> u64 {
        self.hits.get()
    }

    #[inline]
    pub fn misses(&self) -> u64 {
        self.misses.get()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.get(),
            misses: self.misses.get(),
            entries: self.len(),
        }
    }

    /// Number of distinct strings held
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Drop all entries and reset the counters
    ///
    /// Strings already handed out stay valid.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
        self.hits.set(0);
        self.misses.set(0);
    }
}
