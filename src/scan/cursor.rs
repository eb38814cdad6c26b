//! Cursor-based token reader
//!
//! A [`Cursor`] is a mutable read position over a borrowed byte buffer,
//! bounded by `[start, end)`. It pulls typed tokens out of the buffer without
//! allocating: numbers are accumulated in place and sub-slices borrow the
//! buffer. Strings are allocated only when resolved, and then through the
//! attached [`StringCache`] when there is one.
//!
//! Cursors are `Copy`; a copy is an independent position over the same bytes.
//!
//! # Example
//!
//! ```rust
//! use tracescan::{BytePattern, Cursor};
//!
//! let semi = BytePattern::new(b";").unwrap();
//! let mut cursor = Cursor::new(b"name=worker-3;ts=1023.500;");
//!
//! cursor.skip_until(|b| b == b'=');
//! cursor.skip();
//! let name = cursor
//!     .slice_to(|preview| {
//!         preview.skip_to(&semi);
//!         Ok(())
//!     })
//!     .unwrap();
//! assert_eq!(name, b"worker-3");
//! assert_eq!(cursor.read_double().unwrap(), 1023.5);
//! ```

use super::error::{ScanError, ScanResult};
use super::matcher::{MatchResult, PatternMatcher, TextView};
use super::preview::PreviewCursor;
use super::search::BytePattern;
use super::slice::ByteSlice;
use super::string_cache::StringCache;
use std::fmt;
use std::rc::Rc;

/// Powers of ten for fractional digits
const POW10: [f64; 7] = [1.0, 10.0, 100.0, 1_000.0, 10_000.0, 100_000.0, 1_000_000.0];

/// Most fractional digits that contribute to [`Cursor::read_double`]
pub const MAX_FRACTION_DIGITS: usize = POW10.len() - 1;

/// A bounded read position over a byte buffer
#[derive(Clone, Copy)]
pub struct Cursor<'a> {
    /// The scanned buffer
    pub(super) buffer: &'a [u8],

    /// Lowest index the cursor may occupy
    pub(super) start: usize,

    /// Current position
    pub(super) index: usize,

    /// End of the readable range (exclusive)
    pub(super) end: usize,

    /// Interning cache used by string extraction
    pub(super) cache: Option<&'a StringCache>,
}

impl<'a> Cursor<'a> {
    /// Create a cursor over the whole buffer
    #[inline]
    pub fn new(buffer: &'a [u8]) -> Self {
        Self::with_range(buffer, 0, buffer.len())
    }

    /// Create a cursor over `buffer[start..end]`, positioned at `start`
    ///
    /// # Panics
    /// Panics if the range is out of bounds or `start > end`.
    #[inline]
    pub fn with_range(buffer: &'a [u8], start: usize, end: usize) -> Self {
        assert!(
            start <= end && end <= buffer.len(),
            "cursor range {}..{} out of bounds for buffer of length {}",
            start,
            end,
            buffer.len()
        );
        Self {
            buffer,
            start,
            index: start,
            end,
            cache: None,
        }
    }

    /// Create a cursor over the bytes of a [`ByteSlice`]
    ///
    /// Indices stay relative to the slice's backing buffer.
    #[inline]
    pub fn from_slice(slice: &'a ByteSlice<'_>) -> Self {
        Self::with_range(slice.buffer(), slice.start(), slice.end())
    }

    /// Attach a string cache used by [`string_to`](Self::string_to)
    #[inline]
    pub fn with_cache(mut self, cache: &'a StringCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// A cursor over `[start, end)` of the same buffer, sharing the cache
    #[inline]
    pub(super) fn sub_cursor(&self, start: usize, end: usize) -> Self {
        debug_assert!(self.start <= start && start <= end && end <= self.end);
        Self {
            buffer: self.buffer,
            start,
            index: start,
            end,
            cache: self.cache,
        }
    }

    // ------------------------------------------------------------------------
    // Position
    // ------------------------------------------------------------------------

    /// The whole scanned buffer
    #[inline]
    pub fn buffer(&self) -> &'a [u8] {
        self.buffer
    }

    /// Current position in the buffer
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Lowest position of the readable range
    #[inline]
    pub fn start_index(&self) -> usize {
        self.start
    }

    /// End of the readable range (exclusive)
    #[inline]
    pub fn end_index(&self) -> usize {
        self.end
    }

    /// The attached string cache
    #[inline]
    pub fn cache(&self) -> Option<&'a StringCache> {
        self.cache
    }

    /// Whether the cursor has consumed its range
    #[inline]
    pub fn at_end(&self) -> bool {
        self.index >= self.end
    }

    /// Bytes left before the end
    #[inline]
    pub fn remaining_len(&self) -> usize {
        self.end - self.index
    }

    /// The unread bytes
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.buffer[self.index..self.end]
    }

    /// The unread bytes as a [`ByteSlice`]
    #[inline]
    pub fn remaining_slice(&self) -> ByteSlice<'a> {
        ByteSlice::new(self.buffer, self.index, self.end)
    }

    /// The unread bytes as a one-byte-per-char text view
    #[inline]
    pub fn text_view(&self) -> TextView<'a> {
        TextView::new(self.remaining())
    }

    // ------------------------------------------------------------------------
    // Primitives
    // ------------------------------------------------------------------------

    /// The byte at the current position
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        if self.index < self.end {
            Some(self.buffer[self.index])
        } else {
            None
        }
    }

    /// The byte `offset` bytes past the current position
    #[inline]
    pub fn peek_at(&self, offset: usize) -> Option<u8> {
        let at = self.index.checked_add(offset)?;
        if at < self.end {
            Some(self.buffer[at])
        } else {
            None
        }
    }

    /// Whether the current byte is an ASCII digit
    #[inline]
    pub fn is_digit(&self) -> bool {
        self.peek().is_some_and(|b| b.is_ascii_digit())
    }

    /// Advance one byte
    #[inline]
    pub fn skip(&mut self) {
        if self.index < self.end {
            self.index += 1;
        }
    }

    /// Advance `count` bytes, stopping at the end
    #[inline]
    pub fn skip_count(&mut self, count: usize) {
        self.index = self.index.saturating_add(count).min(self.end);
    }

    /// Skip a run of `byte`
    #[inline]
    pub fn skip_char(&mut self, byte: u8) {
        while self.peek() == Some(byte) {
            self.index += 1;
        }
    }

    /// Skip one `byte` if it is next; returns whether it was skipped
    #[inline]
    pub fn skip_single(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Advance until `predicate` holds for the current byte, or to the end
    #[inline]
    pub fn skip_until<P: FnMut(u8) -> bool>(&mut self, mut predicate: P) {
        while let Some(byte) = self.peek() {
            if predicate(byte) {
                break;
            }
            self.index += 1;
        }
    }

    /// Advance while `predicate` holds for the current byte
    #[inline]
    pub fn skip_while<P: FnMut(u8) -> bool>(&mut self, mut predicate: P) {
        self.skip_until(|b| !predicate(b));
    }

    /// Move to the start of the next occurrence of `pattern`
    ///
    /// Moves to the end and returns `false` when there is none.
    #[inline]
    pub fn skip_to(&mut self, pattern: &BytePattern) -> bool {
        match pattern.find(self.buffer, self.index, self.end) {
            Some(found) => {
                self.index = found;
                true
            }
            None => {
                self.index = self.end;
                false
            }
        }
    }

    /// Move forward to `index`, clamped to the readable range
    ///
    /// Never moves backward.
    #[inline]
    pub fn skip_to_index(&mut self, index: usize) {
        self.index = index.clamp(self.index, self.end);
    }

    /// Jump to the end of the range
    #[inline]
    pub fn end(&mut self) {
        self.index = self.end;
    }

    // ------------------------------------------------------------------------
    // Numbers
    // ------------------------------------------------------------------------

    /// Read a decimal integer with an optional leading `-`
    ///
    /// Stops at the first non-digit after at least one digit. Values that do
    /// not fit in 64 bits wrap. On failure the cursor does not move.
    ///
    /// # Errors
    /// [`ScanError::MalformedNumber`] when no digit is found before a
    /// non-digit or the end.
    pub fn read_long(&mut self) -> ScanResult<i64> {
        let begin = self.index;
        let negative = self.peek() == Some(b'-');
        let digits = if negative { begin + 1 } else { begin };

        let mut at = digits;
        let mut value: u64 = 0;
        while at < self.end {
            let byte = self.buffer[at];
            if !byte.is_ascii_digit() {
                break;
            }
            value = value.wrapping_mul(10).wrapping_add(u64::from(byte - b'0'));
            at += 1;
        }

        if at == digits {
            return Err(ScanError::malformed_number(begin, &self.buffer[begin..self.end]));
        }

        self.index = at;
        let value = value as i64;
        Ok(if negative { value.wrapping_neg() } else { value })
    }

    /// Read a decimal integer truncated to 32 bits
    #[inline]
    pub fn read_int(&mut self) -> ScanResult<i32> {
        self.read_long().map(|value| value as i32)
    }

    /// Read a decimal number with an optional fraction
    ///
    /// Skips forward to the first `.` or digit. A `-` immediately before it
    /// negates the result. Up to [`MAX_FRACTION_DIGITS`] fractional digits
    /// contribute; further digits are consumed and ignored. On failure the
    /// cursor does not move.
    ///
    /// # Errors
    /// [`ScanError::MalformedNumber`] when neither an integer part nor a
    /// fraction digit is found.
    pub fn read_double(&mut self) -> ScanResult<f64> {
        let begin = self.index;
        self.skip_until(|b| b == b'.' || b.is_ascii_digit());
        let negative = self.index > begin && self.buffer[self.index - 1] == b'-';

        let mut seen_digit = false;
        let mut value = 0.0;
        if self.is_digit() {
            value = self.read_long()? as f64;
            seen_digit = true;
        }

        if self.skip_single(b'.') {
            let mut fraction: u64 = 0;
            let mut count = 0;
            while let Some(byte) = self.peek().filter(u8::is_ascii_digit) {
                if count < MAX_FRACTION_DIGITS {
                    fraction = fraction * 10 + u64::from(byte - b'0');
                    count += 1;
                }
                seen_digit = true;
                self.index += 1;
            }
            value += fraction as f64 / POW10[count];
        }

        if !seen_digit {
            self.index = begin;
            return Err(ScanError::malformed_number(begin, &self.buffer[begin..self.end]));
        }
        Ok(if negative { -value } else { value })
    }

    // ------------------------------------------------------------------------
    // Slices and strings
    // ------------------------------------------------------------------------

    /// A preview cursor at the current position
    ///
    /// The preview scans ahead independently and cannot rewind before the
    /// position it was created at.
    #[inline]
    pub fn preview(&self) -> PreviewCursor<'a> {
        PreviewCursor::new(*self)
    }

    /// Slice from the current position to wherever `scan` leaves a preview
    ///
    /// Runs `scan` on a preview cursor at the current position, returns the
    /// bytes between here and the preview's final position, and advances this
    /// cursor past them. If `scan` fails the cursor does not move.
    pub fn slice_to<F>(&mut self, scan: F) -> ScanResult<ByteSlice<'a>>
    where
        F: FnOnce(&mut PreviewCursor<'a>) -> ScanResult<()>,
    {
        let mut preview = self.preview();
        scan(&mut preview)?;
        let stop = preview.index();
        let slice = ByteSlice::new(self.buffer, self.index, stop);
        self.index = stop;
        Ok(slice)
    }

    /// Like [`slice_to`](Self::slice_to), resolving the slice to a string
    ///
    /// The string comes from the attached cache when there is one, otherwise
    /// it is allocated directly. Either way it owns its contents.
    pub fn string_to<F>(&mut self, scan: F) -> ScanResult<Rc<str>>
    where
        F: FnOnce(&mut PreviewCursor<'a>) -> ScanResult<()>,
    {
        let slice = self.slice_to(scan)?;
        Ok(self.resolve(&slice))
    }

    /// Slice up to (not including) the next `byte`, or to the end
    #[inline]
    pub fn slice_until(&mut self, byte: u8) -> ByteSlice<'a> {
        let stop = memchr::memchr(byte, self.remaining()).map_or(self.end, |i| self.index + i);
        let slice = ByteSlice::new(self.buffer, self.index, stop);
        self.index = stop;
        slice
    }

    /// String up to (not including) the next `byte`, or to the end
    #[inline]
    pub fn string_until(&mut self, byte: u8) -> Rc<str> {
        let slice = self.slice_until(byte);
        self.resolve(&slice)
    }

    /// Turn a slice into an owned string, interning it when a cache is attached
    #[inline]
    pub fn resolve(&self, slice: &ByteSlice<'_>) -> Rc<str> {
        match self.cache {
            Some(cache) => cache.string_for(slice),
            None => Rc::from(slice.to_string_lossy().as_ref()),
        }
    }

    // ------------------------------------------------------------------------
    // Pattern matching
    // ------------------------------------------------------------------------

    /// Match the unread bytes, returning whether the matcher succeeded
    ///
    /// On success, [`match_result`](Self::match_result) gives access to the
    /// captures. The cursor does not move.
    #[inline]
    pub fn try_match<M: PatternMatcher + ?Sized>(&self, matcher: &mut M) -> bool {
        matcher.reset(self.text_view())
    }

    /// Match the unread bytes, failing if the matcher does not match
    ///
    /// The cursor does not move; use [`MatchResult::end`] with
    /// [`skip_to_index`](Self::skip_to_index) to consume the match.
    pub fn match_with<'m, M: PatternMatcher + ?Sized>(
        &self,
        matcher: &'m mut M,
    ) -> ScanResult<MatchResult<'a, 'm, M>> {
        if !matcher.reset(self.text_view()) {
            return Err(ScanError::NoMatch { offset: self.index });
        }
        Ok(MatchResult::new(*self, matcher))
    }

    /// Captures of the last successful [`try_match`](Self::try_match) at this
    /// position
    #[inline]
    pub fn match_result<'m, M: PatternMatcher + ?Sized>(&self, matcher: &'m M) -> MatchResult<'a, 'm, M> {
        MatchResult::new(*self, matcher)
    }
}

impl fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = &self.remaining()[..self.remaining_len().min(16)];
        f.debug_struct("Cursor")
            .field("index", &self.index)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("next", &shown.escape_ascii().to_string())
            .finish()
    }
}
