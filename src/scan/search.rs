//! Boyer–Moore–Horspool search with the good-suffix rule
//!
//! A [`BytePattern`] compiles a fixed pattern once into two skip tables:
//!
//! - **Bad character** (256 entries): for each byte value, the distance from
//!   its last occurrence in the pattern (excluding the final byte) to the end
//!   of the pattern. Bytes that do not occur skip the full pattern length.
//! - **Good suffix** (one entry per pattern byte): how far the pattern can
//!   slide after a mismatch at a given position, based on how the already
//!   matched suffix recurs inside the pattern.
//!
//! On a mismatch the engine takes the larger of the two skips.
//!
//! # Windowed search
//!
//! [`BytePattern::find_in`] searches a [`WindowedSource`] with the same
//! alignment and skip logic. When the bytes under the current alignment all
//! sit in one resident window, the backward scan runs directly over that
//! window's bytes (the fast path). When the alignment straddles a window
//! boundary, bytes are fetched one at a time through the source, loading
//! windows as needed (the slow path). Both paths produce the same positions as
//! [`BytePattern::find`] over the equivalent flat buffer.
//!
//! # Example
//!
//! ```rust
//! use tracescan::BytePattern;
//!
//! let pattern = BytePattern::new(b";").unwrap();
//! let text = b"name=worker-3;ts=1023.500;";
//! assert_eq!(pattern.find(text, 0, text.len()), Some(13));
//! assert_eq!(pattern.find(text, 14, text.len()), Some(25));
//! ```

use super::error::{ScanError, ScanResult};
use super::slice::ByteSlice;
use super::window::{Window, WindowRef, WindowedSource};
use std::fmt;
use std::str::FromStr;

/// Longest pattern the skip tables support
pub const MAX_PATTERN_LEN: usize = 127;

/// Outcome of one backward scan at an alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// The pattern matched ending at the alignment
    Match,
    /// Advance the alignment by this many bytes
    Skip(usize),
}

/// A compiled search pattern
#[derive(Clone)]
pub struct BytePattern {
    /// The pattern bytes
    pattern: Box<[u8]>,

    /// Bad-character skip per byte value (at most `MAX_PATTERN_LEN`)
    bad_char: [u8; 256],

    /// Good-suffix skip per mismatch position
    good_suffix: Box<[usize]>,
}

impl BytePattern {
    /// Compile a pattern
    ///
    /// # Errors
    /// Returns [`ScanError::InvalidPattern`] if the pattern is empty or longer
    /// than [`MAX_PATTERN_LEN`] bytes.
    pub fn new(pattern: &[u8]) -> ScanResult<Self> {
        if pattern.is_empty() {
            return Err(ScanError::InvalidPattern {
                length: 0,
                reason: "pattern must not be empty",
            });
        }
        if pattern.len() > MAX_PATTERN_LEN {
            return Err(ScanError::InvalidPattern {
                length: pattern.len(),
                reason: "pattern longer than 127 bytes",
            });
        }

        Ok(Self {
            pattern: pattern.into(),
            bad_char: bad_char_table(pattern),
            good_suffix: good_suffix_table(pattern),
        })
    }

    /// The pattern bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.pattern
    }

    /// Pattern length in bytes
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.pattern.len()
    }

    /// Bad-character skip for a byte value
    #[inline]
    pub fn bad_char_skip(&self, byte: u8) -> usize {
        self.bad_char[byte as usize] as usize
    }

    /// Good-suffix skip for a mismatch at pattern position `position`
    #[inline]
    pub fn good_suffix_skip(&self, position: usize) -> usize {
        self.good_suffix[position]
    }

    /// How far to move the alignment after `byte` mismatched pattern position `j`
    #[inline]
    fn shift(&self, byte: u8, j: usize) -> usize {
        // Both skips are measured from the mismatched byte, the alignment sits
        // `len - 1 - j` bytes to its right.
        let skip = self.bad_char_skip(byte).max(self.good_suffix[j]);
        skip - (self.pattern.len() - 1 - j)
    }

    /// Backward scan of `data` with the pattern's last byte aligned at `align`
    #[inline]
    fn scan(&self, data: &[u8], align: usize) -> Step {
        let last = self.pattern.len() - 1;
        let mut j = last;
        loop {
            let byte = data[align - (last - j)];
            if byte != self.pattern[j] {
                return Step::Skip(self.shift(byte, j));
            }
            if j == 0 {
                return Step::Match;
            }
            j -= 1;
        }
    }

    /// Find the first occurrence within `haystack[start..end]`
    ///
    /// The whole match must lie inside the range. `end` is clamped to the
    /// haystack length. Returns the index of the match start.
    pub fn find(&self, haystack: &[u8], start: usize, end: usize) -> Option<usize> {
        let end = end.min(haystack.len());
        if start >= end {
            return None;
        }

        if let [byte] = *self.pattern {
            return memchr::memchr(byte, &haystack[start..end]).map(|i| start + i);
        }

        let last = self.pattern.len() - 1;
        let mut align = start + last;
        while align < end {
            match self.scan(haystack, align) {
                Step::Match => return Some(align - last),
                Step::Skip(n) => align += n,
            }
        }
        None
    }

    /// Find the first occurrence inside a [`ByteSlice`]
    ///
    /// The returned index is relative to the slice's backing buffer, like the
    /// slice's own `start` and `end`.
    #[inline]
    pub fn find_slice(&self, slice: &ByteSlice<'_>) -> Option<usize> {
        self.find(slice.buffer(), slice.start(), slice.end())
    }

    /// Iterate over non-overlapping occurrences in `haystack`
    #[inline]
    pub fn find_iter<'p, 'h>(&'p self, haystack: &'h [u8]) -> FindIter<'p, 'h> {
        FindIter {
            pattern: self,
            haystack,
            position: 0,
        }
    }

    /// Find the first occurrence at or after `start` and before `end` in a
    /// windowed source
    ///
    /// Windows are loaded as needed. Once the source reports end of stream,
    /// `end` is clamped to the source's end index. Returns the global index of
    /// the match start, or `None` if there is no match in range.
    pub fn find_in<S>(&self, source: &mut S, start: usize, end: usize) -> ScanResult<Option<usize>>
    where
        S: WindowedSource + ?Sized,
    {
        self.search_windowed(source, start, end)
    }

    /// Find the first occurrence at or after `start` within the part of the
    /// stream that has already been read
    ///
    /// The search never pulls bytes past the source's current end index.
    /// Windows below it that were evicted may be reloaded.
    pub fn find_loaded<S>(&self, source: &mut S, start: usize) -> ScanResult<Option<usize>>
    where
        S: WindowedSource + ?Sized,
    {
        let end = source.end_index();
        self.search_windowed(source, start, end)
    }

    fn search_windowed<S>(&self, source: &mut S, start: usize, end: usize) -> ScanResult<Option<usize>>
    where
        S: WindowedSource + ?Sized,
    {
        let last = self.pattern.len() - 1;
        let mut end = end;
        if source.reached_eof() {
            end = end.min(source.end_index());
        }
        let Some(mut align) = start.checked_add(last) else {
            return Ok(None);
        };

        let mut window: Option<WindowRef> = None;
        while align < end {
            if !window.as_ref().is_some_and(|w| w.contains(align)) {
                if !source.load_index(align)? {
                    return Ok(None);
                }
                if source.reached_eof() {
                    end = end.min(source.end_index());
                    if align >= end {
                        return Ok(None);
                    }
                }
                let next = source
                    .window_for(align)
                    .ok_or(ScanError::Unavailable { index: align })?;
                window = Some(next);
            }
            let Some(current) = window.as_ref() else {
                return Err(ScanError::Unavailable { index: align });
            };

            let low = align - last;
            let step = if low >= current.global_start() {
                let data = current.as_bytes();
                self.scan(data, align - current.global_start())
            } else {
                self.scan_across(source, current, align)?
            };

            match step {
                Step::Match => return Ok(Some(low)),
                Step::Skip(n) => align += n,
            }
        }
        Ok(None)
    }

    /// Backward scan whose bytes straddle window boundaries
    ///
    /// Fetches bytes one at a time, loading each window the scan enters.
    fn scan_across<S>(&self, source: &mut S, current: &WindowRef, align: usize) -> ScanResult<Step>
    where
        S: WindowedSource + ?Sized,
    {
        log_trace!(
            "pattern scan at {} crosses window start {}",
            align,
            current.global_start()
        );

        let last = self.pattern.len() - 1;
        let mut window = WindowRef::clone(current);
        for j in (0..=last).rev() {
            let index = align - (last - j);
            if !window.contains(index) {
                if !source.load_index(index)? {
                    return Err(ScanError::Unavailable { index });
                }
                let next = source
                    .window_for(index)
                    .ok_or(ScanError::Unavailable { index })?;
                debug_assert!(!Window::same(&window, &next));
                window = next;
            }
            let byte = window
                .byte_at(index)
                .ok_or(ScanError::Unavailable { index })?;
            if byte != self.pattern[j] {
                return Ok(Step::Skip(self.shift(byte, j)));
            }
        }
        Ok(Step::Match)
    }
}

impl FromStr for BytePattern {
    type Err = ScanError;

    #[inline]
    fn from_str(pattern: &str) -> ScanResult<Self> {
        Self::new(pattern.as_bytes())
    }
}

impl fmt::Debug for BytePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BytePattern(\"{}\")", self.pattern.escape_ascii())
    }
}

/// Iterator over non-overlapping matches in a flat buffer
#[derive(Debug)]
pub struct FindIter<'p, 'h> {
    pattern: &'p BytePattern,
    haystack: &'h [u8],
    position: usize,
}

impl Iterator for FindIter<'_, '_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let found = self
            .pattern
            .find(self.haystack, self.position, self.haystack.len())?;
        self.position = found + self.pattern.len();
        Some(found)
    }
}

/// Build the bad-character table
///
/// Every byte of the pattern except the last records its distance to the
/// pattern end; later occurrences overwrite earlier ones.
fn bad_char_table(pattern: &[u8]) -> [u8; 256] {
    let len = pattern.len();
    let mut table = [len as u8; 256];
    for (i, &byte) in pattern[..len - 1].iter().enumerate() {
        table[byte as usize] = (len - 1 - i) as u8;
    }
    table
}

/// Whether `pattern[pos..]` is a prefix of `pattern`
fn is_prefix(pattern: &[u8], pos: usize) -> bool {
    let suffix = &pattern[pos..];
    pattern.starts_with(suffix)
}

/// Length of the longest substring ending at `pattern[pos]` that is also a
/// suffix of `pattern`, capped at `pos`
fn suffix_length(pattern: &[u8], pos: usize) -> usize {
    let last = pattern.len() - 1;
    let mut i = 0;
    while i < pos && pattern[pos - i] == pattern[last - i] {
        i += 1;
    }
    i
}

/// Build the good-suffix table
///
/// Entry `j` is the skip, measured from the mismatched text byte, after a
/// mismatch at pattern position `j` with `pattern[j + 1..]` matched.
fn good_suffix_table(pattern: &[u8]) -> Box<[usize]> {
    let len = pattern.len();
    let last = len - 1;
    let mut table = vec![0usize; len];

    // Case 1: the matched suffix does not recur; slide to the longest prefix
    // that is also a suffix.
    let mut last_prefix = len;
    for p in (0..len).rev() {
        if is_prefix(pattern, p + 1) {
            last_prefix = p + 1;
        }
        table[p] = last_prefix + (last - p);
    }

    // Case 2: the matched suffix recurs preceded by a different byte.
    for p in 0..last {
        let slen = suffix_length(pattern, p);
        if pattern[p - slen] != pattern[last - slen] {
            table[last - slen] = last - p + slen;
        }
    }

    table.into_boxed_slice()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::paged::{PagedSource, WindowConfig};
    use std::io::Cursor;

    fn naive(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    fn paged(data: &[u8], window_size: usize) -> PagedSource<Cursor<Vec<u8>>> {
        PagedSource::new(Cursor::new(data.to_vec()), WindowConfig::new(window_size, 2)).unwrap()
    }

    #[test]
    fn test_rejects_bad_lengths() {
        assert!(matches!(
            BytePattern::new(b""),
            Err(ScanError::InvalidPattern { length: 0, .. })
        ));
        let long = vec![b'a'; MAX_PATTERN_LEN + 1];
        assert!(matches!(
            BytePattern::new(&long),
            Err(ScanError::InvalidPattern { length: 128, .. })
        ));
        assert!(BytePattern::new(&long[..MAX_PATTERN_LEN]).is_ok());
    }

    #[test]
    fn test_bad_char_table() {
        let pattern = BytePattern::new(b"abcab").unwrap();
        // last 'a' before the final byte is at 3, last 'b' is at 1, 'c' at 2
        assert_eq!(pattern.bad_char_skip(b'a'), 1);
        assert_eq!(pattern.bad_char_skip(b'b'), 3);
        assert_eq!(pattern.bad_char_skip(b'c'), 2);
        assert_eq!(pattern.bad_char_skip(b'z'), 5);
    }

    #[test]
    fn test_good_suffix_table() {
        // Classic example: "ANPANMAN"
        let pattern = BytePattern::new(b"ANPANMAN").unwrap();
        let table: Vec<usize> = (0..8).map(|j| pattern.good_suffix_skip(j)).collect();
        assert_eq!(table, vec![13, 12, 11, 10, 9, 5, 9, 1]);
    }

    #[test]
    fn test_good_suffix_repeated_byte() {
        let pattern = BytePattern::new(b"aaa").unwrap();
        assert_eq!(pattern.good_suffix_skip(2), 3);
    }

    #[test]
    fn test_find_basic() {
        let pattern: BytePattern = "needle".parse().unwrap();
        let text = b"haystack with a needle in it";
        assert_eq!(pattern.find(text, 0, text.len()), Some(16));
        assert_eq!(pattern.find(text, 17, text.len()), None);
        assert_eq!(pattern.find(text, 0, 21), None);
        assert_eq!(pattern.find(text, 0, 22), Some(16));
    }

    #[test]
    fn test_find_at_edges() {
        let pattern = BytePattern::new(b"ab").unwrap();
        assert_eq!(pattern.find(b"ab", 0, 2), Some(0));
        assert_eq!(pattern.find(b"aab", 0, 3), Some(1));
        assert_eq!(pattern.find(b"a", 0, 1), None);
        assert_eq!(pattern.find(b"", 0, 0), None);
        assert_eq!(pattern.find(b"xxab", 3, 4), None);
        assert_eq!(pattern.find(b"xxab", 0, 100), Some(2));
    }

    #[test]
    fn test_find_matches_naive() {
        let texts: [&[u8]; 4] = [
            b"abababababcabababc",
            b"ANPANMAN ANPANMANPANMAN",
            b"aaaaaaaaaaaaaaaab",
            b"the quick brown fox jumps over the lazy dog",
        ];
        let patterns: [&[u8]; 7] = [b"abc", b"ANPANMAN", b"aab", b"ab", b"dog", b"o", b"PANMANP"];
        for text in texts {
            for pat in patterns {
                let compiled = BytePattern::new(pat).unwrap();
                assert_eq!(
                    compiled.find(text, 0, text.len()),
                    naive(text, pat),
                    "pattern {:?} in {:?}",
                    compiled,
                    ByteSlice::from_bytes(text)
                );
            }
        }
    }

    #[test]
    fn test_find_slice_is_buffer_relative() {
        let buffer = b";;abc;def";
        let slice = ByteSlice::new(buffer, 2, buffer.len());
        let pattern = BytePattern::new(b";").unwrap();
        assert_eq!(pattern.find_slice(&slice), Some(5));
    }

    #[test]
    fn test_find_iter() {
        let pattern = BytePattern::new(b"aa").unwrap();
        let hits: Vec<usize> = pattern.find_iter(b"aaaaa").collect();
        assert_eq!(hits, vec![0, 2]);

        let semi = BytePattern::new(b";").unwrap();
        let hits: Vec<usize> = semi.find_iter(b"a;b;c;").collect();
        assert_eq!(hits, vec![1, 3, 5]);
    }

    #[test]
    fn test_windowed_straddling_match() {
        // "XY" begins one byte before the boundary at 8 and ends one after.
        let data = b"0123456XY9abcdef";
        let pattern = BytePattern::new(b"6XY9").unwrap();
        let mut source = paged(data, 8);
        assert_eq!(pattern.find_in(&mut source, 0, usize::MAX).unwrap(), Some(6));

        let pattern = BytePattern::new(b"XY").unwrap();
        let mut source = paged(data, 8);
        assert_eq!(pattern.find_in(&mut source, 0, usize::MAX).unwrap(), Some(7));
    }

    #[test]
    fn test_windowed_pattern_longer_than_window() {
        let data = b"..........abcdefghij..........";
        let pattern = BytePattern::new(b"abcdefghij").unwrap();
        let mut source = paged(data, 3);
        assert_eq!(pattern.find_in(&mut source, 0, usize::MAX).unwrap(), Some(10));
    }

    #[test]
    fn test_windowed_not_found_clamps_to_eof() {
        let data = b"nothing to see here";
        let pattern = BytePattern::new(b"zz").unwrap();
        let mut source = paged(data, 4);
        assert_eq!(pattern.find_in(&mut source, 0, usize::MAX).unwrap(), None);
        assert!(source.reached_eof());
    }

    #[test]
    fn test_windowed_respects_bounds() {
        let data = b"ab;cd;ef;";
        let pattern = BytePattern::new(b";").unwrap();
        let mut source = paged(data, 4);
        assert_eq!(pattern.find_in(&mut source, 3, usize::MAX).unwrap(), Some(5));
        assert_eq!(pattern.find_in(&mut source, 0, 2).unwrap(), None);
        assert_eq!(pattern.find_in(&mut source, 6, 9).unwrap(), Some(8));
    }

    #[test]
    fn test_find_loaded_stays_within_frontier() {
        let data = b"aaaaaaaa;bbbbbbb;";
        let pattern = BytePattern::new(b";").unwrap();
        let mut source = paged(data, 4);
        assert!(source.load_index(0).unwrap());
        assert_eq!(pattern.find_loaded(&mut source, 0).unwrap(), None);
        assert_eq!(source.end_index(), 4);

        assert!(source.load_index(8).unwrap());
        assert_eq!(pattern.find_loaded(&mut source, 0).unwrap(), Some(8));
        assert_eq!(source.end_index(), 12);
    }

    #[test]
    fn test_windowed_with_single_resident_window() {
        let data = b"xxxxxxxabcdxxxxx";
        let pattern = BytePattern::new(b"abcd").unwrap();
        let mut source =
            PagedSource::new(Cursor::new(data.to_vec()), WindowConfig::new(4, 1)).unwrap();
        assert_eq!(pattern.find_in(&mut source, 0, usize::MAX).unwrap(), Some(7));
    }
}
