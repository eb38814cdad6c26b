//! Pattern matching at the cursor
//!
//! A [`PatternMatcher`] is reset against the unread bytes of a cursor and,
//! on success, reports capture groups as byte ranges relative to the cursor's
//! position. A [`MatchResult`] ties those ranges back to the buffer so each
//! group can be read with the regular cursor operations.
//!
//! [`RegexMatcher`] is the stock implementation, built on anchored
//! [`regex::bytes::Regex`] patterns: a match must begin at the cursor.
//!
//! ```rust
//! use tracescan::{Cursor, RegexMatcher};
//!
//! let mut matcher = RegexMatcher::new(r"(?P<tid>\d+):(?P<dur>\d+\.\d+)ms").unwrap();
//! let cursor = Cursor::new(b"17:2.75ms rest");
//! let result = cursor.match_with(&mut matcher).unwrap();
//! assert_eq!(result.read_int("tid").unwrap(), 17);
//! assert_eq!(result.read_double("dur").unwrap(), 2.75);
//! assert_eq!(result.end().unwrap(), 9);
//! ```

use super::cursor::Cursor;
use super::error::{ScanError, ScanResult};
use super::regex_cache;
use super::slice::ByteSlice;
use regex::bytes::{CaptureLocations, Regex};
use std::fmt;
use std::ops::Range;
use std::rc::Rc;

// ============================================================================
// Text view
// ============================================================================

/// The unread bytes of a cursor, seen as one character per byte
///
/// Each byte maps to the character with the same code point, so the view
/// never fails to decode and character indices equal byte offsets.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TextView<'a> {
    bytes: &'a [u8],
}

impl<'a> TextView<'a> {
    /// View over `bytes`
    #[inline]
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// The underlying bytes
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Length in characters, which is also the length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Character at `index`
    #[inline]
    pub fn char_at(&self, index: usize) -> Option<char> {
        self.bytes.get(index).map(|&b| char::from(b))
    }

    /// Characters of the view, one per byte
    #[inline]
    pub fn chars(&self) -> impl Iterator<Item = char> + 'a {
        self.bytes.iter().map(|&b| char::from(b))
    }

    /// View of `range`, or `None` if out of bounds
    #[inline]
    pub fn sub_view(&self, range: Range<usize>) -> Option<TextView<'a>> {
        self.bytes.get(range).map(TextView::new)
    }
}

impl fmt::Display for TextView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.chars() {
            fmt::Write::write_char(f, c)?;
        }
        Ok(())
    }
}

impl fmt::Debug for TextView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextView(\"{}\")", self.bytes.escape_ascii())
    }
}

// ============================================================================
// Matchers
// ============================================================================

/// A pattern that can be matched at the start of a [`TextView`]
pub trait PatternMatcher {
    /// Match against `text`, replacing any previous result
    ///
    /// Returns whether the pattern matched at the start of the text.
    fn reset(&mut self, text: TextView<'_>) -> bool;

    /// Range of capture group `group` in the last matched text
    ///
    /// Group 0 is the whole match. `None` if there is no current match, the
    /// group does not exist, or it did not participate.
    fn group_range(&self, group: usize) -> Option<Range<usize>>;

    /// Range of the named capture group in the last matched text
    fn named_group_range(&self, name: &str) -> Option<Range<usize>>;

    /// Number of groups, including group 0
    fn group_count(&self) -> usize;
}

/// [`PatternMatcher`] over an anchored byte regex
#[derive(Clone)]
pub struct RegexMatcher {
    regex: Regex,
    locations: CaptureLocations,
    matched: bool,
}

impl RegexMatcher {
    /// Compile `pattern` anchored at the start of the input
    ///
    /// # Errors
    /// [`ScanError::InvalidRegex`] if the pattern does not compile.
    pub fn new(pattern: &str) -> ScanResult<Self> {
        regex_cache::compile_anchored(pattern).map(Self::from_regex)
    }

    /// Like [`new`](Self::new), reusing this thread's compiled regex cache
    pub fn cached(pattern: &str) -> ScanResult<Self> {
        regex_cache::get_or_compile(pattern).map(Self::from_regex)
    }

    /// Wrap an already compiled regex
    ///
    /// The regex is used as is; without a leading `^` it may match anywhere
    /// in the remaining bytes.
    pub fn from_regex(regex: Regex) -> Self {
        let locations = regex.capture_locations();
        Self {
            regex,
            locations,
            matched: false,
        }
    }

    /// The compiled regex, including the anchor
    #[inline]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Whether the last reset matched
    #[inline]
    pub fn is_matched(&self) -> bool {
        self.matched
    }
}

impl PatternMatcher for RegexMatcher {
    fn reset(&mut self, text: TextView<'_>) -> bool {
        self.matched = self
            .regex
            .captures_read(&mut self.locations, text.as_bytes())
            .is_some();
        self.matched
    }

    fn group_range(&self, group: usize) -> Option<Range<usize>> {
        if !self.matched {
            return None;
        }
        self.locations.get(group).map(|(start, end)| start..end)
    }

    fn named_group_range(&self, name: &str) -> Option<Range<usize>> {
        let group = self
            .regex
            .capture_names()
            .position(|n| n == Some(name))?;
        self.group_range(group)
    }

    fn group_count(&self) -> usize {
        self.locations.len()
    }
}

impl fmt::Debug for RegexMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegexMatcher")
            .field("pattern", &self.regex.as_str())
            .field("matched", &self.matched)
            .finish()
    }
}

// ============================================================================
// Match results
// ============================================================================

/// A way of naming a capture group: by index or by name
pub trait CaptureGroup {
    /// The group's range within the matched text
    fn range_in<M: PatternMatcher + ?Sized>(&self, matcher: &M) -> Option<Range<usize>>;

    /// Label used in error messages
    fn label(&self) -> String;
}

impl CaptureGroup for usize {
    #[inline]
    fn range_in<M: PatternMatcher + ?Sized>(&self, matcher: &M) -> Option<Range<usize>> {
        matcher.group_range(*self)
    }

    fn label(&self) -> String {
        self.to_string()
    }
}

impl CaptureGroup for &str {
    #[inline]
    fn range_in<M: PatternMatcher + ?Sized>(&self, matcher: &M) -> Option<Range<usize>> {
        matcher.named_group_range(self)
    }

    fn label(&self) -> String {
        (*self).to_string()
    }
}

/// Captures of a successful match, anchored at the cursor it was made from
pub struct MatchResult<'a, 'm, M: PatternMatcher + ?Sized> {
    base: Cursor<'a>,
    matcher: &'m M,
}

impl<'a, 'm, M: PatternMatcher + ?Sized> MatchResult<'a, 'm, M> {
    #[inline]
    pub(super) fn new(base: Cursor<'a>, matcher: &'m M) -> Self {
        Self { base, matcher }
    }

    /// Buffer range of `group`
    ///
    /// # Errors
    /// [`ScanError::MissingGroup`] if the group does not exist or did not
    /// participate in the match.
    pub fn range<G: CaptureGroup>(&self, group: G) -> ScanResult<Range<usize>> {
        let local = group
            .range_in(self.matcher)
            .ok_or_else(|| ScanError::MissingGroup { group: group.label() })?;
        let origin = self.base.index();
        Ok(origin + local.start..origin + local.end)
    }

    /// Buffer index where the whole match ends
    #[inline]
    pub fn end(&self) -> ScanResult<usize> {
        self.range(0).map(|r| r.end)
    }

    /// A cursor over just the bytes of `group`
    pub fn cursor<G: CaptureGroup>(&self, group: G) -> ScanResult<Cursor<'a>> {
        let range = self.range(group)?;
        Ok(self.base.sub_cursor(range.start, range.end))
    }

    pub fn slice<G: CaptureGroup>(&self, group: G) -> ScanResult<ByteSlice<'a>> {
        let range = self.range(group)?;
        Ok(ByteSlice::new(self.base.buffer(), range.start, range.end))
    }

    pub fn read_int<G: CaptureGroup>(&self, group: G) -> ScanResult<i32> {
        self.cursor(group)?.read_int()
    }

    pub fn read_long<G: CaptureGroup>(&self, group: G) -> ScanResult<i64> {
        self.cursor(group)?.read_long()
    }

    pub fn read_double<G: CaptureGroup>(&self, group: G) -> ScanResult<f64> {
        self.cursor(group)?.read_double()
    }

    /// The group's bytes as a string, interned when the cursor has a cache
    pub fn read_string<G: CaptureGroup>(&self, group: G) -> ScanResult<Rc<str>> {
        let slice = self.slice(group)?;
        Ok(self.base.resolve(&slice))
    }
}

impl<M: PatternMatcher + ?Sized> fmt::Debug for MatchResult<'_, '_, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchResult")
            .field("origin", &self.base.index())
            .field("whole", &self.matcher.group_range(0))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::string_cache::StringCache;

    #[test]
    fn test_text_view_latin1() {
        let view = TextView::new(b"a\xe9");
        assert_eq!(view.len(), 2);
        assert_eq!(view.char_at(1), Some('\u{e9}'));
        assert_eq!(view.to_string(), "a\u{e9}");
        assert_eq!(view.sub_view(1..2).unwrap().as_bytes(), b"\xe9");
        assert!(view.sub_view(1..3).is_none());
    }

    #[test]
    fn test_regex_matches_latin1_view() {
        let mut cursor = Cursor::new(b"\xe9t\xe9 x=caf\xe9");
        assert_eq!(cursor.text_view().char_at(0), Some('\u{e9}'));

        let mut matcher = RegexMatcher::new("\u{e9}t\u{e9}").unwrap();
        assert!(cursor.try_match(&mut matcher));
        assert_eq!(matcher.group_range(0), Some(0..3));

        cursor.skip_count(4);
        let mut matcher = RegexMatcher::cached("x=(?P<word>[a-z\u{e0}-\u{ff}]+)").unwrap();
        let result = cursor.match_with(&mut matcher).unwrap();
        assert_eq!(result.slice("word").unwrap(), b"caf\xe9");
        assert_eq!(result.end().unwrap(), 10);
    }

    #[test]
    fn test_regex_matcher_anchored() {
        let mut matcher = RegexMatcher::new(r"\d+").unwrap();
        assert!(matcher.reset(TextView::new(b"42 rest")));
        assert_eq!(matcher.group_range(0), Some(0..2));
        assert!(!matcher.reset(TextView::new(b"x42")));
        assert_eq!(matcher.group_range(0), None);
    }

    #[test]
    fn test_named_groups() {
        let mut matcher = RegexMatcher::new(r"(?P<key>\w+)=(?P<value>\w+)?").unwrap();
        assert!(matcher.reset(TextView::new(b"pid=")));
        assert_eq!(matcher.named_group_range("key"), Some(0..3));
        assert_eq!(matcher.named_group_range("value"), None);
        assert_eq!(matcher.named_group_range("nope"), None);
        assert_eq!(matcher.group_count(), 3);
    }

    #[test]
    fn test_match_result_is_offset_by_cursor() {
        let mut cursor = Cursor::new(b"ts=1500 pid=-12 cpu=0.25");
        cursor.skip_count(8);
        let mut matcher = RegexMatcher::new(r"pid=(-?\d+) cpu=([\d.]+)").unwrap();
        let result = cursor.match_with(&mut matcher).unwrap();

        assert_eq!(result.range(1).unwrap(), 12..15);
        assert_eq!(result.read_long(1).unwrap(), -12);
        assert_eq!(result.read_double(2).unwrap(), 0.25);
        assert_eq!(result.slice(0).unwrap(), b"pid=-12 cpu=0.25");
        assert_eq!(result.end().unwrap(), 24);
        assert_eq!(cursor.index(), 8);
    }

    #[test]
    fn test_match_with_failure() {
        let cursor = Cursor::new(b"nothing");
        let mut matcher = RegexMatcher::new(r"\d").unwrap();
        let err = cursor.match_with(&mut matcher).unwrap_err();
        assert_eq!(err, ScanError::NoMatch { offset: 0 });
    }

    #[test]
    fn test_missing_group() {
        let cursor = Cursor::new(b"abc");
        let mut matcher = RegexMatcher::new("a(x)?").unwrap();
        let result = cursor.match_with(&mut matcher).unwrap();
        assert_eq!(
            result.read_string(1).unwrap_err(),
            ScanError::MissingGroup { group: "1".to_string() }
        );
        assert!(matches!(
            result.range(7),
            Err(ScanError::MissingGroup { .. })
        ));
    }

    #[test]
    fn test_group_cursor_is_bounded() {
        let cursor = Cursor::new(b"12345");
        let mut matcher = RegexMatcher::new(r"(\d\d)\d+").unwrap();
        let result = cursor.match_with(&mut matcher).unwrap();
        let mut group = result.cursor(1).unwrap();
        assert_eq!(group.read_long().unwrap(), 12);
        assert!(group.at_end());
    }

    #[test]
    fn test_read_string_uses_cache() {
        let cache = StringCache::new();
        let cursor = Cursor::new(b"name=main").with_cache(&cache);
        let mut matcher = RegexMatcher::cached(r"name=(\w+)").unwrap();
        assert!(cursor.try_match(&mut matcher));
        let result = cursor.match_result(&matcher);
        let first = result.read_string(1).unwrap();
        let second = result.read_string(1).unwrap();
        assert_eq!(&*first, "main");
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_unanchored_regex() {
        let regex = Regex::new(r"\d+").unwrap();
        let mut matcher = RegexMatcher::from_regex(regex);
        let cursor = Cursor::new(b"abc 99");
        let result = cursor.match_with(&mut matcher).unwrap();
        assert_eq!(result.read_int(0).unwrap(), 99);
    }
}
