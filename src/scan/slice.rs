//! Byte slices with content equality
//!
//! A [`ByteSlice`] is a `[start, end)` view into a byte buffer that is either
//! borrowed from the buffer being scanned or owned outright. Equality and
//! hashing look only at the referenced bytes, so a slice cut from one buffer
//! equals a slice cut from another when their contents agree.
//!
//! Borrowed slices cannot outlive the buffer they were cut from. Call
//! [`ByteSlice::compact`] to copy the bytes into a minimal owned buffer, for
//! example before using the slice as a map key.

use std::borrow::{Borrow, Cow};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;

/// A view of `buffer[start..end]`
#[derive(Clone)]
pub struct ByteSlice<'a> {
    buffer: Cow<'a, [u8]>,
    start: usize,
    end: usize,
}

impl<'a> ByteSlice<'a> {
    /// Create a slice borrowing `buffer[start..end]`
    ///
    /// # Panics
    /// Panics if the range is out of bounds or `start > end`.
    #[inline]
    pub fn new(buffer: &'a [u8], start: usize, end: usize) -> Self {
        assert!(
            start <= end && end <= buffer.len(),
            "slice range {}..{} out of bounds for buffer of length {}",
            start,
            end,
            buffer.len()
        );
        Self {
            buffer: Cow::Borrowed(buffer),
            start,
            end,
        }
    }

    /// Create a slice covering a whole borrowed buffer
    #[inline]
    pub fn from_bytes(buffer: &'a [u8]) -> Self {
        Self::new(buffer, 0, buffer.len())
    }

    /// Create a slice that owns its bytes
    #[inline]
    pub fn owned(bytes: Vec<u8>) -> ByteSlice<'static> {
        let end = bytes.len();
        ByteSlice {
            buffer: Cow::Owned(bytes),
            start: 0,
            end,
        }
    }

    /// The empty slice
    #[inline]
    pub fn empty() -> ByteSlice<'static> {
        ByteSlice {
            buffer: Cow::Borrowed(&[]),
            start: 0,
            end: 0,
        }
    }

    /// The referenced bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer[self.start..self.end]
    }

    /// The whole backing buffer, including bytes outside this slice
    #[inline]
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Start offset in the backing buffer
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// End offset (exclusive) in the backing buffer
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// The slice's range within the backing buffer
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Number of referenced bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the slice references no bytes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether the backing buffer is owned by this slice
    #[inline]
    pub fn is_owned(&self) -> bool {
        matches!(self.buffer, Cow::Owned(_))
    }

    /// Copy the referenced bytes into a freshly owned, minimal-length buffer
    ///
    /// The result no longer borrows the original buffer, so it may be kept
    /// after that buffer is reused or dropped.
    #[inline]
    pub fn compact(&self) -> ByteSlice<'static> {
        ByteSlice::owned(self.as_bytes().to_vec())
    }

    /// Decode the bytes as UTF-8, replacing invalid sequences
    #[inline]
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }
}

impl Default for ByteSlice<'_> {
    fn default() -> Self {
        ByteSlice {
            buffer: Cow::Borrowed(&[]),
            start: 0,
            end: 0,
        }
    }
}

impl PartialEq for ByteSlice<'_> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for ByteSlice<'_> {}

impl PartialEq<[u8]> for ByteSlice<'_> {
    #[inline]
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl PartialEq<&[u8]> for ByteSlice<'_> {
    #[inline]
    fn eq(&self, other: &&[u8]) -> bool {
        self.as_bytes() == *other
    }
}

impl<const N: usize> PartialEq<&[u8; N]> for ByteSlice<'_> {
    #[inline]
    fn eq(&self, other: &&[u8; N]) -> bool {
        self.as_bytes() == other.as_slice()
    }
}

// Must hash exactly like `[u8]` so `Borrow<[u8]>` lookups work.
impl Hash for ByteSlice<'_> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state)
    }
}

impl Borrow<[u8]> for ByteSlice<'_> {
    #[inline]
    fn borrow(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for ByteSlice<'_> {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for ByteSlice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ByteSlice({}..{} \"{}\")",
            self.start,
            self.end,
            self.as_bytes().escape_ascii()
        )
    }
}

impl fmt::Display for ByteSlice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}
