//! Windows over a paged byte stream
//!
//! A [`Window`] is a resident chunk of a (possibly much larger than memory)
//! byte stream, tagged with its global position. Sources hand windows out as
//! shared [`WindowRef`] handles: two lookups that land in the same physical
//! window return the same handle, so callers can detect a window change with
//! [`Window::same`] instead of comparing ranges.

use super::cursor::Cursor;
use super::error::ScanResult;
use super::slice::ByteSlice;
use std::ops::Range;
use std::rc::Rc;

/// Shared handle to a resident window
pub type WindowRef = Rc<Window>;

/// A contiguous chunk of the global byte stream
#[derive(Debug)]
pub struct Window {
    /// Global index of the first byte
    global_start: usize,

    /// The window's bytes
    data: Box<[u8]>,
}

impl Window {
    /// Create a window starting at `global_start`
    #[inline]
    pub fn new(global_start: usize, data: Vec<u8>) -> Self {
        Self {
            global_start,
            data: data.into_boxed_slice(),
        }
    }

    /// Global index of the first byte
    #[inline]
    pub fn global_start(&self) -> usize {
        self.global_start
    }

    /// Global index one past the last byte
    #[inline]
    pub fn global_end(&self) -> usize {
        self.global_start + self.data.len()
    }

    /// Global range covered by this window
    #[inline]
    pub fn global_range(&self) -> Range<usize> {
        self.global_start..self.global_end()
    }

    /// Number of bytes in the window
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the window holds no bytes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether `global_index` falls inside this window
    #[inline]
    pub fn contains(&self, global_index: usize) -> bool {
        global_index >= self.global_start && global_index < self.global_end()
    }

    /// Byte at a global index, if inside this window
    #[inline]
    pub fn byte_at(&self, global_index: usize) -> Option<u8> {
        global_index
            .checked_sub(self.global_start)
            .and_then(|local| self.data.get(local).copied())
    }

    /// The window's bytes, indexed locally from 0
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// The window's bytes as a [`ByteSlice`]
    #[inline]
    pub fn slice(&self) -> ByteSlice<'_> {
        ByteSlice::from_bytes(&self.data)
    }

    /// A cursor over the window's bytes (local indices)
    #[inline]
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor::new(&self.data)
    }

    /// Whether two handles refer to the same resident window
    #[inline]
    pub fn same(a: &WindowRef, b: &WindowRef) -> bool {
        Rc::ptr_eq(a, b)
    }
}

/// A byte stream addressable by global index through resident windows
///
/// Implementations page data in lazily. A caller must call
/// [`load_index`](WindowedSource::load_index) before relying on
/// [`window_for`](WindowedSource::window_for) or
/// [`byte_at`](WindowedSource::byte_at) for an index.
///
/// Sources are single-threaded; `load_index` may block on I/O.
pub trait WindowedSource {
    /// Ensure the window covering `global_index` is resident
    ///
    /// Returns `Ok(false)` when the index lies beyond the end of the stream.
    fn load_index(&mut self, global_index: usize) -> ScanResult<bool>;

    /// The resident window containing `global_index`
    ///
    /// Returns `None` when no resident window covers the index. Indices in the
    /// same physical window return the same handle.
    fn window_for(&self, global_index: usize) -> Option<WindowRef>;

    /// Byte at `global_index`, if its window is resident
    fn byte_at(&self, global_index: usize) -> Option<u8> {
        self.window_for(global_index)
            .and_then(|window| window.byte_at(global_index))
    }

    /// Global index one past the furthest byte read so far
    fn end_index(&self) -> usize;

    /// Whether the end of the stream has been observed
    fn reached_eof(&self) -> bool;
}
