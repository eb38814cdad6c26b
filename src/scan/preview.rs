//! Look-ahead cursors
//!
//! A [`PreviewCursor`] is a copy of a [`Cursor`] that scans ahead to find
//! where a token ends. It supports everything a cursor does and can also step
//! backward, but never to before the position it was created at.

use super::cursor::Cursor;
use super::error::{ScanError, ScanResult};
use std::ops::{Deref, DerefMut};

/// A cursor that may rewind, but not past its origin
#[derive(Debug, Clone, Copy)]
pub struct PreviewCursor<'a> {
    cursor: Cursor<'a>,
    origin: usize,
}

impl<'a> PreviewCursor<'a> {
    #[inline]
    pub(super) fn new(mut cursor: Cursor<'a>) -> Self {
        let origin = cursor.index;
        cursor.start = origin;
        Self { cursor, origin }
    }

    /// Position the preview was created at
    #[inline]
    pub fn origin(&self) -> usize {
        self.origin
    }

    /// Number of bytes scanned past the origin
    #[inline]
    pub fn scanned(&self) -> usize {
        self.cursor.index - self.origin
    }

    /// Step back one byte
    ///
    /// # Errors
    /// [`ScanError::CursorUnderflow`] when already at the origin.
    #[inline]
    pub fn rewind(&mut self) -> ScanResult<()> {
        if self.cursor.index <= self.origin {
            return Err(ScanError::CursorUnderflow {
                origin: self.origin,
                index: self.cursor.index,
            });
        }
        self.cursor.index -= 1;
        Ok(())
    }

    /// Step back until `predicate` holds for the byte under the cursor
    ///
    /// Always steps back at least once.
    ///
    /// # Errors
    /// [`ScanError::CursorUnderflow`] when the origin is reached first.
    pub fn rewind_until<P: FnMut(u8) -> bool>(&mut self, mut predicate: P) -> ScanResult<()> {
        loop {
            self.rewind()?;
            if self.cursor.peek().is_some_and(&mut predicate) {
                return Ok(());
            }
        }
    }

    /// The underlying cursor
    #[inline]
    pub fn into_cursor(self) -> Cursor<'a> {
        self.cursor
    }
}

impl<'a> Deref for PreviewCursor<'a> {
    type Target = Cursor<'a>;

    #[inline]
    fn deref(&self) -> &Cursor<'a> {
        &self.cursor
    }
}

impl DerefMut for PreviewCursor<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_does_not_move_parent() {
        let cursor = Cursor::new(b"hello world");
        let mut preview = cursor.preview();
        preview.skip_until(|b| b == b' ');
        assert_eq!(preview.index(), 5);
        assert_eq!(preview.scanned(), 5);
        assert_eq!(cursor.index(), 0);
    }

    #[test]
    fn test_rewind() {
        let mut cursor = Cursor::new(b"abcdef");
        cursor.skip_count(2);
        let mut preview = cursor.preview();
        preview.skip_count(2);
        preview.rewind().unwrap();
        assert_eq!(preview.index(), 3);
        preview.rewind().unwrap();
        assert_eq!(preview.index(), 2);
        assert_eq!(
            preview.rewind(),
            Err(ScanError::CursorUnderflow { origin: 2, index: 2 })
        );
        assert_eq!(preview.index(), 2);
    }

    #[test]
    fn test_rewind_until() {
        // trailing token after the last space
        let mut cursor = Cursor::new(b"GET /index.html HTTP/1.1");
        let slice = cursor
            .slice_to(|p| {
                p.end();
                p.rewind_until(|b| b == b' ')
            })
            .unwrap();
        assert_eq!(slice, b"GET /index.html");
        assert_eq!(cursor.peek(), Some(b' '));
    }

    #[test]
    fn test_rewind_until_underflow() {
        let mut preview = Cursor::new(b"abc").preview();
        preview.end();
        let err = preview.rewind_until(|b| b == b'z').unwrap_err();
        assert!(matches!(err, ScanError::CursorUnderflow { origin: 0, .. }));
        assert_eq!(preview.index(), 0);
    }
}
