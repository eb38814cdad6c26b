//! Error types for the scanning layer
//!
//! Every fallible operation in this crate reports a [`ScanError`]. Pattern
//! searches that find nothing are *not* errors; they return `None`.

use std::fmt;

/// Maximum number of bytes of scanned text carried by a malformed-number error
pub(crate) const ERROR_CONTEXT_LEN: usize = 32;

/// Result alias used throughout the crate
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors produced while scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// No digit was found where a number was expected
    MalformedNumber {
        /// Byte offset where number parsing started
        offset: usize,
        /// The text that was being scanned (truncated)
        text: String,
    },

    /// A preview cursor was rewound past its origin
    CursorUnderflow {
        /// The preview cursor's origin
        origin: usize,
        /// The index the rewind would have moved below
        index: usize,
    },

    /// Search pattern cannot be compiled
    InvalidPattern {
        /// Length of the rejected pattern
        length: usize,
        /// Why the pattern was rejected
        reason: &'static str,
    },

    /// A required pattern match failed
    NoMatch {
        /// Cursor index where matching was attempted
        offset: usize,
    },

    /// A capture group did not participate in the match, or does not exist
    MissingGroup {
        /// The group index or name
        group: String,
    },

    /// Regular expression failed to compile
    InvalidRegex(String),

    /// Window configuration is unusable
    InvalidConfig {
        /// Reason the configuration was rejected
        reason: String,
    },

    /// A byte below the read frontier could not be made resident
    Unavailable {
        /// Global index of the byte
        index: usize,
    },

    /// I/O error from the underlying reader
    Io(String),
}

impl ScanError {
    /// Build a malformed-number error from the bytes that were scanned
    pub(crate) fn malformed_number(offset: usize, scanned: &[u8]) -> Self {
        let shown = &scanned[..scanned.len().min(ERROR_CONTEXT_LEN)];
        ScanError::MalformedNumber {
            offset,
            text: shown.escape_ascii().to_string(),
        }
    }

    /// Whether a caller can skip the current record and keep scanning
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ScanError::MalformedNumber { .. } | ScanError::NoMatch { .. } | ScanError::MissingGroup { .. }
        )
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedNumber { offset, text } => {
                write!(f, "Expected a number at byte offset {}, found {:?}", offset, text)
            }
            Self::CursorUnderflow { origin, index } => write!(
                f,
                "Cursor underflow: cannot rewind from {} past origin {}",
                index, origin
            ),
            Self::InvalidPattern { length, reason } => {
                write!(f, "Invalid search pattern of length {}: {}", length, reason)
            }
            Self::NoMatch { offset } => write!(f, "Pattern did not match at byte offset {}", offset),
            Self::MissingGroup { group } => write!(f, "Capture group {} did not match", group),
            Self::InvalidRegex(msg) => write!(f, "Invalid regex: {}", msg),
            Self::InvalidConfig { reason } => write!(f, "Invalid window configuration: {}", reason),
            Self::Unavailable { index } => write!(f, "Byte {} is not available", index),
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for ScanError {}

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        ScanError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_number_truncates_text() {
        let long = [b'x'; 100];
        let err = ScanError::malformed_number(7, &long);
        match err {
            ScanError::MalformedNumber { offset, text } => {
                assert_eq!(offset, 7);
                assert_eq!(text.len(), ERROR_CONTEXT_LEN);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_display() {
        let err = ScanError::malformed_number(3, b"abc");
        assert_eq!(err.to_string(), "Expected a number at byte offset 3, found \"abc\"");

        let err = ScanError::CursorUnderflow { origin: 4, index: 4 };
        assert!(err.to_string().contains("origin 4"));
    }

    #[test]
    fn test_recoverable() {
        assert!(ScanError::malformed_number(0, b"").is_recoverable());
        assert!(!ScanError::CursorUnderflow { origin: 0, index: 0 }.is_recoverable());
        assert!(!ScanError::Io("boom".into()).is_recoverable());
    }

    #[test]
    fn test_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
        let err: ScanError = io.into();
        assert_eq!(err, ScanError::Io("short read".to_string()));
    }
}
