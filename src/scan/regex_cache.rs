//! Thread-local cache of anchored byte regexes
//!
//! Line matchers are usually built from a handful of patterns, over and over.
//! Compiled regexes are cached per thread and handed out as cheap clones.

use super::error::{ScanError, ScanResult};
use hashbrown::HashMap;
use regex::bytes::{Regex, RegexBuilder};
use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt::Write;

thread_local! {
    static REGEX_CACHE: RefCell<HashMap<String, Regex>> = RefCell::new(HashMap::new());
}

/// Compile `pattern` so it only matches at the start of the input
///
/// Unicode mode is off: classes such as `\w` and `.` match single bytes.
/// Characters U+0080 to U+00FF stand for the byte with the same value, so a
/// pattern reads the input the same way a [`TextView`](super::TextView) does.
pub fn compile_anchored(pattern: &str) -> ScanResult<Regex> {
    RegexBuilder::new(&format!("^(?:{})", latin1_escaped(pattern)))
        .unicode(false)
        .build()
        .map_err(|e| ScanError::InvalidRegex(e.to_string()))
}

/// Rewrite each unescaped character in U+0080..=U+00FF as a `\xNN` byte escape
fn latin1_escaped(pattern: &str) -> Cow<'_, str> {
    if pattern.is_ascii() {
        return Cow::Borrowed(pattern);
    }

    let mut out = String::with_capacity(pattern.len() + 8);
    let mut escaped = false;
    for c in pattern.chars() {
        match c {
            '\u{80}'..='\u{ff}' if !escaped => {
                let _ = write!(out, "\\x{:02X}", c as u32);
            }
            _ => out.push(c),
        }
        escaped = c == '\\' && !escaped;
    }
    Cow::Owned(out)
}

/// Get or compile an anchored regex for `pattern`
///
/// # Errors
/// [`ScanError::InvalidRegex`] if the pattern does not compile. Failed
/// patterns are not cached.
pub fn get_or_compile(pattern: &str) -> ScanResult<Regex> {
    REGEX_CACHE.with(|cache| {
        if let Some(regex) = cache.borrow().get(pattern) {
            return Ok(regex.clone());
        }

        let regex = compile_anchored(pattern)?;
        log_trace!("compiled matcher pattern {:?}", pattern);
        cache.borrow_mut().insert(pattern.to_string(), regex.clone());
        Ok(regex)
    })
}

/// Drop every cached regex on this thread
pub fn clear_cache() {
    REGEX_CACHE.with(|cache| cache.borrow_mut().clear());
}

/// Number of regexes cached on this thread
pub fn cache_size() -> usize {
    REGEX_CACHE.with(|cache| cache.borrow().len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_compilation() {
        clear_cache();

        get_or_compile("[0-9]+").unwrap();
        assert_eq!(cache_size(), 1);

        get_or_compile("[0-9]+").unwrap();
        assert_eq!(cache_size(), 1);

        get_or_compile("[a-z]+").unwrap();
        assert_eq!(cache_size(), 2);
    }

    #[test]
    fn test_invalid_pattern() {
        clear_cache();

        let err = get_or_compile("[invalid").unwrap_err();
        assert!(matches!(err, ScanError::InvalidRegex(_)));
        assert_eq!(cache_size(), 0);
    }

    #[test]
    fn test_anchored() {
        let regex = compile_anchored("[0-9]+").unwrap();
        assert!(regex.is_match(b"123 abc"));
        assert!(!regex.is_match(b"abc 123"));

        // alternation stays inside the anchor
        let regex = compile_anchored("a|b").unwrap();
        assert!(!regex.is_match(b"xb"));
    }

    #[test]
    fn test_latin1_chars_match_single_bytes() {
        let regex = compile_anchored("caf\u{e9}[\u{e0}-\u{ff}]+").unwrap();
        assert!(regex.is_match(b"caf\xe9\xe8\xff!"));
        assert!(!regex.is_match("caf\u{e9}".as_bytes()));

        assert_eq!(latin1_escaped("a\u{e9}b"), "a\\xE9b");
        assert_eq!(latin1_escaped("[\u{80}]"), "[\\x80]");
        assert!(matches!(latin1_escaped(r"\d+"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_bytes_mode() {
        let regex = compile_anchored(".").unwrap();
        let found = regex.find(b"\xff").unwrap();
        assert_eq!(found.end(), 1);
    }
}
