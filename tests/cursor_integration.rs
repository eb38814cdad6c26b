//! Integration tests for token reading
//!
//! These tests parse small trace formats end to end with cursors, previews,
//! matchers, the string cache and the scoped pool.

use std::io::Cursor as IoCursor;
use std::rc::Rc;
use tracescan::prelude::*;
use tracescan::{CacheStats, WindowRef};

const TRACE: &[u8] = b"\
B|1200|main|render|10.250
B|1200|main|layout|10.500
E|1200|main|layout|11.125
E|1200|main|render|12.000
B|1300|io-worker|read|10.750
E|1300|io-worker|read|13.500
";

#[derive(Debug, Default)]
struct Span {
    tid: i32,
    thread: Option<Rc<str>>,
    name: Option<Rc<str>>,
    begin: f64,
    depth: usize,
}

#[derive(Debug, PartialEq)]
struct Finished {
    tid: i32,
    name: String,
    thread: String,
    duration_ms: f64,
    depth: usize,
}

fn field(cursor: &mut Cursor<'_>) -> ScanResult<Rc<str>> {
    let value = cursor.string_to(|p| {
        p.skip_until(|b| b == b'|' || b == b'\n');
        Ok(())
    })?;
    cursor.skip_single(b'|');
    Ok(value)
}

/// Parse begin/end lines, matching nested spans with a scoped pool
fn parse_spans(trace: &[u8], cache: &StringCache) -> ScanResult<Vec<Finished>> {
    let mut pool = ScopedPool::with_reset(Span::default, |span: &mut Span| *span = Span::default());
    let mut finished = Vec::new();
    let mut cursor = Cursor::new(trace).with_cache(cache);

    while !cursor.at_end() {
        let kind = cursor.peek();
        cursor.skip_count(2);
        let tid = cursor.read_int()?;
        cursor.skip_single(b'|');
        let thread = field(&mut cursor)?;
        let name = field(&mut cursor)?;
        let ts = cursor.read_double()?;
        cursor.skip_char(b'\n');

        match kind {
            Some(b'B') => {
                let depth = pool.depth();
                pool.start(|span| {
                    span.tid = tid;
                    span.thread = Some(thread);
                    span.name = Some(name);
                    span.begin = ts;
                    span.depth = depth;
                });
            }
            Some(b'E') => {
                let done = pool.end(|span| Finished {
                    tid: span.tid,
                    name: span.name.as_deref().unwrap_or_default().to_string(),
                    thread: span.thread.as_deref().unwrap_or_default().to_string(),
                    duration_ms: ts - span.begin,
                    depth: span.depth,
                });
                finished.extend(done);
            }
            _ => return Err(ScanError::NoMatch { offset: cursor.index() }),
        }
    }
    Ok(finished)
}

#[test]
fn test_nested_spans() {
    let cache = StringCache::new();
    let spans = parse_spans(TRACE, &cache).unwrap();

    assert_eq!(
        spans,
        vec![
            Finished { tid: 1200, name: "layout".into(), thread: "main".into(), duration_ms: 0.625, depth: 1 },
            Finished { tid: 1200, name: "render".into(), thread: "main".into(), duration_ms: 1.75, depth: 0 },
            Finished { tid: 1300, name: "read".into(), thread: "io-worker".into(), duration_ms: 2.75, depth: 0 },
        ]
    );

    // 5 distinct tokens over 12 lookups
    let stats = cache.stats();
    assert_eq!(stats.entries, 5);
    assert_eq!(stats.misses, 5);
    assert_eq!(stats.hits, 7);
}

#[test]
fn test_malformed_line_reports_offset() {
    let cache = StringCache::new();
    let err = parse_spans(b"B|1200|main|a|x\n", &cache).unwrap_err();
    assert!(err.is_recoverable());

    let err = parse_spans(b"B|main|a|1.0\n", &cache).unwrap_err();
    match err {
        ScanError::MalformedNumber { offset, text } => {
            assert_eq!(offset, 2);
            assert!(text.starts_with("main|a"));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_name_then_timestamp() {
    let semi = BytePattern::new(b";").unwrap();
    let mut cursor = Cursor::new(b"name=worker-3;ts=1023.500;");
    cursor.skip_until(|b| b == b'=');
    cursor.skip();
    let name = cursor
        .slice_to(|p| {
            p.skip_to(&semi);
            Ok(())
        })
        .unwrap();
    assert_eq!(name, b"worker-3");
    assert_eq!(name.compact().to_string(), "worker-3");
    assert_eq!(cursor.read_double().unwrap(), 1023.5);
    assert_eq!(cursor.peek(), Some(b';'));
}

#[test]
fn test_regex_lines_with_named_groups() {
    let cache = StringCache::new();
    let mut matcher =
        RegexMatcher::cached(r"\[(?P<level>[A-Z]+)\] (?P<tid>\d+) took (?P<ms>[\d.]+)ms").unwrap();
    let log = b"[INFO] 7 took 1.5ms\n[WARN] 9 took 250ms\nnot a match\n";

    let mut cursor = Cursor::new(log).with_cache(&cache);
    let mut rows = Vec::new();
    while !cursor.at_end() {
        if cursor.try_match(&mut matcher) {
            let result = cursor.match_result(&matcher);
            rows.push((
                result.read_string("level").unwrap(),
                result.read_long("tid").unwrap(),
                result.read_double("ms").unwrap(),
            ));
            let end = result.end().unwrap();
            cursor.skip_to_index(end);
        }
        cursor.skip_until(|b| b == b'\n');
        cursor.skip();
    }

    assert_eq!(rows.len(), 2);
    assert_eq!(&*rows[0].0, "INFO");
    assert_eq!(rows[0].1, 7);
    assert_eq!(rows[0].2, 1.5);
    assert_eq!(&*rows[1].0, "WARN");
    assert_eq!(rows[1].2, 250.0);
    assert_eq!(cache.stats(), CacheStats { hits: 0, misses: 2, entries: 2 });
}

#[test]
fn test_preview_trailing_token() {
    // last whitespace-separated token of a line is the unit
    let mut cursor = Cursor::new(b"alloc 4096 bytes");
    let head = cursor
        .slice_to(|p| {
            p.end();
            p.rewind_until(|b| b == b' ')
        })
        .unwrap();
    assert_eq!(head, b"alloc 4096");
    cursor.skip();
    assert_eq!(cursor.remaining(), b"bytes");
}

#[test]
fn test_cursor_over_paged_window() {
    let data = b"pid=41;pid=42;pid=43;".to_vec();
    let mut source = PagedSource::new(IoCursor::new(data), WindowConfig::new(7, 2)).unwrap();
    let pid = BytePattern::new(b"pid=").unwrap();

    let at = pid.find_in(&mut source, 8, usize::MAX).unwrap().unwrap();
    assert_eq!(at, 14);
    assert!(source.load_index(at).unwrap());
    let window: WindowRef = source.window_for(at).unwrap();

    let mut cursor = window.cursor();
    cursor.skip_count(at - window.global_start() + 4);
    assert_eq!(cursor.read_long().unwrap(), 43);
}
