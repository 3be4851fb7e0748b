// tests/line_buffer.rs

use phpunit_relay::exec::LineBuffer;

#[test]
fn complete_lines_are_flushed_and_remainder_kept() {
    let mut buffer = LineBuffer::new();

    assert_eq!(buffer.push(b"one\ntw"), vec!["one".to_string()]);
    assert!(buffer.has_pending());
    assert_eq!(buffer.push(b"o\nthree"), vec!["two".to_string()]);
    assert_eq!(buffer.finish(), Some("three".to_string()));
    assert_eq!(buffer.finish(), None);
}

#[test]
fn crlf_split_across_chunks_is_one_line_end() {
    let mut buffer = LineBuffer::new();

    assert_eq!(buffer.push(b"a\r"), vec!["a".to_string()]);
    assert_eq!(buffer.push(b"\nb\r\n"), vec!["b".to_string()]);
    assert!(!buffer.has_pending());
}

#[test]
fn lone_cr_ends_a_line() {
    let mut buffer = LineBuffer::new();
    assert_eq!(
        buffer.push(b"x\ry\n"),
        vec!["x".to_string(), "y".to_string()]
    );
}

#[test]
fn empty_lines_are_kept() {
    let mut buffer = LineBuffer::new();
    assert_eq!(
        buffer.push(b"\n\nz\n"),
        vec![String::new(), String::new(), "z".to_string()]
    );
}

#[test]
fn multibyte_characters_may_straddle_chunks() {
    let mut buffer = LineBuffer::new();
    let bytes = "héllo\n".as_bytes();

    assert!(buffer.push(&bytes[..2]).is_empty());
    assert_eq!(buffer.push(&bytes[2..]), vec!["héllo".to_string()]);
}
