//! Buffer editing tests - insert, delete, replace, bounds

mod common;

use common::{buffer_lines, pos};
use texit::{EditError, TextBuffer};

// ========================================================================
// Bounds checking
// ========================================================================

#[test]
fn test_edits_at_boundary_positions_succeed() {
    let mut buffer = TextBuffer::from_text("ab\ncde");
    let end = buffer.end_position();
    assert_eq!(end, pos(1, 3));

    buffer.insert(end, "!").unwrap();
    buffer.insert(pos(0, 2), "?").unwrap();
    buffer.insert(pos(0, 0), "^").unwrap();
    assert_eq!(buffer.text(), "^ab?\ncde!");

    let end = buffer.end_position();
    assert_eq!(buffer.read(pos(0, 0), end).unwrap(), buffer.text());
    buffer.delete_range(pos(1, 0), end).unwrap();
    assert_eq!(buffer.text(), "^ab?\n");
}

#[test]
fn test_positions_past_end_fail() {
    let mut buffer = TextBuffer::from_text("ab\ncde");
    let outside = [pos(2, 0), pos(1, 4), pos(0, 3), pos(usize::MAX, 0)];

    for at in outside {
        assert!(matches!(
            buffer.insert(at, "x"),
            Err(EditError::OutOfRange { .. })
        ));
        assert!(matches!(
            buffer.delete_range(pos(0, 0), at),
            Err(EditError::OutOfRange { .. })
        ));
        assert!(matches!(
            buffer.read(pos(0, 0), at),
            Err(EditError::OutOfRange { .. })
        ));
    }
    assert_eq!(buffer.text(), "ab\ncde");
    assert_eq!(buffer.version(), 0);
}

#[test]
fn test_out_of_range_reports_limit() {
    let mut buffer = TextBuffer::from_text("ab\ncde");
    assert_eq!(
        buffer.insert(pos(5, 0), "x"),
        Err(EditError::OutOfRange {
            position: pos(5, 0),
            limit: pos(1, 3),
        })
    );
}

// ========================================================================
// Line structure
// ========================================================================

#[test]
fn test_insert_multiline_text_splits_lines() {
    let mut buffer = TextBuffer::from_text("start end");
    let op = buffer.insert(pos(0, 6), "one\ntwo\n").unwrap();
    assert_eq!(buffer_lines(&buffer), vec!["start one", "two", "end"]);
    assert_eq!(op.inserted_end(), pos(2, 0));
}

#[test]
fn test_delete_newline_joins_lines() {
    let mut buffer = TextBuffer::from_text("Hello\nWorld");
    let op = buffer.delete_range(pos(0, 5), pos(1, 0)).unwrap();
    assert_eq!(buffer.text(), "HelloWorld");
    buffer.apply(&op.inverse()).unwrap();
    assert_eq!(buffer.text(), "Hello\nWorld");
}

#[test]
fn test_mixed_terminators_normalized_everywhere() {
    let mut buffer = TextBuffer::from_text("a\r\nb\rc");
    assert_eq!(buffer_lines(&buffer), vec!["a", "b", "c"]);
    buffer.replace_range(pos(2, 0), pos(2, 1), "x\r\ny").unwrap();
    assert_eq!(buffer.text(), "a\nb\nx\ny");
}

#[test]
fn test_unicode_columns_are_chars() {
    let mut buffer = TextBuffer::from_text("日本語\nemoji 🎉!");
    assert_eq!(buffer.line_length(0), Ok(3));
    assert_eq!(buffer.line_length(1), Ok(8));
    buffer.insert(pos(1, 7), "🎉").unwrap();
    assert_eq!(buffer.line(1).unwrap(), "emoji 🎉🎉!");
    assert_eq!(buffer.read(pos(0, 1), pos(0, 2)).unwrap(), "本");
}

#[test]
fn test_version_counts_committed_changes() {
    let mut buffer = TextBuffer::new();
    buffer.insert(pos(0, 0), "abc").unwrap();
    buffer.insert(pos(0, 0), "").unwrap();
    buffer.delete_range(pos(0, 1), pos(0, 1)).unwrap();
    buffer.delete_range(pos(0, 0), pos(0, 1)).unwrap();
    assert_eq!(buffer.version(), 2);
}
