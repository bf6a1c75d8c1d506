//! Rope-backed document buffer addressed by (line, column).
//!
//! All mutation goes through [`TextBuffer::insert`],
//! [`TextBuffer::delete_range`], [`TextBuffer::replace_range`] and
//! [`TextBuffer::apply`]; each returns the [`EditOperation`] it committed.
//! Positions are validated up front, nothing is silently clamped.

use ropey::Rope;
use std::borrow::Cow;

use super::{LineEnding, Position};
use crate::error::EditError;
use crate::history::EditOperation;

/// Document content as `\n`-terminated lines.
///
/// There is always at least one line; an empty document is a single empty
/// line. Cloning is cheap because ropey shares unchanged nodes.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    rope: Rope,
    /// Advisory counter bumped on every committed change
    version: u64,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            version: 0,
        }
    }

    /// Create a buffer from text, normalizing every line terminator to `\n`
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(&LineEnding::normalize(text)),
            version: 0,
        }
    }

    /// Access the underlying Rope for read-only rope-specific queries
    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Version counter for staleness checks by background readers
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of lines (always >= 1)
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Length of a line in characters, excluding its terminator
    pub fn line_length(&self, line: usize) -> Result<usize, EditError> {
        if line >= self.line_count() {
            return Err(EditError::OutOfRange {
                position: Position::new(line, 0),
                limit: self.end_position(),
            });
        }
        Ok(self.line_len(line))
    }

    fn line_len(&self, line: usize) -> usize {
        let slice = self.rope.line(line);
        let len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    /// Total length in characters, terminators included
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Last valid position in the document
    pub fn end_position(&self) -> Position {
        let last = self.line_count() - 1;
        Position::new(last, self.line_len(last))
    }

    /// Get line content without its terminator
    pub fn line(&self, line: usize) -> Option<Cow<'_, str>> {
        if line >= self.line_count() {
            return None;
        }
        let slice = self.rope.line(line);
        let trimmed = slice.slice(..self.line_len(line));
        Some(match trimmed.as_str() {
            Some(s) => Cow::Borrowed(s),
            None => Cow::Owned(trimmed.to_string()),
        })
    }

    /// Full content as a String (may be expensive for large buffers)
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn is_valid_position(&self, position: Position) -> bool {
        position.line < self.line_count() && position.column <= self.line_len(position.line)
    }

    fn check_position(&self, position: Position) -> Result<(), EditError> {
        if position.line >= self.line_count() {
            return Err(EditError::OutOfRange {
                position,
                limit: self.end_position(),
            });
        }
        let line_len = self.line_len(position.line);
        if position.column > line_len {
            return Err(EditError::OutOfRange {
                position,
                limit: Position::new(position.line, line_len),
            });
        }
        Ok(())
    }

    /// Nearest valid position to `position`
    pub fn clamp_position(&self, position: Position) -> Position {
        if position.line >= self.line_count() {
            return self.end_position();
        }
        Position::new(
            position.line,
            position.column.min(self.line_len(position.line)),
        )
    }

    /// Convert (line, column) to a character offset
    pub fn position_to_offset(&self, position: Position) -> Result<usize, EditError> {
        self.check_position(position)?;
        Ok(self.rope.line_to_char(position.line) + position.column)
    }

    /// Convert a character offset to (line, column), clamped to the document
    pub fn offset_to_position(&self, offset: usize) -> Position {
        let clamped = offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(clamped);
        Position::new(line, clamped - self.rope.line_to_char(line))
    }

    /// Convert a byte offset (e.g. from a regex match over [`text`](Self::text))
    /// to (line, column), clamped to the document
    pub fn byte_to_position(&self, byte: usize) -> Position {
        let clamped = byte.min(self.rope.len_bytes());
        self.offset_to_position(self.rope.byte_to_char(clamped))
    }

    fn check_range(&self, start: Position, end: Position) -> Result<(usize, usize), EditError> {
        let start_offset = self.position_to_offset(start)?;
        let end_offset = self.position_to_offset(end)?;
        if start > end {
            return Err(EditError::InvalidRange { start, end });
        }
        Ok((start_offset, end_offset))
    }

    /// Read the text between two positions
    pub fn read(&self, start: Position, end: Position) -> Result<String, EditError> {
        let (from, to) = self.check_range(start, end)?;
        Ok(self.rope.slice(from..to).to_string())
    }

    /// Insert text at a position
    pub fn insert(&mut self, at: Position, text: &str) -> Result<EditOperation, EditError> {
        let offset = self.position_to_offset(at)?;
        Ok(self.commit(at, offset..offset, LineEnding::normalize(text)))
    }

    /// Remove the text between two positions
    pub fn delete_range(
        &mut self,
        start: Position,
        end: Position,
    ) -> Result<EditOperation, EditError> {
        let (from, to) = self.check_range(start, end)?;
        Ok(self.commit(start, from..to, Cow::Borrowed("")))
    }

    /// Replace the text between two positions as one atomic operation
    pub fn replace_range(
        &mut self,
        start: Position,
        end: Position,
        text: &str,
    ) -> Result<EditOperation, EditError> {
        let (from, to) = self.check_range(start, end)?;
        Ok(self.commit(start, from..to, LineEnding::normalize(text)))
    }

    /// Replay an operation in its forward form.
    ///
    /// Fails with [`EditError::StaleOperation`] when the buffer does not hold
    /// the operation's removed text at its start position.
    pub fn apply(&mut self, op: &EditOperation) -> Result<EditOperation, EditError> {
        let stale = || EditError::StaleOperation {
            sequence: op.sequence(),
            start: op.start(),
        };
        let end = op.removed_end();
        let (from, to) = self.check_range(op.start(), end).map_err(|_| stale())?;
        if self.rope.slice(from..to) != op.removed() {
            return Err(stale());
        }
        Ok(self.commit(op.start(), from..to, Cow::Borrowed(op.inserted())))
    }

    fn commit(
        &mut self,
        start: Position,
        range: std::ops::Range<usize>,
        inserted: Cow<'_, str>,
    ) -> EditOperation {
        let removed = self.rope.slice(range.clone()).to_string();
        if removed == inserted {
            return EditOperation::new(start, removed, inserted.into_owned(), self.version);
        }

        if !range.is_empty() {
            self.rope.remove(range.clone());
        }
        if !inserted.is_empty() {
            self.rope.insert(range.start, &inserted);
        }
        self.version = self.version.wrapping_add(1);

        tracing::trace!(
            version = self.version,
            start = %start,
            removed = removed.chars().count(),
            inserted = inserted.chars().count(),
            "buffer edit"
        );
        EditOperation::new(start, removed, inserted.into_owned(), self.version)
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for TextBuffer {
    /// Buffers compare by content only
    fn eq(&self, other: &Self) -> bool {
        self.rope == other.rope
    }
}

impl Eq for TextBuffer {}
