//! Position type for addressing text in a buffer.

use std::fmt;

/// A position in the text buffer (line and column, both 0-indexed).
///
/// Columns count Unicode scalar values, not bytes. Positions order by line
/// first, then column, which is document order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    pub const fn zero() -> Self {
        Self { line: 0, column: 0 }
    }

    /// Position reached after writing `text` starting at `self`.
    ///
    /// `text` must already be normalized to `\n` line terminators.
    pub fn advance(self, text: &str) -> Self {
        match text.rfind('\n') {
            None => Self::new(self.line, self.column + text.chars().count()),
            Some(last_newline) => {
                let newlines = text.bytes().filter(|&b| b == b'\n').count();
                let tail = text[last_newline + 1..].chars().count();
                Self::new(self.line + newlines, tail)
            }
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl From<(usize, usize)> for Position {
    fn from((line, column): (usize, usize)) -> Self {
        Self::new(line, column)
    }
}
