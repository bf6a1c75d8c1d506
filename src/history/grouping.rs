//! Coalescing policy for undo groups.
//!
//! Decides, without looking at a clock, whether a fresh single-character
//! edit extends the operation on top of the undo stack:
//!
//! - typing: the char lands exactly at the end of the previous insertion,
//!   is not a newline, and does not start a new word after whitespace
//!   ("hello world" undoes as "world", then "hello ");
//! - backspace: the deleted char sits immediately before the previous
//!   deletion;
//! - forward delete: the deleted char sits at the previous deletion's start;
//! - no merged group grows past `max_group_chars`.
//!
//! Deleting a newline never merges. Multi-character edits (paste, replace)
//! never merge and never open a group.

use super::EditOperation;

pub const DEFAULT_MAX_GROUP_CHARS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Whitespace,
    Word,
}

fn char_class(ch: char) -> CharClass {
    if ch.is_whitespace() {
        CharClass::Whitespace
    } else {
        CharClass::Word
    }
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupingPolicy {
    enabled: bool,
    max_group_chars: usize,
}

impl GroupingPolicy {
    pub const fn new(max_group_chars: usize) -> Self {
        Self {
            enabled: true,
            max_group_chars,
        }
    }

    /// Every edit is its own undo step
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            max_group_chars: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && self.max_group_chars > 1
    }

    pub fn max_group_chars(&self) -> usize {
        self.max_group_chars
    }

    /// Whether `op` may be extended by following keystrokes
    pub fn opens_group(&self, op: &EditOperation) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let text = if op.is_insertion() {
            op.inserted()
        } else if op.is_deletion() {
            op.removed()
        } else {
            return false;
        };
        matches!(single_char(text), Some(ch) if ch != '\n')
    }

    /// Merge `next` into `top`, or `None` if they belong to separate groups.
    ///
    /// The caller guarantees `next` was committed right after `top`.
    pub fn merge(&self, top: &EditOperation, next: &EditOperation) -> Option<EditOperation> {
        if !self.opens_group(next) {
            return None;
        }

        if next.is_insertion() && top.is_insertion() {
            let ch = single_char(next.inserted())?;
            if next.start() != top.inserted_end() {
                return None;
            }
            let previous = top.inserted().chars().last()?;
            if char_class(previous) == CharClass::Whitespace && char_class(ch) == CharClass::Word
            {
                return None;
            }
            if top.inserted().chars().count() + 1 > self.max_group_chars {
                return None;
            }
            let mut inserted = top.inserted().to_string();
            inserted.push(ch);
            return Some(EditOperation::new(
                top.start(),
                String::new(),
                inserted,
                next.sequence(),
            ));
        }

        if next.is_deletion() && top.is_deletion() {
            if top.removed().chars().count() + 1 > self.max_group_chars {
                return None;
            }
            if next.removed_end() == top.start() {
                // Backspace: the new char precedes the run
                let removed = format!("{}{}", next.removed(), top.removed());
                return Some(EditOperation::new(
                    next.start(),
                    removed,
                    String::new(),
                    next.sequence(),
                ));
            }
            if next.start() == top.start() {
                // Forward delete: the new char follows the run
                let removed = format!("{}{}", top.removed(), next.removed());
                return Some(EditOperation::new(
                    top.start(),
                    removed,
                    String::new(),
                    next.sequence(),
                ));
            }
        }

        None
    }
}

impl Default for GroupingPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_GROUP_CHARS)
    }
}
