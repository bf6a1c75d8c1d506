//! The unit of change recorded by the undo engine.

use crate::text::Position;

/// A single atomic, invertible content change.
///
/// Stored in forward form: at `start`, `removed` was taken out of the buffer
/// and `inserted` was put in its place. Both texts use `\n` terminators.
/// Applying an operation and then its [`inverse`](Self::inverse) restores
/// the original content exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOperation {
    start: Position,
    removed: String,
    inserted: String,
    sequence: u64,
}

impl EditOperation {
    pub fn new(start: Position, removed: String, inserted: String, sequence: u64) -> Self {
        Self {
            start,
            removed,
            inserted,
            sequence,
        }
    }

    /// Create an insert operation
    pub fn insert(start: Position, text: String, sequence: u64) -> Self {
        Self::new(start, String::new(), text, sequence)
    }

    /// Create a delete operation
    pub fn delete(start: Position, text: String, sequence: u64) -> Self {
        Self::new(start, text, String::new(), sequence)
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn removed(&self) -> &str {
        &self.removed
    }

    pub fn inserted(&self) -> &str {
        &self.inserted
    }

    /// Buffer version at which the operation was committed
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// End of the removed span, measured in the buffer *before* the edit
    pub fn removed_end(&self) -> Position {
        self.start.advance(&self.removed)
    }

    /// End of the inserted span, measured in the buffer *after* the edit
    pub fn inserted_end(&self) -> Position {
        self.start.advance(&self.inserted)
    }

    /// True when applying the operation leaves the content unchanged
    pub fn is_noop(&self) -> bool {
        self.removed == self.inserted
    }

    pub fn is_insertion(&self) -> bool {
        self.removed.is_empty() && !self.inserted.is_empty()
    }

    pub fn is_deletion(&self) -> bool {
        self.inserted.is_empty() && !self.removed.is_empty()
    }

    /// Get the inverse operation for undo
    pub fn inverse(&self) -> Self {
        Self {
            start: self.start,
            removed: self.inserted.clone(),
            inserted: self.removed.clone(),
            sequence: self.sequence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_operation_insert() {
        let op = EditOperation::insert(Position::new(0, 5), "hello".to_string(), 1);
        assert_eq!(op.start(), Position::new(0, 5));
        assert!(op.removed().is_empty());
        assert_eq!(op.inserted(), "hello");
        assert!(op.is_insertion());
        assert!(!op.is_deletion());
    }

    #[test]
    fn test_edit_operation_inverse() {
        let op = EditOperation::new(Position::new(0, 5), "old".into(), "new".into(), 7);
        let inv = op.inverse();
        assert_eq!(inv.removed(), "new");
        assert_eq!(inv.inserted(), "old");
        assert_eq!(inv.start(), op.start());
        assert_eq!(inv.sequence(), 7);
        assert_eq!(inv.inverse(), op);
    }

    #[test]
    fn test_span_ends() {
        let op = EditOperation::new(Position::new(1, 2), "ab\nc".into(), "xyz".into(), 1);
        assert_eq!(op.removed_end(), Position::new(2, 1));
        assert_eq!(op.inserted_end(), Position::new(1, 5));
    }

    #[test]
    fn test_noop() {
        assert!(EditOperation::new(Position::zero(), "a".into(), "a".into(), 1).is_noop());
        assert!(EditOperation::insert(Position::zero(), String::new(), 1).is_noop());
        assert!(!EditOperation::delete(Position::zero(), "a".into(), 1).is_noop());
    }
}
