//! Undo/redo stacks with bounded depth and typing coalescing.

use std::collections::VecDeque;

use super::{EditOperation, GroupingPolicy};
use crate::error::EditError;
use crate::text::TextBuffer;

pub const DEFAULT_UNDO_CAPACITY: usize = 1000;

/// Edit history with undo/redo stacks.
///
/// Operations are recorded in forward form. Undo applies the inverse of the
/// newest entry and moves it to the redo stack; redo re-applies it and moves
/// it back. Recording a new operation discards the redo stack. When the undo
/// stack grows past `capacity` the oldest entries are dropped.
#[derive(Debug, Clone)]
pub struct UndoEngine {
    undo_stack: VecDeque<EditOperation>,
    redo_stack: Vec<EditOperation>,
    capacity: usize,
    policy: GroupingPolicy,
    /// Whether the top of the undo stack may absorb the next keystroke
    group_open: bool,
}

impl UndoEngine {
    /// Create a new engine with default capacity and coalescing
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_UNDO_CAPACITY)
    }

    /// Create a new engine keeping at most `capacity` undo steps.
    /// A capacity of zero disables history.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            capacity,
            policy: GroupingPolicy::default(),
            group_open: false,
        }
    }

    pub fn with_policy(mut self, policy: GroupingPolicy) -> Self {
        self.policy = policy;
        self.group_open = false;
        self
    }

    pub fn policy(&self) -> GroupingPolicy {
        self.policy
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the capacity, evicting the oldest entries if needed
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        self.evict();
        // The next redo sits at the end of the Vec; drop the furthest ones
        let excess = self.redo_stack.len().saturating_sub(capacity);
        self.redo_stack.drain(..excess);
    }

    /// Record a committed operation (clears the redo stack)
    pub fn record(&mut self, op: EditOperation) {
        if op.is_noop() {
            return;
        }
        self.redo_stack.clear();

        if self.capacity == 0 {
            self.group_open = false;
            return;
        }

        if self.group_open {
            if let Some(top) = self.undo_stack.back_mut() {
                if let Some(merged) = self.policy.merge(top, &op) {
                    tracing::trace!(
                        sequence = merged.sequence(),
                        "coalesced edit into open undo group"
                    );
                    *top = merged;
                    return;
                }
            }
        }

        self.group_open = self.policy.opens_group(&op);
        self.undo_stack.push_back(op);
        self.evict();
    }

    fn evict(&mut self) {
        while self.undo_stack.len() > self.capacity {
            if let Some(evicted) = self.undo_stack.pop_front() {
                tracing::trace!(sequence = evicted.sequence(), "evicted oldest undo entry");
            }
        }
    }

    /// Close the open group so the next edit starts a new undo step
    pub fn commit_boundary(&mut self) {
        self.group_open = false;
    }

    pub fn has_open_group(&self) -> bool {
        self.group_open
    }

    /// Undo the newest operation against `buffer`.
    ///
    /// Returns `Ok(false)` when there is nothing to undo. Fails only if the
    /// buffer was changed behind the engine's back, in which case both stacks
    /// are left as they were.
    pub fn undo(&mut self, buffer: &mut TextBuffer) -> Result<bool, EditError> {
        self.group_open = false;
        let Some(op) = self.undo_stack.pop_back() else {
            return Ok(false);
        };
        match buffer.apply(&op.inverse()) {
            Ok(_) => {
                tracing::debug!(sequence = op.sequence(), start = %op.start(), "undo");
                self.redo_stack.push(op);
                Ok(true)
            }
            Err(e) => {
                self.undo_stack.push_back(op);
                Err(e)
            }
        }
    }

    /// Redo the most recently undone operation against `buffer`.
    pub fn redo(&mut self, buffer: &mut TextBuffer) -> Result<bool, EditError> {
        self.group_open = false;
        let Some(op) = self.redo_stack.pop() else {
            return Ok(false);
        };
        match buffer.apply(&op) {
            Ok(_) => {
                tracing::debug!(sequence = op.sequence(), start = %op.start(), "redo");
                self.undo_stack.push_back(op);
                Ok(true)
            }
            Err(e) => {
                self.redo_stack.push(op);
                Err(e)
            }
        }
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the number of operations in the undo stack
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of operations in the redo stack
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// The operation the next undo would revert
    pub fn peek_undo(&self) -> Option<&EditOperation> {
        self.undo_stack.back()
    }

    /// The operation the next redo would re-apply
    pub fn peek_redo(&self) -> Option<&EditOperation> {
        self.redo_stack.last()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.group_open = false;
    }
}

impl Default for UndoEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Position;

    fn pos(line: usize, column: usize) -> Position {
        Position::new(line, column)
    }

    fn type_text(buffer: &mut TextBuffer, engine: &mut UndoEngine, at: Position, text: &str) {
        let mut at = at;
        for ch in text.chars() {
            let op = buffer.insert(at, &ch.to_string()).unwrap();
            at = op.inserted_end();
            engine.record(op);
        }
    }

    #[test]
    fn test_history_undo_redo() {
        let mut buffer = TextBuffer::new();
        let mut history = UndoEngine::new();

        history.record(buffer.insert(pos(0, 0), "ab").unwrap());
        history.record(buffer.insert(pos(0, 2), "cd").unwrap());
        assert_eq!(history.undo_len(), 2);
        assert!(!history.can_redo());

        assert_eq!(history.undo(&mut buffer), Ok(true));
        assert_eq!(buffer.text(), "ab");
        assert!(history.can_redo());
        assert_eq!(history.peek_redo().unwrap().inserted(), "cd");

        assert_eq!(history.redo(&mut buffer), Ok(true));
        assert_eq!(buffer.text(), "abcd");
        assert!(!history.can_redo());
    }

    #[test]
    fn test_empty_stacks_are_not_errors() {
        let mut buffer = TextBuffer::from_text("x");
        let mut history = UndoEngine::new();
        assert_eq!(history.undo(&mut buffer), Ok(false));
        assert_eq!(history.redo(&mut buffer), Ok(false));
        assert_eq!(buffer.text(), "x");
    }

    #[test]
    fn test_history_record_clears_redo() {
        let mut buffer = TextBuffer::new();
        let mut history = UndoEngine::new();

        history.record(buffer.insert(pos(0, 0), "a").unwrap());
        history.undo(&mut buffer).unwrap();
        assert!(history.can_redo());

        history.record(buffer.insert(pos(0, 0), "b").unwrap());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_history_capacity_evicts_oldest() {
        let mut buffer = TextBuffer::new();
        let mut history = UndoEngine::with_capacity(3).with_policy(GroupingPolicy::disabled());

        for i in 0..5 {
            let end = buffer.end_position();
            history.record(buffer.insert(end, &i.to_string()).unwrap());
        }
        assert_eq!(history.undo_len(), 3);
        assert_eq!(history.peek_undo().unwrap().inserted(), "4");

        for _ in 0..3 {
            assert_eq!(history.undo(&mut buffer), Ok(true));
        }
        assert_eq!(buffer.text(), "01");
        assert_eq!(history.undo(&mut buffer), Ok(false));
    }

    #[test]
    fn test_zero_capacity_disables_history() {
        let mut buffer = TextBuffer::new();
        let mut history = UndoEngine::with_capacity(0);
        history.record(buffer.insert(pos(0, 0), "a").unwrap());
        assert!(!history.can_undo());
        assert_eq!(history.undo(&mut buffer), Ok(false));
    }

    #[test]
    fn test_noop_is_not_recorded() {
        let mut buffer = TextBuffer::from_text("a");
        let mut history = UndoEngine::new();
        history.record(buffer.insert(pos(0, 0), "").unwrap());
        assert!(!history.can_undo());
    }

    #[test]
    fn test_typing_coalesces_per_word() {
        let mut buffer = TextBuffer::new();
        let mut history = UndoEngine::new();
        type_text(&mut buffer, &mut history, pos(0, 0), "hello world");
        assert_eq!(history.undo_len(), 2);

        history.undo(&mut buffer).unwrap();
        assert_eq!(buffer.text(), "hello ");
        history.undo(&mut buffer).unwrap();
        assert_eq!(buffer.text(), "");
    }

    #[test]
    fn test_commit_boundary_splits_group() {
        let mut buffer = TextBuffer::new();
        let mut history = UndoEngine::new();
        type_text(&mut buffer, &mut history, pos(0, 0), "ab");
        assert!(history.has_open_group());
        history.commit_boundary();
        type_text(&mut buffer, &mut history, pos(0, 2), "cd");
        assert_eq!(history.undo_len(), 2);
    }

    #[test]
    fn test_undo_closes_group() {
        let mut buffer = TextBuffer::new();
        let mut history = UndoEngine::new();
        type_text(&mut buffer, &mut history, pos(0, 0), "ab");
        history.record(buffer.insert(pos(0, 2), "\n").unwrap());
        history.undo(&mut buffer).unwrap();
        type_text(&mut buffer, &mut history, pos(0, 2), "c");
        assert_eq!(history.undo_len(), 2);
    }

    #[test]
    fn test_stale_undo_leaves_stacks_intact() {
        let mut buffer = TextBuffer::from_text("abc");
        let mut history = UndoEngine::new();
        history.record(buffer.insert(pos(0, 3), "def").unwrap());
        // Mutation the engine never saw
        buffer.delete_range(pos(0, 0), pos(0, 6)).unwrap();

        assert!(matches!(
            history.undo(&mut buffer),
            Err(EditError::StaleOperation { .. })
        ));
        assert_eq!(history.undo_len(), 1);
        assert_eq!(history.redo_len(), 0);
    }

    #[test]
    fn test_set_capacity_trims() {
        let mut buffer = TextBuffer::new();
        let mut history = UndoEngine::new().with_policy(GroupingPolicy::disabled());
        for _ in 0..4 {
            let end = buffer.end_position();
            history.record(buffer.insert(end, "x").unwrap());
        }
        history.set_capacity(2);
        assert_eq!(history.undo_len(), 2);
        assert_eq!(history.capacity(), 2);
    }

    #[test]
    fn test_set_capacity_keeps_next_redo() {
        let mut buffer = TextBuffer::new();
        let mut history = UndoEngine::new().with_policy(GroupingPolicy::disabled());
        for text in ["a", "b", "c"] {
            let end = buffer.end_position();
            history.record(buffer.insert(end, text).unwrap());
        }
        for _ in 0..3 {
            history.undo(&mut buffer).unwrap();
        }
        assert_eq!(buffer.text(), "");

        history.set_capacity(2);
        assert_eq!(history.redo_len(), 2);
        assert_eq!(history.redo(&mut buffer), Ok(true));
        assert_eq!(buffer.text(), "a");
        assert_eq!(history.redo(&mut buffer), Ok(true));
        assert_eq!(buffer.text(), "ab");
        assert_eq!(history.redo(&mut buffer), Ok(false));
    }
}
