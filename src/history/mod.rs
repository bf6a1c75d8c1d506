//! Undo/redo history.
//!
//! - [`EditOperation`]: one invertible content change, produced by the buffer
//! - [`UndoEngine`]: bounded undo/redo stacks replaying operations
//! - [`GroupingPolicy`]: deterministic rules for coalescing keystrokes

mod engine;
mod grouping;
mod operation;

pub use engine::{UndoEngine, DEFAULT_UNDO_CAPACITY};
pub use grouping::{GroupingPolicy, DEFAULT_MAX_GROUP_CHARS};
pub use operation::EditOperation;
