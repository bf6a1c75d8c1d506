//! Texit - headless text-editing core
//!
//! A rope-backed [`TextBuffer`] addressed by (line, column), an undo engine
//! that records invertible [`EditOperation`]s and coalesces typing, and an
//! [`EditorSession`] that ties a buffer to its file identity, encoding, line
//! ending and dirty state. Find/replace, autosave, named commands and file
//! access are layered on top.

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod error;
pub mod history;
pub mod io;
pub mod search;
pub mod session;
pub mod text;
pub mod tracing;

// Re-export commonly used types
pub use config::EditorConfig;
pub use error::EditError;
pub use history::{EditOperation, GroupingPolicy, UndoEngine};
pub use session::{Edit, EditorSession, SessionOptions};
pub use text::{LineEnding, Position, TextBuffer, TextEncoding};
