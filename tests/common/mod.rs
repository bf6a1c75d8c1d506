//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use texit::io::{FileError, FileService};
use texit::{EditorSession, Position, SessionOptions, TextBuffer};

/// Shorthand for `Position::new`
pub fn pos(line: usize, column: usize) -> Position {
    Position::new(line, column)
}

/// Untitled session holding `text` with default options
pub fn session(text: &str) -> EditorSession {
    EditorSession::with_text(text)
}

/// Session with a path, as if it was just opened from disk
pub fn named_session(path: &str, text: &str) -> EditorSession {
    EditorSession::open(
        Some(PathBuf::from(path)),
        text.as_bytes(),
        None,
        &SessionOptions::default(),
    )
    .unwrap()
}

/// Type `text` one character at a time starting at `at`, like a keyboard would
pub fn type_text(session: &mut EditorSession, at: Position, text: &str) -> Position {
    let mut at = at;
    for ch in text.chars() {
        at = session.type_char(at, ch).unwrap().inserted_end();
    }
    at
}

pub fn buffer_lines(buffer: &TextBuffer) -> Vec<String> {
    (0..buffer.line_count())
        .map(|i| buffer.line(i).unwrap_or_default().into_owned())
        .collect()
}

/// In-memory [`FileService`]; paths in `read_only` reject writes
#[derive(Default)]
pub struct MemoryFiles {
    pub files: RefCell<HashMap<PathBuf, Vec<u8>>>,
    pub read_only: Vec<PathBuf>,
}

impl MemoryFiles {
    pub fn with_file(path: &str, bytes: &[u8]) -> Self {
        let files = Self::default();
        files
            .files
            .borrow_mut()
            .insert(PathBuf::from(path), bytes.to_vec());
        files
    }

    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.files.borrow().get(Path::new(path)).cloned()
    }
}

impl FileService for MemoryFiles {
    fn read(&self, path: &Path) -> Result<Vec<u8>, FileError> {
        self.files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| FileError::NotFound(path.to_path_buf()))
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), FileError> {
        if self.read_only.iter().any(|p| p == path) {
            return Err(FileError::PermissionDenied(path.to_path_buf()));
        }
        self.files
            .borrow_mut()
            .insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }
}
