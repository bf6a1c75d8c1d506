//! Editor session - one document bound to its history and file identity
//!
//! The session is the unit a presentation layer manipulates: it owns a
//! [`TextBuffer`] and an [`UndoEngine`], remembers where the content came from
//! (path, encoding, line ending) and tracks whether it differs from the last
//! load or save.

pub mod autosave;

use ropey::Rope;
use std::path::{Path, PathBuf};

use crate::error::EditError;
use crate::history::{EditOperation, GroupingPolicy, UndoEngine, DEFAULT_UNDO_CAPACITY};
use crate::text::{decode, encode, LineEnding, Position, TextBuffer, TextEncoding};
use crate::tracing::SessionSnapshot;

pub use autosave::{Autosave, AutosaveAction};

/// Application name used in window titles
pub const APP_NAME: &str = "TexitEditor";

/// Knobs a session is created with, usually derived from
/// [`EditorConfig::session_options`](crate::config::EditorConfig::session_options)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub undo_capacity: usize,
    pub grouping: GroupingPolicy,
    /// Used when the loaded content has no line terminators
    pub default_line_ending: LineEnding,
    /// Used for untitled documents
    pub default_encoding: TextEncoding,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            undo_capacity: DEFAULT_UNDO_CAPACITY,
            grouping: GroupingPolicy::default(),
            default_line_ending: LineEnding::Lf,
            default_encoding: TextEncoding::Utf8,
        }
    }
}

/// A buffer mutation to run through the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Insert {
        at: Position,
        text: String,
    },
    Delete {
        start: Position,
        end: Position,
    },
    Replace {
        start: Position,
        end: Position,
        text: String,
    },
}

impl Edit {
    fn apply_to(&self, buffer: &mut TextBuffer) -> Result<EditOperation, EditError> {
        match self {
            Edit::Insert { at, text } => buffer.insert(*at, text),
            Edit::Delete { start, end } => buffer.delete_range(*start, *end),
            Edit::Replace { start, end, text } => buffer.replace_range(*start, *end, text),
        }
    }
}

/// Content and version at the last load or save
#[derive(Debug, Clone)]
struct SavedSnapshot {
    rope: Rope,
    version: u64,
}

impl SavedSnapshot {
    fn of(buffer: &TextBuffer) -> Self {
        Self {
            rope: buffer.rope().clone(),
            version: buffer.version(),
        }
    }

    fn matches(&self, buffer: &TextBuffer) -> bool {
        if self.version == buffer.version() {
            return true;
        }
        let rope = buffer.rope();
        rope.len_bytes() == self.rope.len_bytes() && *rope == self.rope
    }
}

/// One open document
#[derive(Debug, Clone)]
pub struct EditorSession {
    buffer: TextBuffer,
    history: UndoEngine,
    /// Path to the file on disk (None for new/unsaved documents)
    path: Option<PathBuf>,
    encoding: TextEncoding,
    line_ending: LineEnding,
    is_dirty: bool,
    /// Set when something other than content (encoding, line ending, a
    /// failed write) must be saved
    force_dirty: bool,
    saved: SavedSnapshot,
}

impl EditorSession {
    fn from_parts(
        buffer: TextBuffer,
        path: Option<PathBuf>,
        encoding: TextEncoding,
        line_ending: LineEnding,
        options: &SessionOptions,
    ) -> Self {
        let saved = SavedSnapshot::of(&buffer);
        let history =
            UndoEngine::with_capacity(options.undo_capacity).with_policy(options.grouping);
        Self {
            buffer,
            history,
            path,
            encoding,
            line_ending,
            is_dirty: false,
            force_dirty: false,
            saved,
        }
    }

    /// Create an empty, clean, untitled session
    pub fn new_untitled(options: &SessionOptions) -> Self {
        Self::from_parts(
            TextBuffer::new(),
            None,
            options.default_encoding,
            options.default_line_ending,
            options,
        )
    }

    /// Create an untitled session holding `text`, with default options
    pub fn with_text(text: &str) -> Self {
        let options = SessionOptions::default();
        let line_ending = LineEnding::detect(text).unwrap_or(options.default_line_ending);
        Self::from_parts(
            TextBuffer::from_text(text),
            None,
            options.default_encoding,
            line_ending,
            &options,
        )
    }

    /// Create an empty session for a file that does not exist yet.
    ///
    /// The session starts dirty so the file gets created on first save.
    pub fn new_with_path(path: PathBuf, options: &SessionOptions) -> Self {
        let mut session = Self::new_untitled(options);
        session.path = Some(path);
        session.force_dirty = true;
        session.is_dirty = true;
        session
    }

    /// Decode loaded file bytes into a clean session.
    ///
    /// Uses `declared` when given, otherwise BOM / UTF-8 / Latin-1 detection.
    /// The line ending is taken from the content.
    pub fn open(
        path: Option<PathBuf>,
        bytes: &[u8],
        declared: Option<TextEncoding>,
        options: &SessionOptions,
    ) -> Result<Self, EditError> {
        let (text, encoding) = decode(bytes, declared)?;
        let line_ending = LineEnding::detect(&text).unwrap_or(options.default_line_ending);
        let buffer = TextBuffer::from_text(&text);
        tracing::info!(
            path = ?path,
            %encoding,
            %line_ending,
            lines = buffer.line_count(),
            "Opened session"
        );
        Ok(Self::from_parts(buffer, path, encoding, line_ending, options))
    }

    // === Editing ===

    /// Run a buffer mutation and record it for undo
    pub fn apply_edit(&mut self, edit: Edit) -> Result<EditOperation, EditError> {
        let before = SessionSnapshot::capture(self);
        let op = edit.apply_to(&mut self.buffer)?;
        if op.is_noop() {
            return Ok(op);
        }
        self.history.record(op.clone());
        // Only undo/redo can bring the session back to clean
        self.is_dirty = true;
        self.trace_transition("edit", &before);
        Ok(op)
    }

    pub fn insert(&mut self, at: Position, text: &str) -> Result<EditOperation, EditError> {
        self.apply_edit(Edit::Insert {
            at,
            text: text.to_string(),
        })
    }

    pub fn delete_range(
        &mut self,
        start: Position,
        end: Position,
    ) -> Result<EditOperation, EditError> {
        self.apply_edit(Edit::Delete { start, end })
    }

    pub fn replace_range(
        &mut self,
        start: Position,
        end: Position,
        text: &str,
    ) -> Result<EditOperation, EditError> {
        self.apply_edit(Edit::Replace {
            start,
            end,
            text: text.to_string(),
        })
    }

    /// Insert one typed character; consecutive calls coalesce per word
    pub fn type_char(&mut self, at: Position, ch: char) -> Result<EditOperation, EditError> {
        let mut buf = [0u8; 4];
        self.insert(at, ch.encode_utf8(&mut buf))
    }

    /// Delete the character before `at` (joining lines at column 0).
    ///
    /// Returns `Ok(None)` at the start of the document.
    pub fn backspace(&mut self, at: Position) -> Result<Option<EditOperation>, EditError> {
        let at = self.checked(at)?;
        let previous = if at.column > 0 {
            Position::new(at.line, at.column - 1)
        } else if at.line > 0 {
            let line = at.line - 1;
            Position::new(line, self.buffer.line_length(line)?)
        } else {
            return Ok(None);
        };
        self.delete_range(previous, at).map(Some)
    }

    /// Delete the character after `at` (joining lines at line end).
    ///
    /// Returns `Ok(None)` at the end of the document.
    pub fn delete_forward(&mut self, at: Position) -> Result<Option<EditOperation>, EditError> {
        let at = self.checked(at)?;
        let next = if at.column < self.buffer.line_length(at.line)? {
            Position::new(at.line, at.column + 1)
        } else if at.line + 1 < self.buffer.line_count() {
            Position::new(at.line + 1, 0)
        } else {
            return Ok(None);
        };
        self.delete_range(at, next).map(Some)
    }

    fn checked(&self, at: Position) -> Result<Position, EditError> {
        self.buffer.position_to_offset(at).map(|_| at)
    }

    /// Undo the last edit group. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let before = SessionSnapshot::capture(self);
        let result = self.history.undo(&mut self.buffer);
        self.finish_history_step("undo", result, &before)
    }

    /// Redo the last undone edit group. Returns false if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        let before = SessionSnapshot::capture(self);
        let result = self.history.redo(&mut self.buffer);
        self.finish_history_step("redo", result, &before)
    }

    fn finish_history_step(
        &mut self,
        action: &'static str,
        result: Result<bool, EditError>,
        before: &SessionSnapshot,
    ) -> bool {
        match result {
            Ok(done) => {
                if done {
                    self.refresh_dirty();
                    self.trace_transition(action, before);
                }
                done
            }
            Err(e) => {
                tracing::error!("{} failed, history out of sync with buffer: {}", action, e);
                self.history.clear();
                false
            }
        }
    }

    /// Force the next edit to start a new undo group (cursor moved, pause, ...)
    pub fn commit_boundary(&mut self) {
        self.history.commit_boundary();
    }

    /// True while a typing run is still open for coalescing
    pub fn is_mid_edit(&self) -> bool {
        self.history.has_open_group()
    }

    // === Saving ===

    /// Serialize the content with the session's encoding and line ending and
    /// mark the session clean.
    pub fn save(&mut self) -> Result<Vec<u8>, EditError> {
        let bytes = self.snapshot_bytes()?;
        self.saved = SavedSnapshot::of(&self.buffer);
        self.force_dirty = false;
        self.is_dirty = false;
        self.history.commit_boundary();
        tracing::info!(
            path = ?self.path,
            bytes = bytes.len(),
            version = self.buffer.version(),
            "Saved session"
        );
        Ok(bytes)
    }

    /// Save under a new path
    pub fn save_as(&mut self, path: PathBuf) -> Result<Vec<u8>, EditError> {
        let bytes = self.save()?;
        self.path = Some(path);
        Ok(bytes)
    }

    /// Serialize the content without touching the saved state
    pub fn snapshot_bytes(&self) -> Result<Vec<u8>, EditError> {
        encode(&self.buffer.text(), self.line_ending, self.encoding)
    }

    /// Flag the session as having unsaved changes after the bytes from
    /// [`save`](Self::save) could not be written
    pub fn mark_unsaved(&mut self) {
        self.force_dirty = true;
        self.is_dirty = true;
    }

    pub fn set_path(&mut self, path: Option<PathBuf>) {
        self.path = path;
    }

    pub fn set_encoding(&mut self, encoding: TextEncoding) {
        if encoding != self.encoding {
            self.encoding = encoding;
            self.force_dirty = true;
            self.refresh_dirty();
        }
    }

    pub fn set_line_ending(&mut self, line_ending: LineEnding) {
        if line_ending != self.line_ending {
            self.line_ending = line_ending;
            self.force_dirty = true;
            self.refresh_dirty();
        }
    }

    fn refresh_dirty(&mut self) {
        self.is_dirty = self.force_dirty || !self.saved.matches(&self.buffer);
    }

    fn trace_transition(&self, action: &'static str, before: &SessionSnapshot) {
        if let Some(diff) = before.diff(&SessionSnapshot::capture(self)) {
            tracing::trace!(action, "{}", diff);
        }
    }

    // === Queries ===

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn history(&self) -> &UndoEngine {
        &self.history
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn version(&self) -> u64 {
        self.buffer.version()
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Get the display name for this session.
    /// Returns the file name if the session has a path, or "Untitled".
    pub fn display_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "Untitled".to_string())
    }

    /// Window title, e.g. `notes.txt* - TexitEditor`
    pub fn title(&self) -> String {
        let mark = if self.is_dirty { "*" } else { "" };
        format!("{}{} - {}", self.display_name(), mark, APP_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(line: usize, column: usize) -> Position {
        Position::new(line, column)
    }

    // ========================================================================
    // Session creation tests
    // ========================================================================

    #[test]
    fn test_new_untitled_is_clean_and_empty() {
        let session = EditorSession::new_untitled(&SessionOptions::default());
        assert!(session.path().is_none());
        assert!(!session.is_dirty());
        assert_eq!(session.text(), "");
        assert!(!session.can_undo());
    }

    #[test]
    fn test_new_with_path_is_dirty() {
        let path = PathBuf::from("/tmp/newfile.txt");
        let session = EditorSession::new_with_path(path.clone(), &SessionOptions::default());
        assert_eq!(session.path(), Some(path.as_path()));
        assert!(session.is_dirty());
    }

    #[test]
    fn test_open_detects_line_ending() {
        let session = EditorSession::open(
            Some(PathBuf::from("win.txt")),
            b"one\r\ntwo\r\n",
            None,
            &SessionOptions::default(),
        )
        .unwrap();
        assert_eq!(session.line_ending(), LineEnding::CrLf);
        assert_eq!(session.text(), "one\ntwo\n");
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_open_without_terminators_uses_default_ending() {
        let options = SessionOptions {
            default_line_ending: LineEnding::CrLf,
            ..SessionOptions::default()
        };
        let session = EditorSession::open(None, b"one line", None, &options).unwrap();
        assert_eq!(session.line_ending(), LineEnding::CrLf);
    }

    #[test]
    fn test_open_declared_encoding_failure() {
        let result = EditorSession::open(
            None,
            &[0xFF, 0xFE, 0x00],
            Some(TextEncoding::Utf8),
            &SessionOptions::default(),
        );
        assert!(matches!(result, Err(EditError::Decode { .. })));
    }

    // ========================================================================
    // Dirty flag tests
    // ========================================================================

    #[test]
    fn test_edit_marks_dirty_and_save_clears() {
        let mut session = EditorSession::with_text("hello");
        session.insert(pos(0, 5), "!").unwrap();
        assert!(session.is_dirty());

        let bytes = session.save().unwrap();
        assert_eq!(bytes, b"hello!");
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_undo_to_saved_snapshot_is_clean() {
        let mut session = EditorSession::with_text("hello");
        session.insert(pos(0, 0), "X").unwrap();
        assert!(session.is_dirty());
        assert!(session.undo());
        assert!(!session.is_dirty());
        assert!(session.redo());
        assert!(session.is_dirty());
    }

    #[test]
    fn test_manual_inverse_edit_stays_dirty() {
        let mut session = EditorSession::with_text("hello");
        session.insert(pos(0, 5), "x").unwrap();
        session.backspace(pos(0, 6)).unwrap();
        assert_eq!(session.text(), "hello");
        assert!(session.is_dirty());
    }

    #[test]
    fn test_noop_edit_keeps_clean() {
        let mut session = EditorSession::with_text("hello");
        session.replace_range(pos(0, 0), pos(0, 5), "hello").unwrap();
        assert!(!session.is_dirty());
        assert!(!session.can_undo());
    }

    #[test]
    fn test_undo_past_save_point_is_dirty() {
        let mut session = EditorSession::with_text("");
        session.insert(pos(0, 0), "ab").unwrap();
        session.save().unwrap();
        session.insert(pos(0, 2), "cd").unwrap();
        assert!(session.undo());
        assert!(!session.is_dirty());
        assert!(session.undo());
        assert!(session.is_dirty());
    }

    #[test]
    fn test_encoding_change_marks_dirty_until_save() {
        let mut session = EditorSession::with_text("abc");
        session.set_encoding(TextEncoding::Utf16Le);
        assert!(session.is_dirty());
        session.save().unwrap();
        assert!(!session.is_dirty());
        session.set_encoding(TextEncoding::Utf16Le);
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_failed_save_keeps_dirty() {
        let mut session = EditorSession::with_text("");
        session.set_encoding(TextEncoding::Ascii);
        session.save().unwrap();
        session.insert(pos(0, 0), "naïve").unwrap();

        let err = session.save().unwrap_err();
        assert!(matches!(err, EditError::Encoding { character: 'ï', .. }));
        assert!(session.is_dirty());
    }

    #[test]
    fn test_mark_unsaved() {
        let mut session = EditorSession::with_text("x");
        session.mark_unsaved();
        assert!(session.is_dirty());
    }

    // ========================================================================
    // Editing helpers
    // ========================================================================

    #[test]
    fn test_backspace_joins_lines() {
        let mut session = EditorSession::with_text("ab\ncd");
        let op = session.backspace(pos(1, 0)).unwrap().unwrap();
        assert_eq!(op.removed(), "\n");
        assert_eq!(session.text(), "abcd");
        assert!(session.backspace(pos(0, 0)).unwrap().is_none());
    }

    #[test]
    fn test_delete_forward_joins_lines() {
        let mut session = EditorSession::with_text("ab\ncd");
        session.delete_forward(pos(0, 2)).unwrap();
        assert_eq!(session.text(), "abcd");
        assert!(session.delete_forward(pos(0, 4)).unwrap().is_none());
    }

    #[test]
    fn test_backspace_run_is_one_undo_step() {
        let mut session = EditorSession::with_text("hello");
        for column in (3..=5).rev() {
            session.backspace(pos(0, column)).unwrap();
        }
        assert_eq!(session.text(), "he");
        assert_eq!(session.history().undo_len(), 1);
        assert!(session.undo());
        assert_eq!(session.text(), "hello");
    }

    #[test]
    fn test_save_closes_typing_group() {
        let mut session = EditorSession::with_text("");
        session.insert(pos(0, 0), "a").unwrap();
        assert!(session.is_mid_edit());
        session.save().unwrap();
        assert!(!session.is_mid_edit());
        session.insert(pos(0, 1), "b").unwrap();
        assert_eq!(session.history().undo_len(), 2);
    }

    #[test]
    fn test_failed_edit_changes_nothing() {
        let mut session = EditorSession::with_text("abc");
        assert!(session.insert(pos(3, 0), "x").is_err());
        assert!(!session.is_dirty());
        assert!(!session.can_undo());
        assert_eq!(session.version(), 0);
    }

    // ========================================================================
    // Naming
    // ========================================================================

    #[test]
    fn test_display_name_and_title() {
        let mut session = EditorSession::with_text("");
        assert_eq!(session.display_name(), "Untitled");
        assert_eq!(session.title(), "Untitled - TexitEditor");

        session.set_path(Some(PathBuf::from("/home/user/notes.txt")));
        session.insert(pos(0, 0), "x").unwrap();
        assert_eq!(session.title(), "notes.txt* - TexitEditor");
    }

    #[test]
    fn test_save_as_sets_path() {
        let mut session = EditorSession::with_text("x");
        session.save_as(PathBuf::from("out.txt")).unwrap();
        assert_eq!(session.display_name(), "out.txt");
    }
}
