//! Debug tracing infrastructure for development diagnostics
//!
//! Provides structured logging with scoped filtering for debugging
//! edit, undo and save state transitions.
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=texit::history=trace` - undo grouping decisions
//! - `RUST_LOG=texit::session=trace` - per-edit session diffs
//!
//! # Log Files
//!
//! Logs are written to `~/.config/texit/logs/texit.log` with daily rotation.
//! File logging uses debug level by default for more verbose troubleshooting.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::session::EditorSession;

/// Initialize tracing subscriber with console and file logging
///
/// Console output goes to stderr and respects RUST_LOG (default `warn`).
/// File logging writes to `~/.config/texit/logs/texit.log` with daily rotation.
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Console layer - respects RUST_LOG
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    // File layer - always debug level for troubleshooting
    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender =
                tracing_appender::rolling::daily(logs_dir, crate::config_paths::LOG_FILE_NAME);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {:#}", e);
            None
        }
    };

    // A second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

/// Lightweight snapshot of session state for diffing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub version: u64,
    pub dirty: bool,
    pub undo_depth: usize,
    pub redo_depth: usize,
    pub line_count: usize,
}

impl SessionSnapshot {
    pub fn capture(session: &EditorSession) -> Self {
        Self {
            version: session.version(),
            dirty: session.is_dirty(),
            undo_depth: session.history().undo_len(),
            redo_depth: session.history().redo_len(),
            line_count: session.buffer().line_count(),
        }
    }

    /// Generate a diff description between two snapshots
    pub fn diff(&self, other: &SessionSnapshot) -> Option<String> {
        let mut changes = Vec::new();
        if self.version != other.version {
            changes.push(format!("version: {} → {}", self.version, other.version));
        }
        if self.dirty != other.dirty {
            let status = if other.dirty { "dirty" } else { "clean" };
            changes.push(status.to_string());
        }
        if self.undo_depth != other.undo_depth || self.redo_depth != other.redo_depth {
            changes.push(format!(
                "history: {}/{} → {}/{}",
                self.undo_depth, self.redo_depth, other.undo_depth, other.redo_depth
            ));
        }
        if self.line_count != other.line_count {
            changes.push(format!("lines: {} → {}", self.line_count, other.line_count));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}
