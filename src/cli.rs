//! Command-line argument parsing
//!
//! Supports:
//! - Find (with optional replace-all) in a file
//! - Line ending and encoding conversion
//! - Writing the result back or printing it to stdout
//! - Document statistics as text or JSON

use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

use crate::session::EditorSession;
use crate::text::{LineEnding, TextEncoding};

/// Inspect and edit text files without opening an editor window
#[derive(Parser, Debug)]
#[command(name = "texit", version, about = "Inspect and edit text files")]
pub struct CliArgs {
    /// File to open
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Decode the file with this encoding instead of detecting it
    #[arg(long, value_name = "ENCODING")]
    pub encoding: Option<TextEncoding>,

    /// Pattern to search for
    #[arg(long, value_name = "PATTERN")]
    pub find: Option<String>,

    /// Replace every match of --find
    #[arg(long, value_name = "TEXT")]
    pub replace: Option<String>,

    /// Treat --find as a regular expression ($1 expands in --replace)
    #[arg(long)]
    pub regex: bool,

    /// Case-insensitive --find
    #[arg(short = 'i', long)]
    pub ignore_case: bool,

    /// Convert line endings (lf, crlf, cr)
    #[arg(long, value_name = "STYLE")]
    pub line_ending: Option<LineEnding>,

    /// Convert to another encoding
    #[arg(long, value_name = "ENCODING")]
    pub to_encoding: Option<TextEncoding>,

    /// Write changes back to PATH instead of printing them
    #[arg(short = 'w', long)]
    pub write: bool,

    /// Print document statistics
    #[arg(long)]
    pub stats: bool,

    /// Print statistics as JSON (with --stats)
    #[arg(long)]
    pub json: bool,

    /// Use this config file instead of the default location
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Find or find-and-replace request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub pattern: String,
    pub replacement: Option<String>,
    pub regex: bool,
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsFormat {
    Text,
    Json,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub path: PathBuf,
    pub declared_encoding: Option<TextEncoding>,
    pub search: Option<SearchRequest>,
    pub line_ending: Option<LineEnding>,
    pub to_encoding: Option<TextEncoding>,
    pub write: bool,
    pub stats: Option<StatsFormat>,
    pub config_path: Option<PathBuf>,
}

impl RunConfig {
    /// Whether the run changes the document
    pub fn modifies(&self) -> bool {
        self.line_ending.is_some()
            || self.to_encoding.is_some()
            || self
                .search
                .as_ref()
                .is_some_and(|search| search.replacement.is_some())
    }
}

impl CliArgs {
    /// Convert parsed CLI args into a run configuration
    pub fn into_config(self) -> Result<RunConfig, String> {
        if self.find.is_none() {
            if self.replace.is_some() {
                return Err("--replace requires --find".to_string());
            }
            if self.regex || self.ignore_case {
                return Err("--regex and --ignore-case require --find".to_string());
            }
        }
        if self.json && !self.stats {
            return Err("--json requires --stats".to_string());
        }

        let search = self.find.map(|pattern| SearchRequest {
            pattern,
            replacement: self.replace,
            regex: self.regex,
            case_sensitive: !self.ignore_case,
        });

        let stats = match (self.stats, self.json) {
            (false, _) => None,
            (true, false) => Some(StatsFormat::Text),
            (true, true) => Some(StatsFormat::Json),
        };

        let config = RunConfig {
            path: self.path,
            declared_encoding: self.encoding,
            search,
            line_ending: self.line_ending,
            to_encoding: self.to_encoding,
            write: self.write,
            stats,
            config_path: self.config,
        };

        if config.write && !config.modifies() {
            return Err("--write needs --replace, --line-ending or --to-encoding".to_string());
        }
        Ok(config)
    }
}

/// Summary printed by `--stats`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    pub name: String,
    pub lines: usize,
    pub chars: usize,
    pub bytes: usize,
    pub encoding: TextEncoding,
    pub line_ending: LineEnding,
    pub dirty: bool,
}

impl DocumentStats {
    /// `bytes` is the encoded size; unencodable content reports the UTF-8 size
    pub fn collect(session: &EditorSession) -> Self {
        let bytes = session
            .snapshot_bytes()
            .map(|b| b.len())
            .unwrap_or_else(|_| session.buffer().rope().len_bytes());
        Self {
            name: session.display_name(),
            lines: session.buffer().line_count(),
            chars: session.buffer().len_chars(),
            bytes,
            encoding: session.encoding(),
            line_ending: session.line_ending(),
            dirty: session.is_dirty(),
        }
    }

    pub fn to_text(&self) -> String {
        format!(
            "{}: {} lines, {} chars, {} bytes, {}, {}{}",
            self.name,
            self.lines,
            self.chars,
            self.bytes,
            self.encoding,
            self.line_ending,
            if self.dirty { " (modified)" } else { "" }
        )
    }
}
