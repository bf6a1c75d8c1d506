//! Editor configuration persistence
//!
//! Stores user preferences in `~/.config/texit/config.yaml`. The config is
//! loaded once at startup and passed by reference to whatever needs it.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::history::{GroupingPolicy, DEFAULT_MAX_GROUP_CHARS, DEFAULT_UNDO_CAPACITY};
use crate::session::autosave::{MAX_AUTOSAVE_INTERVAL, MIN_AUTOSAVE_INTERVAL};
use crate::session::{Autosave, SessionOptions};
use crate::text::{LineEnding, TextEncoding};

/// Editor configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Theme name, passed through to the presentation layer
    #[serde(default = "default_theme")]
    pub theme: String,

    #[serde(default = "default_font_family")]
    pub font_family: String,

    #[serde(default = "default_font_size")]
    pub font_size: u32,

    #[serde(default = "default_true")]
    pub show_line_numbers: bool,

    #[serde(default = "default_true")]
    pub autosave_enabled: bool,

    /// Seconds between autosaves, clamped to 5..=300
    #[serde(default = "default_autosave_secs")]
    pub autosave_secs: u64,

    /// Maximum undo steps kept; 0 disables undo
    #[serde(default = "default_undo_capacity")]
    pub undo_capacity: usize,

    /// Merge consecutive keystrokes into word-sized undo steps
    #[serde(default = "default_true")]
    pub coalesce_typing: bool,

    #[serde(default = "default_max_group_chars")]
    pub max_group_chars: usize,

    #[serde(default)]
    pub default_line_ending: LineEnding,

    #[serde(default)]
    pub default_encoding: TextEncoding,
}

fn default_theme() -> String {
    "blue".to_string()
}

fn default_font_family() -> String {
    "Fira Code".to_string()
}

fn default_font_size() -> u32 {
    12
}

fn default_true() -> bool {
    true
}

fn default_autosave_secs() -> u64 {
    10
}

fn default_undo_capacity() -> usize {
    DEFAULT_UNDO_CAPACITY
}

fn default_max_group_chars() -> usize {
    DEFAULT_MAX_GROUP_CHARS
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            font_family: default_font_family(),
            font_size: default_font_size(),
            show_line_numbers: true,
            autosave_enabled: true,
            autosave_secs: default_autosave_secs(),
            undo_capacity: default_undo_capacity(),
            coalesce_typing: true,
            max_group_chars: default_max_group_chars(),
            default_line_ending: LineEnding::default(),
            default_encoding: TextEncoding::default(),
        }
    }
}

impl EditorConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from `path`; a missing or malformed file yields defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str::<Self>(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config.normalized()
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Clamp out-of-range values loaded from disk
    fn normalized(mut self) -> Self {
        let min = MIN_AUTOSAVE_INTERVAL.as_secs();
        let max = MAX_AUTOSAVE_INTERVAL.as_secs();
        if !(min..=max).contains(&self.autosave_secs) {
            let clamped = self.autosave_secs.clamp(min, max);
            tracing::warn!(
                "autosave_secs {} out of range, using {}",
                self.autosave_secs,
                clamped
            );
            self.autosave_secs = clamped;
        }
        self
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = crate::config_paths::config_file()
            .context("No config directory available")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory {}", parent.display())
            })?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn grouping_policy(&self) -> GroupingPolicy {
        if self.coalesce_typing {
            GroupingPolicy::new(self.max_group_chars)
        } else {
            GroupingPolicy::disabled()
        }
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            undo_capacity: self.undo_capacity,
            grouping: self.grouping_policy(),
            default_line_ending: self.default_line_ending,
            default_encoding: self.default_encoding,
        }
    }

    pub fn autosave(&self) -> Autosave {
        Autosave::new(
            Duration::from_secs(self.autosave_secs),
            self.autosave_enabled,
        )
    }
}
