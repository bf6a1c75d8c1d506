//! Where texit keeps its files
//!
//! Everything lives in one per-user directory: `$XDG_CONFIG_HOME/texit` or
//! `~/.config/texit` on Unix and macOS, `%APPDATA%\texit` on Windows.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

const APP_DIR: &str = "texit";

/// Base name of the daily-rotated log file
pub const LOG_FILE_NAME: &str = "texit.log";

/// Per-user texit directory, if the platform has one
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        dirs::config_dir().map(|dir| dir.join(APP_DIR))
    }

    #[cfg(not(target_os = "windows"))]
    {
        unix_config_dir(env::var_os("XDG_CONFIG_HOME"), dirs::home_dir())
    }
}

/// A non-empty `XDG_CONFIG_HOME` wins over `~/.config`
#[cfg_attr(target_os = "windows", allow(dead_code))]
fn unix_config_dir(xdg: Option<OsString>, home: Option<PathBuf>) -> Option<PathBuf> {
    xdg.filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home.map(|home| home.join(".config")))
        .map(|base| base.join(APP_DIR))
}

pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.yaml"))
}

pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

/// Target for [`write_recovery`](crate::io::write_recovery); falls back to
/// `<tmp>/texit_autosave` when there is no per-user directory
pub fn recovery_dir() -> PathBuf {
    config_dir()
        .map(|dir| dir.join("recovery"))
        .unwrap_or_else(|| env::temp_dir().join("texit_autosave"))
}

/// Create the logs directory (and its parents) if needed
pub fn ensure_logs_dir() -> anyhow::Result<PathBuf> {
    let logs = logs_dir().context("No config directory available")?;
    create(&logs)?;
    Ok(logs)
}

fn create(dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))
}
