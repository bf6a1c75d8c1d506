//! File validation before opening
//!
//! Checks existence, permissions, size and binary content so the editor can
//! refuse a file with a clear message instead of decoding garbage.

use std::fs;
use std::path::Path;

use super::FileError;
use crate::text::TextEncoding;

/// Maximum file size in bytes (50 MB)
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// How much of a file is scanned for NUL bytes
pub const BINARY_SNIFF_LEN: usize = 8192;

/// Validate a path before reading it
///
/// Checks:
/// - File exists
/// - Is not a directory
/// - Has read permissions
/// - Does not exceed the size limit
pub fn validate_file_for_opening(path: &Path) -> Result<(), FileError> {
    let metadata = fs::metadata(path).map_err(|e| FileError::from_io(path, e))?;

    if metadata.is_dir() {
        return Err(FileError::IsDirectory(path.to_path_buf()));
    }

    if metadata.len() > MAX_FILE_SIZE {
        return Err(FileError::TooLarge {
            path: path.to_path_buf(),
            size_mb: metadata.len() as f64 / (1024.0 * 1024.0),
        });
    }

    Ok(())
}

/// Check if content is likely binary by scanning the first 8KB for NUL bytes
///
/// UTF-16 text is full of NULs, so content with a UTF-16 byte order mark is
/// always treated as text.
pub fn is_likely_binary(bytes: &[u8]) -> bool {
    if matches!(
        TextEncoding::sniff_bom(bytes),
        Some(TextEncoding::Utf16Le | TextEncoding::Utf16Be)
    ) {
        return false;
    }
    let head = &bytes[..bytes.len().min(BINARY_SNIFF_LEN)];
    head.contains(&0)
}
