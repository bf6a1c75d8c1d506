//! File access for sessions
//!
//! The core types only ever see bytes. [`FileService`] is the seam to the
//! outside world; [`FsFileService`] implements it on top of `std::fs` with
//! validation on read and atomic replace on write.

pub mod validation;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::error::EditError;
use crate::session::{EditorSession, SessionOptions};
use crate::text::TextEncoding;

pub use validation::{is_likely_binary, validate_file_for_opening, MAX_FILE_SIZE};

#[derive(Error, Debug)]
pub enum FileError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    #[error("cannot open directory: {}", .0.display())]
    IsDirectory(PathBuf),

    #[error("cannot open binary file: {}", .0.display())]
    Binary(PathBuf),

    #[error(
        "{} is too large ({size_mb:.1} MB, max {} MB)",
        .path.display(),
        MAX_FILE_SIZE / (1024 * 1024)
    )]
    TooLarge { path: PathBuf, size_mb: f64 },

    #[error("session has no file path")]
    NoPath,

    #[error("error accessing {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Edit(#[from] EditError),
}

impl FileError {
    pub(crate) fn from_io(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => FileError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => FileError::PermissionDenied(path.to_path_buf()),
            _ => FileError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }
}

/// Byte-level file access used by sessions
pub trait FileService {
    fn read(&self, path: &Path) -> Result<Vec<u8>, FileError>;

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), FileError>;

    fn exists(&self, path: &Path) -> bool;

    /// Create a directory and its parents
    fn create_dir_all(&self, _path: &Path) -> Result<(), FileError> {
        Ok(())
    }
}

/// [`FileService`] backed by the local file system
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFileService;

impl FileService for FsFileService {
    fn read(&self, path: &Path) -> Result<Vec<u8>, FileError> {
        validate_file_for_opening(path)?;
        let bytes = fs::read(path).map_err(|e| FileError::from_io(path, e))?;
        if is_likely_binary(&bytes) {
            return Err(FileError::Binary(path.to_path_buf()));
        }
        Ok(bytes)
    }

    /// Write to a temporary sibling, then rename over the target
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), FileError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let temp = path.with_file_name(format!(".{}.texit-tmp", name));

        if let Err(e) = fs::write(&temp, bytes) {
            return Err(FileError::from_io(&temp, e));
        }
        if let Err(e) = fs::rename(&temp, path) {
            let _ = fs::remove_file(&temp);
            return Err(FileError::from_io(path, e));
        }
        tracing::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), FileError> {
        fs::create_dir_all(path).map_err(|e| FileError::from_io(path, e))
    }
}

/// Read and decode a file into a clean session
pub fn open_session(
    service: &dyn FileService,
    path: &Path,
    declared: Option<TextEncoding>,
    options: &SessionOptions,
) -> Result<EditorSession, FileError> {
    let bytes = service.read(path)?;
    let session = EditorSession::open(Some(path.to_path_buf()), &bytes, declared, options)?;
    Ok(session)
}

/// Save a session to its own path.
///
/// If the write fails the session is flagged as having unsaved changes.
pub fn save_session(
    service: &dyn FileService,
    session: &mut EditorSession,
) -> Result<PathBuf, FileError> {
    let path = session.path().map(Path::to_path_buf).ok_or(FileError::NoPath)?;
    let bytes = session.save()?;
    if let Err(e) = service.write(&path, &bytes) {
        tracing::error!("Failed to save {}: {}", path.display(), e);
        session.mark_unsaved();
        return Err(e);
    }
    Ok(path)
}

/// Write an untitled session's snapshot to `dir/untitled_<unix-seconds>.txt`.
///
/// An existing file is never replaced: later snapshots in the same second
/// get a `_1`, `_2`, ... suffix.
pub fn write_recovery(
    service: &dyn FileService,
    dir: &Path,
    bytes: &[u8],
) -> Result<PathBuf, FileError> {
    service.create_dir_all(dir)?;
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let path = unused_recovery_path(service, dir, secs);
    service.write(&path, bytes)?;
    tracing::info!("Wrote recovery file {}", path.display());
    Ok(path)
}

fn unused_recovery_path(service: &dyn FileService, dir: &Path, secs: u64) -> PathBuf {
    let first = dir.join(format!("untitled_{}.txt", secs));
    if !service.exists(&first) {
        return first;
    }
    (1u32..)
        .map(|n| dir.join(format!("untitled_{}_{}.txt", secs, n)))
        .find(|path| !service.exists(path))
        .unwrap_or(first)
}
