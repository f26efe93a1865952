//! Filesystem operations
//!
//! Handles file and directory operations, including modification times.

use std::fs::File;
#[cfg(not(unix))]
use std::fs::OpenOptions;
use std::path::Path;
use std::time::SystemTime;

use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Write content to a file
pub fn write_file(path: &Path, content: &str) -> Result<(), FilesystemError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    std::fs::write(path, content).map_err(|e| FilesystemError::WriteFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Read content from a file
pub fn read_file(path: &Path) -> Result<String, FilesystemError> {
    std::fs::read_to_string(path).map_err(|e| FilesystemError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Read raw bytes from a file
pub fn read_bytes(path: &Path) -> Result<Vec<u8>, FilesystemError> {
    std::fs::read(path).map_err(|e| FilesystemError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Write raw bytes and stamp the file with the given modification time
pub fn write_bytes_with_mtime(
    path: &Path,
    content: &[u8],
    mtime: SystemTime,
) -> Result<(), FilesystemError> {
    std::fs::write(path, content).map_err(|e| FilesystemError::WriteFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;
    set_modified(path, mtime)
}

/// Get the modification time of a file
pub fn modified_time(path: &Path) -> Result<SystemTime, FilesystemError> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|e| FilesystemError::Timestamp {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
}

/// Set the modification time of an existing file
///
/// On Unix the file only needs to be owned, not writable. Elsewhere it
/// must be writable.
pub fn set_modified(path: &Path, mtime: SystemTime) -> Result<(), FilesystemError> {
    let to_err = |e: std::io::Error| FilesystemError::Timestamp {
        path: path.to_path_buf(),
        error: e.to_string(),
    };
    let file = open_for_timestamp(path).map_err(to_err)?;
    file.set_modified(mtime).map_err(to_err)
}

#[cfg(unix)]
fn open_for_timestamp(path: &Path) -> std::io::Result<File> {
    File::open(path)
}

#[cfg(not(unix))]
fn open_for_timestamp(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().write(true).open(path)
}

/// Copy a file, replacing the destination, and stamp both ends with `mtime`
///
/// An existing destination is removed first, so a read-only copy left by
/// an earlier run does not block the replacement.
pub fn copy_with_mtime(from: &Path, to: &Path, mtime: SystemTime) -> Result<(), FilesystemError> {
    let copy_err = |e: std::io::Error| FilesystemError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        error: e.to_string(),
    };
    set_modified(from, mtime)?;
    if to.is_file() {
        std::fs::remove_file(to).map_err(copy_err)?;
    }
    std::fs::copy(from, to).map_err(copy_err)?;
    set_modified(to, mtime)
}
