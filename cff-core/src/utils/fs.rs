//! Filesystem Utilities.
//!
//! Helper functions for common filesystem operations: ensuring a directory
//! exists, reading a file to a string, and replacing a file's content
//! atomically. All of them map I/O failures to [`CoreError::Filesystem`].

use crate::error::CoreError;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Ensures that a directory exists at the given path.
///
/// Creates the directory and any missing parents. If the path exists but is not
/// a directory, an error is returned.
///
/// # Examples
///
/// ```no_run
/// # use cff_core::utils::fs::ensure_dir_exists;
/// let temp_dir = tempfile::tempdir().unwrap();
/// let dir_path = temp_dir.path().join("store");
/// ensure_dir_exists(&dir_path).unwrap();
/// assert!(dir_path.is_dir());
/// ```
pub fn ensure_dir_exists(path: &Path) -> Result<(), CoreError> {
    if path.exists() {
        if !path.is_dir() {
            Err(CoreError::Filesystem {
                message: "Path exists but is not a directory".to_string(),
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "Path exists but is not a directory",
                ),
            })
        } else {
            Ok(())
        }
    } else {
        fs::create_dir_all(path).map_err(|e| CoreError::Filesystem {
            message: "Failed to create directory".to_string(),
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Reads the entire contents of a file into a string.
///
/// A missing file surfaces as `CoreError::Filesystem` whose source has
/// `ErrorKind::NotFound`; callers that treat absence as "empty" match on it.
pub fn read_to_string(path: &Path) -> Result<String, CoreError> {
    fs::read_to_string(path).map_err(|e| CoreError::Filesystem {
        message: "Failed to read file to string".to_string(),
        path: path.to_path_buf(),
        source: e,
    })
}

/// Replaces the content of `path` with `content` atomically.
///
/// The data is written to a temporary file in the same directory, flushed, and
/// renamed over the target. Readers observe either the old or the new content,
/// never a prefix of it. The parent directory is created when missing.
pub fn write_string_atomically(path: &Path, content: &str) -> Result<(), CoreError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    ensure_dir_exists(parent)?;

    let map_err = |message: &str, source: std::io::Error| CoreError::Filesystem {
        message: message.to_string(),
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| map_err("Failed to create temporary file", e))?;
    tmp.write_all(content.as_bytes())
        .map_err(|e| map_err("Failed to write temporary file", e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| map_err("Failed to sync temporary file", e))?;
    tmp.persist(path)
        .map_err(|e| map_err("Failed to replace file", e.error))?;
    Ok(())
}

/// Returns `true` when `err` is a filesystem error caused by a missing path.
pub fn is_not_found(err: &CoreError) -> bool {
    match err {
        CoreError::Filesystem { source, .. } | CoreError::Io(source) => {
            source.kind() == std::io::ErrorKind::NotFound
        }
        _ => false,
    }
}
