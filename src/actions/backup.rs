//! Backup of deletion candidates.
//!
//! A candidate is copied into the backup directory before its original is
//! removed. The copy mirrors the file's location relative to the scan root,
//! so `/data/photos/2020/a.jpg` scanned from `/data` lands at
//! `<backup>/photos/2020/a.jpg`. An existing file at the destination is
//! never overwritten; a numeric suffix is appended instead.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use filetime::FileTime;
use thiserror::Error;

use crate::duplicates::containing_root;

/// Error type for backup operations.
#[derive(Debug, Error)]
pub enum BackupError {
    /// The file to back up no longer exists.
    #[error("backup source not found: {0}")]
    SourceNotFound(PathBuf),

    /// A directory under the backup root could not be created.
    #[error("cannot create backup directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Copying the content failed.
    #[error("cannot copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Timestamps could not be carried over to the copy.
    #[error("cannot preserve timestamps on {path}: {source}")]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Compute where a file is mirrored inside the backup directory.
///
/// The path is taken relative to the first root that contains it. A file
/// outside every root keeps its full path with the root and drive prefix
/// removed.
#[must_use]
pub fn mirror_path(backup_dir: &Path, roots: &[PathBuf], file: &Path) -> PathBuf {
    let relative = containing_root(roots, file)
        .and_then(|root| file.strip_prefix(root).ok())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| strip_root(file));

    backup_dir.join(relative)
}

fn strip_root(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect()
}

/// Return `path`, or the first `stem_N.ext` variant that does not exist.
#[must_use]
pub fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    (1u32..)
        .map(|n| path.with_file_name(format!("{stem}_{n}{ext}")))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Copy `file` into the backup directory, preserving its timestamps.
///
/// Parent directories are created as needed.
///
/// # Returns
///
/// The path of the backup copy.
///
/// # Errors
///
/// Returns [`BackupError`] if the source is gone, the destination cannot be
/// created, or the copy fails. A partially written copy is removed.
pub fn backup_file(file: &Path, backup_dir: &Path, roots: &[PathBuf]) -> Result<PathBuf, BackupError> {
    let metadata = fs::metadata(file).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => BackupError::SourceNotFound(file.to_path_buf()),
        _ => BackupError::Copy {
            from: file.to_path_buf(),
            to: backup_dir.to_path_buf(),
            source: e,
        },
    })?;

    let destination = unique_path(&mirror_path(backup_dir, roots, file));
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|e| BackupError::CreateDir {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    if let Err(e) = fs::copy(file, &destination) {
        let _ = fs::remove_file(&destination);
        return Err(BackupError::Copy {
            from: file.to_path_buf(),
            to: destination,
            source: e,
        });
    }

    let atime = FileTime::from_last_access_time(&metadata);
    let mtime = FileTime::from_last_modification_time(&metadata);
    filetime::set_file_times(&destination, atime, mtime).map_err(|e| BackupError::Metadata {
        path: destination.clone(),
        source: e,
    })?;

    log::debug!("Backed up {} -> {}", file.display(), destination.display());
    Ok(destination)
}
