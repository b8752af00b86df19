//! Duplicate removal with backup and retention strategies.
//!
//! # Overview
//!
//! [`Deleter::delete_duplicates`] processes scan groups one by one:
//!
//! 1. Order the group with the [`RetentionStrategy`]; the first file is kept.
//!    If the kept file is gone or changed since the scan, the whole group is
//!    skipped
//! 2. For each other file, verify it is unchanged since the scan
//! 3. In paranoid mode, compare its bytes with the kept file
//! 4. Copy it to the backup directory, if one is configured
//! 5. Remove it permanently or move it to the system trash
//!
//! Any failure in steps 2-5 leaves that file in place, is logged and counted,
//! and processing moves on to the next file. A failed backup always prevents
//! the deletion, and a backup whose deletion then fails is removed again. When every group is done (or cancellation stops the run)
//! the [`DeletionReport`] is written to the report directory.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::actions::delete::{DeleteConfig, Deleter};
//! use dupsweep::duplicates::{DuplicateFinder, RetentionStrategy};
//! use std::path::PathBuf;
//!
//! let roots = vec![PathBuf::from("/data")];
//! let mut scan = DuplicateFinder::with_defaults().scan(&roots).unwrap();
//!
//! let config = DeleteConfig::new(scan.roots.clone())
//!     .with_strategy(RetentionStrategy::Newest)
//!     .with_backup_dir(PathBuf::from("/backup"));
//! let outcome = Deleter::new(config).delete_duplicates(&mut scan.groups, scan.stats).unwrap();
//! println!("Report: {}", outcome.report_path.display());
//! ```

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::backup::{backup_file, BackupError};
use crate::duplicates::{DuplicateGroup, RetentionStrategy, Statistics};
use crate::progress::{Phase, ProgressCallback};
use crate::report::{DeletedFile, DeletionReport, ReportError, ReportSettings, DEFAULT_REPORT_DIR};
use crate::scanner::{files_identical, FileRecord, HashAlgorithm};
use crate::signal::CancellationToken;

/// Error type for deletion of a single file.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File was modified since scan.
    #[error("file modified since scan: {0}")]
    Modified(PathBuf),

    /// Byte comparison with the kept file found a difference.
    #[error("content differs from kept file {kept}: {path}")]
    ContentMismatch { path: PathBuf, kept: PathBuf },

    /// Backup failed, so the original was left in place.
    #[error("backup failed, file kept: {0}")]
    Backup(#[from] BackupError),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// Permanent delete operation failed.
    #[error("permanent delete failed for {path}: {source}")]
    PermanentDeleteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    fn from_io(path: &Path, e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: e,
            },
        }
    }
}

/// How originals are removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteMode {
    /// Remove the file from the filesystem
    #[default]
    Permanent,
    /// Move the file to the system trash
    Trash,
}

impl DeleteMode {
    /// Lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Permanent => "permanent",
            Self::Trash => "trash",
        }
    }
}

impl fmt::Display for DeleteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeleteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "permanent" => Ok(Self::Permanent),
            "trash" => Ok(Self::Trash),
            other => Err(format!("unknown delete mode '{other}'")),
        }
    }
}

/// Configuration for a deletion run.
#[derive(Debug, Clone)]
pub struct DeleteConfig {
    /// Roots that were scanned; backups mirror paths relative to them.
    pub roots: Vec<PathBuf>,
    /// Rule choosing the kept file.
    pub strategy: RetentionStrategy,
    /// Copy each candidate here before removing it.
    pub backup_dir: Option<PathBuf>,
    /// Directory receiving the deletion report.
    pub report_dir: PathBuf,
    /// How originals are removed.
    pub mode: DeleteMode,
    /// Compare bytes with the kept file before each deletion.
    pub paranoid: bool,
    /// Refuse to delete files whose size or mtime changed since the scan.
    pub verify_unchanged: bool,
    /// Digest the groups were built with, recorded in the report.
    pub hash_algorithm: HashAlgorithm,
}

impl DeleteConfig {
    /// Create a config for the given scan roots with default settings.
    #[must_use]
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            strategy: RetentionStrategy::default(),
            backup_dir: None,
            report_dir: PathBuf::from(DEFAULT_REPORT_DIR),
            mode: DeleteMode::default(),
            paranoid: false,
            verify_unchanged: true,
            hash_algorithm: HashAlgorithm::default(),
        }
    }

    /// Set the retention strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: RetentionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enable backups into the given directory.
    #[must_use]
    pub fn with_backup_dir(mut self, dir: PathBuf) -> Self {
        self.backup_dir = Some(dir);
        self
    }

    /// Set the report directory.
    #[must_use]
    pub fn with_report_dir(mut self, dir: PathBuf) -> Self {
        self.report_dir = dir;
        self
    }

    /// Set the delete mode.
    #[must_use]
    pub fn with_mode(mut self, mode: DeleteMode) -> Self {
        self.mode = mode;
        self
    }

    /// Enable/disable paranoid byte comparison.
    #[must_use]
    pub fn with_paranoid(mut self, paranoid: bool) -> Self {
        self.paranoid = paranoid;
        self
    }

    /// Enable/disable the unchanged-since-scan check.
    #[must_use]
    pub fn with_verify_unchanged(mut self, verify: bool) -> Self {
        self.verify_unchanged = verify;
        self
    }

    /// Record the hash algorithm used for the groups.
    #[must_use]
    pub fn with_hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = algorithm;
        self
    }

    fn report_settings(&self) -> ReportSettings {
        ReportSettings {
            root_paths: self.roots.clone(),
            hash_algorithm: self.hash_algorithm,
            backup_dir: self.backup_dir.clone(),
            strategy: self.strategy,
            delete_mode: self.mode,
            paranoid: self.paranoid,
        }
    }
}

/// File metadata snapshot for change detection.
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    /// Path to the file.
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
    /// Last modification time.
    pub mtime: Option<SystemTime>,
}

impl FileSnapshot {
    /// Snapshot taken from a scan record.
    #[must_use]
    pub fn from_record(record: &FileRecord) -> Self {
        Self {
            path: record.path.clone(),
            size: record.size,
            mtime: Some(record.modified),
        }
    }

    /// Create a snapshot of a file's current state.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or can't be accessed.
    pub fn capture(path: &Path) -> Result<Self, DeleteError> {
        let metadata = fs::metadata(path).map_err(|e| DeleteError::from_io(path, e))?;

        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
            mtime: metadata.modified().ok(),
        })
    }

    /// Verify that the file still matches this snapshot.
    ///
    /// # Errors
    ///
    /// Returns error if file was modified, deleted, or can't be accessed.
    pub fn verify(&self) -> Result<(), DeleteError> {
        let current = Self::capture(&self.path)?;

        if let (Some(orig), Some(curr)) = (self.mtime, current.mtime) {
            if orig != curr {
                log::warn!(
                    "File modified since scan: {} (mtime changed)",
                    self.path.display()
                );
                return Err(DeleteError::Modified(self.path.clone()));
            }
        }

        if self.size != current.size {
            log::warn!(
                "File modified since scan: {} (size changed from {} to {})",
                self.path.display(),
                self.size,
                current.size
            );
            return Err(DeleteError::Modified(self.path.clone()));
        }

        Ok(())
    }
}

/// Move a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<(), DeleteError> {
    if fs::symlink_metadata(path).is_err() {
        return Err(DeleteError::NotFound(path.to_path_buf()));
    }

    trash::delete(path).map_err(|e| DeleteError::TrashFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    log::info!("Moved to trash: {}", path.display());
    Ok(())
}

/// Permanently delete a single file.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if deletion is not allowed
/// - `PermanentDeleteFailed` for any other failure
pub fn permanent_delete(path: &Path) -> Result<(), DeleteError> {
    fs::remove_file(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DeleteError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => DeleteError::PermissionDenied(path.to_path_buf()),
        _ => DeleteError::PermanentDeleteFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    log::info!("Permanently deleted: {}", path.display());
    Ok(())
}

/// Result of a deletion run.
#[derive(Debug, Clone)]
pub struct DeletionOutcome {
    /// The report as written
    pub report: DeletionReport,
    /// Where the report was written
    pub report_path: PathBuf,
}

/// Runs deletions for a set of duplicate groups.
pub struct Deleter {
    config: DeleteConfig,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
    cancel: Option<CancellationToken>,
}

impl Deleter {
    /// Create a deleter with the given configuration.
    #[must_use]
    pub fn new(config: DeleteConfig) -> Self {
        Self {
            config,
            progress_callback: None,
            cancel: None,
        }
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Stop between files once the token is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// Delete all but one file of every group and persist the report.
    ///
    /// Deleted files are removed from their group's `files`, so after the
    /// call each group holds what is still on disk. `stats` carries the
    /// scan counters into the report; deletion counters are added to it.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] only if the report cannot be written.
    /// Per-file failures are counted in the report statistics instead.
    pub fn delete_duplicates(
        &self,
        groups: &mut [DuplicateGroup],
        stats: Statistics,
    ) -> Result<DeletionOutcome, ReportError> {
        let start_time = Instant::now();
        let mut report = DeletionReport::new(self.config.report_settings(), stats);
        let total: usize = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        let mut processed = 0usize;

        log::info!(
            "Deleting {} duplicate(s) from {} group(s), strategy {}, mode {}",
            total,
            groups.len(),
            self.config.strategy,
            self.config.mode
        );
        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start(Phase::Deleting, total);
        }

        'groups: for group in groups.iter_mut() {
            let Some((keep, candidates)) = self.config.strategy.select(&group.files) else {
                continue;
            };
            let keep = keep.clone();
            let candidates: Vec<FileRecord> = candidates.into_iter().cloned().collect();
            log::debug!("Keeping {} ({})", keep.path.display(), group.hash);

            if let Err(e) = self.check_keeper(&keep) {
                log::warn!(
                    "Skipping group {}: kept file unusable: {}",
                    group.hash,
                    e
                );
                report.stats.errors += 1;
                processed += candidates.len();
                if let Some(ref callback) = self.progress_callback {
                    callback.on_progress(processed, total, &keep.path.display().to_string());
                }
                continue;
            }

            let mut removed: Vec<PathBuf> = Vec::new();
            for candidate in &candidates {
                if self.is_cancelled() {
                    log::info!("Deletion cancelled after {} file(s)", processed);
                    report.interrupted = true;
                    group.files.retain(|f| !removed.contains(&f.path));
                    break 'groups;
                }

                match self.process_candidate(&keep, candidate, &mut report.stats) {
                    Ok(backup_path) => {
                        removed.push(candidate.path.clone());
                        report.stats.deleted_files += 1;
                        report.record(DeletedFile {
                            original_path: candidate.path.clone(),
                            backup_path,
                            size: candidate.size,
                            hash: group.hash.clone(),
                        });
                    }
                    Err(e) => {
                        log::warn!("Skipping {}: {}", candidate.path.display(), e);
                        report.stats.errors += 1;
                    }
                }

                processed += 1;
                if let Some(ref callback) = self.progress_callback {
                    callback.on_progress(
                        processed,
                        total,
                        &candidate.path.display().to_string(),
                    );
                }
            }

            group.files.retain(|f| !removed.contains(&f.path));
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end(Phase::Deleting);
        }

        report.stats.delete_duration = start_time.elapsed();
        log::info!(
            "Deleted {} file(s), {} backed up, {} error(s)",
            report.stats.deleted_files,
            report.stats.backed_up_files,
            report.stats.errors
        );

        let report_path = report.save(&self.config.report_dir)?;
        Ok(DeletionOutcome {
            report,
            report_path,
        })
    }

    /// The kept file must still exist, and match the scan unless change
    /// detection is off, before any of its copies go.
    fn check_keeper(&self, keep: &FileRecord) -> Result<(), DeleteError> {
        if self.config.verify_unchanged {
            FileSnapshot::from_record(keep).verify()
        } else {
            FileSnapshot::capture(&keep.path).map(|_| ())
        }
    }

    /// Verify, back up and remove one candidate.
    ///
    /// Returns the backup path (if a backup was made) on success.
    fn process_candidate(
        &self,
        keep: &FileRecord,
        candidate: &FileRecord,
        stats: &mut Statistics,
    ) -> Result<Option<PathBuf>, DeleteError> {
        if self.config.verify_unchanged {
            FileSnapshot::from_record(candidate).verify()?;
        }

        if self.config.paranoid {
            let identical = files_identical(&keep.path, &candidate.path)
                .map_err(|e| DeleteError::from_io(&candidate.path, e))?;
            if !identical {
                return Err(DeleteError::ContentMismatch {
                    path: candidate.path.clone(),
                    kept: keep.path.clone(),
                });
            }
        }

        let backup_path = match self.config.backup_dir {
            Some(ref dir) => Some(backup_file(&candidate.path, dir, &self.config.roots)?),
            None => None,
        };

        let removed = match self.config.mode {
            DeleteMode::Permanent => permanent_delete(&candidate.path),
            DeleteMode::Trash => delete_to_trash(&candidate.path),
        };
        discard_backup_on_failure(removed, backup_path.as_deref())?;

        if backup_path.is_some() {
            stats.backed_up_files += 1;
        }
        Ok(backup_path)
    }
}

/// Remove the backup copy when the original could not be deleted, so every
/// backup on disk has a matching report entry.
fn discard_backup_on_failure(
    removed: Result<(), DeleteError>,
    backup: Option<&Path>,
) -> Result<(), DeleteError> {
    let Err(e) = removed else {
        return Ok(());
    };
    if let Some(path) = backup {
        match fs::remove_file(path) {
            Ok(()) => log::debug!("Removed backup of undeleted file: {}", path.display()),
            Err(err) => log::warn!(
                "Could not remove backup {} after failed delete: {}",
                path.display(),
                err
            ),
        }
    }
    Err(e)
}
