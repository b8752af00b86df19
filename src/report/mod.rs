//! Deletion reports.
//!
//! # Overview
//!
//! Every deletion run produces one [`DeletionReport`], written once as a
//! pretty-printed camelCase JSON file named
//! `deletion_report_YYYYmmdd_HHMMSS.json` inside the report directory.
//! Existing reports are never overwritten: if the name is taken, `_1`,
//! `_2`, ... is appended. The report lists every removed file with its
//! backup location, which is what a manual restore works from.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::report::DeletionReport;
//! use std::path::Path;
//!
//! let report = DeletionReport::load(Path::new("duplicate_cleanup_logs/deletion_report_20240101_120000.json"))?;
//! for file in &report.deleted_files {
//!     println!("{} -> {:?}", file.original_path.display(), file.backup_path);
//! }
//! # Ok::<(), dupsweep::report::ReportError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::actions::backup::unique_path;
use crate::actions::delete::DeleteMode;
use crate::duplicates::{RetentionStrategy, Statistics};
use crate::scanner::HashAlgorithm;

/// Default directory for deletion reports, relative to the working directory.
pub const DEFAULT_REPORT_DIR: &str = "duplicate_cleanup_logs";

/// Error type for report persistence.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The report directory could not be created.
    #[error("cannot create report directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Writing the report file failed.
    #[error("cannot write report {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading the report file failed.
    #[error("cannot read report {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The report could not be encoded or decoded.
    #[error("invalid report JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Settings a deletion run was performed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSettings {
    /// Roots that were scanned
    pub root_paths: Vec<PathBuf>,
    /// Digest used to confirm duplicates
    pub hash_algorithm: HashAlgorithm,
    /// Backup directory, or null when backups were disabled
    pub backup_dir: Option<PathBuf>,
    /// Rule that chose the kept file
    #[serde(default)]
    pub strategy: RetentionStrategy,
    /// How originals were removed
    #[serde(default)]
    pub delete_mode: DeleteMode,
    /// Whether byte comparison preceded each deletion
    #[serde(default)]
    pub paranoid: bool,
}

/// One removed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedFile {
    /// Where the file was before deletion
    pub original_path: PathBuf,
    /// Where its backup copy lives, if one was made
    pub backup_path: Option<PathBuf>,
    /// Size in bytes
    pub size: u64,
    /// Content digest of the group it belonged to
    pub hash: String,
}

/// Persisted record of one deletion run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionReport {
    /// When the run started (ISO-8601)
    pub timestamp: DateTime<Local>,
    /// Final statistics
    pub stats: Statistics,
    /// Configuration used
    pub settings: ReportSettings,
    /// Every removed file, in processing order
    pub deleted_files: Vec<DeletedFile>,
    /// Whether the run stopped early on cancellation
    #[serde(default)]
    pub interrupted: bool,
}

impl DeletionReport {
    /// Start an empty report for a run beginning now.
    #[must_use]
    pub fn new(settings: ReportSettings, stats: Statistics) -> Self {
        Self {
            timestamp: Local::now(),
            stats,
            settings,
            deleted_files: Vec::new(),
            interrupted: false,
        }
    }

    /// Record a removed file.
    pub fn record(&mut self, file: DeletedFile) {
        self.deleted_files.push(file);
    }

    /// Bytes freed by the recorded deletions.
    #[must_use]
    pub fn bytes_freed(&self) -> u64 {
        self.deleted_files.iter().map(|f| f.size).sum()
    }

    /// File name derived from the run timestamp.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("deletion_report_{}.json", self.timestamp.format("%Y%m%d_%H%M%S"))
    }

    /// Write the report into `dir`, creating it if needed.
    ///
    /// # Returns
    ///
    /// The path of the written file.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] if the directory cannot be created or the
    /// file cannot be written.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, ReportError> {
        fs::create_dir_all(dir).map_err(|e| ReportError::CreateDir {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let (path, file) = create_unique(&dir.join(self.file_name()))?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| ReportError::Json {
            path: path.clone(),
            source: e,
        })?;
        writer
            .write_all(b"\n")
            .and_then(|()| writer.flush())
            .map_err(|e| ReportError::Write {
                path: path.clone(),
                source: e,
            })?;

        log::info!("Deletion report written to {}", path.display());
        Ok(path)
    }

    /// Load a previously saved report.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] if the file cannot be read or is not a
    /// valid report.
    pub fn load(path: &Path) -> Result<Self, ReportError> {
        let file = File::open(path).map_err(|e| ReportError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_reader(BufReader::new(file)).map_err(|e| ReportError::Json {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Create `path` exclusively, falling back to suffixed names on collision.
fn create_unique(path: &Path) -> Result<(PathBuf, File), ReportError> {
    let mut candidate = path.to_path_buf();
    loop {
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(file) => return Ok((candidate, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                candidate = unique_path(path);
            }
            Err(e) => {
                return Err(ReportError::Write {
                    path: candidate,
                    source: e,
                })
            }
        }
    }
}
