//! JSON output formatter for duplicate scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "hash": "900150983cd24fb0d6963f7d28e17f72",
//!       "size": 1024,
//!       "files": ["/path/to/file1.txt", "/path/to/file2.txt"]
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 100,
//!     "duplicate_groups": 5,
//!     "duplicate_files": 10,
//!     "reclaimable_space": 51200,
//!     "errors": 0,
//!     "hardlinks_skipped": 0,
//!     "scan_duration_ms": 1234,
//!     "hash_algorithm": "md5",
//!     "exit_code": 0,
//!     "exit_code_name": "DS000"
//!   }
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{DuplicateGroup, Statistics};
use crate::error::ExitCode;
use crate::scanner::HashAlgorithm;

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateGroup {
    /// Hex content digest
    pub hash: String,
    /// File size in bytes
    pub size: u64,
    /// Paths to all duplicate files, in enumeration order
    pub files: Vec<String>,
}

impl JsonDuplicateGroup {
    /// Create a JSON duplicate group from a DuplicateGroup.
    #[must_use]
    pub fn from_duplicate_group(group: &DuplicateGroup) -> Self {
        Self {
            hash: group.hash.clone(),
            size: group.size,
            files: group
                .files
                .iter()
                .map(|f| f.path.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Total number of files scanned
    pub total_files: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding kept copies)
    pub duplicate_files: usize,
    /// Bytes that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Files that could not be read
    pub errors: usize,
    /// Hardlinks skipped during the walk
    pub hardlinks_skipped: usize,
    /// Duration of the scan in milliseconds
    pub scan_duration_ms: u64,
    /// Digest used to confirm duplicates
    pub hash_algorithm: HashAlgorithm,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DS000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from scan statistics.
    #[must_use]
    pub fn new(
        groups: &[DuplicateGroup],
        stats: &Statistics,
        algorithm: HashAlgorithm,
        exit_code: ExitCode,
    ) -> Self {
        Self {
            total_files: stats.total_files,
            duplicate_groups: groups.len(),
            duplicate_files: stats.duplicate_files,
            reclaimable_space: stats.duplicate_size,
            errors: stats.errors,
            hardlinks_skipped: stats.hardlinks_skipped,
            scan_duration_ms: stats.scan_duration.as_millis() as u64,
            hash_algorithm: algorithm,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// List of duplicate groups
    pub duplicates: Vec<JsonDuplicateGroup>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Create a new JSON output from duplicate groups, statistics and exit code.
    ///
    /// # Example
    ///
    /// ```
    /// use dupsweep::duplicates::Statistics;
    /// use dupsweep::error::ExitCode;
    /// use dupsweep::output::json::JsonOutput;
    /// use dupsweep::scanner::HashAlgorithm;
    ///
    /// let output = JsonOutput::new(&[], &Statistics::default(), HashAlgorithm::Md5, ExitCode::NoDuplicates);
    /// assert!(output.duplicates.is_empty());
    /// assert_eq!(output.summary.exit_code, 2);
    /// ```
    #[must_use]
    pub fn new(
        groups: &[DuplicateGroup],
        stats: &Statistics,
        algorithm: HashAlgorithm,
        exit_code: ExitCode,
    ) -> Self {
        Self {
            duplicates: groups
                .iter()
                .map(JsonDuplicateGroup::from_duplicate_group)
                .collect(),
            summary: JsonSummary::new(groups, stats, algorithm, exit_code),
        }
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write pretty JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), JsonOutputError> {
        serde_json::to_writer_pretty(&mut *writer, self)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
