//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Sequential directory walking using walkdir
//! - Content hashing with md5, sha1 or sha256
//! - Hardlink detection
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`hasher`]: Streaming file digests and byte comparison
//! - [`hardlink`]: Inode tracking so hardlinks are not reported as duplicates
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! // Configure the walker
//! let config = WalkerConfig {
//!     min_size: 1024,  // Skip files under 1KB
//!     ..Default::default()
//! };
//!
//! // Walk the directory
//! let walker = Walker::new(Path::new("."), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hardlink;
pub mod hasher;
pub mod walker;

use std::collections::BTreeSet;
use std::fs::Metadata;
use std::path::PathBuf;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

// Re-export main types
pub use hasher::{files_identical, HashAlgorithm, Hasher, CHUNK_SIZE};
pub use walker::Walker;

/// Default upper size bound (1 GiB).
pub const DEFAULT_MAX_SIZE: u64 = 1024 * 1024 * 1024;

/// Directory names skipped anywhere in the tree unless overridden.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[".git", ".svn", ".idea", "__pycache__", "node_modules"];

/// Metadata for a discovered file.
///
/// Captured once per scan and never refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Creation time (falls back to modification time where unsupported)
    pub created: SystemTime,
    /// Last modification time
    pub modified: SystemTime,
}

impl FileRecord {
    /// Create a new FileRecord.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the file
    /// * `size` - File size in bytes
    /// * `created` - Creation time
    /// * `modified` - Last modification time
    #[must_use]
    pub fn new(path: PathBuf, size: u64, created: SystemTime, modified: SystemTime) -> Self {
        Self {
            path,
            size,
            created,
            modified,
        }
    }

    /// Build a record from filesystem metadata.
    ///
    /// Filesystems that do not track birth time report the modification
    /// time as the creation time.
    #[must_use]
    pub fn from_metadata(path: PathBuf, metadata: &Metadata) -> Self {
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let created = metadata.created().unwrap_or(modified);
        Self::new(path, metadata.len(), created, modified)
    }

    /// Length of the path as a string, in characters.
    #[must_use]
    pub fn path_len(&self) -> usize {
        self.path.to_string_lossy().chars().count()
    }
}

/// Configuration for directory walking.
///
/// Controls filtering and symlink handling.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Follow symbolic links during traversal.
    /// Cycles are detected by walkdir and reported as errors.
    pub follow_symlinks: bool,

    /// Minimum file size to include (in bytes, inclusive).
    pub min_size: u64,

    /// Maximum file size to include (in bytes, inclusive).
    pub max_size: u64,

    /// Lowercase extensions (without the leading dot) to restrict to.
    /// `None` admits every file.
    pub extensions: Option<BTreeSet<String>>,

    /// Directory names skipped wherever they appear below a root.
    pub exclude_dirs: BTreeSet<String>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            min_size: 0,
            max_size: DEFAULT_MAX_SIZE,
            extensions: None,
            exclude_dirs: DEFAULT_EXCLUDE_DIRS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

impl WalkerConfig {
    /// Restrict the walk to the given extensions.
    ///
    /// Extensions are matched case-insensitively; a leading dot is optional.
    /// An empty list removes the restriction.
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let set: BTreeSet<String> = extensions
            .into_iter()
            .map(|e| normalize_extension(e.as_ref()))
            .filter(|e| !e.is_empty())
            .collect();
        self.extensions = if set.is_empty() { None } else { Some(set) };
        self
    }

    /// Replace the excluded directory names.
    #[must_use]
    pub fn with_exclude_dirs<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_dirs = names.into_iter().map(Into::into).collect();
        self
    }

    /// Set inclusive size bounds.
    #[must_use]
    pub fn with_size_bounds(mut self, min_size: u64, max_size: u64) -> Self {
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }

    /// Enable/disable following symbolic links.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }
}

/// Lowercase an extension and strip a leading dot.
#[must_use]
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A symbolic link cycle was detected while following links.
    #[error("Symlink loop detected at {0}")]
    SymlinkLoop(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error for the given path.
    #[must_use]
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Hashing stopped because cancellation was requested.
    #[error("Hashing cancelled: {0}")]
    Cancelled(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error for the given path.
    #[must_use]
    pub fn from_io(path: PathBuf, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path),
            _ => Self::Io { path, source },
        }
    }
}
