//! Duplicate finder pipeline.
//!
//! # Overview
//!
//! [`DuplicateFinder::scan`] runs the complete detection pipeline over one
//! or more roots:
//!
//! 1. **Resolve** - Make roots absolute, skip missing ones, drop roots
//!    nested inside another root
//! 2. **Walk** - Collect [`FileRecord`]s that pass the walker filters
//! 3. **Size** - Partition by exact size, discard singleton buckets
//! 4. **Hash** - Stream a full-content digest of every remaining file and
//!    sub-partition by digest
//! 5. **Sort** - Order groups by size, largest first
//!
//! Files that cannot be read are logged, counted in
//! [`Statistics::errors`] and left out. Only configuration problems and
//! cancellation abort the scan.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::duplicates::{DuplicateFinder, FinderConfig};
//! use dupsweep::scanner::HashAlgorithm;
//! use std::path::PathBuf;
//!
//! let config = FinderConfig::default().with_hash_algorithm(HashAlgorithm::Sha256);
//! let finder = DuplicateFinder::new(config);
//!
//! let result = finder.scan(&[PathBuf::from("/some/path")]).unwrap();
//! println!("Found {} duplicate groups", result.groups.len());
//! println!("Reclaimable bytes: {}", result.stats.duplicate_size);
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use super::groups::{group_by_hash, group_by_size, sort_groups, DuplicateGroup};
use super::stats::Statistics;
use crate::error::ConfigError;
use crate::progress::{Phase, ProgressCallback};
use crate::scanner::{FileRecord, HashAlgorithm, HashError, Hasher, ScanError, Walker, WalkerConfig};
use crate::signal::CancellationToken;

/// Walk progress is reported once per this many files.
const WALK_PROGRESS_INTERVAL: usize = 100;

/// Configuration for the duplicate finder.
#[derive(Clone, Default)]
pub struct FinderConfig {
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Digest used to confirm duplicates.
    pub hash_algorithm: HashAlgorithm,
    /// Optional token polled between files.
    pub cancel: Option<CancellationToken>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("walker_config", &self.walker_config)
            .field("hash_algorithm", &self.hash_algorithm)
            .field("cancel", &self.cancel)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl FinderConfig {
    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the hash algorithm.
    #[must_use]
    pub fn with_hash_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.hash_algorithm = algorithm;
        self
    }

    /// Set the cancellation token.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Reject inconsistent settings before any I/O.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSizeBounds`] if `min_size > max_size`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let WalkerConfig {
            min_size, max_size, ..
        } = self.walker_config;
        if min_size > max_size {
            return Err(ConfigError::InvalidSizeBounds {
                min: min_size,
                max: max_size,
            });
        }
        Ok(())
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }
}

/// Errors that abort a scan.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or cancellation token).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Output of a completed scan.
#[derive(Debug, Clone)]
pub struct ScanResult {
    /// Confirmed duplicate groups, largest size first
    pub groups: Vec<DuplicateGroup>,
    /// Counters accumulated during the scan
    pub stats: Statistics,
    /// The roots actually scanned, absolute and de-overlapped
    pub roots: Vec<PathBuf>,
}

/// Duplicate finder that orchestrates the detection pipeline.
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new(config.hash_algorithm);
        if let Some(ref token) = config.cancel {
            hasher = hasher.with_cancellation(token.clone());
        }
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Find all duplicate files under the given roots.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Config`] if the configuration is invalid or
    /// none of the roots exist, and [`FinderError::Interrupted`] if the
    /// cancellation token fires during the scan.
    pub fn scan(&self, roots: &[PathBuf]) -> Result<ScanResult, FinderError> {
        let start_time = Instant::now();
        self.config.validate()?;
        let roots = resolve_roots(roots)?;
        let mut stats = Statistics::default();

        log::info!(
            "Starting duplicate scan of {} root(s) using {}",
            roots.len(),
            self.hasher.algorithm()
        );

        let files = self.collect_files(&roots, &mut stats)?;
        stats.total_files = files.len();

        let (buckets, grouping) = group_by_size(files);
        let mut groups = self.hash_buckets(buckets, grouping.potential_duplicates, &mut stats)?;
        sort_groups(&mut groups);

        stats.record_groups(&groups);
        stats.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} files, {} groups, {} redundant copies ({} bytes) in {:.2?}",
            stats.total_files,
            groups.len(),
            stats.duplicate_files,
            stats.duplicate_size,
            stats.scan_duration
        );

        Ok(ScanResult {
            groups,
            stats,
            roots,
        })
    }

    fn report(&self, current: usize, total: usize, message: &str) {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_progress(current, total, message);
        }
    }

    fn collect_files(
        &self,
        roots: &[PathBuf],
        stats: &mut Statistics,
    ) -> Result<Vec<FileRecord>, FinderError> {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(Phase::Walking, 0);
        }

        let mut files = Vec::new();
        // One tracker for the whole scan: a hard link may span two roots.
        let mut tracker = None;
        for root in roots {
            let mut walker = Walker::new(root, self.config.walker_config.clone());
            if let Some(ref token) = self.config.cancel {
                walker = walker.with_cancellation(token.clone());
            }

            let hardlinks = tracker.take().unwrap_or_else(|| walker.new_tracker());
            let mut walk = walker.walk_with(hardlinks);
            for result in walk.by_ref() {
                match result {
                    Ok(file) => {
                        files.push(file);
                        if files.len() % WALK_PROGRESS_INTERVAL == 0 {
                            self.report(files.len(), 0, &format!("Scanning: {} files", files.len()));
                        }
                    }
                    // Already logged by the walker.
                    Err(_) => stats.errors += 1,
                }
            }
            stats.hardlinks_skipped += walk.hardlinks_skipped();
            tracker = Some(walk.into_tracker());

            if self.config.is_cancelled() {
                log::info!("Scan cancelled during walk of {}", root.display());
                return Err(FinderError::Interrupted);
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(Phase::Walking);
        }
        log::info!("Walk complete: {} files collected", files.len());

        Ok(files)
    }

    fn hash_buckets(
        &self,
        buckets: impl IntoIterator<Item = (u64, Vec<FileRecord>)>,
        total: usize,
        stats: &mut Statistics,
    ) -> Result<Vec<DuplicateGroup>, FinderError> {
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(Phase::Hashing, total);
        }

        let mut groups = Vec::new();
        let mut processed = 0usize;

        for (size, files) in buckets {
            let mut hashed = Vec::with_capacity(files.len());
            for file in files {
                if self.config.is_cancelled() {
                    log::info!("Scan cancelled during hashing");
                    return Err(FinderError::Interrupted);
                }

                match self.hasher.hash_file(&file.path) {
                    Ok(digest) => hashed.push((file, digest)),
                    Err(HashError::Cancelled(_)) => return Err(FinderError::Interrupted),
                    Err(e) => {
                        log::warn!("Skipping unreadable file: {}", e);
                        stats.errors += 1;
                    }
                }

                processed += 1;
                self.report(
                    processed,
                    total,
                    &format!("Hashing: {processed}/{total}"),
                );
            }
            groups.extend(group_by_hash(size, hashed));
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(Phase::Hashing);
        }

        Ok(groups)
    }
}

/// Make roots absolute, skip missing ones and remove overlap.
///
/// A root equal to an earlier root, or located inside another given root,
/// is dropped so no file is enumerated twice. Order is otherwise preserved.
///
/// # Errors
///
/// Returns [`ConfigError::NoRoots`] if no given root is an existing
/// directory.
pub fn resolve_roots(roots: &[PathBuf]) -> Result<Vec<PathBuf>, ConfigError> {
    let mut existing: Vec<(PathBuf, PathBuf)> = Vec::new();

    for root in roots {
        if !root.exists() {
            log::warn!("Skipping missing root: {}", root.display());
            continue;
        }
        if !root.is_dir() {
            log::warn!("{}", ScanError::NotADirectory(root.clone()));
            continue;
        }
        let absolute = std::path::absolute(root).unwrap_or_else(|_| root.clone());
        let canonical = absolute.canonicalize().unwrap_or_else(|_| absolute.clone());
        existing.push((absolute, canonical));
    }

    let mut resolved = Vec::new();
    for (i, (absolute, canonical)) in existing.iter().enumerate() {
        let covered = existing.iter().enumerate().any(|(j, (_, other))| {
            if i == j {
                return false;
            }
            if canonical == other {
                j < i
            } else {
                canonical.starts_with(other)
            }
        });

        if covered {
            log::info!("Skipping root already covered by another root: {}", absolute.display());
        } else {
            resolved.push(absolute.clone());
        }
    }

    if resolved.is_empty() {
        return Err(ConfigError::NoRoots);
    }
    Ok(resolved)
}

/// Find the given root that contains `path`, if any.
#[must_use]
pub fn containing_root<'a>(roots: &'a [PathBuf], path: &Path) -> Option<&'a PathBuf> {
    roots.iter().find(|root| path.starts_with(root))
}
