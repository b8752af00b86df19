//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory
//! tree and collecting [`FileRecord`]s for duplicate detection. Traversal is
//! sequential and sorted by file name, so enumeration order is stable across
//! runs over an unchanged tree.
//!
//! # Features
//!
//! - Excluded directory names pruned anywhere below the root
//! - Extension allow-list (case-insensitive)
//! - Inclusive size bounds
//! - Symlinks to files always skipped; symlinked directories descended only
//!   when following is enabled (loops reported as errors)
//! - Hardlink detection via [`HardlinkTracker`], shareable across roots
//! - Cooperative cancellation between entries
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! let mut walk = walker.walk();
//! for entry in walk.by_ref() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! println!("{} hardlinks skipped", walk.hardlinks_skipped());
//! ```

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::hardlink::HardlinkTracker;
use super::{FileRecord, ScanError, WalkerConfig};
use crate::signal::CancellationToken;

/// Directory walker for file discovery under one root.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional token polled between entries
    cancel: Option<CancellationToken>,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Root directory to scan
    /// * `config` - Walker configuration options
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            cancel: None,
        }
    }

    /// Stop iteration once the token is cancelled.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// Check whether an entry is an excluded directory (never the root).
    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && self
                .config
                .exclude_dirs
                .contains(entry.file_name().to_string_lossy().as_ref())
    }

    /// Check if a file passes the extension filter.
    fn passes_extension_filter(&self, path: &Path) -> bool {
        let Some(allowed) = &self.config.extensions else {
            return true;
        };
        path.extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .is_some_and(|e| allowed.contains(&e))
    }

    /// Check if a file passes size filters.
    fn passes_size_filter(&self, size: u64) -> bool {
        size >= self.config.min_size && size <= self.config.max_size
    }

    /// A tracker suited to this walker's configuration.
    #[must_use]
    pub fn new_tracker(&self) -> HardlinkTracker {
        HardlinkTracker::new().with_all_inodes(self.config.follow_symlinks)
    }

    /// Walk the directory tree, yielding file records.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration; an unreadable subdirectory is skipped as a whole.
    pub fn walk(&self) -> Walk<'_> {
        self.walk_with(self.new_tracker())
    }

    /// Walk using an existing tracker, so inodes seen under earlier roots
    /// are skipped here too. Recover it with [`Walk::into_tracker`].
    pub fn walk_with(&self, hardlinks: HardlinkTracker) -> Walk<'_> {
        let inner = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| {
                if self.is_excluded_dir(e) {
                    log::trace!("Skipping excluded directory: {}", e.path().display());
                    false
                } else {
                    true
                }
            });

        Walk {
            walker: self,
            inner: Box::new(inner),
            hardlinks,
            hardlinks_skipped: 0,
        }
    }

    /// Turn a walkdir entry into a record, or `None` if it is filtered out.
    fn process_entry(
        &self,
        entry: &DirEntry,
        hardlinks: &mut HardlinkTracker,
        hardlinks_skipped: &mut usize,
    ) -> Option<Result<FileRecord, ScanError>> {
        let file_type = entry.file_type();
        if file_type.is_dir() {
            return None;
        }

        // With follow_links enabled walkdir reports the target's type, so a
        // link to a file looks like a regular file here.
        if file_type.is_symlink() || entry.path_is_symlink() {
            log::trace!("Skipping symlink: {}", entry.path().display());
            return None;
        }

        if !file_type.is_file() {
            log::trace!("Skipping special file: {}", entry.path().display());
            return None;
        }

        let path = entry.path();
        if !self.passes_extension_filter(path) {
            return None;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => return Some(Err(self.convert_error(e))),
        };

        let size = metadata.len();
        if !self.passes_size_filter(size) {
            log::trace!(
                "Skipping file due to size filter ({}): {}",
                size,
                path.display()
            );
            return None;
        }

        if hardlinks.is_hardlink(&metadata) {
            log::debug!("Skipping hardlink: {}", path.display());
            *hardlinks_skipped += 1;
            return None;
        }

        Some(Ok(FileRecord::from_metadata(path.to_path_buf(), &metadata)))
    }

    /// Convert a walkdir error to a ScanError.
    fn convert_error(&self, err: walkdir::Error) -> ScanError {
        let path = err
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        if err.loop_ancestor().is_some() {
            log::warn!("Symlink loop detected: {}", path.display());
            return ScanError::SymlinkLoop(path);
        }

        let error = match err.into_io_error() {
            Some(io_err) => ScanError::from_io(path, io_err),
            None => ScanError::Io {
                path,
                source: std::io::Error::other("directory walk failed"),
            },
        };
        log::warn!("{}", error);
        error
    }
}

/// Iterator returned by [`Walker::walk`].
pub struct Walk<'a> {
    walker: &'a Walker,
    inner: Box<dyn Iterator<Item = walkdir::Result<DirEntry>> + 'a>,
    hardlinks: HardlinkTracker,
    hardlinks_skipped: usize,
}

impl Walk<'_> {
    /// Number of entries skipped because they were hardlinks to an
    /// already-reported file.
    #[must_use]
    pub fn hardlinks_skipped(&self) -> usize {
        self.hardlinks_skipped
    }

    /// Give back the tracker for the next root.
    #[must_use]
    pub fn into_tracker(self) -> HardlinkTracker {
        self.hardlinks
    }
}

impl Iterator for Walk<'_> {
    type Item = Result<FileRecord, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.walker.is_cancelled() {
                log::debug!("Walker: cancellation requested, stopping iteration");
                return None;
            }

            let item = match self.inner.next()? {
                Ok(entry) => self.walker.process_entry(
                    &entry,
                    &mut self.hardlinks,
                    &mut self.hardlinks_skipped,
                ),
                Err(e) => Some(Err(self.walker.convert_error(e))),
            };

            if item.is_some() {
                return item;
            }
        }
    }
}
