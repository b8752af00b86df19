//! Duplicate grouping: size partition and hash partition.
//!
//! # Overview
//!
//! Grouping happens in two passes:
//!
//! 1. [`group_by_size`] partitions records by exact byte size. Files with
//!    a unique size cannot have a duplicate and are dropped without being
//!    read.
//! 2. [`group_by_hash`] sub-partitions one size bucket by content digest.
//!    Every digest shared by two or more files becomes a [`DuplicateGroup`].
//!
//! Both passes preserve enumeration order inside a bucket, which retention
//! strategies rely on for tie-breaking.
//!
//! # Example
//!
//! ```
//! use dupsweep::scanner::FileRecord;
//! use dupsweep::duplicates::group_by_size;
//! use std::path::PathBuf;
//! use std::time::SystemTime;
//!
//! let now = SystemTime::now();
//! let files = vec![
//!     FileRecord::new(PathBuf::from("/a.txt"), 10, now, now),
//!     FileRecord::new(PathBuf::from("/b.txt"), 10, now, now),
//!     FileRecord::new(PathBuf::from("/c.txt"), 20, now, now),
//! ];
//!
//! let (buckets, stats) = group_by_size(files);
//!
//! assert_eq!(buckets.len(), 1);
//! assert_eq!(buckets[&10].len(), 2);
//! assert_eq!(stats.eliminated_unique, 1);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::scanner::FileRecord;

/// Confirmed group of files with identical size and content digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Lowercase hex content digest shared by every file
    pub hash: String,
    /// File size in bytes (shared by all files)
    pub size: u64,
    /// Files in enumeration order
    pub files: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    ///
    /// # Arguments
    ///
    /// * `hash` - Hex content digest
    /// * `size` - File size in bytes
    /// * `files` - Member files, in enumeration order
    #[must_use]
    pub fn new(hash: String, size: u64, files: Vec<FileRecord>) -> Self {
        debug_assert!(files.iter().all(|f| f.size == size));
        Self { hash, size, files }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total size of all files in this group.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.size * self.files.len() as u64
    }

    /// Bytes held by the redundant copies (all copies minus one).
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Number of redundant copies (total - 1 kept).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Get just the paths of files in this group.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    /// Check whether a path is a member of this group.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.files.iter().any(|f| f.path == path)
    }
}

/// Statistics from the size grouping pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of files processed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct file sizes
    pub unique_sizes: usize,
    /// Number of files that could be duplicates (in buckets of 2+)
    pub potential_duplicates: usize,
    /// Number of files eliminated as unique (singleton buckets)
    pub eliminated_unique: usize,
    /// Number of size buckets with 2+ files
    pub duplicate_buckets: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size grouping.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Partition files by exact size, keeping only buckets of two or more.
///
/// No file I/O is performed. Buckets are keyed in ascending size order and
/// keep the input order of their members.
///
/// # Example
///
/// ```
/// use dupsweep::scanner::FileRecord;
/// use dupsweep::duplicates::group_by_size;
/// use std::path::PathBuf;
/// use std::time::SystemTime;
///
/// let now = SystemTime::now();
/// let files = vec![
///     FileRecord::new(PathBuf::from("/a"), 0, now, now),
///     FileRecord::new(PathBuf::from("/b"), 0, now, now),
/// ];
///
/// // Empty files are ordinary candidates.
/// let (buckets, _) = group_by_size(files);
/// assert_eq!(buckets[&0].len(), 2);
/// ```
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileRecord>,
) -> (BTreeMap<u64, Vec<FileRecord>>, GroupingStats) {
    let mut all: BTreeMap<u64, Vec<FileRecord>> = BTreeMap::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size;
        all.entry(file.size).or_default().push(file);
    }

    stats.unique_sizes = all.len();

    all.retain(|size, files| {
        if files.len() == 1 {
            stats.eliminated_unique += 1;
            log::trace!("Eliminated unique size {}: {}", size, files[0].path.display());
            false
        } else {
            stats.potential_duplicates += files.len();
            stats.duplicate_buckets += 1;
            log::debug!("Size bucket {} bytes: {} candidates", size, files.len());
            true
        }
    });

    log::info!(
        "Size grouping: {} files -> {} candidates ({:.1}% eliminated)",
        stats.total_files,
        stats.potential_duplicates,
        stats.elimination_rate()
    );

    (all, stats)
}

/// Split one size bucket by content digest.
///
/// Returns one group per digest shared by two or more files, ordered by the
/// first appearance of each digest. Members keep their input order.
#[must_use]
pub fn group_by_hash(
    size: u64,
    hashed: impl IntoIterator<Item = (FileRecord, String)>,
) -> Vec<DuplicateGroup> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<FileRecord>> = HashMap::new();

    for (file, hash) in hashed {
        debug_assert_eq!(file.size, size);
        let bucket = buckets.entry(hash.clone()).or_insert_with(|| {
            order.push(hash);
            Vec::new()
        });
        bucket.push(file);
    }

    order
        .into_iter()
        .filter_map(|hash| {
            let files = buckets.remove(&hash)?;
            if files.len() < 2 {
                return None;
            }
            log::debug!("Duplicate group {} ({} bytes): {} files", hash, size, files.len());
            Some(DuplicateGroup::new(hash, size, files))
        })
        .collect()
}

/// Order groups by size, largest first.
///
/// The sort is stable, so groups of equal size keep their discovery order.
pub fn sort_groups(groups: &mut [DuplicateGroup]) {
    groups.sort_by(|a, b| b.size.cmp(&a.size));
}
