//! Hardlink detection.
//!
//! Hardlinks are several directory entries for one inode. They share content
//! but deleting one of them frees nothing and the data is still reachable
//! through the others, so the walker reports only the first entry seen for
//! each inode.
//!
//! # Platform Support
//!
//! - **Unix**: (device, inode) pairs from file metadata. Only files with a
//!   link count above one are tracked, unless [`HardlinkTracker::with_all_inodes`]
//!   is set. Following symlinked directories can reach one single-link file
//!   through two paths, so the walker tracks every inode in that mode.
//! - **Other**: detection disabled; hardlinks hash identically and are
//!   grouped like any other duplicates.
//!
//! # Example
//!
//! ```no_run
//! use dupsweep::scanner::hardlink::HardlinkTracker;
//!
//! let mut tracker = HardlinkTracker::new();
//! let meta = std::fs::metadata("some/file.txt").unwrap();
//! if tracker.is_hardlink(&meta) {
//!     println!("already seen through another path");
//! }
//! ```

use std::collections::HashSet;
use std::fs::Metadata;

/// Tracks seen inodes for a single scan.
///
/// Not thread-safe. One tracker is threaded through every root of a scan
/// with [`Walker::walk_with`](super::Walker::walk_with).
#[derive(Debug, Default)]
pub struct HardlinkTracker {
    seen: HashSet<InodeKey>,
    all_inodes: bool,
}

impl HardlinkTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track inodes with a single link too.
    #[must_use]
    pub fn with_all_inodes(mut self, all_inodes: bool) -> Self {
        self.all_inodes = all_inodes;
        self
    }

    /// Return `true` if this file's inode was already reported.
    ///
    /// The first sighting of an inode is recorded and returns `false`.
    pub fn is_hardlink(&mut self, metadata: &Metadata) -> bool {
        match InodeKey::from_metadata(metadata, self.all_inodes) {
            Some(key) => !self.seen.insert(key),
            None => false,
        }
    }

    /// Number of inodes recorded so far.
    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    /// Whether hardlink detection works on this platform.
    #[must_use]
    pub const fn is_supported() -> bool {
        cfg!(unix)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct InodeKey {
    dev: u64,
    ino: u64,
}

impl InodeKey {
    #[cfg(unix)]
    fn from_metadata(metadata: &Metadata, all_inodes: bool) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;

        // A single link cannot be shared with another path.
        if !all_inodes && metadata.nlink() < 2 {
            return None;
        }
        Some(Self {
            dev: metadata.dev(),
            ino: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    fn from_metadata(_metadata: &Metadata, _all_inodes: bool) -> Option<Self> {
        None
    }
}
