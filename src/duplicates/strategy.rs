//! Retention strategies: which file of a group survives.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::scanner::FileRecord;

/// Rule selecting the single file kept from each duplicate group.
///
/// Files are ordered with a stable sort, so ties keep enumeration order
/// and the first file in that order is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionStrategy {
    /// Keep the file with the earliest creation time
    #[default]
    Oldest,
    /// Keep the file with the latest modification time
    Newest,
    /// Keep the file with the shortest path
    ShortestPath,
    /// Keep the file with the longest path
    LongestPath,
}

impl RetentionStrategy {
    /// All strategies, in the order they are listed to users.
    pub const ALL: [RetentionStrategy; 4] = [
        Self::Oldest,
        Self::Newest,
        Self::ShortestPath,
        Self::LongestPath,
    ];

    /// Canonical snake_case name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Oldest => "oldest",
            Self::Newest => "newest",
            Self::ShortestPath => "shortest_path",
            Self::LongestPath => "longest_path",
        }
    }

    /// Comparator placing the preferred file first.
    #[must_use]
    pub fn compare(self, a: &FileRecord, b: &FileRecord) -> Ordering {
        match self {
            Self::Oldest => a.created.cmp(&b.created),
            Self::Newest => b.modified.cmp(&a.modified),
            Self::ShortestPath => a.path_len().cmp(&b.path_len()),
            Self::LongestPath => b.path_len().cmp(&a.path_len()),
        }
    }

    /// Sort files in place, preferred first.
    pub fn sort(self, files: &mut [FileRecord]) {
        files.sort_by(|a, b| self.compare(a, b));
    }

    /// Split a group into the kept file and the deletion candidates.
    ///
    /// Returns `None` for an empty slice.
    #[must_use]
    pub fn select(self, files: &[FileRecord]) -> Option<(&FileRecord, Vec<&FileRecord>)> {
        let mut ordered: Vec<&FileRecord> = files.iter().collect();
        ordered.sort_by(|a, b| self.compare(a, b));
        let mut ordered = ordered.into_iter();
        let keep = ordered.next()?;
        Some((keep, ordered.collect()))
    }
}

impl fmt::Display for RetentionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RetentionStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "oldest" => Ok(Self::Oldest),
            "newest" => Ok(Self::Newest),
            "shortest_path" | "shortest" => Ok(Self::ShortestPath),
            "longest_path" | "longest" => Ok(Self::LongestPath),
            _ => Err(ConfigError::UnknownStrategy(s.to_string())),
        }
    }
}
