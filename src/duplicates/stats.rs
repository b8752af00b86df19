//! Run statistics.
//!
//! A single [`Statistics`] value is filled by a scan and then carried into
//! deletion, which adds its own counters. Counters only ever grow during a
//! run and a fresh value is used for every invocation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::groups::DuplicateGroup;

/// Aggregate counters for one scan and (optionally) deletion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Statistics {
    /// Files that passed all filters and were considered
    pub total_files: usize,
    /// Redundant copies across all groups (group size minus one, summed)
    pub duplicate_files: usize,
    /// Bytes held by redundant copies
    pub duplicate_size: u64,
    /// Files removed from their original location
    pub deleted_files: usize,
    /// Files copied to the backup directory
    pub backed_up_files: usize,
    /// Per-item failures recovered during the run
    pub errors: usize,
    /// Hardlinks to already-seen files that were skipped
    pub hardlinks_skipped: usize,
    /// Wall time of the scan phase
    #[serde(with = "duration_secs")]
    pub scan_duration: Duration,
    /// Wall time of the deletion phase
    #[serde(with = "duration_secs")]
    pub delete_duration: Duration,
}

impl Statistics {
    /// Recompute the duplicate counters from the final groups.
    pub fn record_groups(&mut self, groups: &[DuplicateGroup]) {
        self.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        self.duplicate_size = groups.iter().map(DuplicateGroup::wasted_space).sum();
    }

    /// Whether any per-item error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

/// Serialize a [`Duration`] as fractional seconds.
mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
