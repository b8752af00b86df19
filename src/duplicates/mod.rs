//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping
//! - Full-content hash grouping
//! - Retention strategies for choosing the kept file
//! - Run statistics

pub mod finder;
pub mod groups;
pub mod stats;
pub mod strategy;

pub use finder::{containing_root, resolve_roots, DuplicateFinder, FinderConfig, FinderError, ScanResult};
pub use groups::{group_by_hash, group_by_size, sort_groups, DuplicateGroup, GroupingStats};
pub use stats::Statistics;
pub use strategy::RetentionStrategy;
