//! File actions module.
//!
//! This module provides functionality for:
//! - Backing up deletion candidates into a mirrored directory tree
//! - Permanent deletion or moving to the system trash
//! - Running a whole deletion pass over duplicate groups
//!
//! ```no_run
//! use dupsweep::actions::backup::backup_file;
//! use std::path::{Path, PathBuf};
//!
//! let roots = vec![PathBuf::from("/data")];
//! let copy = backup_file(Path::new("/data/a.txt"), Path::new("/backup"), &roots);
//! ```

pub mod backup;
pub mod delete;

// Re-export commonly used types
pub use backup::{backup_file, mirror_path, BackupError};
pub use delete::{
    delete_to_trash, permanent_delete, DeleteConfig, DeleteError, DeleteMode, Deleter,
    DeletionOutcome, FileSnapshot,
};
