//! Configuration errors, exit codes and structured error output.

use serde::Serialize;

use crate::duplicates::FinderError;

/// Invalid configuration detected before any file is touched.
///
/// These are the only errors that abort a whole scan or deletion run.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The hash algorithm name is not one of md5, sha1, sha256.
    #[error("Unknown hash algorithm '{0}' (expected md5, sha1 or sha256)")]
    UnknownHashAlgorithm(String),

    /// The retention strategy name is not recognized.
    #[error("Unknown retention strategy '{0}' (expected oldest, newest, shortest_path or longest_path)")]
    UnknownStrategy(String),

    /// None of the given roots exist.
    #[error("No existing root directories to scan")]
    NoRoots,

    /// The size bounds are inverted.
    #[error("Minimum size {min} is greater than maximum size {max}")]
    InvalidSizeBounds {
        /// Lower bound in bytes
        min: u64,
        /// Upper bound in bytes
        max: u64,
    },

    /// An explicitly requested configuration file does not exist.
    #[error("Configuration file not found: {}", .0.display())]
    FileNotFound(std::path::PathBuf),

    /// A configuration source could not be read or parsed.
    #[error("Invalid configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

/// Exit codes for the dupsweep application.
///
/// - 0: Success (completed normally, duplicates found or removed)
/// - 1: General error (unexpected failure)
/// - 2: No duplicates found (completed normally, nothing to do)
/// - 3: Partial success (completed with some per-file errors)
/// - 4: Invalid configuration
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: Run completed and duplicates were found.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// No duplicates: Scan completed but no duplicates were found.
    NoDuplicates = 2,
    /// Partial success: Run completed but some files could not be processed.
    PartialSuccess = 3,
    /// Configuration error: Options were rejected before scanning.
    ConfigError = 4,
    /// Interrupted: Run was interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DS000",
            Self::GeneralError => "DS001",
            Self::NoDuplicates => "DS002",
            Self::PartialSuccess => "DS003",
            Self::ConfigError => "DS004",
            Self::Interrupted => "DS130",
        }
    }

    /// Pick the exit code for a fatal error.
    ///
    /// An interrupted scan maps to [`ExitCode::Interrupted`] and
    /// configuration errors anywhere in the chain map to
    /// [`ExitCode::ConfigError`].
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        for cause in err.chain() {
            if let Some(finder) = cause.downcast_ref::<FinderError>() {
                return match finder {
                    FinderError::Interrupted => Self::Interrupted,
                    FinderError::Config(_) => Self::ConfigError,
                };
            }
            if cause.downcast_ref::<ConfigError>().is_some() {
                return Self::ConfigError;
            }
        }
        Self::GeneralError
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DS001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
