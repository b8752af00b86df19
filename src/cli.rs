//! Command-line interface definitions for dupsweep.
//!
//! Global options control verbosity, color and the configuration file.
//! Three subcommands cover the workflow: `scan` lists duplicates, `clean`
//! removes them and writes a deletion report, `report` prints a saved report.
//!
//! # Example
//!
//! ```bash
//! # List duplicates as text
//! dupsweep scan ~/Downloads ~/Pictures
//!
//! # Machine-readable listing restricted to photos over 100KB
//! dupsweep scan ~/Pictures --ext jpg --ext png --min-size 100KB --output json
//!
//! # Remove duplicates, keeping the newest copy, with backups
//! dupsweep clean ~/Downloads --strategy newest --backup-dir /mnt/backup
//!
//! # Inspect a deletion report
//! dupsweep report duplicate_cleanup_logs/deletion_report_20260101_120000.json
//! ```

use std::fmt;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::duplicates::RetentionStrategy;
use crate::scanner::HashAlgorithm;

/// Duplicate file finder and cleaner.
///
/// Files are grouped by size and confirmed by content hash. Cleaning keeps
/// one file per group, optionally backs up the rest, and records every
/// deletion in a JSON report.
#[derive(Debug, Parser)]
#[command(name = "dupsweep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Read settings from this TOML file instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Find duplicate files and list them
    Scan(ScanArgs),
    /// Find duplicate files and delete all but one per group
    Clean(CleanArgs),
    /// Print a saved deletion report
    Report(ReportArgs),
}

/// Traversal and hashing options shared by `scan` and `clean`.
#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Directories to scan
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Only consider files with this extension (repeatable)
    #[arg(long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Minimum file size to consider (e.g., 1KB, 1MB, 1GB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Maximum file size to consider (e.g., 1KB, 1MB, 1GB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Skip directories with this name (repeatable, replaces the defaults)
    #[arg(long = "exclude-dir", value_name = "NAME")]
    pub exclude_dirs: Vec<String>,

    /// Hash algorithm used to confirm duplicates
    #[arg(long, value_enum)]
    pub hash: Option<HashArg>,

    /// Follow symbolic links
    #[arg(long)]
    pub follow_symlinks: bool,
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the clean subcommand.
#[derive(Debug, Args)]
pub struct CleanArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Which file of each group to keep
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Copy each file here before deleting it
    #[arg(long, value_name = "DIR")]
    pub backup_dir: Option<PathBuf>,

    /// Directory for the deletion report
    #[arg(long, value_name = "DIR")]
    pub report_dir: Option<PathBuf>,

    /// Move files to the system trash instead of deleting them
    #[arg(long)]
    pub trash: bool,

    /// Compare bytes against the kept file before each deletion
    #[arg(long)]
    pub paranoid: bool,

    /// Do not ask for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the report subcommand.
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Deletion report file
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Print the raw JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing
    #[default]
    Text,
    /// JSON document with groups and summary
    Json,
    /// One CSV row per file
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Hash algorithm option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HashArg {
    Md5,
    Sha1,
    Sha256,
}

impl From<HashArg> for HashAlgorithm {
    fn from(arg: HashArg) -> Self {
        match arg {
            HashArg::Md5 => Self::Md5,
            HashArg::Sha1 => Self::Sha1,
            HashArg::Sha256 => Self::Sha256,
        }
    }
}

/// Retention strategy option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Keep the file created first
    Oldest,
    /// Keep the most recently modified file
    Newest,
    /// Keep the file with the shortest path
    #[value(alias = "shortest")]
    ShortestPath,
    /// Keep the file with the longest path
    #[value(alias = "longest")]
    LongestPath,
}

impl From<StrategyArg> for RetentionStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Oldest => Self::Oldest,
            StrategyArg::Newest => Self::Newest,
            StrategyArg::ShortestPath => Self::ShortestPath,
            StrategyArg::LongestPath => Self::LongestPath,
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports the following formats:
/// - Plain numbers: "1024" (bytes)
/// - Decimal units: "1KB", "1MB", "1GB", "1TB" (powers of 1000)
/// - Binary units: "1KiB", "1MiB", "1GiB", "1TiB" (powers of 1024)
///
/// Suffixes are case-insensitive.
///
/// # Errors
///
/// Returns an error string if the input cannot be parsed.
///
/// # Examples
///
/// ```
/// use dupsweep::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// ```
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
