//! dupsweep - duplicate file finder and cleaner
//!
//! Files under one or more roots are partitioned by size, then confirmed by
//! a streamed content digest (md5, sha1 or sha256). Cleaning keeps one file
//! per group according to a [`RetentionStrategy`], optionally backs up the
//! others, deletes them and writes a JSON deletion report.
//!
//! The library is usable without the binary:
//!
//! ```no_run
//! use dupsweep::actions::{DeleteConfig, Deleter};
//! use dupsweep::duplicates::{DuplicateFinder, RetentionStrategy};
//! use std::path::PathBuf;
//!
//! let mut result = DuplicateFinder::with_defaults()
//!     .scan(&[PathBuf::from("/data")])
//!     .unwrap();
//!
//! let config = DeleteConfig::new(result.roots.clone()).with_strategy(RetentionStrategy::Newest);
//! let outcome = Deleter::new(config)
//!     .delete_duplicates(&mut result.groups, result.stats)
//!     .unwrap();
//! println!("report at {}", outcome.report_path.display());
//! ```
//!
//! [`RetentionStrategy`]: duplicates::RetentionStrategy

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod report;
pub mod scanner;
pub mod signal;

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};

use crate::actions::{DeleteMode, Deleter};
use crate::cli::{CleanArgs, Cli, Commands, OutputFormat, ReportArgs, ScanArgs};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, ScanResult, Statistics};
use crate::error::ExitCode;
use crate::logging::RunLog;
use crate::output::{text, CsvOutput, JsonOutput};
use crate::progress::{Progress, ProgressCallback};
use crate::report::DeletionReport;
use crate::signal::CancellationToken;

/// Run the command described by `cli` and return the process exit code.
///
/// # Errors
///
/// Returns an error for fatal failures: invalid configuration, no usable
/// roots, an interrupted scan, or output that cannot be written. Per-file
/// problems are not errors; they yield [`ExitCode::PartialSuccess`].
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    let token = signal::install_handler().context("Failed to set up Ctrl+C handling")?;
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Scan(args) => run_scan(config, &args, cli.quiet, &token),
        Commands::Clean(args) => run_clean(config, &args, cli.quiet, &token, confirm),
        Commands::Report(args) => run_report(&args),
    }
}

fn scan_exit_code(result: &ScanResult) -> ExitCode {
    if result.stats.has_errors() {
        ExitCode::PartialSuccess
    } else if result.groups.is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    }
}

fn find_duplicates(
    config: &Config,
    paths: &[PathBuf],
    progress: Arc<dyn ProgressCallback>,
    token: &CancellationToken,
) -> Result<ScanResult> {
    let finder = DuplicateFinder::new(
        config
            .finder_config()
            .with_cancellation(token.clone())
            .with_progress_callback(progress),
    );
    let result = finder.scan(paths).context("Scan failed")?;
    Ok(result)
}

fn run_scan(
    mut config: Config,
    args: &ScanArgs,
    quiet: bool,
    token: &CancellationToken,
) -> Result<ExitCode> {
    config.apply_filter_args(&args.filter);
    let progress: Arc<dyn ProgressCallback> = Arc::new(Progress::new(quiet));
    let result = find_duplicates(&config, &args.filter.paths, progress, token)?;
    let exit_code = scan_exit_code(&result);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match args.output {
        OutputFormat::Text => {
            text::write_groups(&mut out, &result.groups)?;
            text::write_scan_summary(&mut out, &result.groups, &result.stats)?;
        }
        OutputFormat::Json => {
            JsonOutput::new(&result.groups, &result.stats, config.hash_algorithm, exit_code)
                .write_to(&mut out)
                .context("Failed to write JSON output")?;
        }
        OutputFormat::Csv => {
            CsvOutput::new(&result.groups)
                .write_to(&mut out)
                .context("Failed to write CSV output")?;
        }
    }
    out.flush()?;

    Ok(exit_code)
}

/// Scan, confirm through `ask` unless `--yes`, then delete.
///
/// A declined confirmation deletes nothing and yields
/// [`ExitCode::GeneralError`], so callers can tell it from a finished clean.
fn run_clean(
    mut config: Config,
    args: &CleanArgs,
    quiet: bool,
    token: &CancellationToken,
    ask: impl FnOnce(usize, &Config) -> Result<bool>,
) -> Result<ExitCode> {
    config.apply_clean_args(args);
    let progress: Arc<dyn ProgressCallback> = Arc::new(Progress::new(quiet));
    let mut result = find_duplicates(&config, &args.filter.paths, Arc::clone(&progress), token)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    text::write_groups(&mut out, &result.groups)?;
    text::write_scan_summary(&mut out, &result.groups, &result.stats)?;
    out.flush()?;

    if result.groups.is_empty() {
        return Ok(scan_exit_code(&result));
    }

    if !args.yes && !ask(result.stats.duplicate_files, &config)? {
        writeln!(out, "Aborted, nothing deleted.")?;
        return Ok(ExitCode::GeneralError);
    }

    let run_log = RunLog::start(&config.report_dir).with_context(|| {
        format!("Failed to create run log in {}", config.report_dir.display())
    })?;

    let deleter = Deleter::new(config.delete_config(result.roots.clone()))
        .with_progress_callback(progress)
        .with_cancellation(token.clone());
    let scan_stats: Statistics = result.stats.clone();
    let outcome = deleter
        .delete_duplicates(&mut result.groups, scan_stats)
        .context("Failed to write deletion report")?;

    writeln!(out)?;
    text::write_deletion_summary(&mut out, &outcome.report)?;
    writeln!(out, "  Report:            {}", outcome.report_path.display())?;
    writeln!(out, "  Log:               {}", run_log.path().display())?;
    out.flush()?;

    Ok(if outcome.report.interrupted {
        ExitCode::Interrupted
    } else if outcome.report.stats.has_errors() {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    })
}

/// Ask on stdin before deleting anything.
fn confirm(count: usize, config: &Config) -> Result<bool> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        bail!("Refusing to delete without confirmation; pass --yes to run non-interactively");
    }

    let verb = match config.delete_mode {
        DeleteMode::Permanent => "delete",
        DeleteMode::Trash => "move to trash",
    };
    let action = match config.backup_dir {
        Some(ref dir) => format!("back up to {} and {}", dir.display(), verb),
        None => verb.to_string(),
    };
    eprint!("{} {} duplicate file(s)? [y/N] ", capitalize(&action), count);
    io::stderr().flush()?;

    read_answer(&mut stdin.lock())
}

fn read_answer(input: &mut impl BufRead) -> Result<bool> {
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn run_report(args: &ReportArgs) -> Result<ExitCode> {
    let report = DeletionReport::load(&args.path)
        .with_context(|| format!("Failed to read report {}", args.path.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &report)?;
        writeln!(out)?;
    } else {
        text::write_report(&mut out, &report)?;
    }
    out.flush()?;

    Ok(ExitCode::Success)
}
