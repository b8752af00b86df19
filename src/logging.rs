//! Logging setup on the `log` facade with an `env_logger` backend.
//!
//! `RUST_LOG` wins when set. Otherwise `--quiet` selects errors only, `-v`
//! debug and `-vv` trace, with `info` as the default. Log lines go to stderr
//! so scan output on stdout stays machine-readable.
//!
//! While a [`RunLog`] is alive, every record that passes the filter is also
//! appended to `duplicate_cleanup_YYYYmmdd_HHMMSS.log` in the report
//! directory as `[YYYY-mm-dd HH:MM:SS] [LEVEL] message`.

use std::env;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::Local;
use env_logger::{Builder, Logger};
use log::{LevelFilter, Log, Metadata, Record};

use crate::actions::backup::unique_path;

/// The open run log, if any: its path and a buffered handle.
static RUN_LOG: Mutex<Option<(PathBuf, BufWriter<File>)>> = Mutex::new(None);

/// env_logger for stderr plus the optional run log file.
struct TeeLogger {
    stderr: Logger,
}

impl Log for TeeLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        self.stderr.enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        if !self.stderr.matches(record) {
            return;
        }
        self.stderr.log(record);

        let mut slot = RUN_LOG.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((_, writer)) = slot.as_mut() {
            // A failing log file must not take the run down with it.
            let _ = writeln!(
                writer,
                "[{}] [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        self.stderr.flush();
        let mut slot = RUN_LOG.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((_, writer)) = slot.as_mut() {
            let _ = writer.flush();
        }
    }
}

/// Initialize the global logger from CLI verbosity flags.
///
/// Must be called once, before any logging happens. Later calls are ignored.
pub fn init_logging(verbose: u8, quiet: bool) {
    let from_env = env::var("RUST_LOG").is_ok();

    let mut builder = Builder::new();
    if from_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }
    configure_format(&mut builder, verbose);

    let stderr = builder.build();
    let max_level = stderr.filter();
    if log::set_boxed_logger(Box::new(TeeLogger { stderr })).is_err() {
        return;
    }
    log::set_max_level(max_level);

    if from_env {
        log::debug!("Logging configured from RUST_LOG");
    } else {
        log::debug!("Logging initialized at level: {}", current_level_name());
    }
}

fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn configure_format(builder: &mut Builder, verbose: u8) {
    builder.format(move |buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);
        if verbose >= 1 {
            writeln!(
                buf,
                "{} {style}{:<5}{style:#} [{}] {}",
                buf.timestamp_millis(),
                level,
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        } else {
            writeln!(buf, "{style}{:<5}{style:#} {}", level, record.args())
        }
    });
}

/// Name of the currently active maximum log level.
#[must_use]
pub fn current_level_name() -> &'static str {
    match log::max_level() {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}

/// Per-run log file in the report directory.
///
/// Records are copied into the file until the value is dropped.
#[derive(Debug)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    /// Create `dir` if needed and open a new timestamped log file in it.
    ///
    /// An existing file is never reused; a `_N` suffix is added instead.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the directory or file cannot be created.
    pub fn start(dir: &Path) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let name = format!(
            "duplicate_cleanup_{}.log",
            Local::now().format("%Y%m%d_%H%M%S")
        );
        let base = dir.join(name);

        let mut path = base.clone();
        let file = loop {
            match OpenOptions::new().append(true).create_new(true).open(&path) {
                Ok(file) => break file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => path = unique_path(&base),
                Err(e) => return Err(e),
            }
        };

        let mut slot = RUN_LOG.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some((path.clone(), BufWriter::new(file)));
        drop(slot);

        log::info!("Run log: {}", path.display());
        Ok(Self { path })
    }

    /// Where the log is written.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLog {
    fn drop(&mut self) {
        let mut slot = RUN_LOG.lock().unwrap_or_else(PoisonError::into_inner);
        // Another run may have replaced the slot since.
        if slot.as_ref().is_some_and(|(path, _)| *path == self.path) {
            if let Some((_, mut writer)) = slot.take() {
                let _ = writer.flush();
            }
        }
    }
}
