//! Progress reporting.
//!
//! The library reports progress through the [`ProgressCallback`] trait with
//! a `(current, total, message)` signature. Any `Fn(usize, usize, &str)`
//! closure that is `Send + Sync` implements it, so a host can forward
//! updates to whatever display it owns. [`Progress`] is the terminal
//! adapter used by the command-line driver, built on indicatif.
//!
//! Callbacks run on the thread doing the work and should return quickly.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Stage of a run a progress update belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Enumerating files under the roots (total unknown, reported as 0)
    Walking,
    /// Hashing size-bucket candidates
    Hashing,
    /// Backing up and deleting candidates
    Deleting,
}

impl Phase {
    /// Short lowercase label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Walking => "walking",
            Self::Hashing => "hashing",
            Self::Deleting => "deleting",
        }
    }
}

/// Receiver for progress updates during scan and deletion.
pub trait ProgressCallback: Send + Sync {
    /// Called at bounded intervals while items are processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Items processed so far
    /// * `total` - Items expected in this phase (0 while unknown)
    /// * `message` - Human-readable status line
    fn on_progress(&self, current: usize, total: usize, message: &str);

    /// Called when a phase starts.
    fn on_phase_start(&self, _phase: Phase, _total: usize) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, _phase: Phase) {}
}

impl<F> ProgressCallback for F
where
    F: Fn(usize, usize, &str) + Send + Sync,
{
    fn on_progress(&self, current: usize, total: usize, message: &str) {
        self(current, total, message);
    }
}

/// Terminal progress reporter using indicatif.
///
/// Shows a spinner while walking and a bar for hashing and deletion.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use dupsweep::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            quiet,
        }
    }

    fn bar(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.bar.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} files")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: Phase, total: usize) {
        if self.quiet {
            return;
        }

        let pb = match phase {
            Phase::Walking => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(Self::spinner_style());
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
            Phase::Hashing | Phase::Deleting => {
                let pb = ProgressBar::new(total as u64);
                pb.set_style(Self::bar_style());
                pb
            }
        };
        pb.set_message(phase.as_str());

        if let Some(previous) = self.bar().replace(pb) {
            previous.finish_and_clear();
        }
    }

    fn on_progress(&self, current: usize, total: usize, message: &str) {
        if self.quiet {
            return;
        }

        if let Some(ref pb) = *self.bar() {
            if total > 0 {
                pb.set_length(total as u64);
            }
            pb.set_position(current as u64);
            pb.set_message(truncate_message(message, 40));
        }
    }

    fn on_phase_end(&self, phase: Phase) {
        if self.quiet {
            return;
        }

        if let Some(pb) = self.bar().take() {
            pb.finish_with_message(format!("{} complete", phase.as_str()));
        }
    }
}

/// Shorten a status line, keeping its tail (usually the file name).
fn truncate_message(message: &str, max_len: usize) -> String {
    let count = message.chars().count();
    if count <= max_len {
        return message.to_string();
    }

    let tail: String = message.chars().skip(count - (max_len - 3)).collect();
    format!("...{tail}")
}
