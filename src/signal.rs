//! Cooperative cancellation and Ctrl+C handling.
//!
//! A [`CancellationToken`] wraps an `AtomicBool` shared between the caller and
//! a running scan or deletion. Work is never interrupted forcibly: the finder
//! and the deletion loop poll the token between files and stop early,
//! leaving completed deletions in place.
//!
//! # Usage
//!
//! ```rust,no_run
//! use dupsweep::signal::install_handler;
//!
//! let token = install_handler().expect("Failed to install signal handler");
//!
//! // Pass clones of the token to long-running operations
//! let worker_token = token.clone();
//! if worker_token.is_cancelled() {
//!     println!("Stopping early");
//! }
//! ```
//!
//! # Exit Codes
//!
//! When Ctrl+C is received the token is cancelled and the application
//! exits with code 130 (128 + SIGINT) once the current file is finished.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared cancellation flag.
///
/// Cloning is cheap and every clone observes the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Clear the flag so the token can be reused for another run.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_TOKEN: OnceLock<CancellationToken> = OnceLock::new();

/// Install a Ctrl+C handler that cancels the returned token.
///
/// Calling this more than once in a process returns the token registered
/// the first time, reset to not-cancelled. This allows tests running in
/// parallel to call `run_app()` repeatedly.
///
/// # Errors
///
/// Returns [`SignalError`] if the handler cannot be installed and no
/// handler was registered earlier in this process.
pub fn install_handler() -> Result<CancellationToken, SignalError> {
    if let Some(token) = GLOBAL_TOKEN.get() {
        token.reset();
        return Ok(token.clone());
    }

    let token = CancellationToken::new();
    let hooked = token.clone();

    match ctrlc::set_handler(move || {
        hooked.cancel();

        let _ = writeln!(std::io::stderr(), "\nInterrupted. Finishing current file...");
        let _ = std::io::stderr().flush();

        log::info!("Cancellation signal received");
    }) {
        Ok(()) => {
            let _ = GLOBAL_TOKEN.set(token.clone());
            Ok(token)
        }
        Err(ctrlc::Error::MultipleHandlers) => {
            // Another handler owns the signal; the token still works for
            // programmatic cancellation.
            log::debug!("Ctrl+C handler already registered, using unhooked token");
            let fallback = GLOBAL_TOKEN.get_or_init(CancellationToken::new).clone();
            fallback.reset();
            Ok(fallback)
        }
        Err(e) => Err(SignalError::InstallFailed(e)),
    }
}
