//! Blocking wait for process termination.

use std::io;
use std::os::raw::c_int;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use signal_hook::low_level::signal_name;
use thiserror::Error;
use tracing::info;

use super::PROCESS_TARGET;

/// Signals that stop the control listener.
pub(crate) const TERMINATION_SIGNALS: [c_int; 4] = [SIGTERM, SIGINT, SIGQUIT, SIGHUP];

/// Source of the "stop serving" notification.
pub trait ShutdownSignal: Send + Sync {
    /// Blocks until the server should stop accepting clients.
    fn wait(&self) -> Result<(), ShutdownError>;
}

/// Failures while waiting for termination.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// Signal handlers could not be registered.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The signal stream ended without delivering a signal.
    #[error("signal stream closed before a termination signal arrived")]
    Closed,
}

/// Waits for one of [`TERMINATION_SIGNALS`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShutdownSignal;

impl ShutdownSignal for SystemShutdownSignal {
    fn wait(&self) -> Result<(), ShutdownError> {
        let mut signals =
            Signals::new(TERMINATION_SIGNALS).map_err(|source| ShutdownError::Install { source })?;
        let signal = signals.forever().next().ok_or(ShutdownError::Closed)?;
        info!(
            target: PROCESS_TARGET,
            signal,
            name = signal_name(signal).unwrap_or("unknown"),
            "termination signal received; stopping control listener"
        );
        Ok(())
    }
}
