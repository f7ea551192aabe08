//! Errors surfaced while launching or supervising the server process.

use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::transport::ListenerError;

use super::shutdown::ShutdownError;

/// Errors surfaced while launching or supervising the server process.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Bootstrap failed.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    /// The control listener could not be started or stopped cleanly.
    #[error("control listener failed: {source}")]
    Listener {
        /// Underlying listener error.
        #[from]
        source: ListenerError,
    },
    /// Waiting for a shutdown signal failed.
    #[error("failed to wait for shutdown: {source}")]
    Shutdown {
        /// Underlying signal error.
        #[from]
        source: ShutdownError,
    },
}
