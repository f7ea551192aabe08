//! Errors raised while moving command lines across the control connection.

use std::io;

use thiserror::Error;

/// Connection-level failure on the control socket.
///
/// Any of these ends the command loop for the current client; the listener
/// then returns to accepting new connections.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The peer closed the connection before a terminator arrived.
    #[error("client disconnected")]
    Disconnected,
    /// A single command line grew beyond the accepted size.
    #[error("command line exceeds {limit} bytes")]
    LineTooLong {
        /// Maximum accepted line length in bytes.
        limit: usize,
    },
    /// Reading from or writing to the socket failed.
    #[error("control socket IO error: {0}")]
    Io(#[from] io::Error),
}
