//! Connection handling abstraction for the control listener.

use std::net::TcpStream;

/// Handles accepted control connections.
///
/// The listener calls `handle` on its own thread and does not accept again
/// until it returns, so at most one connection is served at a time.
pub trait ConnectionHandler: Send + Sync + 'static {
    /// Serves a single connection to completion. Implementations should
    /// avoid panicking.
    fn handle(&self, stream: TcpStream);
}
