//! Per-connection lifecycle of the control port.

use std::fmt;
use std::io::BufReader;
use std::net::TcpStream;
use std::sync::Arc;

use tracing::{error, trace, warn};

use crate::dispatch::{CommandDispatcher, Outcome};
use crate::health::HealthReporter;
use crate::scpi::{LinkError, ScpiLine, read_command_line, send_reply};
use crate::streaming::{StreamHandle, WaveformStreamer};

use super::{ConnectionHandler, SESSION_TARGET};

/// Why a control session ended.
#[derive(Debug)]
pub enum SessionEnd {
    /// The client sent `EXIT`.
    ClientExit,
    /// The client closed the connection.
    Disconnected,
    /// Reading or writing failed.
    LinkFailed(LinkError),
}

impl fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientExit => write!(f, "client exit"),
            Self::Disconnected => write!(f, "peer closed connection"),
            Self::LinkFailed(error) => write!(f, "link failed: {error}"),
        }
    }
}

/// Serves one control client at a time.
///
/// On connect the device is reset and the streaming collaborator started; on
/// disconnect the device is reset again and the collaborator is stopped and
/// joined before the listener may accept again.
pub struct ControlSession<R> {
    dispatcher: CommandDispatcher,
    streamer: Arc<dyn WaveformStreamer>,
    reporter: R,
}

impl<R> ControlSession<R>
where
    R: HealthReporter + 'static,
{
    /// Creates a session handler.
    pub fn new(
        dispatcher: CommandDispatcher,
        streamer: Arc<dyn WaveformStreamer>,
        reporter: R,
    ) -> Self {
        Self {
            dispatcher,
            streamer,
            reporter,
        }
    }

    fn reset_instrument(&self) {
        if let Err(failure) = self.dispatcher.instrument().reset_for_session() {
            error!(target: SESSION_TARGET, error = %failure, "instrument reset failed");
        }
    }

    fn serve(&self, stream: &TcpStream) -> SessionEnd {
        let mut reader = BufReader::new(stream);
        let mut writer = stream;
        loop {
            let line = match read_command_line(&mut reader) {
                Ok(line) => line,
                Err(LinkError::Disconnected) => return SessionEnd::Disconnected,
                Err(failure) => return SessionEnd::LinkFailed(failure),
            };
            trace!(target: SESSION_TARGET, line = %line, "command received");

            match self.dispatcher.dispatch(&ScpiLine::parse(&line)) {
                Outcome::Silent => {}
                Outcome::Reply(reply) => {
                    if let Err(failure) = send_reply(&mut writer, &reply) {
                        return SessionEnd::LinkFailed(failure);
                    }
                }
                Outcome::Exit => return SessionEnd::ClientExit,
            }
        }
    }
}

impl<R> ConnectionHandler for ControlSession<R>
where
    R: HealthReporter + 'static,
{
    fn handle(&self, stream: TcpStream) {
        let peer = stream.peer_addr().ok();
        self.reporter.client_connected(peer);

        if let Err(failure) = stream.set_nodelay(true) {
            warn!(
                target: SESSION_TARGET,
                error = %failure,
                "failed to disable Nagle's algorithm"
            );
        }

        self.reset_instrument();
        let streaming = match StreamHandle::spawn(
            Arc::clone(&self.streamer),
            self.dispatcher.instrument().clone(),
        ) {
            Ok(handle) => Some(handle),
            Err(failure) => {
                error!(target: SESSION_TARGET, error = %failure, "streaming unavailable");
                None
            }
        };

        let end = self.serve(&stream);

        self.reset_instrument();
        if let Some(handle) = streaming
            && let Err(failure) = handle.stop_and_join()
        {
            error!(target: SESSION_TARGET, error = %failure, "streaming thread failed");
        }
        self.reporter.client_disconnected(peer, &end);
    }
}
