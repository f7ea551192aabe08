//! Boundary to the streaming collaborator.
//!
//! The collaborator runs on its own thread for the lifetime of one control
//! connection. It reads the arm snapshot to learn the capture parameters,
//! reports finished captures back through the instrument, and exits once its
//! [`StopToken`] is raised. The waveform wire format is its own business.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::instrument::Instrument;

const STREAM_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::streaming");
const STREAM_THREAD_NAME: &str = "waveform-stream";
const IDLE_POLL: Duration = Duration::from_millis(25);

/// Errors raised while starting or stopping the collaborator thread.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The OS refused to create the thread.
    #[error("failed to spawn streaming thread: {source}")]
    Spawn {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The collaborator panicked before observing the stop flag.
    #[error("streaming thread panicked")]
    ThreadPanic,
}

/// Cooperative termination flag shared with the collaborator.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    /// Creates a token that has not been raised.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raises the flag.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once the flag has been raised.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Produces waveform data for one connection.
pub trait WaveformStreamer: Send + Sync + 'static {
    /// Runs until `stop` is raised. Must poll `stop` often enough that
    /// connection teardown is not held up.
    fn run(&self, instrument: Instrument, stop: StopToken);
}

/// Collaborator that sends nothing.
///
/// It keeps the buffer reallocation flag drained so the instrument behaves
/// as it would with a real stream attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdleStreamer;

impl WaveformStreamer for IdleStreamer {
    fn run(&self, instrument: Instrument, stop: StopToken) {
        while !stop.is_stopped() {
            if let Ok(true) = instrument.take_memory_depth_changed() {
                debug!(target: STREAM_TARGET, "capture buffers reallocated");
            }
            thread::sleep(IDLE_POLL);
        }
    }
}

/// Running collaborator thread.
#[derive(Debug)]
pub struct StreamHandle {
    stop: StopToken,
    handle: Option<thread::JoinHandle<()>>,
}

impl StreamHandle {
    /// Starts `streamer` on a named thread.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Spawn`] if the thread cannot be created.
    pub fn spawn(
        streamer: Arc<dyn WaveformStreamer>,
        instrument: Instrument,
    ) -> Result<Self, StreamError> {
        let stop = StopToken::new();
        let token = stop.clone();
        let handle = thread::Builder::new()
            .name(STREAM_THREAD_NAME.to_owned())
            .spawn(move || streamer.run(instrument, token))
            .map_err(|source| StreamError::Spawn { source })?;
        debug!(target: STREAM_TARGET, "streaming thread started");
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Raises the stop flag and waits for the thread to exit.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::ThreadPanic`] if the collaborator panicked.
    pub fn stop_and_join(mut self) -> Result<(), StreamError> {
        self.stop.stop();
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        handle.join().map_err(|_| StreamError::ThreadPanic)?;
        debug!(target: STREAM_TARGET, "streaming thread stopped");
        Ok(())
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.stop.stop();
    }
}
