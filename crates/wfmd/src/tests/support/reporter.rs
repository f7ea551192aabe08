//! Test double for [`HealthReporter`] that records lifecycle events in order.
//!
//! The same [`Timeline`] is shared with [`super::RecordingStreamer`] so tests
//! can assert how session and streaming events interleave.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use wfm_config::Config;

use crate::bootstrap::BootstrapError;
use crate::health::HealthReporter;
use crate::transport::SessionEnd;

/// Events observed during a scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    BootstrapStarting,
    BootstrapSucceeded,
    BootstrapFailed(String),
    ClientConnected,
    /// Carries the rendered [`SessionEnd`].
    ClientDisconnected(String),
    StreamStarted,
    StreamStopped,
}

/// Ordered, shareable event log.
#[derive(Debug, Default, Clone)]
pub struct Timeline(Arc<Mutex<Vec<Event>>>);

impl Timeline {
    pub fn record(&self, event: Event) {
        self.0.lock().expect("timeline mutex poisoned").push(event);
    }

    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.0.lock().expect("timeline mutex poisoned").clone()
    }

    #[must_use]
    pub fn count(&self, event: &Event) -> usize {
        self.events().iter().filter(|seen| *seen == event).count()
    }

    #[must_use]
    pub fn disconnections(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::ClientDisconnected(reason) => Some(reason),
                _ => None,
            })
            .collect()
    }
}

/// Records health events for assertions.
#[derive(Debug, Default, Clone)]
pub struct RecordingHealthReporter {
    timeline: Timeline,
}

impl RecordingHealthReporter {
    #[must_use]
    pub fn new(timeline: Timeline) -> Self {
        Self { timeline }
    }

    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.timeline.record(Event::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.timeline.record(Event::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.timeline.record(Event::BootstrapFailed(error.to_string()));
    }

    fn client_connected(&self, _peer: Option<SocketAddr>) {
        self.timeline.record(Event::ClientConnected);
    }

    fn client_disconnected(&self, _peer: Option<SocketAddr>, end: &SessionEnd) {
        self.timeline
            .record(Event::ClientDisconnected(end.to_string()));
    }
}
