//! Streaming collaborator double that records its lifetime.

use std::thread;
use std::time::Duration;

use crate::instrument::Instrument;
use crate::streaming::{StopToken, WaveformStreamer};

use super::reporter::{Event, Timeline};

/// Records start and stop on a shared timeline.
#[derive(Debug, Clone)]
pub struct RecordingStreamer {
    timeline: Timeline,
}

impl RecordingStreamer {
    #[must_use]
    pub fn new(timeline: Timeline) -> Self {
        Self { timeline }
    }
}

impl WaveformStreamer for RecordingStreamer {
    fn run(&self, _instrument: Instrument, stop: StopToken) {
        self.timeline.record(Event::StreamStarted);
        while !stop.is_stopped() {
            thread::sleep(Duration::from_millis(2));
        }
        self.timeline.record(Event::StreamStopped);
    }
}
