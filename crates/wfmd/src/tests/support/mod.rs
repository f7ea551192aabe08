//! Test harness utilities shared by unit and behavioural suites.

mod client;
mod config_loader;
mod reporter;
mod streamer;

use std::time::{Duration, Instant};

pub use client::ScpiClient;
pub use config_loader::{FailingConfigLoader, TestConfigLoader};
pub use reporter::{Event, RecordingHealthReporter, Timeline};
pub use streamer::RecordingStreamer;

use crate::device::{FrequencyRange, SimulatedDevice};

/// Four-channel simulated device matching the default configuration.
#[must_use]
pub fn simulated_device() -> SimulatedDevice {
    SimulatedDevice::new(
        4,
        FrequencyRange {
            min_hz: 1.0,
            max_hz: 100e6,
        },
        1e-8,
    )
}

/// Polls `condition` for up to two seconds.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    condition()
}
