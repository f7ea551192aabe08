//! Compiled-in defaults shared by the daemon and its tests.

use crate::logging::LogFormat;

/// Default bind address for the control-plane listener.
pub const DEFAULT_LISTEN_HOST: &str = "0.0.0.0";

/// Default control-plane TCP port (the conventional SCPI socket port).
pub const DEFAULT_LISTEN_PORT: u16 = 5025;

/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Number of analog input channels exposed by the simulated device.
pub const DEFAULT_CHANNEL_COUNT: usize = 4;

/// Lowest sample rate the simulated device reports, in hertz.
pub const DEFAULT_MIN_FREQUENCY_HZ: f64 = 1.0;

/// Highest sample rate the simulated device reports, in hertz.
pub const DEFAULT_MAX_FREQUENCY_HZ: f64 = 100_000_000.0;

/// Memory depth advertised by `DEPTHS?`, in samples per channel.
pub const DEFAULT_MEMORY_DEPTH: u64 = 65_536;

/// Trigger-position rounding step of the simulated device, in seconds.
pub const DEFAULT_TRIGGER_RESOLUTION_SEC: f64 = 1e-8;

/// Default log filter expression used by the daemon.
#[must_use]
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the daemon.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

pub(crate) fn default_listen_host() -> String {
    DEFAULT_LISTEN_HOST.to_owned()
}

pub(crate) const fn default_listen_port() -> u16 {
    DEFAULT_LISTEN_PORT
}

pub(crate) const fn default_channel_count() -> usize {
    DEFAULT_CHANNEL_COUNT
}

pub(crate) const fn default_min_frequency_hz() -> f64 {
    DEFAULT_MIN_FREQUENCY_HZ
}

pub(crate) const fn default_max_frequency_hz() -> f64 {
    DEFAULT_MAX_FREQUENCY_HZ
}

pub(crate) const fn default_memory_depth() -> u64 {
    DEFAULT_MEMORY_DEPTH
}

pub(crate) const fn default_trigger_resolution_sec() -> f64 {
    DEFAULT_TRIGGER_RESOLUTION_SEC
}
