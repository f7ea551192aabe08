//! Layered configuration for the waveform server control plane.
//!
//! Values are merged by [`ortho_config`] in increasing order of precedence:
//! compiled defaults, a TOML configuration file (`--config-path`),
//! `WFMD_`-prefixed environment variables, then command-line flags. Every
//! field carries a default so an empty invocation yields a usable
//! configuration.

mod defaults;
mod logging;

use std::fmt;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_CHANNEL_COUNT, DEFAULT_LISTEN_HOST, DEFAULT_LISTEN_PORT, DEFAULT_LOG_FILTER,
    DEFAULT_MAX_FREQUENCY_HZ, DEFAULT_MEMORY_DEPTH, DEFAULT_MIN_FREQUENCY_HZ,
    DEFAULT_TRIGGER_RESOLUTION_SEC, default_log_filter, default_log_filter_string,
    default_log_format,
};
pub use logging::{LogFormat, LogFormatParseError};

/// Resolved daemon configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "WFMD")]
pub struct Config {
    /// Host the control-plane listener binds to.
    #[serde(default = "defaults::default_listen_host")]
    pub listen_host: String,
    /// TCP port the control-plane listener binds to.
    #[serde(default = "defaults::default_listen_port")]
    pub listen_port: u16,
    /// `tracing` filter expression.
    #[serde(default = "defaults::default_log_filter_string")]
    pub log_filter: String,
    /// Output format for log lines.
    #[serde(default = "defaults::default_log_format")]
    pub log_format: LogFormat,
    /// Analog channels exposed by the simulated device.
    #[serde(default = "defaults::default_channel_count")]
    pub channel_count: usize,
    /// Minimum sample rate reported by the simulated device, in hertz.
    #[serde(default = "defaults::default_min_frequency_hz")]
    pub min_frequency_hz: f64,
    /// Maximum sample rate reported by the simulated device, in hertz.
    #[serde(default = "defaults::default_max_frequency_hz")]
    pub max_frequency_hz: f64,
    /// Memory depth advertised to clients, in samples per channel.
    #[serde(default = "defaults::default_memory_depth")]
    pub memory_depth: u64,
    /// Trigger-position rounding step of the simulated device, in seconds.
    #[serde(default = "defaults::default_trigger_resolution_sec")]
    pub trigger_resolution_sec: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_host: defaults::default_listen_host(),
            listen_port: defaults::default_listen_port(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            channel_count: defaults::default_channel_count(),
            min_frequency_hz: defaults::default_min_frequency_hz(),
            max_frequency_hz: defaults::default_max_frequency_hz(),
            memory_depth: defaults::default_memory_depth(),
            trigger_resolution_sec: defaults::default_trigger_resolution_sec(),
        }
    }
}

impl Config {
    /// Address the control-plane listener binds to.
    #[must_use]
    pub fn control_endpoint(&self) -> ControlEndpoint {
        ControlEndpoint::new(self.listen_host.clone(), self.listen_port)
    }

    /// Filter expression handed to the tracing subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Selected log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }
}

/// TCP endpoint of the control-plane listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlEndpoint {
    host: String,
    port: u16,
}

impl ControlEndpoint {
    /// Builds an endpoint from a host name (or address) and port.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Host name or address to bind.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port to bind; zero asks the OS for an ephemeral port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for ControlEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "tcp://{}:{}", self.host, self.port)
    }
}
