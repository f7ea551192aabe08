//! Control-plane server for a networked waveform instrument.
//!
//! A client holds one persistent TCP connection and speaks a SCPI-style text
//! protocol (`SUBJECT:COMMAND ARG1,ARG2`, with `?` marking queries). Accepted
//! commands reconfigure the acquisition device through the [`DeviceControl`]
//! port and drive the trigger arm/disarm state machine. Waveform data flows
//! on a separate path owned by a [`WaveformStreamer`] that runs for the
//! lifetime of each connection.
//!
//! ## Layers
//!
//! - [`scpi`] splits the byte stream into command lines and tokenises them.
//! - [`dispatch`] decodes lines into commands, applies them under the
//!   instrument lock and re-arms the trigger when a running capture is
//!   affected.
//! - [`instrument`] holds live configuration, trigger status and the arm
//!   snapshot that the streaming collaborator reads.
//! - [`transport`] accepts one client at a time, resets the device around
//!   each session and starts and joins the streaming thread.
//!
//! Configuration comes from [`wfm_config`]; lifecycle events go through a
//! [`HealthReporter`] and all logging uses `tracing`.

mod bootstrap;
pub mod device;
pub mod dispatch;
mod health;
pub mod instrument;
mod process;
pub mod scpi;
pub mod streaming;
mod telemetry;
pub mod transport;
mod trigger;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, RunningServer, StaticConfigLoader, SystemConfigLoader,
    bootstrap_with,
};
pub use device::DeviceControl;
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{LaunchError, run_daemon};
pub use streaming::WaveformStreamer;
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use trigger::ArmRejected;

#[cfg(test)]
mod tests;
