//! Device Control Port: the boundary to the acquisition hardware.
//!
//! The dispatcher and trigger state machine only talk to hardware through
//! [`DeviceControl`]. Every call may fail; failures are logged by the caller
//! and never roll back the in-memory configuration.

mod errors;
#[cfg(test)]
pub(crate) mod mock;
mod simulated;
mod types;

use tracing::error;

pub use self::errors::DeviceError;
pub use self::simulated::{SimulatedDevice, SimulatedRegisters};
pub use self::types::{AcquisitionMode, DeviceIdentity, FrequencyRange, TriggerMode, TriggerSlope};

pub(crate) const DEVICE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::device");

/// Result alias for Device Control Port calls.
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Capability set of the acquisition device.
///
/// Channel indices are zero-based and already clamped by the caller.
pub trait DeviceControl: Send {
    /// Identification fields reported by `*IDN?`.
    fn identity(&self) -> DeviceIdentity;

    /// Number of analog input channels.
    fn channel_count(&self) -> usize;

    /// Restores the device's power-on configuration.
    fn reset(&mut self) -> DeviceResult<()>;

    /// Enables or disables acquisition on a channel.
    fn set_channel_enable(&mut self, channel: usize, enabled: bool) -> DeviceResult<()>;

    /// Sets a channel's vertical offset in volts.
    fn set_offset(&mut self, channel: usize, volts: f64) -> DeviceResult<()>;

    /// Sets a channel's probe attenuation factor.
    fn set_attenuation(&mut self, channel: usize, factor: f64) -> DeviceResult<()>;

    /// Sets a channel's full-scale range in volts.
    fn set_range(&mut self, channel: usize, volts: f64) -> DeviceResult<()>;

    /// Sets the sample rate in hertz.
    fn set_sample_rate(&mut self, hz: u64) -> DeviceResult<()>;

    /// Sets the capture buffer size in samples per channel.
    fn set_buffer_size(&mut self, samples: u64) -> DeviceResult<()>;

    /// Selects the trigger type.
    fn set_trigger_type(&mut self, mode: TriggerMode) -> DeviceResult<()>;

    /// Selects the edge the trigger fires on.
    fn set_trigger_slope(&mut self, slope: TriggerSlope) -> DeviceResult<()>;

    /// Sets the trigger threshold in volts.
    fn set_trigger_level(&mut self, volts: f64) -> DeviceResult<()>;

    /// Routes the analog detector on `channel` to the trigger.
    fn set_trigger_source(&mut self, channel: usize) -> DeviceResult<()>;

    /// Sets how long to wait before auto-triggering; zero waits forever.
    fn set_auto_trigger_timeout(&mut self, seconds: f64) -> DeviceResult<()>;

    /// Programs the trigger position and returns the position actually set.
    ///
    /// Hardware may round the request, so the returned value can differ from
    /// `seconds`.
    fn set_trigger_position(&mut self, seconds: f64) -> DeviceResult<f64>;

    /// Reports the supported sample-rate range.
    fn frequency_range(&mut self) -> DeviceResult<FrequencyRange>;

    /// Applies pending configuration and optionally starts acquisition.
    fn configure(&mut self, reconfigure: bool, start: bool) -> DeviceResult<()>;

    /// Selects how many records one arm captures.
    fn set_acquisition_mode(&mut self, mode: AcquisitionMode) -> DeviceResult<()>;
}

/// Logs a failed device call and converts the result into an `Option`.
///
/// Device failures are never fatal to the command that caused them.
pub(crate) fn report<T>(result: DeviceResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(failure) => {
            error!(
                target: DEVICE_TARGET,
                operation = failure.operation(),
                error = %failure,
                "device call failed"
            );
            None
        }
    }
}
