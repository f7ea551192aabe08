//! In-process stand-in for the acquisition hardware.
//!
//! The simulated device records what was programmed, quantises trigger
//! positions to a fixed resolution and can be told to fail named operations.
//! Clones share the same registers, so a test can keep one handle while the
//! instrument owns the other.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use wfm_config::Config;

use super::{
    AcquisitionMode, DeviceControl, DeviceError, DeviceIdentity, DeviceResult, FrequencyRange,
    TriggerMode, TriggerSlope,
};

const VENDOR: &str = "Digilent";
const MODEL: &str = "WFM-SIM";
const SERIAL: &str = "SIM0001";

/// Programmed state of the simulated device.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedRegisters {
    /// Per-channel enable flags.
    pub channel_enabled: Vec<bool>,
    /// Per-channel offsets in volts.
    pub offsets: Vec<f64>,
    /// Per-channel attenuation factors.
    pub attenuations: Vec<f64>,
    /// Per-channel ranges in volts.
    pub ranges: Vec<f64>,
    /// Sample rate in hertz.
    pub sample_rate_hz: u64,
    /// Buffer size in samples.
    pub buffer_size: u64,
    /// Selected trigger type.
    pub trigger_mode: TriggerMode,
    /// Selected trigger slope.
    pub trigger_slope: TriggerSlope,
    /// Trigger level in volts.
    pub trigger_level: f64,
    /// Trigger source channel.
    pub trigger_source: usize,
    /// Auto-trigger timeout in seconds.
    pub auto_timeout: f64,
    /// Last trigger position actually programmed, in seconds.
    pub trigger_position: f64,
    /// Acquisition mode.
    pub acquisition_mode: AcquisitionMode,
    /// Whether the last `configure` call started acquisition.
    pub running: bool,
    /// Number of `reset` calls.
    pub resets: usize,
}

impl SimulatedRegisters {
    fn power_on(channels: usize) -> Self {
        Self {
            channel_enabled: vec![false; channels],
            offsets: vec![0.0; channels],
            attenuations: vec![1.0; channels],
            ranges: vec![5.0; channels],
            sample_rate_hz: 0,
            buffer_size: 0,
            trigger_mode: TriggerMode::Edge,
            trigger_slope: TriggerSlope::Rising,
            trigger_level: 0.0,
            trigger_source: 0,
            auto_timeout: 0.0,
            trigger_position: 0.0,
            acquisition_mode: AcquisitionMode::Continuous,
            running: false,
            resets: 0,
        }
    }
}

struct SimulatedInner {
    registers: SimulatedRegisters,
    failing: HashSet<&'static str>,
}

/// Software device driven by the shipped daemon and by end-to-end tests.
#[derive(Clone)]
pub struct SimulatedDevice {
    channels: usize,
    frequency: FrequencyRange,
    resolution_sec: f64,
    inner: Arc<Mutex<SimulatedInner>>,
}

impl SimulatedDevice {
    /// Creates a device with the given shape.
    #[must_use]
    pub fn new(channels: usize, frequency: FrequencyRange, resolution_sec: f64) -> Self {
        let channels = channels.max(1);
        Self {
            channels,
            frequency,
            resolution_sec,
            inner: Arc::new(Mutex::new(SimulatedInner {
                registers: SimulatedRegisters::power_on(channels),
                failing: HashSet::new(),
            })),
        }
    }

    /// Creates a device shaped by the daemon configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.channel_count,
            FrequencyRange {
                min_hz: config.min_frequency_hz,
                max_hz: config.max_frequency_hz,
            },
            config.trigger_resolution_sec,
        )
    }

    /// Makes every later call of `operation` fail.
    pub fn fail_on(&self, operation: &'static str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failing.insert(operation);
        }
    }

    /// Clears all injected failures.
    pub fn clear_failures(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failing.clear();
        }
    }

    /// Copy of the programmed registers, or `None` if the lock is poisoned.
    #[must_use]
    pub fn registers(&self) -> Option<SimulatedRegisters> {
        self.inner.lock().ok().map(|inner| inner.registers.clone())
    }

    fn apply<T>(
        &self,
        operation: &'static str,
        write: impl FnOnce(&mut SimulatedRegisters) -> T,
    ) -> DeviceResult<T> {
        let mut inner = self.lock(operation)?;
        if inner.failing.contains(operation) {
            return Err(DeviceError::new(operation, "injected failure"));
        }
        Ok(write(&mut inner.registers))
    }

    fn apply_channel(
        &self,
        operation: &'static str,
        channel: usize,
        write: impl FnOnce(&mut SimulatedRegisters, usize),
    ) -> DeviceResult<()> {
        if channel >= self.channels {
            return Err(DeviceError::new(
                operation,
                format!("channel {channel} out of range"),
            ));
        }
        self.apply(operation, |registers| write(registers, channel))
    }

    fn lock(&self, operation: &'static str) -> DeviceResult<MutexGuard<'_, SimulatedInner>> {
        self.inner
            .lock()
            .map_err(|_| DeviceError::new(operation, "register lock poisoned"))
    }

    fn quantise(&self, seconds: f64) -> f64 {
        if self.resolution_sec > 0.0 {
            (seconds / self.resolution_sec).round() * self.resolution_sec
        } else {
            seconds
        }
    }
}

impl DeviceControl for SimulatedDevice {
    fn identity(&self) -> DeviceIdentity {
        DeviceIdentity {
            vendor: VENDOR.to_owned(),
            model: MODEL.to_owned(),
            serial: SERIAL.to_owned(),
            firmware: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }

    fn channel_count(&self) -> usize {
        self.channels
    }

    fn reset(&mut self) -> DeviceResult<()> {
        let channels = self.channels;
        self.apply("reset", |registers| {
            let resets = registers.resets + 1;
            *registers = SimulatedRegisters::power_on(channels);
            registers.resets = resets;
        })
    }

    fn set_channel_enable(&mut self, channel: usize, enabled: bool) -> DeviceResult<()> {
        self.apply_channel("set_channel_enable", channel, |registers, index| {
            registers.channel_enabled[index] = enabled;
        })
    }

    fn set_offset(&mut self, channel: usize, volts: f64) -> DeviceResult<()> {
        self.apply_channel("set_offset", channel, |registers, index| {
            registers.offsets[index] = volts;
        })
    }

    fn set_attenuation(&mut self, channel: usize, factor: f64) -> DeviceResult<()> {
        self.apply_channel("set_attenuation", channel, |registers, index| {
            registers.attenuations[index] = factor;
        })
    }

    fn set_range(&mut self, channel: usize, volts: f64) -> DeviceResult<()> {
        self.apply_channel("set_range", channel, |registers, index| {
            registers.ranges[index] = volts;
        })
    }

    fn set_sample_rate(&mut self, hz: u64) -> DeviceResult<()> {
        self.apply("set_sample_rate", |registers| registers.sample_rate_hz = hz)
    }

    fn set_buffer_size(&mut self, samples: u64) -> DeviceResult<()> {
        self.apply("set_buffer_size", |registers| registers.buffer_size = samples)
    }

    fn set_trigger_type(&mut self, mode: TriggerMode) -> DeviceResult<()> {
        self.apply("set_trigger_type", |registers| registers.trigger_mode = mode)
    }

    fn set_trigger_slope(&mut self, slope: TriggerSlope) -> DeviceResult<()> {
        self.apply("set_trigger_slope", |registers| registers.trigger_slope = slope)
    }

    fn set_trigger_level(&mut self, volts: f64) -> DeviceResult<()> {
        self.apply("set_trigger_level", |registers| registers.trigger_level = volts)
    }

    fn set_trigger_source(&mut self, channel: usize) -> DeviceResult<()> {
        self.apply_channel("set_trigger_source", channel, |registers, index| {
            registers.trigger_source = index;
        })
    }

    fn set_auto_trigger_timeout(&mut self, seconds: f64) -> DeviceResult<()> {
        self.apply("set_auto_trigger_timeout", |registers| {
            registers.auto_timeout = seconds;
        })
    }

    fn set_trigger_position(&mut self, seconds: f64) -> DeviceResult<f64> {
        let actual = self.quantise(seconds);
        self.apply("set_trigger_position", |registers| {
            registers.trigger_position = actual;
            actual
        })
    }

    fn frequency_range(&mut self) -> DeviceResult<FrequencyRange> {
        let range = self.frequency;
        self.apply("frequency_range", |_| range)
    }

    fn configure(&mut self, _reconfigure: bool, start: bool) -> DeviceResult<()> {
        self.apply("configure", |registers| registers.running = start)
    }

    fn set_acquisition_mode(&mut self, mode: AcquisitionMode) -> DeviceResult<()> {
        self.apply("set_acquisition_mode", |registers| {
            registers.acquisition_mode = mode;
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn device() -> SimulatedDevice {
        SimulatedDevice::new(
            4,
            FrequencyRange {
                min_hz: 1.0,
                max_hz: 100e6,
            },
            1e-8,
        )
    }

    #[rstest]
    fn trigger_position_is_rounded_to_resolution(mut device: SimulatedDevice) {
        let actual = device.set_trigger_position(2.4e-8).expect("position");
        assert!((actual - 2e-8).abs() < 1e-20);
    }

    #[rstest]
    fn injected_failure_names_the_operation(mut device: SimulatedDevice) {
        device.fail_on("set_sample_rate");
        let error = device.set_sample_rate(1000).expect_err("should fail");
        assert_eq!(error.operation(), "set_sample_rate");
        device.clear_failures();
        device.set_sample_rate(1000).expect("rate");
        let registers = device.registers().expect("registers");
        assert_eq!(registers.sample_rate_hz, 1000);
    }

    #[rstest]
    fn reset_restores_power_on_and_counts(mut device: SimulatedDevice) {
        device.set_channel_enable(2, true).expect("enable");
        device.reset().expect("reset");
        let registers = device.registers().expect("registers");
        assert!(!registers.channel_enabled[2]);
        assert_eq!(registers.resets, 1);
    }

    #[rstest]
    fn out_of_range_channel_is_a_device_error(mut device: SimulatedDevice) {
        assert!(device.set_offset(4, 1.0).is_err());
    }

    #[rstest]
    fn clones_share_registers(device: SimulatedDevice) {
        let mut owned = device.clone();
        owned.configure(true, true).expect("configure");
        assert!(device.registers().expect("registers").running);
    }
}
