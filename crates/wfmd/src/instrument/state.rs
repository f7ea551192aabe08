//! Configuration records held by the Instrument State Store.

use crate::device::{TriggerMode, TriggerSlope};

/// Samples per channel before any `DEPTH` command.
pub const DEFAULT_MEMORY_DEPTH: u64 = 1_000_000;

/// Configuration of one analog input channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelConfig {
    /// Whether the channel takes part in acquisition.
    pub enabled: bool,
    /// Vertical offset in volts.
    pub offset_volts: f64,
    /// Probe attenuation factor.
    pub attenuation: f64,
    /// Full-scale range in volts.
    pub range_volts: f64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            offset_volts: 0.0,
            attenuation: 1.0,
            range_volts: 5.0,
        }
    }
}

/// Sampling configuration shared by all channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquisitionConfig {
    /// Sampling period in femtoseconds; zero until a rate is set.
    pub sample_interval_fs: i64,
    /// Samples captured per channel.
    pub memory_depth: u64,
    /// Set when capture buffers must be reallocated.
    pub memory_depth_changed: bool,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            sample_interval_fs: 0,
            memory_depth: DEFAULT_MEMORY_DEPTH,
            memory_depth_changed: false,
        }
    }
}

/// Trigger parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriggerConfig {
    /// Trigger type; edge is the only one supported.
    pub mode: TriggerMode,
    /// Edge direction.
    pub slope: TriggerSlope,
    /// Threshold in volts.
    pub level_volts: f64,
    /// Zero-based channel feeding the trigger detector.
    pub source_channel: usize,
    /// Requested delay from the buffer midpoint, in femtoseconds.
    pub delay_fs: i64,
    /// Absolute trigger position derived from the delay, in femtoseconds.
    pub position_fs: i64,
    /// Delay expressed in samples; recomputed on every arm.
    pub sample_index: i64,
    /// Actual minus requested trigger position after hardware rounding.
    pub position_error_sec: f64,
}

/// Capture parameters frozen when the trigger is armed.
#[derive(Debug, Clone, PartialEq)]
pub struct ArmSnapshot {
    /// Per-channel settings at arm time.
    pub channels: Vec<ChannelConfig>,
    /// Sample interval at arm time.
    pub sample_interval_fs: i64,
    /// Memory depth at arm time.
    pub memory_depth: u64,
}

impl ArmSnapshot {
    /// Indices of the channels enabled at arm time.
    pub fn enabled_channels(&self) -> impl Iterator<Item = usize> + '_ {
        self.channels
            .iter()
            .enumerate()
            .filter_map(|(index, channel)| channel.enabled.then_some(index))
    }
}

/// Armed state of the trigger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TriggerStatus {
    /// No capture in progress.
    #[default]
    Disarmed,
    /// Waiting for or running a capture.
    Armed {
        /// Disarm after the next completed capture.
        one_shot: bool,
    },
}

impl TriggerStatus {
    /// Returns `true` while armed.
    #[must_use]
    pub const fn is_armed(self) -> bool {
        matches!(self, Self::Armed { .. })
    }

    /// Returns `true` only when armed for a single capture.
    #[must_use]
    pub const fn is_one_shot(self) -> bool {
        matches!(self, Self::Armed { one_shot: true })
    }
}

/// Complete mutable state of the instrument.
///
/// The snapshot is present exactly while the status is armed; only the
/// trigger state machine changes either field.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentState {
    /// One entry per device channel.
    pub channels: Vec<ChannelConfig>,
    /// Sample rate and memory depth.
    pub acquisition: AcquisitionConfig,
    /// Trigger settings.
    pub trigger: TriggerConfig,
    pub(crate) status: TriggerStatus,
    pub(crate) snapshot: Option<ArmSnapshot>,
}

impl InstrumentState {
    /// Creates power-on state for a device with `channel_count` channels.
    ///
    /// A device always has at least one channel.
    #[must_use]
    pub fn new(channel_count: usize) -> Self {
        Self {
            channels: vec![ChannelConfig::default(); channel_count.max(1)],
            acquisition: AcquisitionConfig::default(),
            trigger: TriggerConfig::default(),
            status: TriggerStatus::Disarmed,
            snapshot: None,
        }
    }

    /// Current trigger status.
    #[must_use]
    pub const fn status(&self) -> TriggerStatus {
        self.status
    }

    /// Snapshot taken at the last arm, present only while armed.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&ArmSnapshot> {
        self.snapshot.as_ref()
    }

    /// Returns `true` while the trigger is armed.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.status.is_armed()
    }

    /// Number of channels.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Clamps a channel index to the last valid channel.
    #[must_use]
    pub fn clamp_channel(&self, index: usize) -> usize {
        index.min(self.channels.len().saturating_sub(1))
    }

    /// Mutable access to a channel; out-of-range indices are clamped.
    pub fn channel_mut(&mut self, index: usize) -> &mut ChannelConfig {
        let index = self.clamp_channel(index);
        &mut self.channels[index]
    }

    /// Returns `true` if at least one channel is enabled.
    #[must_use]
    pub fn any_channel_enabled(&self) -> bool {
        self.channels.iter().any(|channel| channel.enabled)
    }

    pub(crate) fn take_snapshot(&self) -> ArmSnapshot {
        ArmSnapshot {
            channels: self.channels.clone(),
            sample_interval_fs: self.acquisition.sample_interval_fs,
            memory_depth: self.acquisition.memory_depth,
        }
    }
}
