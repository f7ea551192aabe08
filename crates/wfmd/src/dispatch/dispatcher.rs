//! Command execution against the instrument.

use tracing::{debug, error, info, warn};

use crate::device;
use crate::instrument::{Instrument, InstrumentCore};
use crate::scpi::ScpiLine;

use super::command::{Command, Query};
use super::query::{comma_list, rates_reply};
use super::{DISPATCH_TARGET, DispatchError};

const SECONDS_PER_FS: f64 = 1e-15;
const FEMTOS_PER_SECOND: u64 = 1_000_000_000_000_000;

/// What the command loop should do after a line has been handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing to send.
    Silent,
    /// Send this reply line.
    Reply(String),
    /// Close the connection.
    Exit,
}

/// Interprets parsed lines against the shared instrument.
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    instrument: Instrument,
    supported_depth: u64,
}

impl CommandDispatcher {
    /// Creates a dispatcher advertising `supported_depth` from `DEPTHS?`.
    #[must_use]
    pub fn new(instrument: Instrument, supported_depth: u64) -> Self {
        Self {
            instrument,
            supported_depth,
        }
    }

    /// The instrument this dispatcher drives.
    #[must_use]
    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    /// Handles one line, logging anything that goes wrong.
    ///
    /// Protocol errors never reach the client, so the result is always an
    /// [`Outcome`].
    pub fn dispatch(&self, line: &ScpiLine) -> Outcome {
        match self.execute(line) {
            Ok(outcome) => outcome,
            Err(failure) => {
                log_failure(line, &failure);
                Outcome::Silent
            }
        }
    }

    /// Handles one line.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] if the line cannot be decoded or the
    /// instrument lock is poisoned.
    pub fn execute(&self, line: &ScpiLine) -> Result<Outcome, DispatchError> {
        let supported_depth = self.supported_depth;
        let outcome = self.instrument.with_core(|core| {
            let command = Command::decode(line, core.state.channel_count())?;
            Ok::<_, DispatchError>(apply(core, &command, supported_depth))
        })??;
        Ok(outcome)
    }
}

fn apply(core: &mut InstrumentCore, command: &Command, supported_depth: u64) -> Outcome {
    match *command {
        Command::Query(query) => return Outcome::Reply(answer(core, query, supported_depth)),
        Command::Exit => return Outcome::Exit,
        Command::ChannelEnable { channel, enabled } => {
            core.state.channel_mut(channel).enabled = enabled;
            device::report(core.device.set_channel_enable(channel, enabled));
            core.state.acquisition.memory_depth_changed = true;
        }
        Command::Offset { channel, volts } => {
            core.state.channel_mut(channel).offset_volts = volts;
            device::report(core.device.set_offset(channel, volts));
        }
        Command::Attenuation { channel, factor } => {
            core.state.channel_mut(channel).attenuation = factor;
            device::report(core.device.set_attenuation(channel, factor));
        }
        Command::Range { channel, volts } => {
            core.state.channel_mut(channel).range_volts = volts;
            device::report(core.device.set_range(channel, volts));
        }
        Command::Rate { hz } => {
            device::report(core.device.set_sample_rate(hz));
            core.state.acquisition.sample_interval_fs =
                i64::try_from(FEMTOS_PER_SECOND / hz).unwrap_or(i64::MAX);
        }
        Command::Depth { samples } => {
            core.state.acquisition.memory_depth = samples;
            device::report(core.device.set_buffer_size(samples));
            core.state.acquisition.memory_depth_changed = true;
        }
        Command::TriggerMode(mode) => {
            core.state.trigger.mode = mode;
            device::report(core.device.set_trigger_type(mode));
        }
        Command::TriggerSlope(slope) => {
            core.state.trigger.slope = slope;
            device::report(core.device.set_trigger_slope(slope));
        }
        Command::TriggerLevel { volts } => {
            core.state.trigger.level_volts = volts;
            device::report(core.device.set_trigger_level(volts));
        }
        Command::TriggerSource { channel } => {
            core.state.trigger.source_channel = channel;
            device::report(core.device.set_auto_trigger_timeout(0.0));
            device::report(core.device.set_trigger_source(channel));
        }
        Command::TriggerDelay { delay_fs } => set_trigger_delay(core, delay_fs),
        Command::Start { one_shot } => {
            if let Err(rejected) = core.request_start(one_shot) {
                info!(
                    target: DISPATCH_TARGET,
                    one_shot,
                    reason = %rejected,
                    "ignoring start request"
                );
            }
        }
        Command::Force => core.force(),
        Command::Stop => core.disarm(),
    }

    if command.requires_rearm() {
        core.rearm_if_armed();
    }
    Outcome::Silent
}

/// Places the trigger `delay_fs` before the buffer midpoint and records how
/// far the hardware rounded the position.
fn set_trigger_delay(core: &mut InstrumentCore, delay_fs: i64) {
    let trigger = &mut core.state.trigger;
    let acquisition = &core.state.acquisition;
    let half_depth = i64::try_from(acquisition.memory_depth / 2).unwrap_or(i64::MAX);
    let position_fs = half_depth
        .saturating_mul(acquisition.sample_interval_fs)
        .saturating_sub(delay_fs);

    trigger.delay_fs = delay_fs;
    trigger.position_fs = position_fs;

    let requested_sec = position_fs as f64 * SECONDS_PER_FS;
    if let Some(actual_sec) = device::report(core.device.set_trigger_position(requested_sec)) {
        trigger.position_error_sec = actual_sec - requested_sec;
    }
}

fn answer(core: &mut InstrumentCore, query: Query, supported_depth: u64) -> String {
    match query {
        Query::Identify => core.device.identity().to_string(),
        Query::Channels => core.state.channel_count().to_string(),
        Query::Rates => device::report(core.device.frequency_range())
            .map(rates_reply)
            .unwrap_or_default(),
        Query::Depths => comma_list([supported_depth]),
    }
}

fn log_failure(line: &ScpiLine, failure: &DispatchError) {
    match failure {
        DispatchError::UnsupportedTriggerMode { mode } => {
            warn!(target: DISPATCH_TARGET, mode = %mode, "unknown trigger mode");
        }
        DispatchError::Internal { message } => {
            error!(target: DISPATCH_TARGET, message = %message, "dispatch failed");
        }
        _ => debug!(
            target: DISPATCH_TARGET,
            subject = %line.subject,
            command = %line.command,
            query = line.query,
            args = ?line.args,
            error = %failure,
            "unrecognised command"
        ),
    }
}
