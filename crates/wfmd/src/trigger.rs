//! Trigger State Machine.
//!
//! The trigger is either disarmed or armed; an armed trigger carries the
//! one-shot flag and the arm snapshot. Re-arming repeats the arm sequence in
//! place. All transitions run on [`InstrumentCore`], so callers already hold
//! the instrument lock.

use thiserror::Error;
use tracing::info;

use crate::device::{self, AcquisitionMode};
use crate::instrument::{InstrumentCore, TriggerStatus};

const TRIGGER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::trigger");

/// Admission checks that reject `START` and `SINGLE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArmRejected {
    /// A capture is already running.
    #[error("trigger is already armed")]
    AlreadyArmed,
    /// Arming would capture nothing.
    #[error("no channels are enabled")]
    NoChannelsEnabled,
}

impl InstrumentCore {
    /// Arms from `START` (`one_shot == false`) or `SINGLE`.
    pub(crate) fn request_start(&mut self, one_shot: bool) -> Result<(), ArmRejected> {
        if self.state.is_armed() {
            return Err(ArmRejected::AlreadyArmed);
        }
        if !self.state.any_channel_enabled() {
            return Err(ArmRejected::NoChannelsEnabled);
        }
        self.arm_as(one_shot);
        Ok(())
    }

    /// Arms without admission checks, keeping the one-shot flag if armed.
    pub(crate) fn force(&mut self) {
        self.arm();
    }

    /// Runs the arm sequence, keeping the one-shot flag if already armed.
    pub(crate) fn arm(&mut self) {
        let one_shot = self.state.status.is_one_shot();
        self.arm_as(one_shot);
    }

    /// Re-applies the arm sequence if armed, so a running capture picks up
    /// the latest configuration.
    pub(crate) fn rearm_if_armed(&mut self) {
        if self.state.is_armed() {
            self.arm();
        }
    }

    /// Stops acquisition and drops the snapshot.
    pub(crate) fn disarm(&mut self) {
        device::report(self.device.configure(true, false));
        self.state.status = TriggerStatus::Disarmed;
        self.state.snapshot = None;
        info!(target: TRIGGER_TARGET, "trigger disarmed");
    }

    /// Handles the end of one capture.
    pub(crate) fn capture_complete(&mut self) {
        match self.state.status {
            TriggerStatus::Disarmed => {}
            TriggerStatus::Armed { one_shot: true } => self.disarm(),
            TriggerStatus::Armed { one_shot: false } => self.arm(),
        }
    }

    fn arm_as(&mut self, one_shot: bool) {
        let snapshot = self.state.take_snapshot();
        let interval = self.state.acquisition.sample_interval_fs;
        self.state.trigger.sample_index = if interval == 0 {
            0
        } else {
            self.state.trigger.delay_fs / interval
        };

        device::report(self.device.set_acquisition_mode(AcquisitionMode::Single));
        device::report(self.device.configure(true, true));

        info!(
            target: TRIGGER_TARGET,
            one_shot,
            channels = snapshot.enabled_channels().count(),
            sample_interval_fs = snapshot.sample_interval_fs,
            memory_depth = snapshot.memory_depth,
            "trigger armed"
        );
        self.state.snapshot = Some(snapshot);
        self.state.status = TriggerStatus::Armed { one_shot };
    }
}
