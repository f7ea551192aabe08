//! Instrument State Store and the lock that guards it.
//!
//! [`Instrument`] is the single exclusion point for configuration, trigger
//! status, arm snapshot and the device handle. The command loop and the
//! streaming collaborator share clones of it; every state change and the
//! device call that goes with it happen under one lock acquisition.

mod state;

use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::info;

use crate::device::{self, DeviceControl};

pub use self::state::{
    AcquisitionConfig, ArmSnapshot, ChannelConfig, DEFAULT_MEMORY_DEPTH, InstrumentState,
    TriggerConfig, TriggerStatus,
};

pub(crate) const INSTRUMENT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::instrument");

/// Error returned when the instrument mutex is poisoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatePoisonedError;

impl fmt::Display for StatePoisonedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instrument state mutex poisoned")
    }
}

impl std::error::Error for StatePoisonedError {}

/// State plus the device it describes.
pub(crate) struct InstrumentCore {
    pub(crate) state: InstrumentState,
    pub(crate) device: Box<dyn DeviceControl>,
}

/// Shared handle to the instrument.
#[derive(Clone)]
pub struct Instrument {
    inner: Arc<Mutex<InstrumentCore>>,
}

impl fmt::Debug for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self
            .inner
            .lock()
            .map(|core| format!("{:?}", core.state.status()))
            .unwrap_or_else(|_| String::from("poisoned"));
        f.debug_struct("Instrument").field("status", &status).finish()
    }
}

impl Instrument {
    /// Wraps a device with power-on state sized to its channel count.
    #[must_use]
    pub fn new(device: impl DeviceControl + 'static) -> Self {
        let state = InstrumentState::new(device.channel_count());
        Self {
            inner: Arc::new(Mutex::new(InstrumentCore {
                state,
                device: Box::new(device),
            })),
        }
    }

    /// Runs `f` with exclusive access to state and device.
    pub(crate) fn with_core<F, R>(&self, f: F) -> Result<R, StatePoisonedError>
    where
        F: FnOnce(&mut InstrumentCore) -> R,
    {
        let mut guard = self.inner.lock().map_err(|_| StatePoisonedError)?;
        Ok(f(&mut *guard))
    }

    /// Copy of the current state.
    ///
    /// # Errors
    ///
    /// Returns `StatePoisonedError` if the mutex is poisoned.
    pub fn state(&self) -> Result<InstrumentState, StatePoisonedError> {
        self.with_core(|core| core.state.clone())
    }

    /// Copy of the arm snapshot, or `None` while disarmed.
    ///
    /// # Errors
    ///
    /// Returns `StatePoisonedError` if the mutex is poisoned.
    pub fn armed_snapshot(&self) -> Result<Option<ArmSnapshot>, StatePoisonedError> {
        self.with_core(|core| core.state.snapshot().cloned())
    }

    /// Returns and clears the buffer reallocation flag.
    ///
    /// # Errors
    ///
    /// Returns `StatePoisonedError` if the mutex is poisoned.
    pub fn take_memory_depth_changed(&self) -> Result<bool, StatePoisonedError> {
        self.with_core(|core| {
            std::mem::take(&mut core.state.acquisition.memory_depth_changed)
        })
    }

    /// Reports that the streaming collaborator finished one capture.
    ///
    /// A one-shot arm disarms; a continuous arm re-arms with a fresh
    /// snapshot. Does nothing while disarmed.
    ///
    /// # Errors
    ///
    /// Returns `StatePoisonedError` if the mutex is poisoned.
    pub fn capture_complete(&self) -> Result<(), StatePoisonedError> {
        self.with_core(InstrumentCore::capture_complete)
    }

    /// Resets the device and drops any arm, keeping configuration.
    ///
    /// Called when a control connection opens and again when it closes.
    ///
    /// # Errors
    ///
    /// Returns `StatePoisonedError` if the mutex is poisoned.
    pub fn reset_for_session(&self) -> Result<(), StatePoisonedError> {
        self.with_core(|core| {
            device::report(core.device.reset());
            let was_armed = core.state.is_armed();
            core.state.status = TriggerStatus::Disarmed;
            core.state.snapshot = None;
            info!(
                target: INSTRUMENT_TARGET,
                was_armed,
                "device reset"
            );
        })
    }
}
