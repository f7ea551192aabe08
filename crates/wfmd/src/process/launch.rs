//! Supervises launch sequencing and runtime orchestration.

use std::sync::Arc;

use tracing::info;

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::device::SimulatedDevice;
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::streaming::{IdleStreamer, WaveformStreamer};

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Collaborators required to launch the server runtime.
pub(crate) struct LaunchPlan<L, S> {
    pub(crate) loader: L,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    pub(crate) streamer: Arc<dyn WaveformStreamer>,
    pub(crate) shutdown: S,
}

/// Runs the server using the production collaborators.
///
/// # Errors
///
/// Returns a [`LaunchError`] if bootstrap fails, the control port cannot be
/// bound, or signal handlers cannot be installed.
pub fn run_daemon() -> Result<(), LaunchError> {
    run_daemon_with(LaunchPlan {
        loader: SystemConfigLoader,
        reporter: Arc::new(StructuredHealthReporter::new()),
        streamer: Arc::new(IdleStreamer),
        shutdown: SystemShutdownSignal,
    })
}

/// Runs the server with injected collaborators.
pub(crate) fn run_daemon_with<L, S>(plan: LaunchPlan<L, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    S: ShutdownSignal,
{
    let LaunchPlan {
        loader,
        reporter,
        streamer,
        shutdown,
    } = plan;

    let daemon = bootstrap_with(&loader, reporter)?;
    let device = SimulatedDevice::from_config(daemon.config());
    let server = daemon.serve(device, streamer)?;
    info!(
        target: PROCESS_TARGET,
        local_addr = %server.local_addr(),
        "waveform server ready"
    );

    shutdown.wait()?;
    server.stop()?;
    info!(
        target: PROCESS_TARGET,
        "shutdown sequence completed"
    );
    Ok(())
}
