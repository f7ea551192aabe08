//! Server bootstrap orchestration.

use std::net::SocketAddr;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use wfm_config::Config;

use crate::device::DeviceControl;
use crate::dispatch::CommandDispatcher;
use crate::health::HealthReporter;
use crate::instrument::Instrument;
use crate::streaming::WaveformStreamer;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};
use crate::transport::{ControlListener, ControlSession, ListenerError, ListenerHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the server configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader that hands out an already resolved configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
}

/// Result of a successful bootstrap invocation.
pub struct Daemon {
    config: Config,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Daemon {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Binds the control port and starts serving clients against `device`.
    ///
    /// # Errors
    ///
    /// Returns a [`ListenerError`] if the endpoint cannot be bound or the
    /// listener thread cannot start.
    pub fn serve(
        &self,
        device: impl DeviceControl + 'static,
        streamer: Arc<dyn WaveformStreamer>,
    ) -> Result<RunningServer, ListenerError> {
        let listener = ControlListener::bind(&self.config.control_endpoint())?;
        let local_addr = listener.local_addr();
        let instrument = Instrument::new(device);
        let dispatcher = CommandDispatcher::new(instrument.clone(), self.config.memory_depth);
        let session = ControlSession::new(dispatcher, streamer, Arc::clone(&self.reporter));
        let handle = listener.start(Arc::new(session))?;
        Ok(RunningServer {
            local_addr,
            instrument,
            handle,
        })
    }
}

/// A control port that is accepting clients.
#[derive(Debug)]
pub struct RunningServer {
    local_addr: SocketAddr,
    instrument: Instrument,
    handle: ListenerHandle,
}

impl RunningServer {
    /// Address the control port is bound to.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Instrument shared with the control sessions.
    #[must_use]
    pub fn instrument(&self) -> &Instrument {
        &self.instrument
    }

    /// Stops accepting clients and waits for the listener thread.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::ThreadPanic`] if the listener panicked.
    pub fn stop(self) -> Result<(), ListenerError> {
        self.handle.shutdown();
        self.handle.join()
    }
}

/// Bootstraps the server using the supplied collaborators.
///
/// # Errors
///
/// Returns a [`BootstrapError`] when configuration or telemetry fails; the
/// reporter is told about the failure first.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
) -> Result<Daemon, BootstrapError> {
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    reporter.bootstrap_succeeded(&config);
    Ok(Daemon {
        config,
        telemetry,
        reporter,
    })
}
