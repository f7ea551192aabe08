//! Structured health reporting for daemon lifecycle events.

use std::net::SocketAddr;
use std::sync::Arc;

use wfm_config::Config;

use crate::bootstrap::BootstrapError;
use crate::transport::SessionEnd;

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked when a control client has been accepted.
    fn client_connected(&self, peer: Option<SocketAddr>);

    /// Invoked after a control session has been torn down.
    fn client_disconnected(&self, peer: Option<SocketAddr>, end: &SessionEnd);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn client_connected(&self, peer: Option<SocketAddr>) {
        (**self).client_connected(peer);
    }

    fn client_disconnected(&self, peer: Option<SocketAddr>, end: &SessionEnd) {
        (**self).client_disconnected(peer, end);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: "wfmd::health",
            event = "bootstrap_starting",
            "starting waveform server bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: "wfmd::health",
            event = "bootstrap_succeeded",
            endpoint = %config.control_endpoint(),
            channels = config.channel_count,
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "waveform server bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: "wfmd::health",
            event = "bootstrap_failed",
            error = %error,
            "waveform server bootstrap failed"
        );
    }

    fn client_connected(&self, peer: Option<SocketAddr>) {
        tracing::info!(
            target: "wfmd::health",
            event = "client_connected",
            peer = ?peer,
            "control client connected"
        );
    }

    fn client_disconnected(&self, peer: Option<SocketAddr>, end: &SessionEnd) {
        tracing::info!(
            target: "wfmd::health",
            event = "client_disconnected",
            peer = ?peer,
            reason = %end,
            "control client disconnected"
        );
    }
}
