//! Process-wide `tracing` subscriber for the waveform server.
//!
//! Output goes to stderr as flattened JSON or compact text, with RFC 3339 UTC
//! timestamps and thread names (`scpi-control`, `waveform-stream`). The
//! subscriber is installed at most once per process.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::Subscriber;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::fmt;

use wfm_config::{Config, LogFormat};

/// Format chosen by whichever bootstrap installed the subscriber.
static INSTALLED_FORMAT: OnceCell<LogFormat> = OnceCell::new();

type BoxedSubscriber = Box<dyn Subscriber + Send + Sync>;

/// Proof that logging is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryHandle {
    format: LogFormat,
}

impl TelemetryHandle {
    /// Output format of the installed subscriber.
    ///
    /// This is the format of the first successful bootstrap; later
    /// configurations do not replace it.
    #[must_use]
    pub const fn format(&self) -> LogFormat {
        self.format
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// `log_filter` is not a valid `EnvFilter` directive list.
    #[error("invalid log filter {filter:?}: {source}")]
    Filter {
        /// The rejected expression.
        filter: String,
        /// Parser diagnostic.
        #[source]
        source: ParseError,
    },
    /// Another global subscriber is already installed.
    #[error("failed to install telemetry subscriber: {source}")]
    Subscriber {
        /// Error from `tracing`.
        #[source]
        source: SetGlobalDefaultError,
    },
}

/// Installs the global subscriber described by `config` on first use.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for an unparseable `log_filter` and
/// [`TelemetryError::Subscriber`] if a foreign subscriber is already global.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    let format = INSTALLED_FORMAT.get_or_try_init(|| {
        let subscriber = build_subscriber(config)?;
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|source| TelemetryError::Subscriber { source })?;
        Ok::<_, TelemetryError>(config.log_format())
    })?;
    Ok(TelemetryHandle { format: *format })
}

fn build_subscriber(config: &Config) -> Result<BoxedSubscriber, TelemetryError> {
    let filter = EnvFilter::try_new(config.log_filter()).map_err(|source| {
        TelemetryError::Filter {
            filter: config.log_filter().to_owned(),
            source,
        }
    })?;

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(fmt::time::UtcTime::rfc_3339());

    Ok(match config.log_format() {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    })
}
