//! Protocol-level dispatch failures.
//!
//! None of these reach the client: the protocol has no error reply, so the
//! dispatcher logs them and carries on with the next line.

use thiserror::Error;

use crate::instrument::StatePoisonedError;

/// Errors surfaced while decoding or executing a command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// No command matches the subject and keyword.
    #[error("unknown command '{command}' for subject '{subject}'")]
    UnknownCommand { subject: String, command: String },

    /// No query matches the keyword.
    #[error("unknown query '{command}'")]
    UnknownQuery { command: String },

    /// Wrong number of arguments.
    #[error("'{command}' expects {expected} argument(s), got {actual}")]
    InvalidArguments {
        command: String,
        expected: usize,
        actual: usize,
    },

    /// An argument could not be interpreted.
    #[error("invalid argument '{value}': {reason}")]
    InvalidArgument { value: String, reason: String },

    /// `TRIG:MODE` named a mode the device cannot be put in.
    #[error("unsupported trigger mode '{mode}'")]
    UnsupportedTriggerMode { mode: String },

    /// Internal error (e.g., lock poisoned).
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl DispatchError {
    pub(crate) fn invalid_argument(value: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            value: value.to_owned(),
            reason: reason.into(),
        }
    }
}

impl From<StatePoisonedError> for DispatchError {
    fn from(error: StatePoisonedError) -> Self {
        Self::Internal {
            message: error.to_string(),
        }
    }
}
