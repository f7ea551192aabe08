//! Error type for Device Control Port calls.

use thiserror::Error;

/// A device call did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{operation} failed: {message}")]
pub struct DeviceError {
    operation: &'static str,
    message: String,
}

impl DeviceError {
    /// Creates an error for the named device operation.
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }

    /// Name of the device operation that failed.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        self.operation
    }

    /// Driver-supplied failure description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
