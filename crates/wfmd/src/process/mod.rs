//! Process supervision: launch sequencing and shutdown handling.

mod errors;
mod launch;
pub(crate) mod shutdown;

pub use errors::LaunchError;
pub use launch::run_daemon;
#[cfg(test)]
pub(crate) use launch::{LaunchPlan, run_daemon_with};

pub(crate) const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");
