//! Test suites for the waveform server.

mod bootstrap_behaviour;
mod session_behaviour;
pub(crate) mod support;
