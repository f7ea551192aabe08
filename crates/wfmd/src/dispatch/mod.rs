//! Command Dispatcher.
//!
//! Lines parsed by [`crate::scpi`] are decoded into a [`Command`] and applied
//! to the shared [`crate::instrument::Instrument`] under its lock. Queries
//! produce exactly one reply line; mutating commands never reply. Anything
//! the dispatcher does not understand is logged and dropped, leaving the
//! connection open.
//!
//! ## Re-arm rule
//!
//! After every command that changes a capture parameter (channel settings,
//! rate, depth, any `TRIG:` setter) the dispatcher re-applies the arm
//! sequence if the trigger is armed, so the arm snapshot always reflects the
//! configuration the device is running with.

mod command;
mod dispatcher;
mod errors;
mod query;

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

pub use self::command::{Command, Query, resolve_channel};
pub use self::dispatcher::{CommandDispatcher, Outcome};
pub use self::errors::DispatchError;
pub use self::query::{FS_PER_SECOND, sample_intervals_fs};
