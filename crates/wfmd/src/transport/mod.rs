//! Connection Supervisor for the control port.
//!
//! The listener binds the configured endpoint and accepts connections on a
//! background thread. Each connection is served to completion by a
//! [`ConnectionHandler`] before the next accept.

mod errors;
mod handler;
mod listener;
mod session;

pub use self::errors::ListenerError;
pub use self::handler::ConnectionHandler;
pub use self::listener::{ControlListener, ListenerHandle};
pub use self::session::{ControlSession, SessionEnd};

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
const SESSION_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::session");
