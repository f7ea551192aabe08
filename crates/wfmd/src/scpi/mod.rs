//! Line-oriented SCPI codec for the control-plane connection.
//!
//! Requests arrive as text lines terminated by `\n` or `;` and follow the
//! grammar `[SUBJECT:]COMMAND[?][ ARG[,ARG...]]`. [`read_command_line`] frames
//! the byte stream, [`ScpiLine::parse`] tokenises one frame, and
//! [`send_reply`] writes a newline-terminated answer to a query.

mod errors;
mod io;
mod line;

pub use self::errors::LinkError;
pub use self::io::{MAX_LINE_BYTES, read_command_line, send_reply};
pub use self::line::ScpiLine;
