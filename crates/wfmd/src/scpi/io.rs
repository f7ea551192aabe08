//! Framing of command lines and replies on the control socket.

use std::io::{self, BufRead, Write};

use super::LinkError;

/// Largest command line accepted before the connection is dropped.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Reads one command line, excluding its `\n` or `;` terminator.
///
/// The reader is consumed one byte at a time so that a `;` separating two
/// commands leaves the second one buffered for the next call.
///
/// # Errors
///
/// Returns [`LinkError::Disconnected`] when the peer closes the connection
/// before a terminator arrives, [`LinkError::LineTooLong`] when the line
/// exceeds [`MAX_LINE_BYTES`], and [`LinkError::Io`] when the read fails.
pub fn read_command_line<R: BufRead>(reader: &mut R) -> Result<String, LinkError> {
    let mut line = Vec::new();
    loop {
        let Some(byte) = read_byte(reader)? else {
            return Err(LinkError::Disconnected);
        };
        if byte == b'\n' || byte == b';' {
            return Ok(String::from_utf8_lossy(&line).into_owned());
        }
        line.push(byte);
        if line.len() > MAX_LINE_BYTES {
            return Err(LinkError::LineTooLong {
                limit: MAX_LINE_BYTES,
            });
        }
    }
}

/// Writes `reply` followed by `\n` and flushes the stream.
///
/// # Errors
///
/// Returns [`LinkError::Io`] if the full payload could not be written.
pub fn send_reply<W: Write>(writer: &mut W, reply: &str) -> Result<(), LinkError> {
    let mut payload = String::with_capacity(reply.len() + 1);
    payload.push_str(reply);
    payload.push('\n');
    writer.write_all(payload.as_bytes())?;
    writer.flush()?;
    Ok(())
}

fn read_byte<R: BufRead>(reader: &mut R) -> io::Result<Option<u8>> {
    loop {
        let byte = match reader.fill_buf() {
            Ok([]) => return Ok(None),
            Ok([first, ..]) => *first,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        };
        reader.consume(1);
        return Ok(Some(byte));
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufReader, Cursor};

    use super::*;

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn splits_on_newline_and_semicolon() {
        let mut reader = BufReader::new(Cursor::new(b"C1:ON;C2:ON\n*IDN?\n".to_vec()));
        assert_eq!(read_command_line(&mut reader).expect("first"), "C1:ON");
        assert_eq!(read_command_line(&mut reader).expect("second"), "C2:ON");
        assert_eq!(read_command_line(&mut reader).expect("third"), "*IDN?");
    }

    #[test]
    fn empty_frames_are_returned_as_empty_lines() {
        let mut reader = BufReader::new(Cursor::new(b";\n".to_vec()));
        assert_eq!(read_command_line(&mut reader).expect("first"), "");
        assert_eq!(read_command_line(&mut reader).expect("second"), "");
    }

    #[test]
    fn unterminated_tail_reports_disconnect() {
        let mut reader = BufReader::new(Cursor::new(b"STOP".to_vec()));
        let error = read_command_line(&mut reader).expect_err("no terminator");
        assert!(matches!(error, LinkError::Disconnected));
    }

    #[test]
    fn closed_stream_reports_disconnect() {
        let mut reader = BufReader::new(Cursor::new(Vec::new()));
        let error = read_command_line(&mut reader).expect_err("eof");
        assert!(matches!(error, LinkError::Disconnected));
    }

    #[test]
    fn oversized_line_is_rejected() {
        let mut reader = BufReader::new(Cursor::new(vec![b'A'; MAX_LINE_BYTES + 2]));
        let error = read_command_line(&mut reader).expect_err("too long");
        assert!(matches!(error, LinkError::LineTooLong { .. }));
    }

    #[test]
    fn reply_is_newline_terminated() {
        let mut output = Vec::new();
        send_reply(&mut output, "4").expect("send");
        assert_eq!(output, b"4\n");
    }

    #[test]
    fn failed_write_is_reported() {
        let error = send_reply(&mut BrokenPipe, "4").expect_err("write fails");
        assert!(matches!(error, LinkError::Io(_)));
    }
}
