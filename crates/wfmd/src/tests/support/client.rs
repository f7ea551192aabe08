//! Minimal control-port client for end-to-end tests.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

/// Line-oriented client talking to a running listener.
pub struct ScpiClient {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
}

impl ScpiClient {
    pub fn connect(addr: SocketAddr) -> Self {
        let writer = TcpStream::connect(addr).expect("connect control client");
        writer
            .set_read_timeout(Some(Duration::from_secs(2)))
            .expect("set read timeout");
        let reader = BufReader::new(writer.try_clone().expect("clone client stream"));
        Self { reader, writer }
    }

    /// Sends raw text; callers supply the terminators.
    pub fn send(&mut self, text: &str) {
        self.writer
            .write_all(text.as_bytes())
            .expect("write command");
        self.writer.flush().expect("flush command");
    }

    /// Reads one reply line without its newline.
    pub fn read_reply(&mut self) -> String {
        let mut reply = String::new();
        self.reader.read_line(&mut reply).expect("read reply");
        reply.trim_end_matches('\n').to_owned()
    }

    /// Returns `true` once the server has closed the connection.
    pub fn sees_close(&mut self) -> bool {
        let mut buffer = [0_u8; 16];
        matches!(self.reader.read(&mut buffer), Ok(0))
    }

    pub fn close(self) {
        let _ = self.writer.shutdown(Shutdown::Both);
    }
}
