// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! TCP transport implementation

use super::error::Error;
use super::transport::Transport as TransportTrait;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

/// Default socket read timeout, overridden once a session is configured
/// with its own `soc_timeout` (§3, access options).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A `Transport` backed by a plain `std::net::TcpStream`.
pub struct TcpTransport {
    stream: Option<TcpStream>,
}

impl TcpTransport {
    pub fn new() -> Self {
        TcpTransport { stream: None }
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportTrait for TcpTransport {
    fn connect(&mut self, host: &str, port: u16) -> Result<(), Error> {
        let stream = TcpStream::connect((host, port))?;
        stream.set_read_timeout(Some(DEFAULT_TIMEOUT))?;
        stream.set_write_timeout(Some(DEFAULT_TIMEOUT))?;
        self.stream = Some(stream);
        Ok(())
    }

    fn send_all(&mut self, buf: &[u8]) -> Result<(), Error> {
        let stream = self.stream.as_mut().ok_or(Error::Disconnected)?;
        stream.write_all(buf)?;
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        let stream = self.stream.as_mut().ok_or(Error::Disconnected)?;
        let n = stream.read(buf)?;
        Ok(n)
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<(), Error> {
        let stream = self.stream.as_mut().ok_or(Error::Disconnected)?;
        stream.set_read_timeout(Some(timeout))?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        // Dropping the TcpStream closes the socket; there is no explicit
        // std::net close, so this just releases our handle to it.
        self.stream = None;
        Ok(())
    }
}
