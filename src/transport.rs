// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! Transport definition for the PLC session.

use super::error::Error;
use std::time::Duration;

/// The byte-stream transport a `Client` drives.
///
/// Deliberately thinner than a protocol that negotiates PDU size or
/// connection class: MC protocol frames are built and parsed entirely in
/// the session/client layer, so the transport only has to move bytes and
/// manage the socket lifecycle.
pub trait Transport {
    /// Resolves `host:port` and opens the connection.
    fn connect(&mut self, host: &str, port: u16) -> Result<(), Error>;
    /// Writes the entire buffer, blocking until done.
    fn send_all(&mut self, buf: &[u8]) -> Result<(), Error>;
    /// Reads at least one byte into `buf`, returning the number read.
    fn recv(&mut self, buf: &mut [u8]) -> Result<usize, Error>;
    /// Sets the read deadline applied by subsequent `recv` calls.
    fn set_timeout(&mut self, timeout: Duration) -> Result<(), Error>;
    /// Closes the connection. Idempotent.
    fn close(&mut self) -> Result<(), Error>;
}
