// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! A client for the Mitsubishi MELSEC Communication Protocol (MC protocol),
//! frame type 3E, for reading and writing PLC device memory, controlling
//! PLC execution state, reading CPU identity, and remote password locks.
//!
//! # Examples
//! ```no_run
//! use mcprotocol::client::Client;
//! use mcprotocol::plc::{CommType, PlcType};
//! use mcprotocol::tcp::TcpTransport;
//!
//! # fn main() -> Result<(), mcprotocol::error::Error> {
//! let mut client = Client::new(TcpTransport::new(), PlcType::Q, CommType::Binary);
//! client.connect("192.168.0.10", 5007)?;
//!
//! let values = client.batchread_wordunits("D1000", 2)?;
//! println!("{:?}", values);
//!
//! client.close()?;
//! # Ok(())
//! # }
//! ```
pub mod client;
pub mod codec;
pub mod device;
pub mod error;
pub mod frame;
pub mod plc;
pub mod tcp;
pub mod transport;
