// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

use std::error;
use std::fmt;
use std::io::Error as IOError;

/// Errors produced by this crate.
#[derive(Debug)]
pub enum Error {
    /// A caller-supplied argument was out of its accepted range.
    BadArg(String),
    /// A device string could not be parsed, or its mnemonic is unknown for the PLC family.
    BadDevice(String),
    /// An invalid communication type was supplied (must be "binary" or "ascii").
    BadCommType,
    /// An invalid PLC type was supplied (must be "Q", "L", "QnA", "iQ-L" or "iQ-R").
    BadPlcType,
    /// A value does not fit the declared wire width.
    EncodingRange(String),
    /// The underlying transport failed (resolve/connect/send/recv/close).
    Transport(String),
    /// The receive deadline elapsed before a response arrived.
    Timeout,
    /// The PLC answered with a non-zero status code.
    ProtocolError { code: u16, message: &'static str },
    /// An operation was attempted while the session is not connected.
    Disconnected,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::BadArg(s) => write!(f, "invalid argument: {}", s),
            Error::BadDevice(s) => write!(f, "invalid device: {}", s),
            Error::BadCommType => write!(f, "comm type must be \"binary\" or \"ascii\""),
            Error::BadPlcType => {
                write!(f, "plc type must be \"Q\", \"L\", \"QnA\", \"iQ-L\" or \"iQ-R\"")
            }
            Error::EncodingRange(s) => write!(f, "value out of encodable range: {}", s),
            Error::Transport(s) => write!(f, "transport error: {}", s),
            Error::Timeout => write!(f, "receive timeout"),
            Error::ProtocolError { code, message } => {
                write!(f, "protocol error 0x{:04x}: {}", code, message)
            }
            Error::Disconnected => write!(f, "not connected"),
        }
    }
}

impl From<IOError> for Error {
    fn from(e: IOError) -> Self {
        Error::Transport(e.to_string())
    }
}

// This is important for other errors to wrap this one.
impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        None
    }
}

/// Builds a `ProtocolError` from a raw status code, looking up its message in
/// the static MC protocol status table.
pub(crate) fn protocol_error(code: u16) -> Error {
    Error::ProtocolError {
        code,
        message: status_text(code),
    }
}

/// Translates an MC protocol status code to its reference message.
///
/// Codes not listed here still raise correctly, just with the generic message.
fn status_text(code: u16) -> &'static str {
    match code {
        0x0000 => "normal completion",
        0x0051 => "the number of read/write points is outside the allowable range",
        0x0052 => "the request data length does not match the data count",
        0x0054 => "the specified command/subcommand is not supported by this PLC",
        0x0055 => "the specified command cannot be executed for the target CPU",
        0x0058 => "online change is disabled while the PLC is running",
        0x00C0 => "the requested points or device range exceed the limit",
        0x00C1 => "the request data length does not agree with the byte count",
        0x00C2 => "the command/subcommand combination is not supported",
        0x00C4 => "a write was attempted while PLC protection is enabled",
        0x00C8 => "the device specified in the request is not supported by the module",
        0x00CA => "the request contents error (out of device range, etc.)",
        0x00CC => "monitor registration has not been executed",
        0x00CE => "the number of blocks/points exceeds the allowed maximum",
        0x00CF => "an error was found in the request contents (device designation, etc.)",
        0x00F0 => "the number of read/write points for a random access request is incorrect",
        0x00F1 => "the CPU module was in a state that could not execute the command (STOP/PAUSE)",
        0x00F3 => "the remote password is incorrect or the PLC is locked",
        0x00FA => "the remote password must be unlocked before this request",
        0x00FB => "the remote password has already been unlocked from another line",
        0x4000 => "CAN communication error between the module and the CPU",
        _ => "unknown or reserved status code",
    }
}
