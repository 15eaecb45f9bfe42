// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

use crate::codec::{encoded_len, Value};
use crate::plc::CommType;

/// The routing fields every 3E frame carries ahead of its command body.
#[derive(Debug, Clone, Copy)]
pub struct FrameHeader {
    pub network: u8,
    pub pc: u8,
    pub dest_moduleio: u16,
    pub dest_modulesta: u8,
    pub timer: u16,
}

const SUBHEADER: u16 = 0x5000;

/// Builds a full request frame: subheader, routing fields, length, timer,
/// then `body` verbatim (the caller has already encoded it in `comm`).
pub fn build_request(header: FrameHeader, comm: CommType, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();

    match comm {
        CommType::Binary => {
            out.extend_from_slice(&SUBHEADER.to_be_bytes());
        }
        CommType::Ascii => {
            out.extend_from_slice(format!("{:04X}", SUBHEADER).as_bytes());
        }
    }

    Value::U8(header.network).encode(comm, &mut out);
    Value::U8(header.pc).encode(comm, &mut out);
    Value::U16(header.dest_moduleio).encode(comm, &mut out);
    Value::U8(header.dest_modulesta).encode(comm, &mut out);

    let wordsize = match comm {
        CommType::Binary => 2,
        CommType::Ascii => 4,
    };
    let length = (wordsize + body.len()) as u16;
    Value::U16(length).encode(comm, &mut out);
    Value::U16(header.timer).encode(comm, &mut out);

    out.extend_from_slice(body);
    out
}

/// Byte offset of the status field in a response, by comm type.
pub fn status_offset(comm: CommType) -> usize {
    match comm {
        CommType::Binary => 9,
        CommType::Ascii => 18,
    }
}

/// Byte offset of the payload in a response, by comm type.
pub fn payload_offset(comm: CommType) -> usize {
    match comm {
        CommType::Binary => 11,
        CommType::Ascii => 22,
    }
}
