// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

use crate::error::Error;
use crate::plc::CommType;
use byteorder::{ByteOrder, LittleEndian};

/// A tagged-union value to encode/decode, replacing the single-character
/// format codes (`b`, `h`, `l`, `B`, `H`, `L`) used elsewhere in this family
/// of protocol clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
}

impl Value {
    /// Width in bytes of the *binary* wire form.
    fn width(self) -> usize {
        match self {
            Value::I8(_) | Value::U8(_) => 1,
            Value::I16(_) | Value::U16(_) => 2,
            Value::I32(_) | Value::U32(_) => 4,
        }
    }

    /// Encodes into `out`, appending bytes in the requested comm type.
    pub fn encode(self, comm: CommType, out: &mut Vec<u8>) {
        match comm {
            CommType::Binary => self.encode_binary(out),
            CommType::Ascii => self.encode_ascii(out),
        }
    }

    fn encode_binary(self, out: &mut Vec<u8>) {
        match self {
            Value::I8(v) => out.push(v as u8),
            Value::U8(v) => out.push(v),
            Value::I16(v) => {
                let mut buf = [0u8; 2];
                LittleEndian::write_i16(&mut buf, v);
                out.extend_from_slice(&buf);
            }
            Value::U16(v) => {
                let mut buf = [0u8; 2];
                LittleEndian::write_u16(&mut buf, v);
                out.extend_from_slice(&buf);
            }
            Value::I32(v) => {
                let mut buf = [0u8; 4];
                LittleEndian::write_i32(&mut buf, v);
                out.extend_from_slice(&buf);
            }
            Value::U32(v) => {
                let mut buf = [0u8; 4];
                LittleEndian::write_u32(&mut buf, v);
                out.extend_from_slice(&buf);
            }
        }
    }

    fn encode_ascii(self, out: &mut Vec<u8>) {
        let (masked, digits): (u64, usize) = match self {
            Value::I8(v) => (v as u8 as u64, 2),
            Value::U8(v) => (v as u64, 2),
            Value::I16(v) => (v as u16 as u64, 4),
            Value::U16(v) => (v as u64, 4),
            Value::I32(v) => (v as u32 as u64, 8),
            Value::U32(v) => (v as u64, 8),
        };
        let hex = format!("{:0width$X}", masked, width = digits);
        out.extend_from_slice(hex.as_bytes());
    }

    /// Decodes a value of the same shape as `self` (used to pick the width
    /// and signedness) from `buf`, returning the decoded value and the
    /// number of bytes consumed.
    pub fn decode(kind: ValueKind, comm: CommType, buf: &[u8]) -> Result<(Value, usize), Error> {
        match comm {
            CommType::Binary => Self::decode_binary(kind, buf),
            CommType::Ascii => Self::decode_ascii(kind, buf),
        }
    }

    fn decode_binary(kind: ValueKind, buf: &[u8]) -> Result<(Value, usize), Error> {
        let need = kind.width();
        if buf.len() < need {
            return Err(Error::EncodingRange(format!(
                "need {} bytes to decode {:?}, got {}",
                need,
                kind,
                buf.len()
            )));
        }
        let value = match kind {
            ValueKind::I8 => Value::I8(buf[0] as i8),
            ValueKind::U8 => Value::U8(buf[0]),
            ValueKind::I16 => Value::I16(LittleEndian::read_i16(buf)),
            ValueKind::U16 => Value::U16(LittleEndian::read_u16(buf)),
            ValueKind::I32 => Value::I32(LittleEndian::read_i32(buf)),
            ValueKind::U32 => Value::U32(LittleEndian::read_u32(buf)),
        };
        Ok((value, need))
    }

    fn decode_ascii(kind: ValueKind, buf: &[u8]) -> Result<(Value, usize), Error> {
        let digits = kind.ascii_digits();
        if buf.len() < digits {
            return Err(Error::EncodingRange(format!(
                "need {} ascii digits to decode {:?}, got {}",
                digits,
                kind,
                buf.len()
            )));
        }
        let text = std::str::from_utf8(&buf[..digits])
            .map_err(|_| Error::EncodingRange("non-utf8 ascii payload".into()))?;
        let raw = u64::from_str_radix(text, 16)
            .map_err(|_| Error::EncodingRange(format!("invalid hex digits: {}", text)))?;
        let value = match kind {
            ValueKind::I8 => Value::I8(two_complement(raw, 8) as i8),
            ValueKind::U8 => Value::U8(raw as u8),
            ValueKind::I16 => Value::I16(two_complement(raw, 16) as i16),
            ValueKind::U16 => Value::U16(raw as u16),
            ValueKind::I32 => Value::I32(two_complement(raw, 32) as i32),
            ValueKind::U32 => Value::U32(raw as u32),
        };
        Ok((value, digits))
    }
}

/// Applies explicit two's-complement interpretation to an unsigned value of
/// `bits` width, as read back from an ASCII hex payload.
fn two_complement(raw: u64, bits: u32) -> i64 {
    let sign_bit = 1u64 << (bits - 1);
    if raw & sign_bit != 0 {
        raw as i64 - (1i64 << bits)
    } else {
        raw as i64
    }
}

/// The shape of a `Value` without carrying a payload, used to tell the
/// decoder what to parse before any bytes exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
}

impl ValueKind {
    fn width(self) -> usize {
        match self {
            ValueKind::I8 | ValueKind::U8 => 1,
            ValueKind::I16 | ValueKind::U16 => 2,
            ValueKind::I32 | ValueKind::U32 => 4,
        }
    }

    fn ascii_digits(self) -> usize {
        self.width() * 2
    }
}

/// Number of on-wire bytes `value` will occupy once encoded under `comm`.
pub fn encoded_len(value: Value, comm: CommType) -> usize {
    match comm {
        CommType::Binary => value.width(),
        CommType::Ascii => value.width() * 2,
    }
}
