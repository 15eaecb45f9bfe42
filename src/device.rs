// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

use crate::error::Error;
use crate::plc::{CommType, PlcType};
use byteorder::{ByteOrder, LittleEndian};

/// One entry of the device table: the wire code for a mnemonic and the
/// numeric base its device number is written in.
///
/// Values are reconstructed from well-known MC protocol reference material
/// (see DESIGN.md) — this pack carries no machine-readable source for the
/// original device/error tables, only the distilled behavior description.
struct DeviceEntry {
    mnemonic: &'static str,
    binary_code: u8,
    ascii_code: &'static str,
    base: u32,
}

const DEVICE_TABLE: &[DeviceEntry] = &[
    DeviceEntry { mnemonic: "SM", binary_code: 0x91, ascii_code: "SM", base: 10 },
    DeviceEntry { mnemonic: "SD", binary_code: 0xA9, ascii_code: "SD", base: 10 },
    DeviceEntry { mnemonic: "X", binary_code: 0x9C, ascii_code: "X", base: 16 },
    DeviceEntry { mnemonic: "Y", binary_code: 0x9D, ascii_code: "Y", base: 16 },
    DeviceEntry { mnemonic: "M", binary_code: 0x90, ascii_code: "M", base: 10 },
    DeviceEntry { mnemonic: "L", binary_code: 0x92, ascii_code: "L", base: 10 },
    DeviceEntry { mnemonic: "F", binary_code: 0x93, ascii_code: "F", base: 10 },
    DeviceEntry { mnemonic: "V", binary_code: 0x94, ascii_code: "V", base: 10 },
    DeviceEntry { mnemonic: "B", binary_code: 0xA0, ascii_code: "B", base: 16 },
    DeviceEntry { mnemonic: "D", binary_code: 0xA8, ascii_code: "D", base: 10 },
    DeviceEntry { mnemonic: "W", binary_code: 0xB4, ascii_code: "W", base: 16 },
    DeviceEntry { mnemonic: "TS", binary_code: 0xC1, ascii_code: "TS", base: 10 },
    DeviceEntry { mnemonic: "TC", binary_code: 0xC0, ascii_code: "TC", base: 10 },
    DeviceEntry { mnemonic: "TN", binary_code: 0xC2, ascii_code: "TN", base: 10 },
    DeviceEntry { mnemonic: "SS", binary_code: 0xC7, ascii_code: "SS", base: 10 },
    DeviceEntry { mnemonic: "SC", binary_code: 0xC6, ascii_code: "SC", base: 10 },
    DeviceEntry { mnemonic: "SN", binary_code: 0xC8, ascii_code: "SN", base: 10 },
    DeviceEntry { mnemonic: "CS", binary_code: 0xC4, ascii_code: "CS", base: 10 },
    DeviceEntry { mnemonic: "CC", binary_code: 0xC3, ascii_code: "CC", base: 10 },
    DeviceEntry { mnemonic: "CN", binary_code: 0xC5, ascii_code: "CN", base: 10 },
    DeviceEntry { mnemonic: "SB", binary_code: 0xA1, ascii_code: "SB", base: 16 },
    DeviceEntry { mnemonic: "SW", binary_code: 0xB5, ascii_code: "SW", base: 16 },
    DeviceEntry { mnemonic: "R", binary_code: 0xAF, ascii_code: "R", base: 10 },
    DeviceEntry { mnemonic: "ZR", binary_code: 0xB0, ascii_code: "ZR", base: 16 },
];

fn lookup(mnemonic: &str) -> Result<&'static DeviceEntry, Error> {
    DEVICE_TABLE
        .iter()
        .find(|e| e.mnemonic == mnemonic)
        .ok_or_else(|| Error::BadDevice(format!("unknown device mnemonic: {}", mnemonic)))
}

/// A parsed device reference ready for wire encoding.
#[derive(Debug, Clone, Copy)]
pub struct Device {
    binary_code: u8,
    ascii_code: &'static str,
    number: u32,
}

/// Splits `"<MNEMONIC><NUMBER>"` into its leading non-digit run and trailing
/// digit run. Both parts must be non-empty.
fn split_device(s: &str) -> Result<(&str, &str), Error> {
    let split_at = s
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| Error::BadDevice(format!("no device number in: {}", s)))?;
    let (mnemonic, number) = s.split_at(split_at);
    if mnemonic.is_empty() || number.is_empty() {
        return Err(Error::BadDevice(format!("malformed device string: {}", s)));
    }
    Ok((mnemonic, number))
}

impl Device {
    /// Parses a device string such as `"D1000"` or `"X0x1A"` against the
    /// table for `plc_type`.
    pub fn parse(s: &str, _plc_type: PlcType) -> Result<Self, Error> {
        let (mnemonic, number_str) = split_device(s)?;
        let entry = lookup(mnemonic)?;
        let number = parse_number(number_str, entry.base)
            .ok_or_else(|| Error::BadDevice(format!("invalid device number: {}", number_str)))?;
        Ok(Device {
            binary_code: entry.binary_code,
            ascii_code: entry.ascii_code,
            number,
        })
    }

    /// Appends this device's wire encoding to `out`, per §4.2.
    pub fn encode(&self, plc_type: PlcType, comm: CommType, out: &mut Vec<u8>) {
        match comm {
            CommType::Binary => self.encode_binary(plc_type, out),
            CommType::Ascii => self.encode_ascii(plc_type, out),
        }
    }

    fn encode_binary(&self, plc_type: PlcType, out: &mut Vec<u8>) {
        if plc_type.is_iq_r() {
            let mut buf = [0u8; 4];
            LittleEndian::write_u32(&mut buf, self.number);
            out.extend_from_slice(&buf);
            let mut code = [0u8; 2];
            LittleEndian::write_u16(&mut code, self.binary_code as u16);
            out.extend_from_slice(&code);
        } else {
            let mut buf = [0u8; 4];
            LittleEndian::write_u32(&mut buf, self.number);
            out.extend_from_slice(&buf[..3]);
            out.push(self.binary_code);
        }
    }

    fn encode_ascii(&self, plc_type: PlcType, out: &mut Vec<u8>) {
        out.extend_from_slice(self.ascii_code.as_bytes());
        let digits = if plc_type.is_iq_r() { 8 } else { 6 };
        let text = format!("{:0width$}", self.number, width = digits);
        out.extend_from_slice(text.as_bytes());
    }
}

/// Parses `number_str` honouring a `0x` prefix regardless of `base`, else
/// interpreting it in `base`.
fn parse_number(number_str: &str, base: u32) -> Option<u32> {
    if let Some(hex) = number_str.strip_prefix("0x").or_else(|| number_str.strip_prefix("0X")) {
        return u32::from_str_radix(hex, 16).ok();
    }
    u32::from_str_radix(number_str, base).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decimal_device() {
        let d = Device::parse("D1000", PlcType::Q).unwrap();
        assert_eq!(d.number, 1000);
        assert_eq!(d.binary_code, 0xA8);
    }

    #[test]
    fn parses_hex_device_in_hex_base() {
        let d = Device::parse("X1A", PlcType::Q).unwrap();
        assert_eq!(d.number, 0x1A);
    }

    #[test]
    fn parses_0x_prefixed_number_regardless_of_base() {
        let d = Device::parse("D0x10", PlcType::Q).unwrap();
        assert_eq!(d.number, 0x10);
    }

    #[test]
    fn unknown_mnemonic_is_bad_device() {
        assert!(Device::parse("Q5", PlcType::Q).is_err());
    }

    #[test]
    fn binary_encoding_length_matches_plc_family() {
        let d = Device::parse("D1000", PlcType::Q).unwrap();
        let mut out = Vec::new();
        d.encode(PlcType::Q, CommType::Binary, &mut out);
        assert_eq!(out.len(), 4);

        let mut out = Vec::new();
        d.encode(PlcType::IqR, CommType::Binary, &mut out);
        assert_eq!(out.len(), 6);
    }

    #[test]
    fn ascii_encoding_length_matches_plc_family() {
        let d = Device::parse("D1000", PlcType::Q).unwrap();
        let mut out = Vec::new();
        d.encode(PlcType::Q, CommType::Ascii, &mut out);
        assert_eq!(out.len(), 1 + 6);

        let mut out = Vec::new();
        d.encode(PlcType::IqR, CommType::Ascii, &mut out);
        assert_eq!(out.len(), 1 + 8);
    }

    #[test]
    fn ascii_encoding_length_for_multi_char_mnemonic() {
        let d = Device::parse("SM400", PlcType::Q).unwrap();
        let mut out = Vec::new();
        d.encode(PlcType::Q, CommType::Ascii, &mut out);
        assert_eq!(out.len(), 2 + 6);
    }
}
