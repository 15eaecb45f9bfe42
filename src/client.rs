// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! The MC protocol 3E client: owns a transport, a PLC dialect, and the
//! access-options record, and exposes the 14 public operations.

use super::codec::{Value, ValueKind};
use super::device::Device;
use super::error::{protocol_error, Error};
use super::frame::{build_request, payload_offset, status_offset, FrameHeader};
use super::plc::{CommType, Dialect, PlcType};
use super::transport::Transport;
use log::{debug, info, warn};
use std::thread::sleep;
use std::time::Duration;

const CMD_BATCH_READ: u16 = 0x0401;
const CMD_BATCH_WRITE: u16 = 0x1401;
const CMD_RANDOM_READ: u16 = 0x0403;
const CMD_RANDOM_WRITE: u16 = 0x1402;
const CMD_REMOTE_RUN: u16 = 0x1001;
const CMD_REMOTE_STOP: u16 = 0x1002;
const CMD_REMOTE_PAUSE: u16 = 0x1003;
const CMD_REMOTE_LATCH_CLEAR: u16 = 0x1005;
const CMD_REMOTE_RESET: u16 = 0x1006;
const CMD_READ_CPU_TYPE: u16 = 0x0101;
const CMD_REMOTE_UNLOCK: u16 = 0x1630;
const CMD_REMOTE_LOCK: u16 = 0x1631;
const CMD_ECHO_TEST: u16 = 0x0619;

const SUB_NONE: u16 = 0x0000;

const MAX_RESPONSE: usize = 4096;

/// Access options record (§3); any subset of its fields can be updated
/// after construction via [`Client::set_access_options`].
#[derive(Debug, Clone, Copy)]
pub struct AccessOptions {
    pub network: u8,
    pub pc: u8,
    pub dest_moduleio: u16,
    pub dest_modulesta: u8,
    /// PLC-side wait budget, in 250 ms units.
    pub timer: u16,
    /// Transport read deadline, maintained as `timer_sec + 1`.
    pub soc_timeout: Duration,
}

impl Default for AccessOptions {
    fn default() -> Self {
        AccessOptions {
            network: 0,
            pc: 0xFF,
            dest_moduleio: 0x03FF,
            dest_modulesta: 0x00,
            timer: 4,
            soc_timeout: Duration::from_secs(2),
        }
    }
}

/// An update to a subset of [`AccessOptions`].
///
/// Every field is an explicit `Option` rather than treating a zero value as
/// "not provided" (the source implementation keys this off truthiness,
/// which means a caller there can never set a field to 0 — see DESIGN.md).
#[derive(Debug, Clone, Default)]
pub struct AccessOptionsUpdate {
    /// New wire encoding, as the string accepted by [`CommType::from_str`]
    /// (`"binary"` or `"ascii"`).
    pub commtype: Option<String>,
    pub network: Option<u8>,
    pub pc: Option<u8>,
    pub dest_moduleio: Option<u16>,
    pub dest_modulesta: Option<u8>,
    /// Request timeout in whole seconds; internally stored as `4 * timer_sec`.
    pub timer_sec: Option<u16>,
}

/// A session talking MC protocol 3E frames to one PLC over `T`.
pub struct Client<T: Transport> {
    transport: T,
    host: String,
    port: u16,
    plc_type: PlcType,
    dialect: Dialect,
    comm_type: CommType,
    access: AccessOptions,
    connected: bool,
}

impl<T: Transport> Client<T> {
    /// Builds a session for `plc_type` over `comm_type`, not yet connected.
    pub fn new(transport: T, plc_type: PlcType, comm_type: CommType) -> Self {
        Client {
            transport,
            host: String::new(),
            port: 0,
            plc_type,
            dialect: Dialect::for_plc(plc_type),
            comm_type,
            access: AccessOptions::default(),
            connected: false,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Opens the transport to `host:port` and applies the current socket
    /// timeout.
    pub fn connect(&mut self, host: &str, port: u16) -> Result<(), Error> {
        self.transport.connect(host, port)?;
        self.transport.set_timeout(self.access.soc_timeout)?;
        self.host = host.to_string();
        self.port = port;
        self.connected = true;
        info!("connected to {}:{}", host, port);
        Ok(())
    }

    /// Closes the transport. Idempotent.
    pub fn close(&mut self) -> Result<(), Error> {
        if self.connected {
            self.transport.close()?;
            self.connected = false;
            info!("closed connection to {}:{}", self.host, self.port);
        }
        Ok(())
    }

    /// Updates any subset of the access options. Each present field is
    /// bounds-checked before being applied.
    pub fn set_access_options(&mut self, update: AccessOptionsUpdate) -> Result<(), Error> {
        let mut next = self.access;

        if let Some(commtype) = &update.commtype {
            self.comm_type = CommType::from_str(commtype)?;
        }
        if let Some(network) = update.network {
            next.network = network;
        }
        if let Some(pc) = update.pc {
            next.pc = pc;
        }
        if let Some(dest_moduleio) = update.dest_moduleio {
            next.dest_moduleio = dest_moduleio;
        }
        if let Some(dest_modulesta) = update.dest_modulesta {
            next.dest_modulesta = dest_modulesta;
        }
        if let Some(timer_sec) = update.timer_sec {
            let timer = (timer_sec as u32) * 4;
            if timer > 16383 {
                return Err(Error::BadArg(format!(
                    "timer_sec {} exceeds the 16383-unit PLC timer range",
                    timer_sec
                )));
            }
            next.timer = timer as u16;
            next.soc_timeout = Duration::from_secs(u64::from(timer_sec) + 1);
        }

        self.access = next;
        if self.connected {
            self.transport.set_timeout(self.access.soc_timeout)?;
        }
        Ok(())
    }

    fn header(&self) -> FrameHeader {
        FrameHeader {
            network: self.access.network,
            pc: self.access.pc,
            dest_moduleio: self.access.dest_moduleio,
            dest_modulesta: self.access.dest_modulesta,
            timer: self.access.timer,
        }
    }

    fn device(&self, s: &str) -> Result<Device, Error> {
        Device::parse(s, self.plc_type)
    }

    /// Builds a frame for `(cmd, subcmd, payload)`, sends it, reads one
    /// response, validates status, and returns the payload slice.
    fn exchange(&mut self, cmd: u16, subcmd: u16, payload: &[u8]) -> Result<Vec<u8>, Error> {
        if !self.connected {
            return Err(Error::Disconnected);
        }

        let mut body = Vec::new();
        Value::U16(cmd).encode(self.comm_type, &mut body);
        Value::U16(subcmd).encode(self.comm_type, &mut body);
        body.extend_from_slice(payload);

        let frame = build_request(self.header(), self.comm_type, &body);
        debug!("-> {}", hex(&frame));
        self.transport.send_all(&frame)?;

        let mut buf = vec![0u8; MAX_RESPONSE];
        let n = self.transport.recv(&mut buf)?;
        let resp = &buf[..n];
        debug!("<- {}", hex(resp));

        let status = read_status(self.comm_type, resp)?;
        if status != 0 {
            return Err(protocol_error(status));
        }

        let off = payload_offset(self.comm_type);
        Ok(resp[off..].to_vec())
    }

    /// Reads `size` 16-bit words starting at `head_device`.
    pub fn batchread_wordunits(&mut self, head_device: &str, size: u16) -> Result<Vec<i16>, Error> {
        let dev = self.device(head_device)?;
        let mut payload = Vec::new();
        dev.encode(self.plc_type, self.comm_type, &mut payload);
        Value::U16(size).encode(self.comm_type, &mut payload);

        let resp = self.exchange(CMD_BATCH_READ, self.dialect.subcommand_normal, &payload)?;
        decode_words(&resp, size, self.comm_type)
    }

    /// Reads `size` bit units starting at `head_device`, returning one
    /// `0`/`1` entry per bit.
    pub fn batchread_bitunits(&mut self, head_device: &str, size: u16) -> Result<Vec<u8>, Error> {
        let dev = self.device(head_device)?;
        let mut payload = Vec::new();
        dev.encode(self.plc_type, self.comm_type, &mut payload);
        Value::U16(size).encode(self.comm_type, &mut payload);

        let resp = self.exchange(CMD_BATCH_READ, self.dialect.subcommand_random, &payload)?;
        decode_bits(&resp, size, self.comm_type)
    }

    /// Writes `values` starting at `head_device`.
    pub fn batchwrite_wordunits(&mut self, head_device: &str, values: &[i16]) -> Result<(), Error> {
        let dev = self.device(head_device)?;
        let mut payload = Vec::new();
        dev.encode(self.plc_type, self.comm_type, &mut payload);
        Value::U16(values.len() as u16).encode(self.comm_type, &mut payload);
        for &v in values {
            Value::I16(v).encode(self.comm_type, &mut payload);
        }

        self.exchange(CMD_BATCH_WRITE, self.dialect.subcommand_normal, &payload)?;
        Ok(())
    }

    /// Writes bit `values` (each must be 0 or 1) starting at `head_device`.
    pub fn batchwrite_bitunits(&mut self, head_device: &str, values: &[u8]) -> Result<(), Error> {
        for &v in values {
            if v > 1 {
                return Err(Error::BadArg(format!("bit value must be 0 or 1, got {}", v)));
            }
        }
        let dev = self.device(head_device)?;
        let mut payload = Vec::new();
        dev.encode(self.plc_type, self.comm_type, &mut payload);
        Value::U16(values.len() as u16).encode(self.comm_type, &mut payload);
        encode_bits(values, self.comm_type, &mut payload);

        self.exchange(CMD_BATCH_WRITE, self.dialect.subcommand_random, &payload)?;
        Ok(())
    }

    /// Reads a mixed set of word and dword devices in one request.
    pub fn randomread(
        &mut self,
        word_devices: &[&str],
        dword_devices: &[&str],
    ) -> Result<(Vec<i16>, Vec<i32>), Error> {
        if word_devices.len() > 255 || dword_devices.len() > 255 {
            return Err(Error::BadArg("device count exceeds 255".into()));
        }

        let mut payload = Vec::new();
        Value::U8(word_devices.len() as u8).encode(self.comm_type, &mut payload);
        Value::U8(dword_devices.len() as u8).encode(self.comm_type, &mut payload);
        for d in word_devices {
            self.device(d)?.encode(self.plc_type, self.comm_type, &mut payload);
        }
        for d in dword_devices {
            self.device(d)?.encode(self.plc_type, self.comm_type, &mut payload);
        }

        let resp = self.exchange(CMD_RANDOM_READ, self.dialect.subcommand_normal, &payload)?;
        let mut cursor = 0usize;
        let mut words = Vec::with_capacity(word_devices.len());
        for _ in 0..word_devices.len() {
            let (value, used) = Value::decode(ValueKind::I16, self.comm_type, &resp[cursor..])?;
            cursor += used;
            words.push(expect_i16(value));
        }
        let mut dwords = Vec::with_capacity(dword_devices.len());
        for _ in 0..dword_devices.len() {
            let (value, used) = Value::decode(ValueKind::I32, self.comm_type, &resp[cursor..])?;
            cursor += used;
            dwords.push(expect_i32(value));
        }
        Ok((words, dwords))
    }

    /// Writes a mixed set of word and dword device/value pairs.
    pub fn randomwrite(
        &mut self,
        word_values: &[(&str, i16)],
        dword_values: &[(&str, i32)],
    ) -> Result<(), Error> {
        if word_values.len() > 255 || dword_values.len() > 255 {
            return Err(Error::BadArg("device count exceeds 255".into()));
        }

        let mut payload = Vec::new();
        Value::U8(word_values.len() as u8).encode(self.comm_type, &mut payload);
        Value::U8(dword_values.len() as u8).encode(self.comm_type, &mut payload);
        for (dev, value) in word_values {
            self.device(dev)?.encode(self.plc_type, self.comm_type, &mut payload);
            Value::I16(*value).encode(self.comm_type, &mut payload);
        }
        for (dev, value) in dword_values {
            self.device(dev)?.encode(self.plc_type, self.comm_type, &mut payload);
            Value::I32(*value).encode(self.comm_type, &mut payload);
        }

        self.exchange(CMD_RANDOM_WRITE, self.dialect.subcommand_normal, &payload)?;
        Ok(())
    }

    /// Writes single bit values to arbitrary devices in one request.
    pub fn randomwrite_bitunits(&mut self, values: &[(&str, u8)]) -> Result<(), Error> {
        if values.len() > 255 {
            return Err(Error::BadArg("device count exceeds 255".into()));
        }
        let mut payload = Vec::new();
        Value::U8(values.len() as u8).encode(self.comm_type, &mut payload);
        for (dev, value) in values {
            if *value > 1 {
                return Err(Error::BadArg(format!("bit value must be 0 or 1, got {}", value)));
            }
            self.device(dev)?.encode(self.plc_type, self.comm_type, &mut payload);
            if self.plc_type.is_iq_r() {
                Value::I16(*value as i16).encode(self.comm_type, &mut payload);
            } else {
                Value::I8(*value as i8).encode(self.comm_type, &mut payload);
            }
        }

        self.exchange(CMD_RANDOM_WRITE, self.dialect.subcommand_random, &payload)?;
        Ok(())
    }

    /// Sets the PLC to RUN. `clear_mode` must be 0 (no clear), 1 (clear
    /// device memory) or 2 (clear device memory and latches).
    pub fn remote_run(&mut self, clear_mode: u8, force_exec: bool) -> Result<(), Error> {
        if clear_mode > 2 {
            return Err(Error::BadArg(format!("clear_mode must be 0, 1 or 2, got {}", clear_mode)));
        }
        let mode: u16 = if force_exec { 0x0003 } else { 0x0001 };
        let mut payload = Vec::new();
        Value::U16(mode).encode(self.comm_type, &mut payload);
        Value::U8(clear_mode).encode(self.comm_type, &mut payload);
        Value::U8(0).encode(self.comm_type, &mut payload);

        self.exchange(CMD_REMOTE_RUN, SUB_NONE, &payload)?;
        Ok(())
    }

    pub fn remote_stop(&mut self) -> Result<(), Error> {
        let mut payload = Vec::new();
        Value::U16(0x0001).encode(self.comm_type, &mut payload);
        self.exchange(CMD_REMOTE_STOP, SUB_NONE, &payload)?;
        Ok(())
    }

    pub fn remote_pause(&mut self, force_exec: bool) -> Result<(), Error> {
        let mode: u16 = if force_exec { 0x0003 } else { 0x0001 };
        let mut payload = Vec::new();
        Value::U16(mode).encode(self.comm_type, &mut payload);
        self.exchange(CMD_REMOTE_PAUSE, SUB_NONE, &payload)?;
        Ok(())
    }

    /// Clears device latches. The caller is responsible for first stopping
    /// the PLC (the protocol does not accept this command while running).
    pub fn remote_latchclear(&mut self) -> Result<(), Error> {
        let mut payload = Vec::new();
        Value::U16(0x0001).encode(self.comm_type, &mut payload);
        self.exchange(CMD_REMOTE_LATCH_CLEAR, SUB_NONE, &payload)?;
        Ok(())
    }

    /// Resets the CPU. The PLC may tear down the socket before replying, so
    /// this follows a dedicated recovery protocol: a short read timeout,
    /// and on any transport failure, a marked disconnect followed by a
    /// one-second pause and reconnect.
    pub fn remote_reset(&mut self) -> Result<(), Error> {
        let mut payload = Vec::new();
        Value::U16(0x0001).encode(self.comm_type, &mut payload);

        self.transport.set_timeout(Duration::from_secs(1))?;
        let result = self.exchange(CMD_REMOTE_RESET, SUB_NONE, &payload);

        match result {
            Ok(_) => {
                self.transport.set_timeout(self.access.soc_timeout)?;
                Ok(())
            }
            Err(_) => {
                warn!("remote_reset: connection dropped by PLC, reconnecting");
                self.connected = false;
                sleep(Duration::from_secs(1));
                let host = self.host.clone();
                let port = self.port;
                self.connect(&host, port)
            }
        }
    }

    /// Reads the CPU name and type code.
    pub fn read_cputype(&mut self) -> Result<(String, String), Error> {
        let resp = self.exchange(CMD_READ_CPU_TYPE, SUB_NONE, &[])?;
        let code_end = match self.comm_type {
            CommType::Binary => 18,
            CommType::Ascii => 20,
        };
        if resp.len() < code_end {
            return Err(Error::Transport("truncated read_cputype response".into()));
        }
        let name = String::from_utf8_lossy(&resp[..16]).trim().to_string();

        let code = match self.comm_type {
            CommType::Binary => {
                let code_bytes = &resp[16..18];
                format!("{:04x}", u16::from_le_bytes([code_bytes[0], code_bytes[1]]))
            }
            CommType::Ascii => String::from_utf8_lossy(&resp[16..20]).to_string(),
        };
        Ok((name, code))
    }

    /// Unlocks the remote password. `password` must be ASCII and within the
    /// PLC family's length range (iQ-R: 6-32, others: exactly 4).
    pub fn remote_unlock(&mut self, password: &str) -> Result<(), Error> {
        self.validate_password(password)?;
        let payload = password_payload(password, self.comm_type);
        self.exchange(CMD_REMOTE_UNLOCK, SUB_NONE, &payload)?;
        Ok(())
    }

    /// Re-locks the remote password.
    pub fn remote_lock(&mut self, password: &str) -> Result<(), Error> {
        self.validate_password(password)?;
        let payload = password_payload(password, self.comm_type);
        self.exchange(CMD_REMOTE_LOCK, SUB_NONE, &payload)?;
        Ok(())
    }

    /// Like [`Client::remote_unlock`], but obtains the password from
    /// `prompt` rather than a caller-supplied string — the only place in
    /// this crate that a console interaction might happen, and it happens
    /// outside the core via injection rather than a direct stdin read.
    pub fn remote_unlock_with_prompt(&mut self, prompt: impl FnOnce() -> String) -> Result<(), Error> {
        let password = prompt();
        self.remote_unlock(&password)
    }

    fn validate_password(&self, password: &str) -> Result<(), Error> {
        if !password.is_ascii() {
            return Err(Error::BadArg("password must be ASCII".into()));
        }
        let len = password.len();
        let ok = if self.plc_type.is_iq_r() {
            (6..=32).contains(&len)
        } else {
            len == 4
        };
        if !ok {
            return Err(Error::BadArg(format!(
                "password length {} invalid for this PLC family",
                len
            )));
        }
        Ok(())
    }

    /// Sends `data` and verifies the PLC echoes it back unchanged.
    pub fn echo_test(&mut self, data: &str) -> Result<(u16, String), Error> {
        if data.is_empty() || data.len() > 960 || !data.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::BadArg("echo data must be 1-960 alphanumeric characters".into()));
        }

        let mut payload = Vec::new();
        Value::U16(data.len() as u16).encode(self.comm_type, &mut payload);
        payload.extend_from_slice(data.as_bytes());

        let resp = self.exchange(CMD_ECHO_TEST, SUB_NONE, &payload)?;
        let (len_value, used) = Value::decode(ValueKind::U16, self.comm_type, &resp)?;
        let len = expect_u16(len_value) as usize;
        let answer = String::from_utf8_lossy(&resp[used..used + len]).to_string();
        Ok((len as u16, answer))
    }
}

impl<T: Transport> Drop for Client<T> {
    fn drop(&mut self) {
        if self.connected {
            if let Err(e) = self.transport.close() {
                warn!("error closing transport on drop: {}", e);
            }
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn read_status(comm: CommType, resp: &[u8]) -> Result<u16, Error> {
    let off = status_offset(comm);
    match comm {
        CommType::Binary => {
            if resp.len() < off + 2 {
                return Err(Error::Transport("response too short for status field".into()));
            }
            Ok(u16::from_le_bytes([resp[off], resp[off + 1]]))
        }
        CommType::Ascii => {
            if resp.len() < off + 4 {
                return Err(Error::Transport("response too short for status field".into()));
            }
            let text = std::str::from_utf8(&resp[off..off + 4])
                .map_err(|_| Error::Transport("non-utf8 status field".into()))?;
            u16::from_str_radix(text, 16)
                .map_err(|_| Error::Transport(format!("invalid status digits: {}", text)))
        }
    }
}

fn decode_words(resp: &[u8], size: u16, comm: CommType) -> Result<Vec<i16>, Error> {
    let mut out = Vec::with_capacity(size as usize);
    let mut cursor = 0usize;
    for _ in 0..size {
        let (value, used) = Value::decode(ValueKind::I16, comm, &resp[cursor..])?;
        cursor += used;
        out.push(expect_i16(value));
    }
    Ok(out)
}

/// Unpacks `size` bit values from a batch-read response payload.
///
/// Binary responses pack two values per byte: the even-indexed bit sits in
/// bit 4, the odd-indexed bit in bit 0. ASCII responses carry one `'0'`/`'1'`
/// character per bit.
fn decode_bits(resp: &[u8], size: u16, comm: CommType) -> Result<Vec<u8>, Error> {
    let size = size as usize;
    match comm {
        CommType::Binary => {
            let need = size.div_ceil(2);
            if resp.len() < need {
                return Err(Error::Transport("truncated bit response".into()));
            }
            let mut out = Vec::with_capacity(size);
            for i in 0..size {
                let byte = resp[i / 2];
                let bit = if i % 2 == 0 { (byte >> 4) & 0x1 } else { byte & 0x1 };
                out.push(bit);
            }
            Ok(out)
        }
        CommType::Ascii => {
            if resp.len() < size {
                return Err(Error::Transport("truncated bit response".into()));
            }
            Ok(resp[..size]
                .iter()
                .map(|&c| if c == b'1' { 1 } else { 0 })
                .collect())
        }
    }
}

/// Packs `values` (each 0 or 1) for a batch-write bit request, the inverse
/// of [`decode_bits`].
fn encode_bits(values: &[u8], comm: CommType, out: &mut Vec<u8>) {
    match comm {
        CommType::Binary => {
            let mut bytes = vec![0u8; values.len().div_ceil(2)];
            for (i, &v) in values.iter().enumerate() {
                if i % 2 == 0 {
                    bytes[i / 2] |= v << 4;
                } else {
                    bytes[i / 2] |= v;
                }
            }
            out.extend_from_slice(&bytes);
        }
        CommType::Ascii => {
            for &v in values {
                out.push(if v == 1 { b'1' } else { b'0' });
            }
        }
    }
}

fn password_payload(password: &str, comm: CommType) -> Vec<u8> {
    let mut out = Vec::new();
    Value::U16(password.len() as u16).encode(comm, &mut out);
    out.extend_from_slice(password.as_bytes());
    out
}

fn expect_i16(v: Value) -> i16 {
    match v {
        Value::I16(x) => x,
        _ => unreachable!("decode(ValueKind::I16, ..) always returns Value::I16"),
    }
}

fn expect_i32(v: Value) -> i32 {
    match v {
        Value::I32(x) => x,
        _ => unreachable!("decode(ValueKind::I32, ..) always returns Value::I32"),
    }
}

fn expect_u16(v: Value) -> u16 {
    match v {
        Value::U16(x) => x,
        _ => unreachable!("decode(ValueKind::U16, ..) always returns Value::U16"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// An in-process fake transport: feeds back pre-scripted responses and
    /// records what was sent, so tests are deterministic without a live PLC.
    struct FakeTransport {
        sent: Vec<Vec<u8>>,
        responses: VecDeque<Vec<u8>>,
        connected: bool,
    }

    impl FakeTransport {
        fn new(responses: Vec<Vec<u8>>) -> Self {
            FakeTransport {
                sent: Vec::new(),
                responses: responses.into(),
                connected: false,
            }
        }
    }

    impl Transport for FakeTransport {
        fn connect(&mut self, _host: &str, _port: u16) -> Result<(), Error> {
            self.connected = true;
            Ok(())
        }

        fn send_all(&mut self, buf: &[u8]) -> Result<(), Error> {
            self.sent.push(buf.to_vec());
            Ok(())
        }

        fn recv(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
            let resp = self.responses.pop_front().ok_or(Error::Timeout)?;
            buf[..resp.len()].copy_from_slice(&resp);
            Ok(resp.len())
        }

        fn set_timeout(&mut self, _timeout: Duration) -> Result<(), Error> {
            Ok(())
        }

        fn close(&mut self) -> Result<(), Error> {
            self.connected = false;
            Ok(())
        }
    }

    fn response_with_payload(comm: CommType, payload: &[u8]) -> Vec<u8> {
        let mut resp = vec![0u8; payload_offset(comm)];
        resp.extend_from_slice(payload);
        resp
    }

    #[test]
    fn batchread_wordunits_decodes_signed_and_unsigned_words() {
        let resp = response_with_payload(CommType::Binary, &[0x34, 0x12, 0xff, 0xff]);
        let transport = FakeTransport::new(vec![resp]);
        let mut client = Client::new(transport, PlcType::Q, CommType::Binary);
        client.connect("127.0.0.1", 5007).unwrap();

        let values = client.batchread_wordunits("D1000", 2).unwrap();
        assert_eq!(values, vec![0x1234, -1]);
    }

    #[test]
    fn batchwrite_bitunits_packs_per_spec_scenario() {
        let resp = response_with_payload(CommType::Binary, &[]);
        let transport = FakeTransport::new(vec![resp]);
        let mut client = Client::new(transport, PlcType::Q, CommType::Binary);
        client.connect("127.0.0.1", 5007).unwrap();

        client.batchwrite_bitunits("M0", &[1, 0, 1, 1, 0]).unwrap();
        let sent = &client.transport.sent[0];
        let body_start = sent.len() - 3;
        assert_eq!(&sent[body_start..], &[0x10, 0x11, 0x00]);
    }

    #[test]
    fn batchwrite_bitunits_rejects_non_bit_values() {
        let transport = FakeTransport::new(vec![]);
        let mut client = Client::new(transport, PlcType::Q, CommType::Binary);
        client.connect("127.0.0.1", 5007).unwrap();
        assert!(client.batchwrite_bitunits("M0", &[2]).is_err());
    }

    #[test]
    fn remote_run_builds_expected_body() {
        let resp = response_with_payload(CommType::Binary, &[]);
        let transport = FakeTransport::new(vec![resp]);
        let mut client = Client::new(transport, PlcType::Q, CommType::Binary);
        client.connect("127.0.0.1", 5007).unwrap();

        client.remote_run(1, true).unwrap();
        let sent = &client.transport.sent[0];
        let body_start = sent.len() - 4;
        assert_eq!(&sent[body_start..], &[0x03, 0x00, 0x01, 0x00]);
    }

    #[test]
    fn echo_test_round_trips_data() {
        let resp = response_with_payload(CommType::Binary, &[0x03, 0x00, b'A', b'B', b'C']);
        let transport = FakeTransport::new(vec![resp]);
        let mut client = Client::new(transport, PlcType::Q, CommType::Binary);
        client.connect("127.0.0.1", 5007).unwrap();

        let (len, answer) = client.echo_test("ABC").unwrap();
        assert_eq!(len, 3);
        assert_eq!(answer, "ABC");
    }

    #[test]
    fn echo_test_rejects_non_alphanumeric_data() {
        let transport = FakeTransport::new(vec![]);
        let mut client = Client::new(transport, PlcType::Q, CommType::Binary);
        client.connect("127.0.0.1", 5007).unwrap();
        assert!(client.echo_test("AB-C").is_err());
    }

    #[test]
    fn protocol_error_propagates_status_code() {
        let mut resp = vec![0u8; payload_offset(CommType::Binary)];
        let off = status_offset(CommType::Binary);
        resp[off] = 0xF3;
        resp[off + 1] = 0x00;
        let transport = FakeTransport::new(vec![resp]);
        let mut client = Client::new(transport, PlcType::Q, CommType::Binary);
        client.connect("127.0.0.1", 5007).unwrap();

        let err = client.batchread_wordunits("D1000", 1).unwrap_err();
        match err {
            Error::ProtocolError { code, .. } => assert_eq!(code, 0x00F3),
            other => panic!("expected ProtocolError, got {:?}", other),
        }
    }

    #[test]
    fn set_access_options_rejects_out_of_range_timer() {
        let transport = FakeTransport::new(vec![]);
        let mut client = Client::new(transport, PlcType::Q, CommType::Binary);
        let update = AccessOptionsUpdate {
            timer_sec: Some(5000),
            ..Default::default()
        };
        assert!(client.set_access_options(update).is_err());
    }

    #[test]
    fn set_access_options_allows_setting_network_to_zero() {
        let transport = FakeTransport::new(vec![]);
        let mut client = Client::new(transport, PlcType::Q, CommType::Binary);
        let update = AccessOptionsUpdate {
            network: Some(0),
            ..Default::default()
        };
        assert!(client.set_access_options(update).is_ok());
        assert_eq!(client.access.network, 0);
    }

    #[test]
    fn disconnected_session_rejects_operations() {
        let transport = FakeTransport::new(vec![]);
        let mut client = Client::new(transport, PlcType::Q, CommType::Binary);
        let err = client.batchread_wordunits("D0", 1).unwrap_err();
        assert!(matches!(err, Error::Disconnected));
    }

    #[test]
    fn set_access_options_switches_comm_type() {
        let transport = FakeTransport::new(vec![]);
        let mut client = Client::new(transport, PlcType::Q, CommType::Binary);
        let update = AccessOptionsUpdate {
            commtype: Some("ascii".to_string()),
            ..Default::default()
        };
        client.set_access_options(update).unwrap();
        assert_eq!(client.comm_type, CommType::Ascii);
    }

    #[test]
    fn set_access_options_rejects_unknown_comm_type() {
        let transport = FakeTransport::new(vec![]);
        let mut client = Client::new(transport, PlcType::Q, CommType::Binary);
        let update = AccessOptionsUpdate {
            commtype: Some("bogus".to_string()),
            ..Default::default()
        };
        assert!(client.set_access_options(update).is_err());
    }
}
