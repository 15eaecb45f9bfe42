use mcprotocol::client::Client;
use mcprotocol::error::Error;
use mcprotocol::frame::payload_offset;
use mcprotocol::plc::{CommType, PlcType};
use mcprotocol::transport::Transport;
use std::collections::VecDeque;
use std::time::Duration;

/// An in-process stand-in for a live PLC socket: replays scripted
/// responses and records outgoing frames so the test stays deterministic.
struct FakeTransport {
    responses: VecDeque<Vec<u8>>,
}

impl FakeTransport {
    fn new(responses: Vec<Vec<u8>>) -> Self {
        FakeTransport {
            responses: responses.into(),
        }
    }
}

impl Transport for FakeTransport {
    fn connect(&mut self, _host: &str, _port: u16) -> Result<(), Error> {
        Ok(())
    }

    fn send_all(&mut self, _buf: &[u8]) -> Result<(), Error> {
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
        Ok(())
    }
}

fn response_with_payload(comm: CommType, payload: &[u8]) -> Vec<u8> {
    let mut resp = vec![0u8; payload_offset(comm)];
    resp.extend_from_slice(payload);
    resp
}

#[test]
fn batchread_wordunits_end_to_end() {
    let resp = response_with_payload(CommType::Binary, &[0x34, 0x12, 0xff, 0xff]);
    let transport = FakeTransport::new(vec![resp]);
    let mut client = Client::new(transport, PlcType::Q, CommType::Binary);
    client.connect("127.0.0.1", 5007).unwrap();

    let values = client.batchread_wordunits("D1000", 2).unwrap();
    assert_eq!(values, vec![0x1234, -1]);
}

#[test]
fn echo_test_round_trip() {
    let resp = response_with_payload(CommType::Binary, &[0x03, 0x00, b'A', b'B', b'C']);
    let transport = FakeTransport::new(vec![resp]);
    let mut client = Client::new(transport, PlcType::Q, CommType::Binary);
    client.connect("127.0.0.1", 5007).unwrap();

    let (len, answer) = client.echo_test("ABC").unwrap();
    assert_eq!(len, 3);
    assert_eq!(answer, "ABC");
}

#[test]
fn protocol_error_is_returned_on_nonzero_status() {
    let mut resp = vec![0u8; payload_offset(CommType::Binary)];
    resp[9] = 0xF3;
    let transport = FakeTransport::new(vec![resp]);
    let mut client = Client::new(transport, PlcType::Q, CommType::Binary);
    client.connect("127.0.0.1", 5007).unwrap();

    let err = client.batchread_wordunits("D1000", 1).unwrap_err();
    assert!(matches!(err, Error::ProtocolError { code: 0x00F3, .. }));
}

#[test]
fn remote_run_then_stop() {
    let responses = vec![
        response_with_payload(CommType::Binary, &[]),
        response_with_payload(CommType::Binary, &[]),
    ];
    let transport = FakeTransport::new(responses);
    let mut client = Client::new(transport, PlcType::Q, CommType::Binary);
    client.connect("127.0.0.1", 5007).unwrap();

    client.remote_run(0, false).unwrap();
    client.remote_stop().unwrap();
}
