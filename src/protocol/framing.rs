//! Length-prefixed wire framing and envelope marshaling.
//!
//! Frame layout: `[4-byte big-endian length][length bytes of envelope]`.
//! Each blocking read/write is bounded by `so_timeout`: the deadline is set
//! immediately before the call and cleared immediately after, so a stalled
//! peer cannot hang the connector past `so_timeout` on any single frame. A
//! failure to clear the deadline is logged but does not undo a read/write
//! that already succeeded.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use prost::Message;

use crate::error::{Error, Result};
use crate::protocol::envelope::{COMPRESSION_NONE, Packet, PacketType};

/// Reads exactly one frame: 4 bytes of big-endian length, then that many
/// payload bytes. A short read fails as a network error.
pub fn read_frame(stream: &mut TcpStream, so_timeout: Duration) -> Result<Vec<u8>> {
    stream.set_read_timeout(Some(so_timeout))?;

    let mut len_bytes = [0u8; 4];
    stream.read_exact(&mut len_bytes)?;
    let len = u32::from_be_bytes(len_bytes) as usize;

    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload)?;

    if let Err(err) = stream.set_read_timeout(None) {
        tracing::warn!(error = %err, "failed to clear read deadline after a successful read");
    }

    Ok(payload)
}

/// Writes one frame as two sequential writes under the caller's lock:
/// the 4-byte length, then the payload.
pub fn write_frame(stream: &mut TcpStream, payload: &[u8], so_timeout: Duration) -> Result<()> {
    stream.set_write_timeout(Some(so_timeout))?;

    let len = u32::try_from(payload.len())
        .map_err(|_| Error::library_bug("frame payload exceeds u32::MAX"))?;
    stream.write_all(&len.to_be_bytes())?;
    stream.write_all(payload)?;

    if let Err(err) = stream.set_write_timeout(None) {
        tracing::warn!(error = %err, "failed to clear write deadline after a successful write");
    }

    Ok(())
}

/// Reads one frame and decodes it as a `Packet` envelope.
pub fn read_packet(stream: &mut TcpStream, so_timeout: Duration) -> Result<Packet> {
    let bytes = read_frame(stream, so_timeout)?;
    Ok(Packet::decode(bytes.as_slice())?)
}

/// Builds the wire bytes for an outbound `{type, body}` envelope.
///
/// Outbound version and compression are always zero; encoding our own
/// messages with `prost` cannot fail (unlike the server's Go `proto.Marshal`),
/// so there is no fallible counterpart to call instead.
pub fn encode_packet(packet_type: PacketType, body: &impl Message) -> Vec<u8> {
    let packet = Packet {
        version: 0,
        r#type: packet_type as i32,
        body: body.encode_to_vec(),
        compression: COMPRESSION_NONE,
    };
    packet.encode_to_vec()
}

/// Encodes and writes an outbound envelope in one call.
pub fn write_packet(
    stream: &mut TcpStream,
    so_timeout: Duration,
    packet_type: PacketType,
    body: &impl Message,
) -> Result<()> {
    let data = encode_packet(packet_type, body);
    write_frame(stream, &data, so_timeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn frame_round_trips_over_loopback() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");

        let payloads: Vec<Vec<u8>> = vec![vec![], vec![0xAA; 17], vec![1, 2, 3, 4, 5]];
        let expected = payloads.clone();

        let server = thread::spawn(move || {
            let (mut sock, _) = listener.accept().expect("accept");
            for payload in payloads {
                write_frame(&mut sock, &payload, Duration::from_secs(5)).expect("write");
            }
        });

        let mut client = TcpStream::connect(addr).expect("connect");
        for want in expected {
            let got = read_frame(&mut client, Duration::from_secs(5)).expect("read");
            assert_eq!(got, want);
        }

        server.join().expect("server thread");
    }

    #[test]
    fn read_frame_fails_on_truncated_payload() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");

        let server = thread::spawn(move || {
            let (mut sock, _) = listener.accept().expect("accept");
            // Announce 10 bytes, then immediately hang up after writing 2.
            sock.write_all(&10u32.to_be_bytes()).expect("write header");
            sock.write_all(&[1, 2]).expect("write partial body");
        });

        let mut client = TcpStream::connect(addr).expect("connect");
        let result = read_frame(&mut client, Duration::from_secs(5));
        assert!(result.is_err());

        server.join().expect("server thread");
    }
}
