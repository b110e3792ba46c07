//! Envelope → `Message` decoding.

use prost::Message as _;

use crate::error::{Error, Result, ServerError};
use crate::message::{Entry, Message};
use crate::protocol::envelope::{
    Ack, COMPRESSION_COMPATIBLE_PROTO2, COMPRESSION_NONE, Messages, Packet, PacketType,
};

/// Decodes a `get` response envelope.
///
/// `MESSAGES` is decoded into a `Message`, honoring `lazy_parse_entry`.
/// `ACK` signals the server rejected the request; its error is surfaced.
/// Any other packet type is unexpected on this path.
pub fn decode_get_response(packet: &Packet, lazy_parse_entry: bool) -> Result<Message> {
    let packet_type = PacketType::from_i32(packet.r#type).ok_or(Error::ExpectedPacketType)?;

    match packet_type {
        PacketType::Messages => decode_messages(packet, lazy_parse_entry),
        PacketType::Ack => {
            let ack = Ack::decode(packet.body.as_slice())?;
            Err(Error::Other(
                ServerError {
                    code: ack.error_code,
                    message: ack.error_message,
                }
                .to_string(),
            ))
        }
        _ => Err(Error::ExpectedPacketType),
    }
}

fn decode_messages(packet: &Packet, lazy_parse_entry: bool) -> Result<Message> {
    if packet.compression != COMPRESSION_NONE && packet.compression != COMPRESSION_COMPATIBLE_PROTO2
    {
        return Err(Error::CompressionNotSupport);
    }

    let decoded = Messages::decode(packet.body.as_slice())?;

    if lazy_parse_entry {
        return Ok(Message {
            id: decoded.batch_id,
            entries: Vec::new(),
            raw: true,
            raw_entries: decoded.messages,
        });
    }

    let entries = decoded.messages.into_iter().map(Entry::new).collect();
    Ok(Message {
        id: decoded.batch_id,
        entries,
        raw: false,
        raw_entries: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::envelope::Ack;

    fn envelope(packet_type: PacketType, compression: i32, body: Vec<u8>) -> Packet {
        Packet {
            version: 1,
            r#type: packet_type as i32,
            body,
            compression,
        }
    }

    #[test]
    fn decodes_messages_into_entries_by_default() {
        let body = Messages {
            batch_id: 42,
            messages: vec![vec![1, 2], vec![3, 4]],
        }
        .encode_to_vec();
        let packet = envelope(PacketType::Messages, COMPRESSION_NONE, body);

        let msg = decode_get_response(&packet, false).expect("decode");
        assert_eq!(msg.id, 42);
        assert!(!msg.raw);
        assert_eq!(msg.entries.len(), 2);
        assert_eq!(msg.entries[0].as_bytes(), &[1, 2]);
    }

    #[test]
    fn lazy_parse_entry_keeps_raw_bytes() {
        let body = Messages {
            batch_id: 7,
            messages: vec![vec![9]],
        }
        .encode_to_vec();
        let packet = envelope(PacketType::Messages, COMPRESSION_COMPATIBLE_PROTO2, body);

        let msg = decode_get_response(&packet, true).expect("decode");
        assert_eq!(msg.id, 7);
        assert!(msg.raw);
        assert!(msg.entries.is_empty());
        assert_eq!(msg.raw_entries, vec![vec![9]]);
    }

    #[test]
    fn unsupported_compression_fails() {
        let body = Messages {
            batch_id: 1,
            messages: vec![],
        }
        .encode_to_vec();
        let packet = envelope(PacketType::Messages, 99, body);

        let err = decode_get_response(&packet, false).unwrap_err();
        assert!(matches!(err, Error::CompressionNotSupport));
    }

    #[test]
    fn ack_with_error_code_fails() {
        let body = Ack {
            error_code: 1,
            error_message: "destination not found".into(),
        }
        .encode_to_vec();
        let packet = envelope(PacketType::Ack, COMPRESSION_NONE, body);

        let err = decode_get_response(&packet, false).unwrap_err();
        match err {
            Error::Other(msg) => assert!(msg.contains("destination not found")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unexpected_packet_type_fails() {
        let packet = envelope(PacketType::Handshake, COMPRESSION_NONE, vec![]);
        let err = decode_get_response(&packet, false).unwrap_err();
        assert!(matches!(err, Error::ExpectedPacketType));
    }
}
