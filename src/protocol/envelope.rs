//! Hand-authored stand-ins for the server's generated protocol-buffer bindings.
//!
//! The byte layout of these messages is owned by the server team; we only need
//! the semantic fields the core reads or writes. Deriving `prost::Message`
//! directly (without a `.proto` file or `protoc` build step) is the idiomatic
//! way to carry a fixed, hand-known wire contract in Rust.

use prost::Message;

/// `Packet.type` values the core exchanges with the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum PacketType {
    Handshake = 0,
    ClientAuthentication = 1,
    Ack = 2,
    Subscription = 3,
    Unsubscription = 4,
    Get = 5,
    ClientAck = 6,
    ClientRollback = 7,
    Messages = 8,
}

impl PacketType {
    pub fn from_i32(value: i32) -> Option<Self> {
        Some(match value {
            0 => Self::Handshake,
            1 => Self::ClientAuthentication,
            2 => Self::Ack,
            3 => Self::Subscription,
            4 => Self::Unsubscription,
            5 => Self::Get,
            6 => Self::ClientAck,
            7 => Self::ClientRollback,
            8 => Self::Messages,
            _ => return None,
        })
    }
}

/// `Packet.compression` values. Modeled as raw `i32` (not a closed Rust enum)
/// because proto3 enums are open: a server may send a mode we don't recognize,
/// and the core must classify-then-reject it rather than fail to decode.
pub const COMPRESSION_NONE: i32 = 0;
pub const COMPRESSION_COMPATIBLE_PROTO2: i32 = 1;

#[derive(Clone, PartialEq, Message)]
pub struct Packet {
    #[prost(int32, tag = "1")]
    pub version: i32,
    #[prost(int32, tag = "2")]
    pub r#type: i32,
    #[prost(bytes = "vec", tag = "3")]
    pub body: Vec<u8>,
    #[prost(int32, tag = "4")]
    pub compression: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct Handshake {
    #[prost(bytes = "vec", tag = "1")]
    pub seeds: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ClientAuth {
    #[prost(string, tag = "1")]
    pub username: String,
    #[prost(bytes = "vec", tag = "2")]
    pub password: Vec<u8>,
    #[prost(int32, tag = "3")]
    pub net_read_timeout: i32,
    #[prost(int32, tag = "4")]
    pub net_write_timeout: i32,
}

#[derive(Clone, PartialEq, Message)]
pub struct Ack {
    #[prost(int32, tag = "1")]
    pub error_code: i32,
    #[prost(string, tag = "2")]
    pub error_message: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct Sub {
    #[prost(string, tag = "1")]
    pub destination: String,
    #[prost(string, tag = "2")]
    pub client_id: String,
    #[prost(string, tag = "3")]
    pub filter: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct Unsub {
    #[prost(string, tag = "1")]
    pub destination: String,
    #[prost(string, tag = "2")]
    pub client_id: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct Get {
    #[prost(string, tag = "1")]
    pub destination: String,
    #[prost(string, tag = "2")]
    pub client_id: String,
    #[prost(int32, tag = "3")]
    pub fetch_size: i32,
    #[prost(int64, tag = "4")]
    pub timeout: i64,
    #[prost(int32, tag = "5")]
    pub unit: i32,
    #[prost(bool, tag = "6")]
    pub auto_ack: bool,
}

#[derive(Clone, PartialEq, Message)]
pub struct ClientAck {
    #[prost(string, tag = "1")]
    pub destination: String,
    #[prost(string, tag = "2")]
    pub client_id: String,
    #[prost(int64, tag = "3")]
    pub batch_id: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct ClientRollback {
    #[prost(string, tag = "1")]
    pub destination: String,
    #[prost(string, tag = "2")]
    pub client_id: String,
    #[prost(int64, tag = "3")]
    pub batch_id: i64,
}

#[derive(Clone, PartialEq, Message)]
pub struct Messages {
    #[prost(int64, tag = "1")]
    pub batch_id: i64,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub messages: Vec<Vec<u8>>,
}
