use std::net::TcpStream;

use prost::Message as _;

use crate::connector::Connector;
use crate::constant::{
    BATCH_SIZE_DEFAULT, CANAL_VERSION, TIMEOUT_DEFAULT, TimeUnit,
};
use crate::error::{Error, Result, ServerError};
use crate::hash::scramble411_hex;
use crate::identity::ClientIdentity;
use crate::message::Message;
use crate::options::ConnectorOptions;
use crate::protocol::envelope::{
    Ack, ClientAck, ClientAuth, ClientRollback, Get, Handshake, PacketType, Sub, Unsub,
};
use crate::protocol::{decode_get_response, read_packet, write_packet};

/// A single-server session: handshake, auth, subscribe/get/ack/rollback, disconnect.
///
/// Owns at most one transport at a time; `&mut self` on every operation
/// guarantees only one caller can drive the connector at once.
pub struct SimpleConnector {
    address: String,
    identity: ClientIdentity,
    options: ConnectorOptions,
    stream: Option<TcpStream>,
}

impl SimpleConnector {
    pub fn new(address: impl Into<String>, identity: ClientIdentity, options: ConnectorOptions) -> Self {
        Self {
            address: address.into(),
            identity,
            options,
            stream: None,
        }
    }

    pub fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn require_stream(&mut self) -> Result<&mut TcpStream> {
        self.stream
            .as_mut()
            .ok_or_else(|| Error::Other("not connected".into()))
    }

    fn expect_ack(&mut self) -> Result<Ack> {
        let so_timeout = self.options.so_timeout;
        let packet = read_packet(self.require_stream()?, so_timeout)?;
        if PacketType::from_i32(packet.r#type) != Some(PacketType::Ack) {
            return Err(Error::ExpectedPacketType);
        }
        Ok(Ack::decode(packet.body.as_slice())?)
    }
}

impl Connector for SimpleConnector {
    fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }

        let mut stream = TcpStream::connect(&self.address)?;
        let so_timeout = self.options.so_timeout;

        let handshake_packet = read_packet(&mut stream, so_timeout)?;
        if handshake_packet.version != CANAL_VERSION {
            return Err(Error::UnsupportedVersion);
        }
        if PacketType::from_i32(handshake_packet.r#type) != Some(PacketType::Handshake) {
            return Err(Error::Handshake);
        }
        let handshake = Handshake::decode(handshake_packet.body.as_slice())?;

        let idle_timeout_ms = i32::try_from(self.options.idle_timeout.as_millis())
            .map_err(Error::library_bug)?;
        let auth = ClientAuth {
            username: self.options.username.clone(),
            password: scramble411_hex(self.options.password.as_bytes(), &handshake.seeds).into_bytes(),
            net_read_timeout: idle_timeout_ms,
            net_write_timeout: idle_timeout_ms,
        };
        write_packet(&mut stream, so_timeout, PacketType::ClientAuthentication, &auth)?;

        let ack_packet = read_packet(&mut stream, so_timeout)?;
        if PacketType::from_i32(ack_packet.r#type) != Some(PacketType::Ack) {
            return Err(Error::ExpectedPacketType);
        }
        let ack = Ack::decode(ack_packet.body.as_slice())?;
        if ack.error_code > 0 {
            return Err(Error::Auth(ServerError {
                code: ack.error_code,
                message: ack.error_message,
            }));
        }

        self.stream = Some(stream);

        if !self.identity.filter.is_empty() {
            let filter = self.identity.filter.clone();
            self.subscribe(&filter)?;
        }
        if self.options.rollback_on_connect {
            self.rollback(0)?;
        }

        tracing::info!(address = %self.address, destination = %self.identity.destination, "connected");
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        if self.options.rollback_on_disconnect && self.is_connected() {
            self.rollback(0)?;
        }

        if let Some(stream) = self.stream.take() {
            if let Err(err) = stream.shutdown(std::net::Shutdown::Both) {
                tracing::warn!(error = %err, "failed to close transport cleanly");
            }
            tracing::info!(destination = %self.identity.destination, "disconnected");
        }

        Ok(())
    }

    fn subscribe(&mut self, filter: &str) -> Result<()> {
        let sub = Sub {
            destination: self.identity.destination.clone(),
            client_id: self.identity.client_id.to_string(),
            filter: filter.to_string(),
        };
        let so_timeout = self.options.so_timeout;
        write_packet(
            self.require_stream()?,
            so_timeout,
            PacketType::Subscription,
            &sub,
        )?;

        let ack = self.expect_ack()?;
        if ack.error_code > 0 {
            return Err(Error::Subscribe(ServerError {
                code: ack.error_code,
                message: ack.error_message,
            }));
        }

        self.identity.filter = filter.to_string();
        Ok(())
    }

    fn unsubscribe(&mut self) -> Result<()> {
        let unsub = Unsub {
            destination: self.identity.destination.clone(),
            client_id: self.identity.client_id.to_string(),
        };
        let so_timeout = self.options.so_timeout;
        write_packet(
            self.require_stream()?,
            so_timeout,
            PacketType::Unsubscription,
            &unsub,
        )?;

        let ack = self.expect_ack()?;
        if ack.error_code > 0 {
            return Err(Error::Unsubscribe(ServerError {
                code: ack.error_code,
                message: ack.error_message,
            }));
        }
        Ok(())
    }

    fn get_without_ack(&mut self, batch_size: i32, timeout: i64) -> Result<Message> {
        let fetch_size = if batch_size <= 0 {
            BATCH_SIZE_DEFAULT
        } else {
            batch_size
        };
        let mapped_timeout = if timeout < 0 { TIMEOUT_DEFAULT } else { timeout };

        let get = Get {
            destination: self.identity.destination.clone(),
            client_id: self.identity.client_id.to_string(),
            fetch_size,
            timeout: mapped_timeout,
            unit: TimeUnit::Milliseconds as i32,
            auto_ack: false,
        };
        let so_timeout = self.options.so_timeout;
        write_packet(self.require_stream()?, so_timeout, PacketType::Get, &get)?;

        let packet = read_packet(self.require_stream()?, so_timeout)?;
        decode_get_response(&packet, self.options.lazy_parse_entry)
    }

    fn get(&mut self, batch_size: i32, timeout: i64) -> Result<Message> {
        let message = self.get_without_ack(batch_size, timeout)?;
        self.ack(message.id)?;
        Ok(message)
    }

    fn ack(&mut self, batch_id: i64) -> Result<()> {
        let ack = ClientAck {
            destination: self.identity.destination.clone(),
            client_id: self.identity.client_id.to_string(),
            batch_id,
        };
        let so_timeout = self.options.so_timeout;
        write_packet(self.require_stream()?, so_timeout, PacketType::ClientAck, &ack)
    }

    fn rollback(&mut self, batch_id: i64) -> Result<()> {
        let rollback = ClientRollback {
            destination: self.identity.destination.clone(),
            client_id: self.identity.client_id.to_string(),
            batch_id,
        };
        let so_timeout = self.options.so_timeout;
        write_packet(
            self.require_stream()?,
            so_timeout,
            PacketType::ClientRollback,
            &rollback,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::envelope::{COMPRESSION_NONE, Messages, Packet};
    use std::io::Read;
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    fn write_test_packet(stream: &mut TcpStream, packet_type: PacketType, body: impl prost::Message) {
        write_packet(stream, Duration::from_secs(5), packet_type, &body).expect("write");
    }

    fn read_test_packet(stream: &mut TcpStream) -> Packet {
        read_packet(stream, Duration::from_secs(5)).expect("read")
    }

    fn test_options() -> ConnectorOptions {
        ConnectorOptions::default()
            .with_username("canal")
            .with_password("canal")
            .with_so_timeout(Duration::from_secs(5))
    }

    #[test]
    fn connect_then_get_empty_batch() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");

        let server = thread::spawn(move || {
            let (mut sock, _) = listener.accept().expect("accept");

            write_test_packet(
                &mut sock,
                PacketType::Handshake,
                Handshake {
                    seeds: vec![0xEE, 0x1E, 0xFD, 0x70, 0x1A, 0xF7, 0x24, 0x3F],
                },
            );

            let auth_packet = read_test_packet(&mut sock);
            assert_eq!(
                PacketType::from_i32(auth_packet.r#type),
                Some(PacketType::ClientAuthentication)
            );
            write_test_packet(
                &mut sock,
                PacketType::Ack,
                Ack {
                    error_code: 0,
                    error_message: String::new(),
                },
            );

            // rollback(0) on connect is fire-and-forget; drain it before GET.
            let mut discard = [0u8; 4];
            sock.read_exact(&mut discard).ok();
            let mut body = vec![0u8; u32::from_be_bytes(discard) as usize];
            sock.read_exact(&mut body).ok();

            let get_packet = read_test_packet(&mut sock);
            assert_eq!(PacketType::from_i32(get_packet.r#type), Some(PacketType::Get));
            write_test_packet(
                &mut sock,
                PacketType::Messages,
                Messages {
                    batch_id: -1,
                    messages: vec![],
                },
            );

            // get() acks afterward; drain it so the write doesn't block.
            let mut discard = [0u8; 4];
            sock.read_exact(&mut discard).ok();
            let mut body = vec![0u8; u32::from_be_bytes(discard) as usize];
            sock.read_exact(&mut body).ok();
        });

        let mut options = test_options();
        options.rollback_on_connect = true;
        let identity = ClientIdentity::new("example");
        let mut connector = SimpleConnector::new(addr.to_string(), identity, options);

        connector.connect().expect("connect");
        let msg = connector.get(10, 1000).expect("get");
        assert_eq!(msg.id, -1);
        assert!(msg.entries.is_empty());

        server.join().expect("server thread");
    }

    #[test]
    fn connect_fails_on_auth_error() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");

        let server = thread::spawn(move || {
            let (mut sock, _) = listener.accept().expect("accept");
            write_test_packet(
                &mut sock,
                PacketType::Handshake,
                Handshake { seeds: vec![1, 2, 3, 4] },
            );
            let _auth_packet = read_test_packet(&mut sock);
            write_test_packet(
                &mut sock,
                PacketType::Ack,
                Ack {
                    error_code: 401,
                    error_message: "bad".into(),
                },
            );
        });

        let mut options = test_options();
        options.rollback_on_connect = false;
        let identity = ClientIdentity::new("example");
        let mut connector = SimpleConnector::new(addr.to_string(), identity, options);

        let err = connector.connect().unwrap_err();
        match err {
            Error::Auth(server_err) => {
                assert_eq!(server_err.code, 401);
                assert_eq!(server_err.message, "bad");
            }
            other => panic!("unexpected error: {other:?}"),
        }

        server.join().expect("server thread");
    }

    #[test]
    fn connect_is_idempotent() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");

        let server = thread::spawn(move || {
            let (mut sock, _) = listener.accept().expect("accept");
            write_test_packet(
                &mut sock,
                PacketType::Handshake,
                Handshake { seeds: vec![1, 2, 3, 4] },
            );
            let _auth_packet = read_test_packet(&mut sock);
            write_test_packet(
                &mut sock,
                PacketType::Ack,
                Ack {
                    error_code: 0,
                    error_message: String::new(),
                },
            );
        });

        let mut options = test_options();
        options.rollback_on_connect = false;
        let identity = ClientIdentity::new("example");
        let mut connector = SimpleConnector::new(addr.to_string(), identity, options);

        connector.connect().expect("first connect");
        connector.connect().expect("second connect is a no-op");

        server.join().expect("server thread");
    }

    #[test]
    fn disconnect_propagates_rollback_failure_and_stays_connected() {
        // rollback() is fire-and-forget on the wire (no ack is read), so the
        // only way it fails is a write error. Shut down the write half of
        // the already-connected socket out from under the connector to
        // force that.
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");

        let server = thread::spawn(move || {
            let (mut sock, _) = listener.accept().expect("accept");
            write_test_packet(
                &mut sock,
                PacketType::Handshake,
                Handshake { seeds: vec![1, 2, 3, 4] },
            );
            let _auth_packet = read_test_packet(&mut sock);
            write_test_packet(
                &mut sock,
                PacketType::Ack,
                Ack {
                    error_code: 0,
                    error_message: String::new(),
                },
            );
            sock
        });

        let mut options = test_options();
        options.rollback_on_connect = false;
        options.rollback_on_disconnect = true;
        let identity = ClientIdentity::new("example");
        let mut connector = SimpleConnector::new(addr.to_string(), identity, options);

        connector.connect().expect("connect");
        connector
            .stream
            .as_ref()
            .expect("connected")
            .shutdown(std::net::Shutdown::Both)
            .expect("shutdown local socket");

        let err = connector.disconnect().unwrap_err();
        assert!(matches!(err, Error::Network(_)));
        assert!(
            connector.is_connected(),
            "a failed rollback must not close the transport"
        );

        server.join().expect("server thread").shutdown(std::net::Shutdown::Both).ok();
    }
}
