use thiserror::Error;

pub use color_eyre::eyre::eyre;

pub type Result<T> = core::result::Result<T, Error>;

/// Error/message pair returned by the server inside an ACK packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerError {
    pub code: i32,
    pub message: String,
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "server error {}: {}", self.code, self.message)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported version at this client")]
    UnsupportedVersion,

    #[error("expect handshake but found other packet type")]
    Handshake,

    #[error("expected ACK but found other packet type")]
    ExpectedPacketType,

    #[error("authentication failed: {0}")]
    Auth(ServerError),

    #[error("failed to subscribe: {0}")]
    Subscribe(ServerError),

    #[error("failed to unsubscribe: {0}")]
    Unsubscribe(ServerError),

    #[error("protobuf decode error: {0}")]
    Unmarshal(#[from] prost::DecodeError),

    #[error("compression mode is not supported by this connector")]
    CompressionNotSupport,

    #[error("network error: {0}")]
    Network(#[from] std::io::Error),

    #[error("over retry times")]
    OverRetryTimes,

    #[error("coordinator error: {0}")]
    Coordinator(String),

    #[error("{0}")]
    Other(String),

    #[error("a bug in canal-client: {0}")]
    LibraryBug(color_eyre::Report),
}

impl From<zookeeper::ZkError> for Error {
    fn from(err: zookeeper::ZkError) -> Self {
        Error::Coordinator(err.to_string())
    }
}

impl Error {
    /// Wraps a failure that the protocol considers impossible in practice
    /// (e.g. encoding an outbound message built entirely from our own fields).
    pub fn library_bug(err: impl std::fmt::Debug) -> Self {
        Self::LibraryBug(color_eyre::eyre::eyre!(format!("{err:#?}")))
    }

    /// True if this error should trigger the supervisor's reconnect-and-retry cycle.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Error::OverRetryTimes)
    }
}
