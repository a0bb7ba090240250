//! Domain layer error definitions.

use thiserror::Error;

use super::state::SessionState;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// Nickname validation error
    #[error("Nickname cannot be empty")]
    NicknameEmpty,

    /// Nickname too long error
    #[error("Nickname cannot exceed {max} characters (got {actual})")]
    NicknameTooLong { max: usize, actual: usize },

    /// Nickname contains control characters
    #[error("Nickname cannot contain control characters")]
    NicknameInvalidCharacter,

    /// RoomId validation error
    #[error("RoomId cannot be empty")]
    RoomIdEmpty,

    /// RoomId too long error
    #[error("RoomId cannot exceed {max} characters (got {actual})")]
    RoomIdTooLong { max: usize, actual: usize },

    /// RoomId contains characters not allowed in a destination
    #[error("RoomId may only contain ASCII letters, digits, '-' and '_' (got: {0})")]
    RoomIdInvalidFormat(String),

    /// MessageContent validation error
    #[error("MessageContent cannot be empty")]
    MessageContentEmpty,

    /// MessageContent too long error
    #[error("MessageContent cannot exceed {max} characters (got {actual})")]
    MessageContentTooLong { max: usize, actual: usize },
}

/// Reason a `send` was refused without touching the transport
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendRejection {
    #[error("not connected (session is {0})")]
    NotConnected(SessionState),

    #[error("message is empty")]
    EmptyContent,

    #[error("message is too long: {actual} characters (max {max})")]
    TooLong { max: usize, actual: usize },
}

/// Errors reported by a transport implementation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The socket could not be opened
    #[error("Connection error: {0}")]
    Connect(String),

    /// The broker answered the handshake with an ERROR frame
    #[error("Broker rejected the connection: {0}")]
    Rejected(String),

    /// The broker reported an error or sent something unparseable
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The connection is already gone
    #[error("Connection closed")]
    Closed,

    /// A bounded wait elapsed
    #[error("Timed out: {0}")]
    Timeout(String),
}

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Handshake or protocol failure
    #[error("Connection failure: {0}")]
    ConnectionFailure(String),

    /// Send attempted while it cannot be published
    #[error("Send rejected: {0}")]
    SendRejected(SendRejection),

    /// Socket closed without explicit teardown
    #[error("Connection lost without teardown")]
    AbruptDisconnect,

    /// Invalid command line or environment configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Reading or writing the persisted nickname failed
    #[error("Nickname store error: {0}")]
    NicknameStore(#[from] std::io::Error),
}

impl From<ValueObjectError> for ClientError {
    fn from(err: ValueObjectError) -> Self {
        ClientError::InvalidConfig(err.to_string())
    }
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Closed => ClientError::AbruptDisconnect,
            other => ClientError::ConnectionFailure(other.to_string()),
        }
    }
}
