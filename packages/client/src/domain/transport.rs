//! Transport trait definitions.
//!
//! The session depends on these interfaces only. The STOMP-over-WebSocket
//! implementation lives in the infrastructure layer.

use async_trait::async_trait;

use super::error::TransportError;

/// A message delivered on a subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Destination the broker delivered the message from
    pub destination: String,
    /// Raw message body
    pub body: String,
}

/// An open connection to the broker.
///
/// Publishing is fire-and-forget: `Ok` means the frame was handed to the
/// socket, not that any peer received it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send {
    /// Subscribe to a destination
    async fn subscribe(&mut self, destination: &str) -> Result<(), TransportError>;

    /// Publish a body to a destination
    async fn publish(&mut self, destination: &str, body: String) -> Result<(), TransportError>;

    /// Wait for the next delivery.
    ///
    /// `None` means the connection closed without teardown and no further
    /// deliveries will arrive. `Some(Err(_))` is an error reported by the
    /// broker. Must be cancel-safe.
    async fn recv(&mut self) -> Option<Result<Delivery, TransportError>>;

    /// Tear the connection down
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Opens transports to one broker endpoint
#[async_trait]
pub trait Connector: Send + Sync {
    type Transport: Transport;

    async fn open(&self) -> Result<Self::Transport, TransportError>;
}
