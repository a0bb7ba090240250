//! STOMP 1.2 client over WebSocket.
//!
//! - `frame`: frame encoding and decoding
//! - `heartbeat`: heart-beat header parsing and negotiation
//! - `endpoint`: broker URL derivation from the backend base URL
//! - `connection`: the `Connector` / `Transport` implementation

pub mod connection;
pub mod endpoint;
pub mod frame;
pub mod heartbeat;

pub use connection::{StompConnection, StompConnector};
pub use endpoint::{EndpointError, websocket_endpoint};
pub use frame::{Command, Frame, FrameError};
pub use heartbeat::{HeartBeat, NegotiatedHeartBeat};
