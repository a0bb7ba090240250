//! Session state machine.
//!
//! The session moves through an explicit set of states driven only by
//! transport outcomes and explicit teardown.

use std::fmt;

use thiserror::Error;

/// Lifecycle state of a chat session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Connecting,
    Connected,
    Disconnected,
    Errored,
}

/// Transport outcome that drives a state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEvent {
    /// CONNECTED received, subscription and ENTER published
    HandshakeSucceeded,
    /// Socket or STOMP handshake failed
    HandshakeFailed,
    /// Broker reported an error on an established connection
    ProtocolFailed,
    /// Socket closed without explicit teardown
    TransportClosed,
    /// Explicit disconnect by the user
    Teardown,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("invalid transition: {event:?} while {from}")]
pub struct StateError {
    pub from: SessionState,
    pub event: SessionEvent,
}

impl SessionState {
    /// Apply an event, returning the next state.
    pub fn on(self, event: SessionEvent) -> Result<SessionState, StateError> {
        use SessionEvent::*;
        use SessionState::*;

        match (self, event) {
            (Connecting, HandshakeSucceeded) => Ok(Connected),
            (Connecting, HandshakeFailed) => Ok(Errored),
            (Connecting, TransportClosed) => Ok(Errored),
            (Connecting, Teardown) => Ok(Disconnected),
            (Connected, Teardown) => Ok(Disconnected),
            (Connected, TransportClosed) => Ok(Disconnected),
            (Connected, ProtocolFailed) => Ok(Errored),
            (from, event) => Err(StateError { from, event }),
        }
    }

    /// A live membership: messages may be sent and received
    pub fn is_connected(self) -> bool {
        self == SessionState::Connected
    }

    /// No further transitions are possible
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Disconnected | SessionState::Errored)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Connecting => "connecting",
            SessionState::Connected => "connected",
            SessionState::Disconnected => "disconnected",
            SessionState::Errored => "errored",
        };
        f.write_str(label)
    }
}
