//! Heart-beat header handling.
//!
//! Each side advertises `<cx>,<cy>`: the smallest interval it can send at and
//! the interval it wants to receive at, in milliseconds. `0` means "cannot" /
//! "does not want".

use std::time::Duration;

use super::frame::FrameError;

/// Upper bound for a negotiated interval; broker values above it are capped
const MAX_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Heart-beat intervals in milliseconds as advertised in a `heart-beat` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeartBeat {
    pub send_ms: u64,
    pub recv_ms: u64,
}

/// Intervals in effect after the CONNECT / CONNECTED exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NegotiatedHeartBeat {
    /// How often the client must send something
    pub outgoing: Option<Duration>,
    /// How often the broker promised to send something
    pub incoming: Option<Duration>,
}

impl HeartBeat {
    pub fn new(send_ms: u64, recv_ms: u64) -> Self {
        Self { send_ms, recv_ms }
    }

    pub fn parse(header: &str) -> Result<Self, FrameError> {
        let invalid = || FrameError::InvalidHeartBeat(header.to_string());
        let (send, recv) = header.split_once(',').ok_or_else(invalid)?;
        let send_ms = send.trim().parse().map_err(|_| invalid())?;
        let recv_ms = recv.trim().parse().map_err(|_| invalid())?;
        Ok(Self { send_ms, recv_ms })
    }

    pub fn to_header(&self) -> String {
        format!("{},{}", self.send_ms, self.recv_ms)
    }

    /// Negotiate with the broker's advertised values (`self` is the client).
    pub fn negotiate(&self, server: HeartBeat) -> NegotiatedHeartBeat {
        NegotiatedHeartBeat {
            outgoing: interval(self.send_ms, server.recv_ms),
            incoming: interval(self.recv_ms, server.send_ms),
        }
    }
}

fn interval(ours: u64, theirs: u64) -> Option<Duration> {
    if ours == 0 || theirs == 0 {
        None
    } else {
        Some(Duration::from_millis(ours.max(theirs)).min(MAX_INTERVAL))
    }
}
