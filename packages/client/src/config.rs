//! Command line and environment configuration.

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use url::Url;

use crate::{
    domain::{ClientError, Nickname, RoomId},
    infrastructure::stomp::{HeartBeat, websocket_endpoint},
};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";

#[derive(Parser, Debug)]
#[command(name = "stomproom")]
#[command(about = "Terminal chat client for a STOMP-over-WebSocket chat room", long_about = None)]
pub struct Args {
    /// Backend base URL; the STOMP endpoint is <url>/ws
    #[arg(short = 'u', long, env = "BACKEND_URL", default_value = DEFAULT_BACKEND_URL)]
    pub backend_url: String,

    /// Room to join
    #[arg(short = 'r', long, default_value = RoomId::DEFAULT)]
    pub room: String,

    /// Nickname for this run (not persisted)
    #[arg(short = 'n', long)]
    pub nickname: Option<String>,

    /// File the nickname is persisted in
    #[arg(long, env = "STOMPROOM_NICKNAME_FILE")]
    pub nickname_file: Option<PathBuf>,

    /// Connect to the raw WebSocket entry of a SockJS endpoint (<url>/ws/websocket)
    #[arg(long)]
    pub sockjs: bool,

    /// Heart-beat interval to offer the broker in milliseconds (0 disables)
    #[arg(long, default_value_t = 10_000)]
    pub heartbeat_ms: u64,

    /// Reconnection attempts after the connection drops
    #[arg(long, default_value_t = 5)]
    pub reconnect_attempts: u32,

    /// Fixed delay between reconnection attempts in seconds
    #[arg(long, default_value_t = 5)]
    pub reconnect_delay_secs: u64,
}

/// Fixed-delay reconnect policy applied after an abrupt disconnect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl ReconnectPolicy {
    /// Whether another attempt is allowed after `attempts_made` failures
    pub fn allows(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts
    }
}

/// Resolved client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: Url,
    pub room_id: RoomId,
    pub nickname: Option<Nickname>,
    pub nickname_file: Option<PathBuf>,
    pub heart_beat: HeartBeat,
    pub reconnect: ReconnectPolicy,
}

impl TryFrom<Args> for ClientConfig {
    type Error = ClientError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let endpoint = websocket_endpoint(&args.backend_url, args.sockjs)
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;
        let nickname = args.nickname.map(Nickname::new).transpose()?;

        Ok(Self {
            endpoint,
            room_id: RoomId::new(args.room)?,
            nickname,
            nickname_file: args.nickname_file,
            heart_beat: HeartBeat::new(args.heartbeat_ms, args.heartbeat_ms),
            reconnect: ReconnectPolicy {
                max_attempts: args.reconnect_attempts,
                delay: Duration::from_secs(args.reconnect_delay_secs),
            },
        })
    }
}
