//! STOMP connection over a tokio-tungstenite WebSocket.
//!
//! ## Structure
//!
//! The handshake (CONNECT / CONNECTED) runs inline in `StompConnector::open`.
//! After that the socket is split and driven by two tasks:
//!
//! - writer: forwards frames queued by the connection and sends heart-beats
//! - reader: decodes incoming frames and forwards them over an mpsc channel
//!
//! The reader stops (and `recv` yields `None`) when the socket closes, errors,
//! or stays silent for twice the negotiated incoming heart-beat interval.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio::{
    net::TcpStream,
    sync::mpsc,
    task::JoinHandle,
    time::{Instant, Interval, MissedTickBehavior, timeout},
};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};
use url::Url;

use crate::domain::{Connector, Delivery, Transport, TransportError};

use super::{
    frame::{Command, Frame, FrameError, decode_all},
    heartbeat::{HeartBeat, NegotiatedHeartBeat},
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const ACCEPT_VERSION: &str = "1.2,1.1,1.0";
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_HEART_BEAT_MS: u64 = 10_000;
const RECEIPT_TIMEOUT: Duration = Duration::from_secs(2);

/// Opens STOMP connections to one WebSocket endpoint
#[derive(Debug, Clone)]
pub struct StompConnector {
    endpoint: Url,
    heart_beat: HeartBeat,
    connect_timeout: Duration,
}

impl StompConnector {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            heart_beat: HeartBeat::new(DEFAULT_HEART_BEAT_MS, DEFAULT_HEART_BEAT_MS),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_heart_beat(mut self, heart_beat: HeartBeat) -> Self {
        self.heart_beat = heart_beat;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn host(&self) -> &str {
        self.endpoint.host_str().unwrap_or("localhost")
    }
}

#[async_trait]
impl Connector for StompConnector {
    type Transport = StompConnection;

    async fn open(&self) -> Result<StompConnection, TransportError> {
        tracing::debug!("Opening WebSocket to {}", self.endpoint);

        let (mut ws, _response) =
            timeout(self.connect_timeout, connect_async(self.endpoint.as_str()))
                .await
                .map_err(|_| TransportError::Timeout(format!("connecting to {}", self.endpoint)))?
                .map_err(|e| TransportError::Connect(e.to_string()))?;

        let connect = Frame::new(Command::Connect)
            .with_header("accept-version", ACCEPT_VERSION)
            .with_header("host", self.host())
            .with_header("heart-beat", self.heart_beat.to_header());
        ws.send(frame_message(&connect))
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        let connected = timeout(self.connect_timeout, await_connected(&mut ws))
            .await
            .map_err(|_| TransportError::Timeout("waiting for CONNECTED".to_string()))??;

        let server_heart_beat = connected
            .header("heart-beat")
            .map(HeartBeat::parse)
            .transpose()
            .map_err(|e| TransportError::Protocol(e.to_string()))?
            .unwrap_or_default();
        let negotiated = self.heart_beat.negotiate(server_heart_beat);

        tracing::info!(
            "STOMP session established (version {}, heart-beat {:?})",
            connected.header("version").unwrap_or("1.0"),
            negotiated
        );

        Ok(StompConnection::start(ws, negotiated))
    }
}

async fn await_connected(ws: &mut WsStream) -> Result<Frame, TransportError> {
    while let Some(message) = ws.next().await {
        let message = message.map_err(|e| TransportError::Connect(e.to_string()))?;
        if let Message::Close(close) = &message {
            return Err(TransportError::Connect(format!(
                "server closed the socket during handshake: {:?}",
                close
            )));
        }
        let frames = decode_message(&message).map_err(|e| TransportError::Protocol(e.to_string()))?;
        for frame in frames {
            match frame.command() {
                Command::Connected => return Ok(frame),
                Command::Error => return Err(TransportError::Rejected(error_summary(&frame))),
                other => tracing::debug!("Ignoring {} frame before CONNECTED", other),
            }
        }
    }
    Err(TransportError::Closed)
}

/// Frames received by the reader task
#[derive(Debug)]
enum Inbound {
    Message(Delivery),
    Receipt(String),
    Error(String),
}

/// An established STOMP session
pub struct StompConnection {
    outgoing: mpsc::UnboundedSender<Message>,
    inbound: mpsc::UnboundedReceiver<Inbound>,
    next_subscription: u32,
    next_receipt: u32,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl StompConnection {
    fn start(ws: WsStream, heart_beat: NegotiatedHeartBeat) -> Self {
        let (sink, stream) = ws.split();
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        let writer = tokio::spawn(write_loop(sink, outgoing_rx, heart_beat.outgoing));
        let reader = tokio::spawn(read_loop(stream, inbound_tx, heart_beat.incoming));

        Self {
            outgoing: outgoing_tx,
            inbound: inbound_rx,
            next_subscription: 0,
            next_receipt: 0,
            reader,
            writer,
        }
    }

    fn send_frame(&self, frame: &Frame) -> Result<(), TransportError> {
        tracing::trace!("Sending {} frame", frame.command());
        self.outgoing
            .send(frame_message(frame))
            .map_err(|_| TransportError::Closed)
    }

    async fn await_receipt(&mut self, receipt: &str) -> bool {
        while let Some(inbound) = self.inbound.recv().await {
            match inbound {
                Inbound::Receipt(id) if id == receipt => return true,
                other => tracing::debug!("Dropping {:?} while waiting for receipt", other),
            }
        }
        false
    }
}

#[async_trait]
impl Transport for StompConnection {
    async fn subscribe(&mut self, destination: &str) -> Result<(), TransportError> {
        let id = format!("sub-{}", self.next_subscription);
        self.next_subscription += 1;

        let frame = Frame::new(Command::Subscribe)
            .with_header("id", id)
            .with_header("destination", destination)
            .with_header("ack", "auto");
        self.send_frame(&frame)
    }

    async fn publish(&mut self, destination: &str, body: String) -> Result<(), TransportError> {
        let frame = Frame::new(Command::Send)
            .with_header("destination", destination)
            .with_header("content-type", "application/json")
            .with_body(body);
        self.send_frame(&frame)
    }

    async fn recv(&mut self) -> Option<Result<Delivery, TransportError>> {
        loop {
            match self.inbound.recv().await? {
                Inbound::Message(delivery) => return Some(Ok(delivery)),
                Inbound::Error(message) => return Some(Err(TransportError::Protocol(message))),
                Inbound::Receipt(id) => tracing::debug!("Ignoring unexpected receipt '{}'", id),
            }
        }
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        let receipt = format!("disconnect-{}", self.next_receipt);
        self.next_receipt += 1;

        let frame = Frame::new(Command::Disconnect).with_header("receipt", receipt.clone());
        let sent = self.send_frame(&frame);
        if sent.is_ok() {
            match timeout(RECEIPT_TIMEOUT, self.await_receipt(&receipt)).await {
                Ok(true) => tracing::debug!("DISCONNECT acknowledged"),
                _ => tracing::debug!("No RECEIPT for DISCONNECT, closing anyway"),
            }
        }

        // The writer exits after forwarding the close frame.
        let _ = self.outgoing.send(Message::Close(None));
        if timeout(RECEIPT_TIMEOUT, &mut self.writer).await.is_err() {
            self.writer.abort();
        }
        self.reader.abort();

        sent
    }
}

impl Drop for StompConnection {
    fn drop(&mut self) {
        self.reader.abort();
        self.writer.abort();
    }
}

async fn write_loop(
    mut sink: SplitSink<WsStream, Message>,
    mut outgoing: mpsc::UnboundedReceiver<Message>,
    heart_beat: Option<Duration>,
) {
    let mut ticker = heart_beat.and_then(|period| {
        let start = Instant::now().checked_add(period)?;
        let mut ticker = tokio::time::interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Some(ticker)
    });

    loop {
        let next = tokio::select! {
            message = outgoing.recv() => message,
            _ = tick(&mut ticker) => Some(Message::Text(String::from("\n").into())),
        };
        let Some(message) = next else {
            break;
        };

        let closing = matches!(message, Message::Close(_));
        if let Err(e) = sink.send(message).await {
            tracing::warn!("WebSocket write error: {}", e);
            break;
        }
        if closing {
            break;
        }
    }
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn read_loop(
    mut stream: SplitStream<WsStream>,
    inbound: mpsc::UnboundedSender<Inbound>,
    heart_beat: Option<Duration>,
) {
    let silence_limit = heart_beat.and_then(|period| period.checked_mul(2));

    loop {
        let next = match silence_limit {
            Some(limit) => match timeout(limit, stream.next()).await {
                Ok(next) => next,
                Err(_) => {
                    tracing::warn!("No data from broker for {:?}, connection lost", limit);
                    break;
                }
            },
            None => stream.next().await,
        };

        let message = match next {
            Some(Ok(message)) => message,
            Some(Err(e)) => {
                tracing::warn!("WebSocket read error: {}", e);
                break;
            }
            None => break,
        };

        if let Message::Close(close) = &message {
            tracing::info!("Broker closed the connection: {:?}", close);
            break;
        }

        let frames = match decode_message(&message) {
            Ok(frames) => frames,
            Err(e) => {
                tracing::warn!("Dropping undecodable STOMP data: {}", e);
                continue;
            }
        };

        for frame in frames {
            let forwarded = match frame.command() {
                Command::Message => match delivery(&frame) {
                    Some(delivery) => Inbound::Message(delivery),
                    None => continue,
                },
                Command::Receipt => {
                    Inbound::Receipt(frame.header("receipt-id").unwrap_or_default().to_string())
                }
                Command::Error => Inbound::Error(error_summary(&frame)),
                other => {
                    tracing::debug!("Ignoring unexpected {} frame", other);
                    continue;
                }
            };
            if inbound.send(forwarded).is_err() {
                return;
            }
        }
    }
}

fn delivery(frame: &Frame) -> Option<Delivery> {
    let body = match frame.body_text() {
        Ok(body) => body.to_string(),
        Err(e) => {
            tracing::warn!("Dropping MESSAGE with non-text body: {}", e);
            return None;
        }
    };
    Some(Delivery {
        destination: frame.header("destination").unwrap_or_default().to_string(),
        body,
    })
}

fn error_summary(frame: &Frame) -> String {
    let message = frame.header("message").unwrap_or("broker error");
    match frame.body_text().map(str::trim) {
        Ok(details) if !details.is_empty() => format!("{}: {}", message, details),
        _ => message.to_string(),
    }
}

fn frame_message(frame: &Frame) -> Message {
    match String::from_utf8(frame.encode()) {
        Ok(text) => Message::Text(text.into()),
        Err(e) => Message::Binary(e.into_bytes().into()),
    }
}

fn decode_message(message: &Message) -> Result<Vec<Frame>, FrameError> {
    match message {
        Message::Text(text) => decode_all(text.as_str().as_bytes()),
        Message::Binary(data) => decode_all(data),
        _ => Ok(Vec::new()),
    }
}
