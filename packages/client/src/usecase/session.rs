//! Chat session: one room membership over one transport connection.
//!
//! ## Lifecycle
//!
//! 1. `connect` (or `new` followed by `open`) opens a transport, subscribes
//!    to the room topic and publishes exactly one ENTER message. Failure
//!    leaves the session `Errored`.
//! 2. `send` publishes TALK messages while `Connected`.
//! 3. `receive` appends deliveries to the local log in arrival order.
//! 4. `disconnect` publishes LEAVE best-effort and closes the transport.
//!
//! An abrupt close moves the session to `Disconnected` without LEAVE; peers
//! cannot tell that apart from silence. The session never reconnects on its
//! own; `resume` exists for the runner's reconnect policy. It starts the
//! membership over at `Connecting` on the same state channel and log.

use std::sync::Arc;

use futures_util::Stream;
use stomproom_shared::time::{Clock, SystemClock};
use tokio::sync::watch;

use crate::{
    domain::{
        ChatMessage, ClientError, Connector, MessageContent, MessageLog, Nickname, RoomId,
        SendRejection, SessionEvent, SessionState, Transport, TransportError, ValueObjectError,
    },
    infrastructure::dto::{decode_chat_message, encode_chat_message},
};

/// Explicit configuration a session is constructed with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub nickname: Nickname,
    pub room_id: RoomId,
}

/// How a session reached `Disconnected`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// `disconnect` was called; LEAVE was published best-effort
    Teardown,
    /// The socket went away; no LEAVE was published
    TransportLost,
}

pub struct ChatSession<T: Transport> {
    config: SessionConfig,
    state: SessionState,
    state_tx: watch::Sender<SessionState>,
    transport: Option<T>,
    log: MessageLog,
    clock: Arc<dyn Clock>,
    status: String,
    disconnect_reason: Option<DisconnectReason>,
}

impl<T: Transport> ChatSession<T> {
    /// A session for `config` that has not connected yet.
    ///
    /// The state is `Connecting`; subscribe to `state_changes` before
    /// calling `open` to observe the whole handshake.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: SessionConfig, clock: Arc<dyn Clock>) -> Self {
        let (state_tx, _) = watch::channel(SessionState::Connecting);
        let status = format!("connecting to room '{}'", config.room_id);
        Self {
            config,
            state: SessionState::Connecting,
            state_tx,
            transport: None,
            log: MessageLog::new(),
            clock,
            status,
            disconnect_reason: None,
        }
    }

    /// Join the configured room through `connector`.
    ///
    /// Always returns a session; check `state()` for the outcome.
    pub async fn connect<C>(config: SessionConfig, connector: &C) -> Self
    where
        C: Connector<Transport = T> + ?Sized,
    {
        Self::connect_with_clock(config, connector, Arc::new(SystemClock)).await
    }

    pub async fn connect_with_clock<C>(
        config: SessionConfig,
        connector: &C,
        clock: Arc<dyn Clock>,
    ) -> Self
    where
        C: Connector<Transport = T> + ?Sized,
    {
        let mut session = Self::with_clock(config, clock);
        session.open(connector).await;
        session
    }

    /// Open a fresh connection for the same membership.
    ///
    /// The message log and the state channel are carried over, so messages
    /// seen before the drop stay in the log exactly once and existing
    /// `state_changes` receivers observe the new connection. A session that
    /// has not ended yet is returned unchanged.
    pub async fn resume<C>(mut self, connector: &C) -> Self
    where
        C: Connector<Transport = T> + ?Sized,
    {
        if !self.state.is_terminal() {
            tracing::warn!("resume ignored while {}", self.state);
            return self;
        }

        self.transport = None;
        self.disconnect_reason = None;
        self.state = SessionState::Connecting;
        self.state_tx.send_replace(SessionState::Connecting);
        self.status = format!("reconnecting to room '{}'", self.config.room_id);
        self.open(connector).await;
        self
    }

    /// Run the handshake: open a transport, subscribe and announce presence.
    ///
    /// No-op unless the session is `Connecting`.
    pub async fn open<C>(&mut self, connector: &C)
    where
        C: Connector<Transport = T> + ?Sized,
    {
        if self.state != SessionState::Connecting {
            tracing::warn!("open ignored while {}", self.state);
            return;
        }

        tracing::info!(
            "Connecting to room '{}' as '{}'",
            self.config.room_id,
            self.config.nickname
        );

        match connector.open().await {
            Ok(transport) => {
                self.transport = Some(transport);
                match self.join().await {
                    Ok(()) => {
                        self.apply(SessionEvent::HandshakeSucceeded);
                        self.status = format!(
                            "connected to room '{}' as '{}'",
                            self.config.room_id, self.config.nickname
                        );
                    }
                    Err(e) => self.fail(SessionEvent::HandshakeFailed, &e),
                }
            }
            Err(e) => self.fail(SessionEvent::HandshakeFailed, &e),
        }
    }

    /// Subscribe to the room topic, then announce presence.
    async fn join(&mut self) -> Result<(), TransportError> {
        let enter = ChatMessage::enter(self.config.room_id.clone(), self.config.nickname.clone());
        let body =
            encode_chat_message(&enter).map_err(|e| TransportError::Protocol(e.to_string()))?;

        let transport = self.transport.as_mut().ok_or(TransportError::Closed)?;
        transport.subscribe(&self.config.room_id.topic()).await?;
        transport
            .publish(&self.config.room_id.publish_destination(), body)
            .await
    }

    /// Publish a TALK message.
    ///
    /// Nothing is transmitted unless the session is `Connected` and the
    /// content is non-blank.
    pub async fn send(&mut self, content: &str) -> Result<(), ClientError> {
        if !self.state.is_connected() {
            tracing::warn!("Not connected: message not sent (session is {})", self.state);
            return Err(ClientError::SendRejected(SendRejection::NotConnected(
                self.state,
            )));
        }

        let content = MessageContent::new(content).map_err(|e| {
            ClientError::SendRejected(match e {
                ValueObjectError::MessageContentTooLong { max, actual } => {
                    SendRejection::TooLong { max, actual }
                }
                _ => SendRejection::EmptyContent,
            })
        })?;

        let message = ChatMessage::talk(
            self.config.room_id.clone(),
            self.config.nickname.clone(),
            content,
        );
        let body = encode_chat_message(&message)
            .map_err(|e| ClientError::ConnectionFailure(e.to_string()))?;

        let Some(transport) = self.transport.as_mut() else {
            return Err(ClientError::AbruptDisconnect);
        };
        if let Err(e) = transport
            .publish(&self.config.room_id.publish_destination(), body)
            .await
        {
            tracing::warn!("Failed to publish message: {}", e);
            self.lose_transport();
            return Err(ClientError::AbruptDisconnect);
        }

        Ok(())
    }

    /// Wait for the next message delivered to the room.
    ///
    /// The message is appended to the log before it is returned. Returns
    /// `None` once the session is no longer connected. Cancel-safe.
    pub async fn receive(&mut self) -> Option<ChatMessage> {
        loop {
            if !self.state.is_connected() {
                return None;
            }
            let transport = self.transport.as_mut()?;

            match transport.recv().await {
                Some(Ok(delivery)) => match decode_chat_message(&delivery.body) {
                    Ok(message) => {
                        self.log.append(message.clone(), self.clock.now_millis());
                        return Some(message);
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Skipping undecodable message from '{}': {}",
                            delivery.destination,
                            e
                        );
                    }
                },
                Some(Err(e)) => {
                    self.fail(SessionEvent::ProtocolFailed, &e);
                    return None;
                }
                None => {
                    self.lose_transport();
                    return None;
                }
            }
        }
    }

    /// Incoming messages as a lazy, unbounded stream.
    pub fn incoming(&mut self) -> impl Stream<Item = ChatMessage> + '_ {
        futures_util::stream::unfold(self, |session| async move {
            let message = session.receive().await?;
            Some((message, session))
        })
    }

    /// Leave the room gracefully.
    ///
    /// Publishes LEAVE best-effort, then closes the transport. No-op unless
    /// the session is `Connected`.
    pub async fn disconnect(&mut self) {
        if !self.state.is_connected() {
            tracing::debug!("disconnect ignored while {}", self.state);
            return;
        }

        let leave = ChatMessage::leave(self.config.room_id.clone(), self.config.nickname.clone());
        let destination = self.config.room_id.publish_destination();

        if let Some(mut transport) = self.transport.take() {
            match encode_chat_message(&leave) {
                Ok(body) => {
                    if let Err(e) = transport.publish(&destination, body).await {
                        tracing::warn!("Failed to publish LEAVE: {}", e);
                    }
                }
                Err(e) => tracing::warn!("Failed to encode LEAVE: {}", e),
            }
            if let Err(e) = transport.close().await {
                tracing::warn!("Failed to close transport cleanly: {}", e);
            }
        }

        self.disconnect_reason = Some(DisconnectReason::Teardown);
        self.apply(SessionEvent::Teardown);
        self.status = format!("left room '{}'", self.config.room_id);
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Observe state transitions; the receiver starts at the current state.
    pub fn state_changes(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Human-readable description of the current state
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn disconnect_reason(&self) -> Option<DisconnectReason> {
        self.disconnect_reason
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    fn lose_transport(&mut self) {
        tracing::warn!(
            "Connection to room '{}' lost without teardown",
            self.config.room_id
        );
        self.transport = None;
        self.disconnect_reason = Some(DisconnectReason::TransportLost);
        self.apply(SessionEvent::TransportClosed);
        self.status = "connection lost".to_string();
    }

    fn fail(&mut self, event: SessionEvent, error: &TransportError) {
        tracing::error!("Session failed: {}", error);
        self.transport = None;
        self.apply(event);
        self.status = format!("connection failed: {}", error);
    }

    fn apply(&mut self, event: SessionEvent) {
        match self.state.on(event) {
            Ok(next) => {
                tracing::debug!("Session {} -> {} on {:?}", self.state, next, event);
                self.state = next;
                self.state_tx.send_replace(next);
            }
            Err(e) => tracing::warn!("{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use futures_util::StreamExt;
    use stomproom_shared::time::FixedClock;

    use super::*;
    use crate::{
        domain::{MessageType, transport::MockTransport},
        usecase::fake::{Recorder, ScriptedConnector, ScriptedTransport, TOPIC},
    };

    const DESTINATION: &str = "/app/chat.sendMessage.room1";

    // ── Helpers ─────────────────────────────────────────────────────

    fn config() -> SessionConfig {
        SessionConfig {
            nickname: Nickname::new("alice").unwrap(),
            room_id: RoomId::new("room1").unwrap(),
        }
    }

    fn body(sender: &str, content: &str, kind: &str) -> String {
        format!(
            r#"{{"roomId":"room1","sender":"{}","content":"{}","type":"{}"}}"#,
            sender, content, kind
        )
    }

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock::new(1672531200000))
    }

    async fn connected(transport: ScriptedTransport) -> ChatSession<ScriptedTransport> {
        let connector = ScriptedConnector::new(vec![Ok(transport)]);
        let session = ChatSession::connect_with_clock(config(), &connector, clock()).await;
        assert_eq!(session.state(), SessionState::Connected);
        session
    }

    // ── Tests ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_connect_subscribes_then_publishes_one_enter() {
        // テスト項目: 接続成功時にルームを購読し、ENTER を 1 件だけ送信する
        // given (前提条件):
        let recorder = Recorder::default();
        let connector = ScriptedConnector::new(vec![Ok(ScriptedTransport::new(&recorder))]);

        // when (操作):
        let session = ChatSession::connect(config(), &connector).await;

        // then (期待する結果):
        assert_eq!(session.state(), SessionState::Connected);
        assert_eq!(*recorder.subscribed.lock().unwrap(), vec![TOPIC.to_string()]);
        assert_eq!(recorder.published_types(), vec!["ENTER"]);
        assert_eq!(recorder.published.lock().unwrap()[0].0, DESTINATION);
        assert!(session.status().contains("connected"));
    }

    #[tokio::test]
    async fn test_connect_failure_is_errored_without_retry() {
        // テスト項目: 接続失敗時は Errored になり、再試行しない
        // given (前提条件):
        let connector = ScriptedConnector::<ScriptedTransport>::new(vec![Err(
            TransportError::Connect("connection refused".to_string()),
        )]);

        // when (操作):
        let session = ChatSession::connect(config(), &connector).await;

        // then (期待する結果):
        assert_eq!(session.state(), SessionState::Errored);
        assert!(session.status().contains("connection refused"));
        assert!(connector.transports.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_enter_publish_is_errored() {
        // テスト項目: ENTER の送信に失敗した場合は Errored になる
        // given (前提条件):
        let recorder = Recorder::default();
        let transport = ScriptedTransport::new(&recorder).failing_publish();
        let connector = ScriptedConnector::new(vec![Ok(transport)]);

        // when (操作):
        let session = ChatSession::connect(config(), &connector).await;

        // then (期待する結果):
        assert_eq!(session.state(), SessionState::Errored);
        assert!(recorder.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_publishes_talk() {
        // テスト項目: 接続中の送信は TALK として送信先に publish される
        // given (前提条件):
        let recorder = Recorder::default();
        let mut session = connected(ScriptedTransport::new(&recorder)).await;

        // when (操作):
        let result = session.send("hello").await;

        // then (期待する結果):
        assert!(result.is_ok());
        let published = recorder.published.lock().unwrap().clone();
        assert_eq!(published.len(), 2);
        assert_eq!(published[1], (DESTINATION.to_string(), body("alice", "hello", "TALK")));
    }

    #[tokio::test]
    async fn test_blank_input_is_never_published() {
        // テスト項目: 空文字や空白のみの入力は送信されない
        // given (前提条件):
        let recorder = Recorder::default();
        let mut session = connected(ScriptedTransport::new(&recorder)).await;

        for input in ["", "   ", "\t\n"] {
            // when (操作):
            let result = session.send(input).await;

            // then (期待する結果):
            assert!(matches!(
                result,
                Err(ClientError::SendRejected(SendRejection::EmptyContent))
            ));
        }
        assert_eq!(recorder.published_types(), vec!["ENTER"]);
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[tokio::test]
    async fn test_too_long_input_is_rejected() {
        // テスト項目: 長すぎる入力は送信されずに拒否される
        // given (前提条件):
        let recorder = Recorder::default();
        let mut session = connected(ScriptedTransport::new(&recorder)).await;
        let input = "x".repeat(10001);

        // when (操作):
        let result = session.send(&input).await;

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(ClientError::SendRejected(SendRejection::TooLong {
                max: 10000,
                actual: 10001
            }))
        ));
        assert_eq!(recorder.published_types(), vec!["ENTER"]);
    }

    #[tokio::test]
    async fn test_send_while_errored_is_rejected() {
        // テスト項目: Errored 状態での送信は拒否される
        // given (前提条件):
        let connector = ScriptedConnector::<ScriptedTransport>::new(vec![]);
        let mut session = ChatSession::connect(config(), &connector).await;

        // when (操作):
        let result = session.send("hello").await;

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(ClientError::SendRejected(SendRejection::NotConnected(
                SessionState::Errored
            )))
        ));
    }

    #[tokio::test]
    async fn test_send_after_abrupt_close_never_publishes() {
        // テスト項目: 突然の切断後の送信はトランスポートに一切届かない
        // given (前提条件):
        let mut transport = MockTransport::new();
        transport
            .expect_subscribe()
            .withf(|destination| destination == TOPIC)
            .times(1)
            .returning(|_| Ok(()));
        transport
            .expect_publish()
            .withf(|destination, body| destination == DESTINATION && body.contains("ENTER"))
            .times(1)
            .returning(|_, _| Ok(()));
        transport.expect_recv().times(1).returning(|| None);
        transport.expect_close().times(0);
        let connector = ScriptedConnector::new(vec![Ok(transport)]);
        let mut session = ChatSession::connect(config(), &connector).await;

        // when (操作):
        let received = session.receive().await;
        let result = session.send("hello").await;

        // then (期待する結果):
        assert!(received.is_none());
        assert_eq!(session.state(), SessionState::Disconnected);
        assert_eq!(
            session.disconnect_reason(),
            Some(DisconnectReason::TransportLost)
        );
        assert!(matches!(
            result,
            Err(ClientError::SendRejected(SendRejection::NotConnected(
                SessionState::Disconnected
            )))
        ));
    }

    #[tokio::test]
    async fn test_publish_failure_is_abrupt_disconnect() {
        // テスト項目: 送信中にソケットが失われた場合は AbruptDisconnect になる
        // given (前提条件):
        let mut transport = MockTransport::new();
        transport.expect_subscribe().returning(|_| Ok(()));
        let mut published = 0;
        transport.expect_publish().times(2).returning(move |_, _| {
            published += 1;
            if published == 1 {
                Ok(())
            } else {
                Err(TransportError::Closed)
            }
        });
        let connector = ScriptedConnector::new(vec![Ok(transport)]);
        let mut session = ChatSession::connect(config(), &connector).await;

        // when (操作):
        let result = session.send("hello").await;

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::AbruptDisconnect)));
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_receive_keeps_delivery_order() {
        // テスト項目: [A(TALK), B(ENTER), C(TALK)] の順に届いたものがその順でログに残る
        // given (前提条件):
        let recorder = Recorder::default();
        let transport = ScriptedTransport::new(&recorder)
            .deliver(&body("bob", "A", "TALK"))
            .deliver(&body("carol", "carol entered the room", "ENTER"))
            .deliver(&body("bob", "C", "TALK"));
        let mut session = connected(transport).await;

        // when (操作):
        let mut received = Vec::new();
        while let Some(message) = session.receive().await {
            received.push(message);
        }

        // then (期待する結果):
        let logged: Vec<ChatMessage> = session.log().messages().cloned().collect();
        assert_eq!(logged, received);
        let summary: Vec<(MessageType, &str)> = logged
            .iter()
            .map(|m| (m.kind(), m.sender()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (MessageType::Talk, "bob"),
                (MessageType::Enter, "carol"),
                (MessageType::Talk, "bob"),
            ]
        );
        assert_eq!(session.log().entries()[0].received_at, 1672531200000);
    }

    #[tokio::test]
    async fn test_undecodable_delivery_is_skipped() {
        // テスト項目: デコードできない配信はスキップされ、次のメッセージが返る
        // given (前提条件):
        let recorder = Recorder::default();
        let transport = ScriptedTransport::new(&recorder)
            .deliver("not json")
            .deliver(&body("bob", "hi", "TALK"));
        let mut session = connected(transport).await;

        // when (操作):
        let message = session.receive().await.unwrap();

        // then (期待する結果):
        assert_eq!(message.content(), "hi");
        assert_eq!(session.log().len(), 1);
        assert_eq!(session.state(), SessionState::Connected);
    }

    #[tokio::test]
    async fn test_broker_error_moves_to_errored() {
        // テスト項目: 接続中にブローカーからエラーが届くと Errored になる
        // given (前提条件):
        let recorder = Recorder::default();
        let transport = ScriptedTransport::new(&recorder).broker_error("destination forbidden");
        let mut session = connected(transport).await;

        // when (操作):
        let message = session.receive().await;

        // then (期待する結果):
        assert!(message.is_none());
        assert_eq!(session.state(), SessionState::Errored);
        assert!(session.status().contains("destination forbidden"));
    }

    #[tokio::test]
    async fn test_own_messages_echo_once_in_publish_order() {
        // テスト項目: ブローカーがエコーする場合、自分の送信が送信順に 1 回ずつログに現れる
        // given (前提条件):
        let recorder = Recorder::default();
        let mut session = connected(ScriptedTransport::new(&recorder).echoing()).await;
        session.send("one").await.unwrap();
        session.send("two").await.unwrap();

        // when (操作):
        let received: Vec<ChatMessage> = session.incoming().collect().await;

        // then (期待する結果):
        let contents: Vec<&str> = received.iter().map(ChatMessage::content).collect();
        assert_eq!(contents, vec!["alice entered the room", "one", "two"]);
    }

    #[tokio::test]
    async fn test_disconnect_publishes_leave_and_closes() {
        // テスト項目: 明示的な切断で LEAVE を送信し、トランスポートを閉じる
        // given (前提条件):
        let recorder = Recorder::default();
        let mut session = connected(ScriptedTransport::new(&recorder)).await;
        let mut states = session.state_changes();

        // when (操作):
        session.disconnect().await;

        // then (期待する結果):
        assert_eq!(recorder.published_types(), vec!["ENTER", "LEAVE"]);
        assert!(recorder.closed.load(Ordering::SeqCst));
        assert_eq!(session.state(), SessionState::Disconnected);
        assert_eq!(session.disconnect_reason(), Some(DisconnectReason::Teardown));
        assert!(states.has_changed().unwrap());
        assert_eq!(*states.borrow_and_update(), SessionState::Disconnected);
    }

    #[tokio::test]
    async fn test_disconnect_twice_publishes_one_leave() {
        // テスト項目: 2 回切断しても LEAVE は 1 回だけ送信される
        // given (前提条件):
        let recorder = Recorder::default();
        let mut session = connected(ScriptedTransport::new(&recorder)).await;

        // when (操作):
        session.disconnect().await;
        session.disconnect().await;

        // then (期待する結果):
        assert_eq!(recorder.published_types(), vec!["ENTER", "LEAVE"]);
    }

    #[tokio::test]
    async fn test_abrupt_close_publishes_no_leave() {
        // テスト項目: 突然の切断では LEAVE が送信されない
        // given (前提条件):
        let recorder = Recorder::default();
        let mut session = connected(ScriptedTransport::new(&recorder)).await;

        // when (操作):
        let message = session.receive().await;
        session.disconnect().await;

        // then (期待する結果):
        assert!(message.is_none());
        assert_eq!(recorder.published_types(), vec!["ENTER"]);
        assert!(!recorder.closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_resume_carries_log_without_replay() {
        // テスト項目: 再接続後もログは引き継がれ、既読メッセージは重複しない
        // given (前提条件):
        let first = Recorder::default();
        let second = Recorder::default();
        let connector = ScriptedConnector::new(vec![
            Ok(ScriptedTransport::new(&first).deliver(&body("bob", "A", "TALK"))),
            Ok(ScriptedTransport::new(&second).deliver(&body("bob", "B", "TALK"))),
        ]);
        let mut session = ChatSession::connect_with_clock(config(), &connector, clock()).await;
        while session.receive().await.is_some() {}
        assert_eq!(session.state(), SessionState::Disconnected);

        // when (操作):
        let mut session = session.resume(&connector).await;
        while session.receive().await.is_some() {}

        // then (期待する結果):
        let contents: Vec<&str> = session.log().messages().map(ChatMessage::content).collect();
        assert_eq!(contents, vec!["A", "B"]);
        assert_eq!(first.published_types(), vec!["ENTER"]);
        assert_eq!(second.published_types(), vec!["ENTER"]);
    }

    #[tokio::test]
    async fn test_state_changes_start_at_current_state() {
        // テスト項目: 状態の購読は現在の状態から始まる
        // given (前提条件):
        let recorder = Recorder::default();
        let session = connected(ScriptedTransport::new(&recorder)).await;

        // when (操作):
        let states = session.state_changes();

        // then (期待する結果):
        assert_eq!(*states.borrow(), SessionState::Connected);
    }

    #[tokio::test]
    async fn test_state_changes_observe_connecting_before_handshake() {
        // テスト項目: ハンドシェイク前に購読すれば Connecting から Connected への遷移を観測できる
        // given (前提条件):
        let recorder = Recorder::default();
        let connector = ScriptedConnector::new(vec![Ok(ScriptedTransport::new(&recorder))]);
        let mut session = ChatSession::with_clock(config(), clock());
        let mut states = session.state_changes();
        assert_eq!(*states.borrow_and_update(), SessionState::Connecting);

        // when (操作):
        session.open(&connector).await;

        // then (期待する結果):
        assert!(states.has_changed().unwrap());
        assert_eq!(*states.borrow_and_update(), SessionState::Connected);
        assert_eq!(recorder.published_types(), vec!["ENTER"]);
    }

    #[tokio::test]
    async fn test_state_changes_survive_resume() {
        // テスト項目: 再接続の前に取得した状態の購読で、再接続後の状態を観測できる
        // given (前提条件):
        let connector = ScriptedConnector::new(vec![
            Ok(ScriptedTransport::new(&Recorder::default())),
            Ok(ScriptedTransport::new(&Recorder::default())),
        ]);
        let mut session = ChatSession::connect_with_clock(config(), &connector, clock()).await;
        let mut states = session.state_changes();
        assert!(session.receive().await.is_none());
        assert_eq!(*states.borrow_and_update(), SessionState::Disconnected);

        // when (操作):
        let session = session.resume(&connector).await;

        // then (期待する結果):
        assert_eq!(session.state(), SessionState::Connected);
        assert!(states.changed().await.is_ok());
        assert_eq!(*states.borrow_and_update(), SessionState::Connected);
    }

    #[tokio::test]
    async fn test_open_is_ignored_after_terminal_state() {
        // テスト項目: 終了状態のセッションで open を呼んでも接続しない
        // given (前提条件):
        let connector = ScriptedConnector::<ScriptedTransport>::new(vec![]);
        let mut session = ChatSession::connect(config(), &connector).await;
        assert_eq!(session.state(), SessionState::Errored);
        let recorder = Recorder::default();
        let retry = ScriptedConnector::new(vec![Ok(ScriptedTransport::new(&recorder))]);

        // when (操作):
        session.open(&retry).await;

        // then (期待する結果):
        assert_eq!(session.state(), SessionState::Errored);
        assert!(recorder.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_peer_messages_outside_local_rules_are_logged() {
        // テスト項目: 自分の入力規則に合わない送信者のメッセージも配信順にログへ残る
        // given (前提条件):
        let long_sender = "b".repeat(101);
        let transport = ScriptedTransport::new(&Recorder::default())
            .deliver(&body("bob", "A", "TALK"))
            .deliver(&body(&long_sender, "B", "TALK"))
            .deliver(r#"{"roomId":"room1","sender":null,"content":"C","type":"TALK"}"#);
        let mut session = connected(transport).await;

        // when (操作):
        while session.receive().await.is_some() {}

        // then (期待する結果):
        let logged: Vec<(&str, &str)> = session
            .log()
            .messages()
            .map(|m| (m.sender(), m.content()))
            .collect();
        assert_eq!(
            logged,
            vec![("bob", "A"), (long_sender.as_str(), "B"), ("", "C")]
        );
    }

    #[tokio::test]
    async fn test_resume_on_live_session_keeps_connection() {
        // テスト項目: 終了していないセッションで resume を呼んでも再接続しない
        // given (前提条件):
        let recorder = Recorder::default();
        let transport = ScriptedTransport::new(&recorder).held_open();
        let connector = ScriptedConnector::new(vec![Ok(transport)]);
        let session = ChatSession::connect(config(), &connector).await;

        // when (操作):
        let session = session.resume(&connector).await;

        // then (期待する結果):
        assert_eq!(session.state(), SessionState::Connected);
        assert_eq!(connector.opened.load(Ordering::SeqCst), 1);
        assert_eq!(recorder.published_types(), vec!["ENTER"]);
    }
}
