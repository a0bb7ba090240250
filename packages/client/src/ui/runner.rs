//! Client execution logic with reconnection support.

use chrono::FixedOffset;
use stomproom_shared::time::{local_offset, now_millis};
use tokio::sync::mpsc;

use super::{
    formatter::MessageFormatter,
    input::spawn_line_reader,
    prompt::redisplay_prompt,
};
use crate::{
    config::{ClientConfig, ReconnectPolicy},
    domain::{ChatMessage, ClientError, Connector, Nickname, SendRejection, Transport},
    infrastructure::stomp::StompConnector,
    usecase::{ChatSession, DisconnectReason, SessionConfig},
};

/// What ended a stretch of connected operation
enum Outcome {
    /// Input closed (Ctrl+C / Ctrl+D)
    UserExit,
    /// The session stopped being connected
    SessionEnded,
}

enum Step {
    Input(Option<String>),
    Incoming(Option<ChatMessage>),
}

/// Run the chat client with reconnection logic
///
/// Returns once the user leaves. An initial connect failure, a protocol
/// failure or running out of reconnect attempts is returned as an error.
pub async fn run_client(config: ClientConfig, nickname: Nickname) -> Result<(), ClientError> {
    let connector = StompConnector::new(config.endpoint.clone()).with_heart_beat(config.heart_beat);
    tracing::info!("Connecting to {} as '{}'", connector.endpoint(), nickname);

    let prompt = format!("{}> ", nickname);
    let session_config = SessionConfig {
        nickname,
        room_id: config.room_id.clone(),
    };
    run_session(&connector, session_config, &config.reconnect, || {
        spawn_line_reader(prompt)
    })
    .await
}

/// Drive one membership over `connector` until the user leaves.
///
/// `spawn_input` is only called once the first connection succeeded.
async fn run_session<C, F>(
    connector: &C,
    session_config: SessionConfig,
    policy: &ReconnectPolicy,
    spawn_input: F,
) -> Result<(), ClientError>
where
    C: Connector,
    F: FnOnce() -> mpsc::UnboundedReceiver<String>,
{
    let nickname = session_config.nickname.clone();
    let room_id = session_config.room_id.clone();

    let mut session = ChatSession::connect(session_config, connector).await;
    if !session.state().is_connected() {
        print!(
            "{}",
            MessageFormatter::format_status(session.state(), session.status())
        );
        return Err(ClientError::ConnectionFailure(session.status().to_string()));
    }

    print!("{}", MessageFormatter::format_welcome(&nickname, &room_id));

    let mut input = spawn_input();
    let offset = local_offset();

    loop {
        if let Outcome::UserExit = drive(&mut session, &mut input, &offset).await {
            session.disconnect().await;
            tracing::info!("Client session ended normally");
            return Ok(());
        }

        print!(
            "{}",
            MessageFormatter::format_status(session.state(), session.status())
        );
        if session.disconnect_reason() != Some(DisconnectReason::TransportLost) {
            return Err(ClientError::ConnectionFailure(session.status().to_string()));
        }

        session = match reconnect(session, connector, policy, &mut input).await {
            Reconnect::Connected(session) => session,
            Reconnect::UserExit => {
                tracing::info!("Client session ended while disconnected");
                return Ok(());
            }
            Reconnect::GaveUp => return Err(ClientError::AbruptDisconnect),
        };
        print!(
            "{}",
            MessageFormatter::format_status(session.state(), session.status())
        );
        redisplay_prompt(&nickname);
    }
}

/// Pump input and deliveries until the user leaves or the session ends
async fn drive<T: Transport>(
    session: &mut ChatSession<T>,
    input: &mut mpsc::UnboundedReceiver<String>,
    offset: &FixedOffset,
) -> Outcome {
    let nickname = session.config().nickname.clone();

    loop {
        let step = tokio::select! {
            line = input.recv() => Step::Input(line),
            message = session.receive() => Step::Incoming(message),
        };

        match step {
            Step::Input(None) => return Outcome::UserExit,
            Step::Input(Some(line)) => send_line(session, &line).await,
            Step::Incoming(Some(message)) => {
                let received_at = session
                    .log()
                    .entries()
                    .last()
                    .map(|entry| entry.received_at)
                    .unwrap_or_else(now_millis);
                print!(
                    "{}",
                    MessageFormatter::format_message(&message, received_at, &nickname, offset)
                );
                redisplay_prompt(&nickname);
            }
            Step::Incoming(None) => return Outcome::SessionEnded,
        }
    }
}

async fn send_line<T: Transport>(session: &mut ChatSession<T>, line: &str) {
    match session.send(line).await {
        Ok(()) => {}
        Err(ClientError::SendRejected(SendRejection::EmptyContent)) => {
            redisplay_prompt(&session.config().nickname);
        }
        Err(ClientError::SendRejected(rejection)) => {
            print!("{}", MessageFormatter::format_send_rejected(&rejection));
            redisplay_prompt(&session.config().nickname);
        }
        Err(e) => tracing::warn!("Failed to send message: {}", e),
    }
}

enum Reconnect<T: Transport> {
    Connected(ChatSession<T>),
    UserExit,
    GaveUp,
}

/// Retry with a fixed delay until connected or out of attempts.
///
/// Lines typed while waiting go through `send` on the disconnected session
/// and are rejected, never queued for the next connection.
async fn reconnect<C>(
    mut session: ChatSession<C::Transport>,
    connector: &C,
    policy: &ReconnectPolicy,
    input: &mut mpsc::UnboundedReceiver<String>,
) -> Reconnect<C::Transport>
where
    C: Connector,
{
    let mut attempts = 0;

    while policy.allows(attempts) {
        attempts += 1;
        print!(
            "{}",
            MessageFormatter::format_reconnecting(attempts, policy.max_attempts, policy.delay)
        );

        let delay = tokio::time::sleep(policy.delay);
        tokio::pin!(delay);
        loop {
            tokio::select! {
                _ = &mut delay => break,
                line = input.recv() => match line {
                    Some(line) => send_line(&mut session, &line).await,
                    None => return Reconnect::UserExit,
                },
            }
        }

        session = session.resume(connector).await;
        if session.state().is_connected() {
            tracing::info!("Reconnected after {} attempt(s)", attempts);
            return Reconnect::Connected(session);
        }
        tracing::warn!("Reconnect attempt {} failed: {}", attempts, session.status());
    }

    tracing::error!(
        "Failed to reconnect after {} attempts. Exiting.",
        policy.max_attempts
    );
    Reconnect::GaveUp
}
