//! Message formatting utilities for client display.

use std::time::Duration;

use chrono::FixedOffset;
use stomproom_shared::time::timestamp_to_clock_time;

use crate::domain::{ChatMessage, MessageType, Nickname, RoomId, SendRejection, SessionState};

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Banner shown once the room is joined
    pub fn format_welcome(nickname: &Nickname, room_id: &RoomId) -> String {
        format!(
            "\n============================================================\n\
             You are '{}' in room '{}'.\n\
             Type messages and press Enter to send. Press Ctrl+C to leave.\n\
             ============================================================\n",
            nickname, room_id
        )
    }

    /// Format a message from the room log
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    /// * `received_at` - Unix timestamp (milliseconds) when it arrived locally
    /// * `me` - The current user's nickname (own messages are marked)
    /// * `offset` - Timezone offset to show times in
    pub fn format_message(
        message: &ChatMessage,
        received_at: i64,
        me: &Nickname,
        offset: &FixedOffset,
    ) -> String {
        let time = timestamp_to_clock_time(received_at, offset)
            .unwrap_or_else(|| "--:--:--".to_string());
        match message.kind() {
            MessageType::Enter => format!("\n[{}] + {} entered\n", time, message.sender()),
            MessageType::Leave => format!("\n[{}] - {} left\n", time, message.sender()),
            MessageType::Talk => {
                let me_suffix = if message.is_from(me) { " (me)" } else { "" };
                format!(
                    "\n[{}] @{}{}: {}\n",
                    time,
                    message.sender(),
                    me_suffix,
                    message.content()
                )
            }
        }
    }

    /// Format the session status indicator
    pub fn format_status(state: SessionState, status: &str) -> String {
        format!("\n* [{}] {}\n", state, status)
    }

    /// Format the alert shown when a message could not be sent
    pub fn format_send_rejected(rejection: &SendRejection) -> String {
        format!("\n! Message not sent: {}\n", rejection)
    }

    /// Format the notice shown before a reconnection attempt
    pub fn format_reconnecting(attempt: u32, max_attempts: u32, delay: Duration) -> String {
        format!(
            "\n* Reconnecting in {} seconds... (attempt {}/{})\n",
            delay.as_secs(),
            attempt,
            max_attempts
        )
    }
}
