//! Inbound update conversion and the `Channel` implementation.

use super::types::TgUpdate;
use super::TelegramChannel;
use async_trait::async_trait;
use subtrack_core::{
    error::SubtrackError,
    message::{IncomingMessage, OutgoingMessage},
    traits::Channel,
};
use tracing::debug;

impl TgUpdate {
    /// The text message carried by this update, if any.
    ///
    /// Updates without a message or without text (stickers, photos, edits)
    /// yield `None`, as do group chats: the chat id doubles as the user id,
    /// which only holds for private chats.
    pub fn into_incoming(self) -> Option<IncomingMessage> {
        let msg = self.message?;
        if matches!(msg.chat.chat_type.as_str(), "group" | "supergroup" | "channel") {
            debug!("telegram: ignoring {} chat {}", msg.chat.chat_type, msg.chat.id);
            return None;
        }
        let Some(text) = msg.text else {
            debug!("telegram: message {} in chat {} has no text", msg.message_id, msg.chat.id);
            return None;
        };
        Some(IncomingMessage::new(msg.chat.id, text))
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, message: OutgoingMessage) -> Result<(), SubtrackError> {
        self.send_message(&message).await
    }
}
