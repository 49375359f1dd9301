use crate::{dialogue::DialogueState, error::SubtrackError, message::OutgoingMessage};
use async_trait::async_trait;

/// Messaging channel trait: outbound delivery.
///
/// Inbound messages arrive through the webhook, so a channel only needs
/// to know how to push a reply.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// Deliver a message to `message.chat_id`.
    async fn send(&self, message: OutgoingMessage) -> Result<(), SubtrackError>;
}

/// Per-user dialogue session storage.
///
/// `None` from [`SessionStore::load`] means the user is idle. Implementations
/// drop sessions idle past their timeout when they are read.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, user_id: i64) -> Result<Option<DialogueState>, SubtrackError>;

    /// Create or replace the user's session and refresh its activity time.
    async fn save(&self, user_id: i64, state: &DialogueState) -> Result<(), SubtrackError>;

    async fn clear(&self, user_id: i64) -> Result<(), SubtrackError>;
}
