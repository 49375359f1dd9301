//! Telegram Bot API channel.
//!
//! Updates arrive through the webhook; replies go out with `sendMessage`.
//! Docs: <https://core.telegram.org/bots/api>

mod send;
mod types;
mod webhook;

#[cfg(test)]
mod tests;

pub use types::{TgChat, TgMessage, TgResponse, TgUpdate};

use subtrack_core::config::TelegramConfig;

/// Telegram channel using the Bot API.
pub struct TelegramChannel {
    config: TelegramConfig,
    client: reqwest::Client,
    base_url: String,
}

impl TelegramChannel {
    /// Create a new Telegram channel from config.
    pub fn new(config: TelegramConfig) -> Self {
        let base_url = format!("https://api.telegram.org/bot{}", config.bot_token);
        Self {
            config,
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Whether a bot token is configured.
    pub fn is_configured(&self) -> bool {
        !self.config.bot_token.trim().is_empty()
    }
}
