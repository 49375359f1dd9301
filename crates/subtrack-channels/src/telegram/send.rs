//! Message sending and bot setup calls.

use super::types::TgResponse;
use super::TelegramChannel;
use subtrack_core::{error::SubtrackError, message::OutgoingMessage};
use tracing::{info, warn};

impl TelegramChannel {
    /// Send a message (with its keyboard) through `sendMessage`.
    ///
    /// When Telegram rejects the Markdown, the message is resent as plain text.
    pub async fn send_message(&self, message: &OutgoingMessage) -> Result<(), SubtrackError> {
        let url = format!("{}/sendMessage", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(message)
            .send()
            .await
            .map_err(|e| SubtrackError::Channel(format!("telegram send failed: {e}")))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let error_text = resp.text().await.unwrap_or_default();
        if message.parse_mode.is_none() || !error_text.contains("can't parse entities") {
            return Err(SubtrackError::Channel(format!(
                "telegram send failed ({status}): {error_text}"
            )));
        }

        warn!("Markdown parse failed, retrying as plain text: {error_text}");
        let plain = OutgoingMessage {
            parse_mode: None,
            ..message.clone()
        };
        let plain_resp = self
            .client
            .post(&url)
            .json(&plain)
            .send()
            .await
            .map_err(|e| SubtrackError::Channel(format!("telegram send (plain) failed: {e}")))?;

        if !plain_resp.status().is_success() {
            let plain_err = plain_resp.text().await.unwrap_or_default();
            return Err(SubtrackError::Channel(format!(
                "telegram send (plain fallback) failed: {plain_err}"
            )));
        }

        Ok(())
    }

    /// Register bot commands with Telegram so users see an autocomplete menu.
    /// Best-effort: logs failures but does not propagate errors.
    pub async fn register_commands(&self) {
        let commands = serde_json::json!({
            "commands": [
                { "command": "start", "description": "Show the main menu" },
                { "command": "list", "description": "List your subscriptions and totals" },
                { "command": "cancel", "description": "Cancel the current step" },
                { "command": "help", "description": "How to use the bot" },
            ]
        });

        let url = format!("{}/setMyCommands", self.base_url);
        match self.client.post(&url).json(&commands).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("registered Telegram bot commands");
            }
            Ok(resp) => {
                let body = resp.text().await.unwrap_or_default();
                warn!("failed to register Telegram bot commands: {body}");
            }
            Err(e) => {
                warn!("failed to register Telegram bot commands: {e}");
            }
        }
    }

    /// Point Telegram at our webhook URL.
    pub async fn set_webhook(&self, webhook_url: &str) -> Result<(), SubtrackError> {
        let url = format!("{}/setWebhook", self.base_url);
        let body = serde_json::json!({
            "url": webhook_url,
            "allowed_updates": ["message"],
        });

        let resp: TgResponse<bool> = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SubtrackError::Channel(format!("telegram setWebhook failed: {e}")))?
            .json()
            .await
            .map_err(|e| SubtrackError::Channel(format!("telegram setWebhook parse error: {e}")))?;

        if !resp.ok {
            return Err(SubtrackError::Channel(format!(
                "telegram setWebhook rejected: {}",
                resp.description.unwrap_or_default()
            )));
        }

        info!("Telegram webhook set to {webhook_url}");
        Ok(())
    }
}
