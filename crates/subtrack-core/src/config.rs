use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SubtrackError;

/// Environment variable that overrides `telegram.bot_token`.
pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Top-level subtrack configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub subtrack: GeneralConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub sessions: SessionConfig,
    #[serde(default)]
    pub bot: BotConfig,
}

/// General process settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Also write a daily rolling log under `{data_dir}/logs`.
    #[serde(default)]
    pub log_to_file: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            log_to_file: false,
        }
    }
}

/// How replies reach the user.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyMode {
    /// Reply in the webhook response body (`"method": "sendMessage"`).
    #[default]
    Inline,
    /// Call `sendMessage` on the Bot API and answer the webhook with an empty 200.
    Push,
}

impl ReplyMode {
    pub fn display_name(&self) -> &str {
        match self {
            Self::Inline => "inline",
            Self::Push => "push",
        }
    }
}

/// Telegram bot config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub reply_mode: ReplyMode,
    /// Public URL registered with `setWebhook` at startup. Empty = leave as is.
    #[serde(default)]
    pub webhook_url: String,
}

/// Webhook HTTP server config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// SQLite storage config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

/// Where dialogue sessions live.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// Persisted in the `sessions` table, survives restarts.
    #[default]
    Sqlite,
    /// Held in process memory, lost on restart.
    Memory,
}

/// Dialogue session config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub backend: SessionBackend,
    /// Idle time after which a half-finished dialogue is dropped.
    #[serde(default = "default_session_timeout")]
    pub timeout_minutes: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::default(),
            timeout_minutes: default_session_timeout(),
        }
    }
}

/// Presentation settings for bot replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Currency label appended to prices. Display only, never converted.
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
        }
    }
}

// --- Default value functions ---

fn default_name() -> String {
    "subtrack".to_string()
}
fn default_data_dir() -> String {
    "~/.subtrack".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_db_path() -> String {
    "~/.subtrack/subtrack.db".to_string()
}
fn default_session_timeout() -> i64 {
    60
}
fn default_currency() -> String {
    "RUB".to_string()
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist. A non-empty
/// `TELEGRAM_BOT_TOKEN` always wins over the file's token.
pub fn load(path: &str) -> Result<Config, SubtrackError> {
    let path = Path::new(path);
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SubtrackError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        parse(&content)?
    } else {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        Config::default()
    };

    if let Ok(token) = std::env::var(BOT_TOKEN_ENV) {
        if !token.trim().is_empty() {
            config.telegram.bot_token = token.trim().to_string();
        }
    }

    Ok(config)
}

/// Parse configuration from TOML text.
pub fn parse(content: &str) -> Result<Config, SubtrackError> {
    toml::from_str(content)
        .map_err(|e| SubtrackError::Config(format!("failed to parse config: {}", e)))
}
