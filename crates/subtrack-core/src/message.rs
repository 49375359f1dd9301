use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An incoming text message from a chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: Uuid,
    /// Chat id of the sender. Private chats only, so this is also the user id.
    pub user_id: i64,
    /// Message text content.
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl IncomingMessage {
    pub fn new(user_id: i64, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// An outgoing message, shaped like the Bot API `sendMessage` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub chat_id: i64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyKeyboard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
}

impl OutgoingMessage {
    /// Plain text with no keyboard.
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            reply_markup: None,
            parse_mode: None,
        }
    }

    /// Labels of every keyboard button, row by row. Empty without a keyboard.
    pub fn button_labels(&self) -> Vec<&str> {
        self.reply_markup
            .as_ref()
            .map(|k| {
                k.keyboard
                    .iter()
                    .flatten()
                    .map(|b| b.text.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Text formatting mode understood by the Bot API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    Markdown,
}

/// A reply keyboard: rows of tappable text buttons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyKeyboard {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
}

impl ReplyKeyboard {
    /// Build a keyboard from rows of labels.
    pub fn from_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keyboard: rows
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .map(|label| KeyboardButton { text: label.into() })
                        .collect()
                })
                .collect(),
            resize_keyboard: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardButton {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_message_omits_optional_fields() {
        let msg = OutgoingMessage::text(42, "hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["chat_id"], 42);
        assert_eq!(json["text"], "hi");
        assert!(json.get("reply_markup").is_none());
        assert!(json.get("parse_mode").is_none());
    }

    #[test]
    fn test_keyboard_serializes_as_bot_api_shape() {
        let msg = OutgoingMessage {
            chat_id: 7,
            text: "menu".into(),
            reply_markup: Some(ReplyKeyboard::from_rows([vec!["a", "b"], vec!["c"]])),
            parse_mode: Some(ParseMode::Markdown),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["parse_mode"], "Markdown");
        assert_eq!(json["reply_markup"]["resize_keyboard"], true);
        assert_eq!(json["reply_markup"]["keyboard"][0][1]["text"], "b");
        assert_eq!(json["reply_markup"]["keyboard"][1][0]["text"], "c");
        assert_eq!(msg.button_labels(), vec!["a", "b", "c"]);
    }
}
