//! Tests for the Telegram channel module.

use super::types::*;
use super::TelegramChannel;
use subtrack_core::config::TelegramConfig;

#[test]
fn test_minimal_webhook_envelope() {
    let update: TgUpdate =
        serde_json::from_str(r#"{"message":{"chat":{"id":42},"text":"/start"}}"#).unwrap();
    let incoming = update.into_incoming().unwrap();
    assert_eq!(incoming.user_id, 42);
    assert_eq!(incoming.text, "/start");
}

#[test]
fn test_full_private_update() {
    let json = r#"{
        "update_id": 900,
        "message": {
            "message_id": 5,
            "from": {"id": 42, "first_name": "Ann", "username": "ann"},
            "chat": {"id": 42, "type": "private"},
            "date": 1700000000,
            "text": "Netflix - 599 - 15"
        }
    }"#;
    let update: TgUpdate = serde_json::from_str(json).unwrap();
    assert_eq!(update.update_id, 900);
    let msg = update.message.as_ref().unwrap();
    assert_eq!(msg.message_id, 5);
    assert_eq!(msg.chat.chat_type, "private");
    let incoming = update.into_incoming().unwrap();
    assert_eq!(incoming.text, "Netflix - 599 - 15");
}

#[test]
fn test_update_without_text_is_ignored() {
    let update: TgUpdate =
        serde_json::from_str(r#"{"update_id":1,"message":{"chat":{"id":42},"sticker":{}}}"#)
            .unwrap();
    assert!(update.into_incoming().is_none());

    let update: TgUpdate =
        serde_json::from_str(r#"{"update_id":2,"edited_message":{"chat":{"id":42}}}"#).unwrap();
    assert!(update.into_incoming().is_none());
}

#[test]
fn test_group_messages_are_ignored() {
    let update: TgUpdate = serde_json::from_str(
        r#"{"message":{"chat":{"id":-100123,"type":"supergroup"},"text":"/start"}}"#,
    )
    .unwrap();
    assert!(update.into_incoming().is_none());
}

#[test]
fn test_tg_chat_type_defaults_when_missing() {
    let chat: TgChat = serde_json::from_str(r#"{"id": 123}"#).unwrap();
    assert_eq!(chat.chat_type, "");
}

#[test]
fn test_envelope_without_chat_id_fails_to_parse() {
    assert!(serde_json::from_str::<TgUpdate>(r#"{"message":{"text":"hi"}}"#).is_err());
}

#[test]
fn test_api_response_parsing() {
    let ok: TgResponse<bool> = serde_json::from_str(r#"{"ok":true,"result":true}"#).unwrap();
    assert!(ok.ok);
    let err: TgResponse<bool> =
        serde_json::from_str(r#"{"ok":false,"description":"Unauthorized"}"#).unwrap();
    assert!(!err.ok);
    assert_eq!(err.description.as_deref(), Some("Unauthorized"));
}

#[test]
fn test_is_configured() {
    assert!(!TelegramChannel::new(TelegramConfig::default()).is_configured());
    let cfg = TelegramConfig {
        bot_token: "123:abc".into(),
        ..Default::default()
    };
    assert!(TelegramChannel::new(cfg).is_configured());
}
