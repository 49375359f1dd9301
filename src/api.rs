//! Webhook HTTP server.
//!
//! `GET /` answers health probes. `POST /` takes Telegram updates, runs them
//! through the dialogue router, and delivers the reply according to the
//! configured reply mode. Every update gets a 200 so Telegram never retries.

use crate::router;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use subtrack_channels::telegram::TgUpdate;
use subtrack_core::{
    config::{ReplyMode, ServerConfig},
    error::SubtrackError,
    message::OutgoingMessage,
    traits::Channel,
};
use tracing::{debug, error, info, warn};

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    router: Arc<router::Router>,
    channel: Arc<dyn Channel>,
    reply_mode: ReplyMode,
}

impl ApiState {
    pub fn new(router: Arc<router::Router>, channel: Arc<dyn Channel>, reply_mode: ReplyMode) -> Self {
        Self {
            router,
            channel,
            reply_mode,
        }
    }
}

/// Reply returned in the webhook response; Telegram performs the call.
#[derive(Debug, Serialize)]
struct WebhookReply {
    method: &'static str,
    #[serde(flatten)]
    message: OutgoingMessage,
}

async fn health() -> &'static str {
    "ok"
}

async fn webhook(
    State(state): State<ApiState>,
    body: Result<Json<TgUpdate>, JsonRejection>,
) -> Response {
    let update = match body {
        Ok(Json(update)) => update,
        Err(e) => {
            warn!("ignoring malformed webhook payload: {e}");
            return StatusCode::OK.into_response();
        }
    };

    let update_id = update.update_id;
    let Some(incoming) = update.into_incoming() else {
        debug!("update {update_id} carries no text message, ignoring");
        return StatusCode::OK.into_response();
    };

    let reply = state.router.handle(&incoming).await;

    match state.reply_mode {
        ReplyMode::Inline => Json(WebhookReply {
            method: "sendMessage",
            message: reply,
        })
        .into_response(),
        ReplyMode::Push => {
            let chat_id = reply.chat_id;
            if let Err(e) = state.channel.send(reply).await {
                error!("{} delivery to chat {chat_id} failed: {e}", state.channel.name());
            }
            StatusCode::OK.into_response()
        }
    }
}

/// Build the axum router with shared state.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(health).post(webhook))
        .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024)) // 1 MB max request body
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: &ServerConfig, state: ApiState) -> Result<(), SubtrackError> {
    let app = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("webhook server listening on {addr}");

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::sync::Mutex;
    use subtrack_core::config::{SessionConfig, StorageConfig};
    use subtrack_core::session::MemorySessionStore;
    use subtrack_store::Store;
    use tower::ServiceExt;

    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    /// A mock channel that records sent messages for assertion.
    struct MockChannel {
        sent: Arc<Mutex<Vec<OutgoingMessage>>>,
        /// When true, `send()` returns an error (simulates delivery failure).
        fail_send: bool,
    }

    impl MockChannel {
        fn new() -> (Self, Arc<Mutex<Vec<OutgoingMessage>>>) {
            let sent = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    sent: Arc::clone(&sent),
                    fail_send: false,
                },
                sent,
            )
        }

        fn new_failing() -> Self {
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
                fail_send: true,
            }
        }
    }

    #[async_trait]
    impl Channel for MockChannel {
        fn name(&self) -> &str {
            "mock"
        }

        async fn send(&self, message: OutgoingMessage) -> Result<(), SubtrackError> {
            if self.fail_send {
                return Err(SubtrackError::Channel("connection reset".to_string()));
            }
            self.sent.lock().unwrap().push(message);
            Ok(())
        }
    }

    async fn test_store() -> Store {
        let id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = std::env::temp_dir().join(format!(
            "__subtrack_api_test_{}_{}__",
            std::process::id(),
            id
        ));
        let _ = std::fs::create_dir_all(&dir);
        let db_path = dir.join("test.db").to_string_lossy().to_string();
        let _ = std::fs::remove_file(&db_path);
        Store::new(&StorageConfig { db_path }, &SessionConfig::default())
            .await
            .unwrap()
    }

    async fn test_app(channel: Arc<dyn Channel>, reply_mode: ReplyMode) -> Router {
        app_with_store(test_store().await, channel, reply_mode)
    }

    fn app_with_store(store: Store, channel: Arc<dyn Channel>, reply_mode: ReplyMode) -> Router {
        let sessions = Arc::new(MemorySessionStore::from_minutes(60));
        let router = Arc::new(router::Router::new(store, sessions, "RUB"));
        build_router(ApiState::new(router, channel, reply_mode))
    }

    fn post(body: &str) -> Request<Body> {
        Request::post("/")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_bytes(resp: axum::http::Response<Body>) -> Vec<u8> {
        resp.into_body().collect().await.unwrap().to_bytes().to_vec()
    }

    async fn body_json(resp: axum::http::Response<Body>) -> Value {
        serde_json::from_slice(&body_bytes(resp).await).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (mock, _sent) = MockChannel::new();
        let app = test_app(Arc::new(mock), ReplyMode::Inline).await;
        let resp = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_bytes(resp).await, b"ok");
    }

    #[tokio::test]
    async fn test_start_returns_main_menu_inline() {
        let (mock, sent) = MockChannel::new();
        let app = test_app(Arc::new(mock), ReplyMode::Inline).await;
        let resp = app
            .oneshot(post(r#"{"message":{"chat":{"id":42},"text":"/start"}}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let json = body_json(resp).await;
        assert_eq!(json["method"], "sendMessage");
        assert_eq!(json["chat_id"], 42);
        assert!(!json["text"].as_str().unwrap().is_empty());
        let keyboard = &json["reply_markup"]["keyboard"];
        assert_eq!(keyboard[0][0]["text"], crate::labels::ADD);
        assert_eq!(keyboard[0][1]["text"], crate::labels::LIST);
        assert_eq!(json["reply_markup"]["resize_keyboard"], true);
        assert!(sent.lock().unwrap().is_empty(), "inline mode never pushes");
    }

    #[tokio::test]
    async fn test_push_mode_sends_through_channel() {
        let (mock, sent) = MockChannel::new();
        let app = test_app(Arc::new(mock), ReplyMode::Push).await;
        let resp = app
            .oneshot(post(r#"{"message":{"chat":{"id":42},"text":"/start"}}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_bytes(resp).await.is_empty());

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].chat_id, 42);
        assert!(sent[0].button_labels().contains(&crate::labels::ADD));
    }

    #[tokio::test]
    async fn test_push_failure_still_returns_200() {
        let app = test_app(Arc::new(MockChannel::new_failing()), ReplyMode::Push).await;
        let resp = app
            .oneshot(post(r#"{"message":{"chat":{"id":42},"text":"/start"}}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_malformed_payloads_return_empty_200() {
        for body in [
            "not json",
            r#"{"message":{"text":"no chat"}}"#,
            r#"{"message":{"chat":{"id":"forty-two"},"text":"hi"}}"#,
            r#"[]"#,
        ] {
            let (mock, sent) = MockChannel::new();
            let app = test_app(Arc::new(mock), ReplyMode::Inline).await;
            let resp = app.oneshot(post(body)).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK, "{body}");
            assert!(body_bytes(resp).await.is_empty(), "{body}");
            assert!(sent.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_update_without_text_returns_empty_200() {
        let (mock, _sent) = MockChannel::new();
        let app = test_app(Arc::new(mock), ReplyMode::Inline).await;
        for body in [
            r#"{"update_id":1}"#,
            r#"{"message":{"chat":{"id":42},"sticker":{"file_id":"x"}}}"#,
        ] {
            let resp = app.clone().oneshot(post(body)).await.unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
            assert!(body_bytes(resp).await.is_empty(), "{body}");
        }
    }

    #[tokio::test]
    async fn test_missing_content_type_returns_200() {
        let (mock, _sent) = MockChannel::new();
        let app = test_app(Arc::new(mock), ReplyMode::Inline).await;
        let req = Request::post("/")
            .body(Body::from(r#"{"message":{"chat":{"id":42},"text":"/start"}}"#))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_dialogue_continues_across_requests() {
        let (mock, _sent) = MockChannel::new();
        let app = test_app(Arc::new(mock), ReplyMode::Inline).await;
        let send = |text: &str| {
            post(&serde_json::json!({"message": {"chat": {"id": 7}, "text": text}}).to_string())
        };

        app.clone().oneshot(send(crate::labels::CUSTOM)).await.unwrap();
        let resp = app.clone().oneshot(send("Gym")).await.unwrap();
        let json = body_json(resp).await;
        assert!(json["text"].as_str().unwrap().contains("Gym"));
        assert_eq!(json["reply_markup"]["keyboard"][0][0]["text"], crate::labels::CANCEL);
    }

    #[tokio::test]
    async fn test_storage_failure_still_answers_200() {
        let store = test_store().await;
        store.pool().close().await;

        let (mock, _sent) = MockChannel::new();
        let app = app_with_store(store.clone(), Arc::new(mock), ReplyMode::Inline);
        let resp = app
            .oneshot(post(r#"{"message":{"chat":{"id":42},"text":"Add Netflix"}}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["method"], "sendMessage");
        assert_eq!(json["chat_id"], 42);
        assert!(json["text"]
            .as_str()
            .unwrap()
            .contains("Something went wrong"));

        let (mock, sent) = MockChannel::new();
        let app = app_with_store(store, Arc::new(mock), ReplyMode::Push);
        let resp = app
            .oneshot(post(r#"{"message":{"chat":{"id":42},"text":"/list"}}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(sent.lock().unwrap()[0].text.contains("Something went wrong"));
    }
}
