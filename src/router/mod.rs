//! Dialogue router: sends each inbound message either to the flow the user
//! is in the middle of or to an idle-state command.

mod flows;


use crate::commands::{self, Command, CommandContext, Reply};
use chrono::{Local, NaiveDate};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use subtrack_core::{
    error::SubtrackError,
    message::{IncomingMessage, OutgoingMessage},
    traits::SessionStore,
};
use subtrack_store::Store;
use tracing::{debug, error, warn};

/// Routes inbound text to handlers and turns the result into a reply.
pub struct Router {
    store: Store,
    sessions: Arc<dyn SessionStore>,
    currency: String,
    /// One async lock per user, so a user's messages are handled one at a time.
    locks: Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>,
}

impl Router {
    pub fn new(store: Store, sessions: Arc<dyn SessionStore>, currency: impl Into<String>) -> Self {
        Self {
            store,
            sessions,
            currency: currency.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Handle an inbound message, resolving dates against the local calendar.
    pub async fn handle(&self, incoming: &IncomingMessage) -> OutgoingMessage {
        debug!(
            "message {} from user {} received at {}",
            incoming.id, incoming.user_id, incoming.timestamp
        );
        let today = incoming.timestamp.with_timezone(&Local).date_naive();
        self.handle_at(incoming.user_id, &incoming.text, today).await
    }

    /// Handle `text` from `user_id` as if the date were `today`.
    ///
    /// Never fails: storage errors are logged and answered with a generic reply.
    pub async fn handle_at(&self, user_id: i64, text: &str, today: NaiveDate) -> OutgoingMessage {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let reply = match self.dispatch(user_id, text, today).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("handling message from user {user_id} failed: {e}");
                Reply::failure()
            }
        };
        reply.into_message(user_id)
    }

    async fn dispatch(
        &self,
        user_id: i64,
        text: &str,
        today: NaiveDate,
    ) -> Result<Reply, SubtrackError> {
        let ctx = CommandContext {
            store: &self.store,
            sessions: self.sessions.as_ref(),
            user_id,
            text,
            today,
            currency: &self.currency,
        };
        let command = Command::parse(text);

        let session = match self.sessions.load(user_id).await {
            Ok(session) => session,
            Err(e) => {
                warn!("session load for user {user_id} failed, treating as idle: {e}");
                None
            }
        };

        match session {
            Some(state) => {
                debug!("user {user_id} in flow {}", state.tag());
                flows::step(&ctx, state, &command).await
            }
            None => commands::handle(command, &ctx).await,
        }
    }

    /// The user's lock, created on first use. Locks nobody holds are dropped.
    fn user_lock(&self, user_id: i64) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.retain(|id, lock| *id == user_id || Arc::strong_count(lock) > 1);
        Arc::clone(locks.entry(user_id).or_default())
    }
}
