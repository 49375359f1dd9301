//! In-process dialogue session store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::{dialogue::DialogueState, error::SubtrackError, traits::SessionStore};

/// Sessions kept in a map for the life of the process.
///
/// Expiry is checked when a session is loaded; nothing runs in the background.
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<i64, (DialogueState, Instant)>>,
    timeout: Duration,
}

impl MemorySessionStore {
    pub fn new(timeout: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    pub fn from_minutes(minutes: i64) -> Self {
        Self::new(Duration::from_secs(minutes.max(0) as u64 * 60))
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<i64, (DialogueState, Instant)>>, SubtrackError>
    {
        self.sessions
            .lock()
            .map_err(|_| SubtrackError::Storage("session map poisoned".into()))
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, user_id: i64) -> Result<Option<DialogueState>, SubtrackError> {
        let mut sessions = self.lock()?;
        let timeout = self.timeout;
        sessions.retain(|_, (_, touched)| touched.elapsed() < timeout);
        Ok(sessions.get(&user_id).map(|(state, _)| state.clone()))
    }

    async fn save(&self, user_id: i64, state: &DialogueState) -> Result<(), SubtrackError> {
        self.lock()?
            .insert(user_id, (state.clone(), Instant::now()));
        Ok(())
    }

    async fn clear(&self, user_id: i64) -> Result<(), SubtrackError> {
        self.lock()?.remove(&user_id);
        Ok(())
    }
}
