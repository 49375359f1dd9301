//! Persisted dialogue sessions with idle expiry checked on read.

use super::Store;
use async_trait::async_trait;
use subtrack_core::{dialogue::DialogueState, error::SubtrackError, traits::SessionStore};
use tracing::{debug, warn};

#[async_trait]
impl SessionStore for Store {
    async fn load(&self, user_id: i64) -> Result<Option<DialogueState>, SubtrackError> {
        // Sweep idle sessions of every user before reading.
        let swept = sqlx::query(
            "DELETE FROM sessions \
             WHERE datetime(last_activity) <= datetime('now', ? || ' minutes')",
        )
        .bind(-self.session_timeout_minutes)
        .execute(&self.pool)
        .await
        .map_err(|e| SubtrackError::Storage(format!("session sweep failed: {e}")))?;

        if swept.rows_affected() > 0 {
            debug!("expired {} idle session(s)", swept.rows_affected());
        }

        let row: Option<(String,)> =
            sqlx::query_as("SELECT session_json FROM sessions WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| SubtrackError::Storage(format!("session query failed: {e}")))?;

        let Some((json,)) = row else {
            return Ok(None);
        };

        match serde_json::from_str(&json) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                // A row written by an incompatible build: treat the user as idle.
                warn!("dropping unreadable session for user {user_id}: {e}");
                self.clear(user_id).await?;
                Ok(None)
            }
        }
    }

    async fn save(&self, user_id: i64, state: &DialogueState) -> Result<(), SubtrackError> {
        let json = serde_json::to_string(state)?;
        sqlx::query(
            "INSERT INTO sessions (user_id, session_json, last_activity) \
             VALUES (?, ?, datetime('now')) \
             ON CONFLICT(user_id) DO UPDATE SET \
                 session_json = excluded.session_json, \
                 last_activity = excluded.last_activity",
        )
        .bind(user_id)
        .bind(&json)
        .execute(&self.pool)
        .await
        .map_err(|e| SubtrackError::Storage(format!("session save failed: {e}")))?;

        Ok(())
    }

    async fn clear(&self, user_id: i64) -> Result<(), SubtrackError> {
        sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| SubtrackError::Storage(format!("session clear failed: {e}")))?;

        Ok(())
    }
}
