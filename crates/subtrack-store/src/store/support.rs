//! Messages users leave for support.

use super::Store;
use subtrack_core::error::SubtrackError;
use tracing::info;

impl Store {
    /// Persist a support message and return its id.
    pub async fn record_support_message(
        &self,
        user_id: i64,
        text: &str,
    ) -> Result<i64, SubtrackError> {
        let result = sqlx::query("INSERT INTO support_messages (user_id, text) VALUES (?, ?)")
            .bind(user_id)
            .bind(text)
            .execute(&self.pool)
            .await
            .map_err(|e| SubtrackError::Storage(format!("insert failed: {e}")))?;

        let id = result.last_insert_rowid();
        info!("support message {id} from user {user_id}");
        Ok(id)
    }

    /// Support messages of a user, oldest first: (id, text, created_at).
    pub async fn support_messages(
        &self,
        user_id: i64,
    ) -> Result<Vec<(i64, String, String)>, SubtrackError> {
        let rows: Vec<(i64, String, String)> = sqlx::query_as(
            "SELECT id, text, created_at FROM support_messages \
             WHERE user_id = ? ORDER BY id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SubtrackError::Storage(format!("query failed: {e}")))?;

        Ok(rows)
    }
}
