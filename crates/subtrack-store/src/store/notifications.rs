//! Per-user reminder settings.

use super::Store;
use subtrack_core::{error::SubtrackError, model::NotificationSetting};
use tracing::error;

impl Store {
    /// The user's reminder setting.
    ///
    /// A user without a row gets the default, which is persisted on the spot.
    /// Storage failures are logged and the default is returned.
    pub async fn notification_setting(&self, user_id: i64) -> NotificationSetting {
        match self.load_or_init_notification_setting(user_id).await {
            Ok(setting) => setting,
            Err(e) => {
                error!("notification setting for user {user_id}: {e}");
                NotificationSetting::default()
            }
        }
    }

    async fn load_or_init_notification_setting(
        &self,
        user_id: i64,
    ) -> Result<NotificationSetting, SubtrackError> {
        let row: Option<(i64, bool)> = sqlx::query_as(
            "SELECT days_before, is_active FROM notification_settings WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SubtrackError::Storage(format!("query failed: {e}")))?;

        if let Some((days_before, enabled)) = row {
            return Ok(NotificationSetting {
                days_before: u32::try_from(days_before).unwrap_or_default(),
                enabled,
            });
        }

        let default = NotificationSetting::default();
        sqlx::query(
            "INSERT OR IGNORE INTO notification_settings (user_id, days_before, is_active) \
             VALUES (?, ?, ?)",
        )
        .bind(user_id)
        .bind(i64::from(default.days_before))
        .bind(default.enabled)
        .execute(&self.pool)
        .await
        .map_err(|e| SubtrackError::Storage(format!("insert failed: {e}")))?;

        Ok(default)
    }

    /// Replace the user's reminder setting.
    pub async fn set_notification_setting(
        &self,
        user_id: i64,
        setting: NotificationSetting,
    ) -> Result<(), SubtrackError> {
        sqlx::query(
            "INSERT INTO notification_settings (user_id, days_before, is_active) \
             VALUES (?, ?, ?) \
             ON CONFLICT(user_id) DO UPDATE SET \
                 days_before = excluded.days_before, \
                 is_active = excluded.is_active, \
                 updated_at = datetime('now')",
        )
        .bind(user_id)
        .bind(i64::from(setting.days_before))
        .bind(setting.enabled)
        .execute(&self.pool)
        .await
        .map_err(|e| SubtrackError::Storage(format!("upsert failed: {e}")))?;

        Ok(())
    }
}
