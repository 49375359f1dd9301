//! Subscription CRUD: add (with reactivation), list, soft delete, date changes.

use super::Store;
use chrono::NaiveDate;
use subtrack_core::{
    error::SubtrackError,
    model::{AddOutcome, DeleteOutcome, NewSubscription, Subscription, UpdateOutcome},
};
use tracing::{info, warn};

/// Date format of `next_charge_date`.
const DATE_FORMAT: &str = "%Y-%m-%d";

const SUBSCRIPTION_COLUMNS: &str =
    "id, user_id, service_name, price, charge_day, next_charge_date, is_active";

/// (id, user_id, service_name, price, charge_day, next_charge_date, is_active)
type SubscriptionRow = (i64, i64, String, f64, i64, Option<String>, bool);

fn into_subscription(row: SubscriptionRow) -> Result<Subscription, SubtrackError> {
    let (id, user_id, service_name, price, charge_day, next_charge_date, is_active) = row;
    let charge_day = u32::try_from(charge_day)
        .map_err(|_| SubtrackError::Storage(format!("subscription {id}: bad charge_day")))?;
    let next_charge_date = next_charge_date.and_then(|raw| {
        NaiveDate::parse_from_str(&raw, DATE_FORMAT)
            .map_err(|e| warn!("subscription {id}: unreadable next_charge_date {raw:?}: {e}"))
            .ok()
    });
    Ok(Subscription {
        id,
        user_id,
        service_name,
        price,
        charge_day,
        next_charge_date,
        is_active,
    })
}

fn format_date(date: Option<NaiveDate>) -> Option<String> {
    date.map(|d| d.format(DATE_FORMAT).to_string())
}

impl Store {
    /// Add a subscription.
    ///
    /// An active subscription with the same name (case-insensitive) yields
    /// `AlreadyExists`. A soft-deleted one is reactivated with the new values.
    pub async fn add_subscription(
        &self,
        new: &NewSubscription,
    ) -> Result<AddOutcome, SubtrackError> {
        new.validate()?;
        let name = new.service_name.trim();
        let next_charge_date = format_date(new.next_charge_date);

        let existing: Option<(i64, bool)> = sqlx::query_as(
            "SELECT id, is_active FROM subscriptions WHERE user_id = ? AND service_name = ?",
        )
        .bind(new.user_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SubtrackError::Storage(format!("subscription lookup failed: {e}")))?;

        match existing {
            Some((_, true)) => Ok(AddOutcome::AlreadyExists),
            Some((id, false)) => {
                sqlx::query(
                    "UPDATE subscriptions \
                     SET service_name = ?, price = ?, charge_day = ?, next_charge_date = ?, \
                         is_active = 1, updated_at = datetime('now') \
                     WHERE id = ?",
                )
                .bind(name)
                .bind(new.price)
                .bind(i64::from(new.charge_day))
                .bind(&next_charge_date)
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| SubtrackError::Storage(format!("reactivate failed: {e}")))?;

                info!("reactivated subscription {id} ({name}) for user {}", new.user_id);
                Ok(AddOutcome::Reactivated(id))
            }
            None => {
                let result = sqlx::query(
                    "INSERT INTO subscriptions \
                     (user_id, service_name, price, charge_day, next_charge_date) \
                     VALUES (?, ?, ?, ?, ?)",
                )
                .bind(new.user_id)
                .bind(name)
                .bind(new.price)
                .bind(i64::from(new.charge_day))
                .bind(&next_charge_date)
                .execute(&self.pool)
                .await;

                match result {
                    Ok(done) => {
                        let id = done.last_insert_rowid();
                        info!("created subscription {id} ({name}) for user {}", new.user_id);
                        Ok(AddOutcome::Created(id))
                    }
                    // Lost a race with a concurrent insert of the same name.
                    Err(e)
                        if e.as_database_error()
                            .is_some_and(|db| db.is_unique_violation()) =>
                    {
                        Ok(AddOutcome::AlreadyExists)
                    }
                    Err(e) => Err(SubtrackError::Storage(format!("insert failed: {e}"))),
                }
            }
        }
    }

    /// Active subscriptions of a user, ordered by service name.
    pub async fn list_subscriptions(
        &self,
        user_id: i64,
    ) -> Result<Vec<Subscription>, SubtrackError> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions \
             WHERE user_id = ? AND is_active = 1 \
             ORDER BY service_name ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SubtrackError::Storage(format!("list subscriptions failed: {e}")))?;

        rows.into_iter().map(into_subscription).collect()
    }

    /// Active subscriptions of every user, for the reminder pass.
    pub async fn list_all_active_subscriptions(&self) -> Result<Vec<Subscription>, SubtrackError> {
        let rows: Vec<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions \
             WHERE is_active = 1 \
             ORDER BY user_id ASC, service_name ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SubtrackError::Storage(format!("list subscriptions failed: {e}")))?;

        rows.into_iter().map(into_subscription).collect()
    }

    /// The user's active subscription with this name, if any.
    pub async fn find_active_subscription(
        &self,
        user_id: i64,
        service_name: &str,
    ) -> Result<Option<Subscription>, SubtrackError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {SUBSCRIPTION_COLUMNS} FROM subscriptions \
             WHERE user_id = ? AND service_name = ? AND is_active = 1"
        ))
        .bind(user_id)
        .bind(service_name.trim())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SubtrackError::Storage(format!("subscription lookup failed: {e}")))?;

        row.map(into_subscription).transpose()
    }

    /// Mark the user's active subscription inactive. The row is kept.
    pub async fn soft_delete_subscription(
        &self,
        user_id: i64,
        service_name: &str,
    ) -> Result<DeleteOutcome, SubtrackError> {
        let result = sqlx::query(
            "UPDATE subscriptions SET is_active = 0, updated_at = datetime('now') \
             WHERE user_id = ? AND service_name = ? AND is_active = 1",
        )
        .bind(user_id)
        .bind(service_name.trim())
        .execute(&self.pool)
        .await
        .map_err(|e| SubtrackError::Storage(format!("soft delete failed: {e}")))?;

        if result.rows_affected() > 0 {
            Ok(DeleteOutcome::Deleted)
        } else {
            Ok(DeleteOutcome::NotFound)
        }
    }

    /// Change the next charge date of one of the user's active subscriptions.
    pub async fn update_next_charge_date(
        &self,
        user_id: i64,
        subscription_id: i64,
        date: NaiveDate,
    ) -> Result<UpdateOutcome, SubtrackError> {
        let result = sqlx::query(
            "UPDATE subscriptions SET next_charge_date = ?, updated_at = datetime('now') \
             WHERE id = ? AND user_id = ? AND is_active = 1",
        )
        .bind(date.format(DATE_FORMAT).to_string())
        .bind(subscription_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| SubtrackError::Storage(format!("update charge date failed: {e}")))?;

        if result.rows_affected() > 0 {
            Ok(UpdateOutcome::Updated)
        } else {
            Ok(UpdateOutcome::NotFound)
        }
    }
}
