//! Upcoming-charge reminders, run once per `subtrack remind` invocation.

use crate::labels;
use chrono::NaiveDate;
use std::collections::HashMap;
use subtrack_core::{
    error::SubtrackError,
    message::OutgoingMessage,
    model::{NotificationSetting, Subscription, UpdateOutcome},
    parse,
    traits::Channel,
};
use subtrack_store::Store;
use tracing::{error, info, warn};

/// One reminder for one subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub user_id: i64,
    pub service_name: String,
    pub price: f64,
    pub charge_date: NaiveDate,
    pub days_before: u32,
}

impl Reminder {
    pub fn message(&self, currency: &str) -> OutgoingMessage {
        let when = match self.days_before {
            0 => "today".to_string(),
            1 => "tomorrow".to_string(),
            n => format!("in {n} days, on {}", labels::format_date(self.charge_date)),
        };
        OutgoingMessage::text(
            self.user_id,
            format!(
                "🔔 {} will charge {} {when}.",
                self.service_name,
                labels::format_price(self.price, currency)
            ),
        )
    }
}

/// Counts from one reminder pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub rolled_forward: usize,
    pub due: usize,
    pub sent: usize,
    pub failed: usize,
}

/// The charge date as of `today`: a date already behind `today` is moved to
/// its next occurrence. `None` when no date is set or it cannot be rolled.
fn upcoming_charge_date(sub: &Subscription, today: NaiveDate) -> Option<NaiveDate> {
    let date = sub.next_charge_date?;
    if date >= today {
        return Some(date);
    }
    let next = parse::roll_forward(date, sub.charge_day, today);
    if next.is_none() {
        warn!("subscription {}: cannot roll {date} forward", sub.id);
    }
    next
}

/// Subscriptions whose stored charge date is behind `today`, with the date
/// it rolls forward to.
fn stale_charge_dates(subs: &[Subscription], today: NaiveDate) -> Vec<(&Subscription, NaiveDate)> {
    subs.iter()
        .filter(|s| s.next_charge_date.is_some_and(|d| d < today))
        .filter_map(|s| Some((s, upcoming_charge_date(s, today)?)))
        .collect()
}

/// Move charge dates that are already behind `today` to their next occurrence.
pub async fn roll_forward_charge_dates(store: &Store, today: NaiveDate) -> Result<usize, SubtrackError> {
    let subs = store.list_all_active_subscriptions().await?;
    let mut moved = 0;
    for (sub, next) in stale_charge_dates(&subs, today) {
        if store.update_next_charge_date(sub.user_id, sub.id, next).await? == UpdateOutcome::Updated {
            moved += 1;
        }
    }
    Ok(moved)
}

/// How many charge dates a pass on `today` would roll forward. Read-only.
pub async fn count_stale_charge_dates(store: &Store, today: NaiveDate) -> Result<usize, SubtrackError> {
    let subs = store.list_all_active_subscriptions().await?;
    Ok(stale_charge_dates(&subs, today).len())
}

/// Reminders due on `today`: the owner has reminders enabled and the charge
/// is exactly `days_before` days away. Stored dates behind `today` count as
/// their next occurrence, whether or not they were rolled forward yet.
pub async fn due_reminders(store: &Store, today: NaiveDate) -> Result<Vec<Reminder>, SubtrackError> {
    let mut settings: HashMap<i64, NotificationSetting> = HashMap::new();
    let mut due = Vec::new();

    for sub in store.list_all_active_subscriptions().await? {
        let Some(charge_date) = upcoming_charge_date(&sub, today) else {
            continue;
        };
        let setting = match settings.get(&sub.user_id) {
            Some(s) => *s,
            None => {
                let s = store.notification_setting(sub.user_id).await;
                settings.insert(sub.user_id, s);
                s
            }
        };
        if !setting.enabled {
            continue;
        }
        if (charge_date - today).num_days() == i64::from(setting.days_before) {
            due.push(Reminder {
                user_id: sub.user_id,
                service_name: sub.service_name,
                price: sub.price,
                charge_date,
                days_before: setting.days_before,
            });
        }
    }
    Ok(due)
}

/// Roll dates forward, then deliver every due reminder.
///
/// With no channel this is a dry run: nothing is written or sent, and the
/// reminders are only logged. A failed delivery is logged and counted; the
/// pass continues.
pub async fn run(
    store: &Store,
    channel: Option<&dyn Channel>,
    currency: &str,
    today: NaiveDate,
) -> Result<RunSummary, SubtrackError> {
    let rolled_forward = match channel {
        Some(_) => roll_forward_charge_dates(store, today).await?,
        None => count_stale_charge_dates(store, today).await?,
    };
    let mut summary = RunSummary {
        rolled_forward,
        ..Default::default()
    };

    let due = due_reminders(store, today).await?;
    summary.due = due.len();

    for reminder in &due {
        let message = reminder.message(currency);
        match channel {
            Some(channel) => match channel.send(message).await {
                Ok(()) => summary.sent += 1,
                Err(e) => {
                    error!("reminder to user {} failed: {e}", reminder.user_id);
                    summary.failed += 1;
                }
            },
            None => info!("[dry run] to {}: {}", message.chat_id, message.text),
        }
    }

    info!(
        "reminder pass for {today}: {} rolled forward, {} due, {} sent, {} failed",
        summary.rolled_forward, summary.due, summary.sent, summary.failed
    );
    Ok(summary)
}
