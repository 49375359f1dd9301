//! Notification preferences and the support entry point.

use super::{CommandContext, ReminderChoice, Reply};
use crate::labels;
use subtrack_core::{dialogue::DialogueState, error::SubtrackError};
use tracing::info;

/// Show the current reminder setting with the choices.
pub(super) async fn notifications(ctx: &CommandContext<'_>) -> Result<Reply, SubtrackError> {
    let setting = ctx.store.notification_setting(ctx.user_id).await;
    let status = if setting.enabled {
        format!("Reminders are on: {}.", labels::describe_lead(setting.days_before))
    } else {
        "Reminders are off.".to_string()
    };
    Ok(Reply::new(
        format!("{status}\nWhen should I remind you about a charge?"),
        labels::notifications_menu(setting.enabled),
    ))
}

pub(super) async fn set_reminder(
    ctx: &CommandContext<'_>,
    choice: ReminderChoice,
) -> Result<Reply, SubtrackError> {
    let mut setting = ctx.store.notification_setting(ctx.user_id).await;
    let text = match choice {
        ReminderChoice::DaysBefore(days) => {
            setting.days_before = days;
            setting.enabled = true;
            format!("🔔 I'll remind you {}.", labels::describe_lead(days))
        }
        ReminderChoice::Enable => {
            setting.enabled = true;
            format!(
                "🔔 Reminders are on: {}.",
                labels::describe_lead(setting.days_before)
            )
        }
        ReminderChoice::Disable => {
            setting.enabled = false;
            "🔕 Reminders are off.".to_string()
        }
    };
    ctx.store
        .set_notification_setting(ctx.user_id, setting)
        .await?;
    info!(
        "user {} reminders: enabled={} days_before={}",
        ctx.user_id, setting.enabled, setting.days_before
    );
    Ok(Reply::menu(text))
}

pub(super) async fn start_support(ctx: &CommandContext<'_>) -> Result<Reply, SubtrackError> {
    ctx.sessions
        .save(ctx.user_id, &DialogueState::AwaitingSupportText)
        .await?;
    Ok(Reply::new(
        "Describe your question or problem in one message and I'll pass it on.",
        labels::cancel_menu(),
    ))
}
