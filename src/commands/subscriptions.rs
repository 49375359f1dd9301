//! Subscription commands: catalog, custom flow entry, list, delete, date picker, quick add.

use super::{CommandContext, Reply};
use crate::labels;
use chrono::NaiveDate;
use subtrack_core::{
    catalog::CatalogEntry,
    dialogue::DialogueState,
    error::SubtrackError,
    model::{AddOutcome, DeleteOutcome, NewSubscription},
    parse::{self, QuickAdd},
};
use tracing::info;

pub(super) fn catalog_menu() -> Reply {
    Reply::new(
        "Pick a service, or tap ✏️ Custom subscription to enter your own.",
        labels::catalog_menu(),
    )
}

pub(super) fn catalog_info(entry: &CatalogEntry, currency: &str) -> Reply {
    Reply::new(
        format!(
            "*{}*\n{}\nPrice: {} per month",
            labels::escape_md(entry.name),
            entry.description,
            labels::format_price(entry.price, currency)
        ),
        labels::catalog_entry_menu(entry.name),
    )
    .markdown()
}

/// Add a catalog service at its list price, billed on the 1st.
pub(super) async fn catalog_add(
    ctx: &CommandContext<'_>,
    entry: &CatalogEntry,
) -> Result<Reply, SubtrackError> {
    let next = parse::quick_add_charge_date(ctx.today);
    let new = NewSubscription {
        user_id: ctx.user_id,
        service_name: entry.name.to_string(),
        price: entry.price,
        charge_day: 1,
        next_charge_date: next,
    };
    let outcome = ctx.store.add_subscription(&new).await?;
    Ok(added_reply(outcome, &new, ctx.currency))
}

pub(super) async fn start_custom(ctx: &CommandContext<'_>) -> Result<Reply, SubtrackError> {
    ctx.sessions
        .save(ctx.user_id, &DialogueState::start_adding())
        .await?;
    Ok(Reply::new(
        "Enter the service name:",
        labels::cancel_menu(),
    ))
}

pub(super) async fn quick_add(
    ctx: &CommandContext<'_>,
    quick: QuickAdd,
) -> Result<Reply, SubtrackError> {
    let new = NewSubscription {
        user_id: ctx.user_id,
        next_charge_date: parse::next_charge_on_day(quick.charge_day, ctx.today),
        service_name: quick.name,
        price: quick.price,
        charge_day: quick.charge_day,
    };
    let outcome = ctx.store.add_subscription(&new).await?;
    Ok(added_reply(outcome, &new, ctx.currency))
}

/// Confirmation for any way of adding a subscription.
pub(crate) fn added_reply(outcome: AddOutcome, new: &NewSubscription, currency: &str) -> Reply {
    let name = new.service_name.trim();
    match outcome {
        AddOutcome::Created(_) | AddOutcome::Reactivated(_) => {
            let mut text = format!(
                "✅ {name} added: {}, billed on day {}.",
                labels::format_price(new.price, currency),
                new.charge_day
            );
            if let Some(next) = new.next_charge_date {
                text.push_str(&format!("\nNext charge: {}.", labels::format_date(next)));
            }
            Reply::menu(text)
        }
        AddOutcome::AlreadyExists => Reply::menu(format!("{name} is already in your list.")),
    }
}

pub(super) async fn list(ctx: &CommandContext<'_>) -> Result<Reply, SubtrackError> {
    let subs = ctx.store.list_subscriptions(ctx.user_id).await?;
    if subs.is_empty() {
        return Ok(Reply::menu(
            "You have no subscriptions yet. Tap ➕ Add subscription, \
             or send one as Name - Price - Day.",
        ));
    }

    let mut text = String::from("*Your subscriptions:*\n\n");
    for sub in &subs {
        text.push_str(&format!(
            "• {}: {} (day {}",
            labels::escape_md(&sub.service_name),
            labels::format_price(sub.price, ctx.currency),
            sub.charge_day
        ));
        if let Some(next) = sub.next_charge_date {
            text.push_str(&format!(", next {}", labels::format_date(next)));
        }
        text.push_str(")\n");
    }
    let total: f64 = subs.iter().map(|s| s.price).sum();
    text.push_str(&format!(
        "\n*Total per month:* {}\n*Subscriptions:* {}",
        labels::format_price(total, ctx.currency),
        subs.len()
    ));

    Ok(Reply::menu(text).markdown())
}

pub(super) async fn delete_menu(ctx: &CommandContext<'_>) -> Result<Reply, SubtrackError> {
    let subs = ctx.store.list_subscriptions(ctx.user_id).await?;
    if subs.is_empty() {
        return Ok(Reply::menu("You have no subscriptions to delete."));
    }
    Ok(Reply::new(
        "Which subscription should I delete?",
        labels::delete_menu(&subs),
    ))
}

pub(super) async fn delete(ctx: &CommandContext<'_>, name: &str) -> Result<Reply, SubtrackError> {
    match ctx.store.soft_delete_subscription(ctx.user_id, name).await? {
        DeleteOutcome::Deleted => {
            info!("user {} deleted subscription {name}", ctx.user_id);
            Ok(Reply::menu(format!("🗑 {name} deleted.")))
        }
        DeleteOutcome::NotFound => Ok(Reply::menu(format!(
            "You have no active subscription called {name}."
        ))),
    }
}

pub(super) async fn change_date_menu(ctx: &CommandContext<'_>) -> Result<Reply, SubtrackError> {
    let subs = ctx.store.list_subscriptions(ctx.user_id).await?;
    if subs.is_empty() {
        return Ok(Reply::menu("You have no subscriptions yet."));
    }
    Ok(Reply::new(
        "Which subscription's charge date should I change?",
        labels::change_date_menu(&subs),
    ))
}

/// Start the date change flow for one subscription.
pub(super) async fn pick_for_date_change(
    ctx: &CommandContext<'_>,
    name: &str,
) -> Result<Reply, SubtrackError> {
    let Some(sub) = ctx.store.find_active_subscription(ctx.user_id, name).await? else {
        return Ok(Reply::menu(format!(
            "You have no active subscription called {name}."
        )));
    };

    let state = DialogueState::ChangingDate {
        subscription_id: sub.id,
        service_name: sub.service_name.clone(),
    };
    ctx.sessions.save(ctx.user_id, &state).await?;

    let current = sub
        .next_charge_date
        .map(labels::format_date)
        .unwrap_or_else(|| "not set".to_string());
    Ok(Reply::new(
        format!(
            "{}: next charge {current}.\n{}",
            sub.service_name,
            date_prompt(ctx.today)
        ),
        labels::cancel_menu(),
    ))
}

/// Ask for a date, with an example that would be accepted today.
pub(crate) fn date_prompt(today: NaiveDate) -> String {
    let example = parse::next_charge_on_day(15, today)
        .map(|d| d.format("%d.%m").to_string())
        .unwrap_or_else(|| "15.06".to_string());
    format!("Send the next charge date as DD.MM or DD.MM.YY, for example {example}.")
}
