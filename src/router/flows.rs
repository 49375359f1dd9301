//! Step handlers for multi-step flows.
//!
//! Invalid input re-prompts and keeps the flow at its current step.
//! Reset input (`/start`, `/cancel`, back, cancel) ends any flow without
//! saving anything.

use crate::commands::{self, Command, CommandContext, Reply};
use crate::labels;
use chrono::Datelike;
use subtrack_core::{
    dialogue::{AddStep, DialogueState},
    error::SubtrackError,
    model::{NewSubscription, UpdateOutcome},
    parse,
};
use tracing::debug;

pub(super) async fn step(
    ctx: &CommandContext<'_>,
    state: DialogueState,
    command: &Command,
) -> Result<Reply, SubtrackError> {
    if command.is_reset() {
        ctx.sessions.clear(ctx.user_id).await?;
        debug!("user {} cancelled {}", ctx.user_id, state.tag());
        return Ok(Reply::menu("Cancelled. Back to the main menu."));
    }

    let text = ctx.text.trim();
    match state {
        DialogueState::AddingSubscription { step } => adding(ctx, step, text).await,
        DialogueState::ChangingDate {
            subscription_id,
            service_name,
        } => changing_date(ctx, subscription_id, &service_name, text).await,
        DialogueState::AwaitingSupportText => support(ctx, text).await,
    }
}

async fn adding(
    ctx: &CommandContext<'_>,
    step: AddStep,
    text: &str,
) -> Result<Reply, SubtrackError> {
    match step {
        AddStep::Name => {
            if text.is_empty() {
                return Ok(Reply::new(
                    "The name can't be empty. Enter the service name:",
                    labels::cancel_menu(),
                ));
            }
            let next = AddStep::Price {
                name: text.to_string(),
            };
            save(ctx, next).await?;
            Ok(Reply::new(
                format!("How much does {text} cost per month?"),
                labels::cancel_menu(),
            ))
        }
        AddStep::Price { name } => match parse::parse_price(text) {
            Ok(price) => {
                save(ctx, AddStep::Date { name, price }).await?;
                Ok(Reply::new(
                    commands::date_prompt(ctx.today),
                    labels::cancel_menu(),
                ))
            }
            Err(_) => {
                save(ctx, AddStep::Price { name }).await?;
                Ok(Reply::new(
                    "That doesn't look like a price. Send a positive number, for example 599 or 4.99:",
                    labels::cancel_menu(),
                ))
            }
        },
        AddStep::Date { name, price } => match parse::parse_date(text, ctx.today) {
            Ok(date) => {
                let new = NewSubscription {
                    user_id: ctx.user_id,
                    service_name: name,
                    price,
                    charge_day: date.day(),
                    next_charge_date: Some(date),
                };
                let outcome = ctx.store.add_subscription(&new).await?;
                ctx.sessions.clear(ctx.user_id).await?;
                Ok(commands::added_reply(outcome, &new, ctx.currency))
            }
            Err(_) => {
                save(ctx, AddStep::Date { name, price }).await?;
                Ok(Reply::new(
                    format!(
                        "I need a date after today. {}",
                        commands::date_prompt(ctx.today)
                    ),
                    labels::cancel_menu(),
                ))
            }
        },
    }
}

/// Store the next step of the add flow, refreshing the session's activity time.
async fn save(ctx: &CommandContext<'_>, step: AddStep) -> Result<(), SubtrackError> {
    ctx.sessions
        .save(ctx.user_id, &DialogueState::AddingSubscription { step })
        .await
}

async fn changing_date(
    ctx: &CommandContext<'_>,
    subscription_id: i64,
    service_name: &str,
    text: &str,
) -> Result<Reply, SubtrackError> {
    let date = match parse::parse_date(text, ctx.today) {
        Ok(date) => date,
        Err(_) => {
            let state = DialogueState::ChangingDate {
                subscription_id,
                service_name: service_name.to_string(),
            };
            ctx.sessions.save(ctx.user_id, &state).await?;
            return Ok(Reply::new(
                format!(
                    "I need a date after today. {}",
                    commands::date_prompt(ctx.today)
                ),
                labels::cancel_menu(),
            ));
        }
    };

    let outcome = ctx
        .store
        .update_next_charge_date(ctx.user_id, subscription_id, date)
        .await?;
    ctx.sessions.clear(ctx.user_id).await?;

    Ok(match outcome {
        UpdateOutcome::Updated => Reply::menu(format!(
            "📅 Next charge for {service_name}: {}.",
            labels::format_date(date)
        )),
        UpdateOutcome::NotFound => Reply::menu(format!(
            "{service_name} is no longer in your list."
        )),
    })
}

async fn support(ctx: &CommandContext<'_>, text: &str) -> Result<Reply, SubtrackError> {
    if text.is_empty() {
        return Ok(Reply::new(
            "Please describe your question in one message:",
            labels::cancel_menu(),
        ));
    }
    ctx.store.record_support_message(ctx.user_id, text).await?;
    ctx.sessions.clear(ctx.user_id).await?;
    Ok(Reply::menu("Thanks! Your message has been passed on to support."))
}
