//! Idle-state commands: menu actions, catalog picks, per-item actions, and
//! the one-line quick add.

mod settings;
mod subscriptions;


pub(crate) use subscriptions::{added_reply, date_prompt};

use crate::labels;
use chrono::NaiveDate;
use subtrack_core::{
    catalog::{self, CatalogEntry},
    error::SubtrackError,
    message::{OutgoingMessage, ParseMode, ReplyKeyboard},
    parse::{self, QuickAdd},
    traits::SessionStore,
};
use subtrack_store::Store;

/// Grouped context for command execution.
pub struct CommandContext<'a> {
    pub store: &'a Store,
    pub sessions: &'a dyn SessionStore,
    pub user_id: i64,
    pub text: &'a str,
    /// Calendar date all date input is resolved against.
    pub today: NaiveDate,
    pub currency: &'a str,
}

/// Text plus the keyboard to show with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<ReplyKeyboard>,
    pub markdown: bool,
}

impl Reply {
    pub fn new(text: impl Into<String>, keyboard: ReplyKeyboard) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
            markdown: false,
        }
    }

    /// Text with the main menu keyboard.
    pub fn menu(text: impl Into<String>) -> Self {
        Self::new(text, labels::main_menu())
    }

    /// Send the text with `parse_mode = Markdown`.
    pub fn markdown(mut self) -> Self {
        self.markdown = true;
        self
    }

    /// Shown when a store call failed; the details only go to the log.
    pub fn failure() -> Self {
        Self::menu("Something went wrong on our side. Please try again later.")
    }

    pub fn into_message(self, chat_id: i64) -> OutgoingMessage {
        OutgoingMessage {
            chat_id,
            text: self.text,
            reply_markup: self.keyboard,
            parse_mode: self.markdown.then_some(ParseMode::Markdown),
        }
    }
}

/// Notification menu choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderChoice {
    DaysBefore(u32),
    Enable,
    Disable,
}

/// What an idle user's message asks for.
#[derive(Debug, PartialEq)]
pub enum Command {
    /// `/start`, `/menu`, or the back button.
    Start,
    /// `/cancel` or the cancel button.
    Cancel,
    Help,
    AddMenu,
    AddCustom,
    List,
    DeleteMenu,
    ChangeDateMenu,
    Notifications,
    Support,
    /// A catalog service name: show its price and description.
    CatalogInfo(&'static CatalogEntry),
    /// `Add X` for a catalog service.
    CatalogAdd(&'static CatalogEntry),
    /// `Delete X`, carrying the bare name.
    Delete(String),
    /// `🗓 X`, carrying the bare name.
    ChangeDate(String),
    SetReminder(ReminderChoice),
    /// `Name - Price - Day`.
    QuickAdd(QuickAdd),
    /// Looked like `Name - Price - Day` but a value was out of range.
    InvalidQuickAdd(String),
    Unknown,
}

impl Command {
    /// Classify message text. Earlier rules win over later ones.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();

        if let Some(cmd) = Self::parse_slash(text) {
            return cmd;
        }

        if let Some(name) = labels::strip_action(text, labels::DELETE_PREFIX) {
            return Self::Delete(name.to_string());
        }
        if let Some(name) = labels::strip_action(text, labels::DATE_PREFIX) {
            return Self::ChangeDate(name.to_string());
        }

        match text {
            labels::BACK => return Self::Start,
            labels::CANCEL => return Self::Cancel,
            labels::ADD => return Self::AddMenu,
            labels::CUSTOM => return Self::AddCustom,
            labels::LIST => return Self::List,
            labels::DELETE => return Self::DeleteMenu,
            labels::CHANGE_DATE => return Self::ChangeDateMenu,
            labels::NOTIFICATIONS => return Self::Notifications,
            labels::SUPPORT => return Self::Support,
            _ => {}
        }

        if let Some(entry) = catalog::lookup(text) {
            return Self::CatalogInfo(entry);
        }
        if let Some(entry) = labels::strip_action(text, labels::ADD_PREFIX).and_then(catalog::lookup) {
            return Self::CatalogAdd(entry);
        }
        if let Some(choice) = Self::parse_reminder_choice(text) {
            return Self::SetReminder(choice);
        }

        match parse::parse_quick_add(text) {
            Some(Ok(quick)) => Self::QuickAdd(quick),
            Some(Err(SubtrackError::Validation(reason))) => Self::InvalidQuickAdd(reason),
            Some(Err(e)) => Self::InvalidQuickAdd(e.to_string()),
            None => Self::Unknown,
        }
    }

    /// Slash commands, with any `@botname` suffix stripped.
    fn parse_slash(text: &str) -> Option<Self> {
        let first = text.split_whitespace().next()?;
        if !first.starts_with('/') {
            return None;
        }
        let cmd = first.split('@').next().unwrap_or(first);
        match cmd {
            "/start" | "/menu" => Some(Self::Start),
            "/cancel" => Some(Self::Cancel),
            "/help" => Some(Self::Help),
            "/list" => Some(Self::List),
            "/add" => Some(Self::AddMenu),
            "/delete" => Some(Self::DeleteMenu),
            "/notifications" => Some(Self::Notifications),
            "/support" => Some(Self::Support),
            _ => None,
        }
    }

    fn parse_reminder_choice(text: &str) -> Option<ReminderChoice> {
        match text {
            labels::REMIND_OFF => Some(ReminderChoice::Disable),
            labels::REMIND_ON => Some(ReminderChoice::Enable),
            _ => labels::REMIND_CHOICES
                .iter()
                .find(|(label, _)| *label == text)
                .map(|(_, days)| ReminderChoice::DaysBefore(*days)),
        }
    }

    /// Whether this input abandons a multi-step flow.
    pub fn is_reset(&self) -> bool {
        matches!(self, Self::Start | Self::Cancel)
    }
}

/// Handle a command for an idle user.
pub async fn handle(cmd: Command, ctx: &CommandContext<'_>) -> Result<Reply, SubtrackError> {
    match cmd {
        Command::Start => Ok(Reply::menu(
            "Hi! I keep track of your subscriptions and remind you before each charge.\n\
             Pick an action below.",
        )),
        Command::Cancel => Ok(Reply::menu("Nothing to cancel.")),
        Command::Help => Ok(help()),
        Command::AddMenu => Ok(subscriptions::catalog_menu()),
        Command::AddCustom => subscriptions::start_custom(ctx).await,
        Command::List => subscriptions::list(ctx).await,
        Command::DeleteMenu => subscriptions::delete_menu(ctx).await,
        Command::ChangeDateMenu => subscriptions::change_date_menu(ctx).await,
        Command::Notifications => settings::notifications(ctx).await,
        Command::Support => settings::start_support(ctx).await,
        Command::CatalogInfo(entry) => Ok(subscriptions::catalog_info(entry, ctx.currency)),
        Command::CatalogAdd(entry) => subscriptions::catalog_add(ctx, entry).await,
        Command::Delete(name) => subscriptions::delete(ctx, &name).await,
        Command::ChangeDate(name) => subscriptions::pick_for_date_change(ctx, &name).await,
        Command::SetReminder(choice) => settings::set_reminder(ctx, choice).await,
        Command::QuickAdd(quick) => subscriptions::quick_add(ctx, quick).await,
        Command::InvalidQuickAdd(reason) => Ok(Reply::menu(format!(
            "Couldn't add that: {reason}.\n\
             Use the format Name - Price - Day, for example: Netflix - 599 - 15"
        ))),
        Command::Unknown => Ok(Reply::menu(
            "I didn't get that. Pick an action below, or send a subscription as \
             Name - Price - Day.",
        )),
    }
}

fn help() -> Reply {
    Reply::menu(
        "*How to use*\n\
         • ➕ Add subscription: pick a known service or enter your own.\n\
         • Quick add: send `Netflix - 599 - 15` (name, price, billing day).\n\
         • 📋 My subscriptions: everything you pay for and the monthly total.\n\
         • 🔔 Notifications: when to remind you before a charge.\n\
         • /cancel stops whatever you are entering.",
    )
    .markdown()
}
