//! Button labels, keyboards, and reply formatting shared by the command
//! classifier and the reply builders.

use chrono::NaiveDate;
use subtrack_core::{catalog, message::ReplyKeyboard, model::Subscription};

// Main menu.
pub const ADD: &str = "➕ Add subscription";
pub const LIST: &str = "📋 My subscriptions";
pub const DELETE: &str = "🗑 Delete subscription";
pub const CHANGE_DATE: &str = "📅 Change date";
pub const NOTIFICATIONS: &str = "🔔 Notifications";
pub const SUPPORT: &str = "💬 Support";

// Navigation.
pub const CUSTOM: &str = "✏️ Custom subscription";
pub const BACK: &str = "⬅️ Back";
pub const CANCEL: &str = "❌ Cancel";

// Per-item action prefixes. The item name follows the prefix. Delete and
// date prefixes use emoji no menu label starts with, so an item button can
// never spell a menu label whatever the item is called.
pub const ADD_PREFIX: &str = "➕ Add ";
pub const DELETE_PREFIX: &str = "✖️ Delete ";
pub const DATE_PREFIX: &str = "🗓 ";

// Notification choices.
pub const REMIND_ON_DAY: &str = "🔔 On the charge day";
pub const REMIND_1_DAY: &str = "🔔 1 day before";
pub const REMIND_3_DAYS: &str = "🔔 3 days before";
pub const REMIND_7_DAYS: &str = "🔔 7 days before";
pub const REMIND_OFF: &str = "🔕 Turn reminders off";
pub const REMIND_ON: &str = "🔔 Turn reminders on";

/// Lead times offered in the notifications menu, with their labels.
pub const REMIND_CHOICES: [(&str, u32); 4] = [
    (REMIND_ON_DAY, 0),
    (REMIND_1_DAY, 1),
    (REMIND_3_DAYS, 3),
    (REMIND_7_DAYS, 7),
];

pub fn main_menu() -> ReplyKeyboard {
    ReplyKeyboard::from_rows([
        [ADD, LIST],
        [DELETE, CHANGE_DATE],
        [NOTIFICATIONS, SUPPORT],
    ])
}

/// Catalog services two per row, then custom entry and back.
pub fn catalog_menu() -> ReplyKeyboard {
    let mut rows: Vec<Vec<String>> = catalog::entries()
        .chunks(2)
        .map(|pair| pair.iter().map(|e| e.name.to_string()).collect())
        .collect();
    rows.push(vec![CUSTOM.to_string()]);
    rows.push(vec![BACK.to_string()]);
    ReplyKeyboard::from_rows(rows)
}

/// Shown under a catalog entry's description.
pub fn catalog_entry_menu(name: &str) -> ReplyKeyboard {
    ReplyKeyboard::from_rows([vec![format!("{ADD_PREFIX}{name}")], vec![BACK.to_string()]])
}

pub fn delete_menu(subs: &[Subscription]) -> ReplyKeyboard {
    item_menu(subs, DELETE_PREFIX)
}

pub fn change_date_menu(subs: &[Subscription]) -> ReplyKeyboard {
    item_menu(subs, DATE_PREFIX)
}

fn item_menu(subs: &[Subscription], prefix: &str) -> ReplyKeyboard {
    let mut rows: Vec<Vec<String>> = subs
        .iter()
        .map(|s| vec![format!("{prefix}{}", s.service_name)])
        .collect();
    rows.push(vec![BACK.to_string()]);
    ReplyKeyboard::from_rows(rows)
}

pub fn notifications_menu(enabled: bool) -> ReplyKeyboard {
    let toggle = if enabled { REMIND_OFF } else { REMIND_ON };
    ReplyKeyboard::from_rows([
        vec![REMIND_ON_DAY, REMIND_1_DAY],
        vec![REMIND_3_DAYS, REMIND_7_DAYS],
        vec![toggle],
        vec![BACK],
    ])
}

/// Keyboard shown while a multi-step flow waits for input.
pub fn cancel_menu() -> ReplyKeyboard {
    ReplyKeyboard::from_rows([[CANCEL]])
}

/// `599 RUB`, or `4.99 RUB` when the price has a fractional part.
pub fn format_price(price: f64, currency: &str) -> String {
    if price.fract() == 0.0 {
        format!("{price:.0} {currency}")
    } else {
        format!("{price:.2} {currency}")
    }
}

/// `15.06.2025`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Human phrasing of a reminder lead time.
pub fn describe_lead(days_before: u32) -> String {
    match days_before {
        0 => "on the charge day".to_string(),
        1 => "1 day before".to_string(),
        n => format!("{n} days before"),
    }
}

/// Escape characters that legacy Markdown treats as markup.
pub fn escape_md(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// The item name after an action prefix.
///
/// The leading emoji is optional, so both `✖️ Delete Netflix` and
/// `Delete Netflix` yield `Netflix`.
pub fn strip_action<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let text = text.trim();
    let rest = text.strip_prefix(prefix).or_else(|| {
        let word = prefix.split_once(' ')?.1;
        if word.is_empty() {
            return None;
        }
        text.strip_prefix(word)
    })?;
    let name = rest.trim();
    (!name.is_empty()).then_some(name)
}
