//! Multi-step dialogue state held per user between messages.
//!
//! A user with no stored state is idle. Every variant here is a flow that
//! is waiting for the user's next message.

use serde::{Deserialize, Serialize};

/// The flow a user is in the middle of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "flow", rename_all = "snake_case")]
pub enum DialogueState {
    /// Entering a custom subscription: name, then price, then first charge date.
    AddingSubscription { step: AddStep },
    /// Waiting for a new next-charge date for one subscription.
    ChangingDate {
        subscription_id: i64,
        service_name: String,
    },
    /// The next message is forwarded to support as-is.
    AwaitingSupportText,
}

/// Steps of the custom-subscription flow. Each step carries what was
/// collected before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum AddStep {
    Name,
    Price { name: String },
    Date { name: String, price: f64 },
}

impl DialogueState {
    /// Start of the custom-subscription flow.
    pub fn start_adding() -> Self {
        Self::AddingSubscription {
            step: AddStep::Name,
        }
    }

    /// Short tag for logs.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::AddingSubscription { step } => match step {
                AddStep::Name => "adding:name",
                AddStep::Price { .. } => "adding:price",
                AddStep::Date { .. } => "adding:date",
            },
            Self::ChangingDate { .. } => "changing_date",
            Self::AwaitingSupportText => "awaiting_support_text",
        }
    }
}
