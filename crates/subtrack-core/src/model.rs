//! Persistent records and the outcomes of store operations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::SubtrackError;

/// Default reminder lead time in days.
pub const DEFAULT_DAYS_BEFORE: u32 = 3;

/// A recurring payment tracked for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub user_id: i64,
    pub service_name: String,
    pub price: f64,
    /// Day of month the charge is expected (1–31).
    pub charge_day: u32,
    pub next_charge_date: Option<NaiveDate>,
    pub is_active: bool,
}

/// Fields needed to create (or reactivate) a subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubscription {
    pub user_id: i64,
    pub service_name: String,
    pub price: f64,
    pub charge_day: u32,
    pub next_charge_date: Option<NaiveDate>,
}

impl NewSubscription {
    /// Reject values no subscription may hold, regardless of what the caller checked.
    pub fn validate(&self) -> Result<(), SubtrackError> {
        if self.service_name.trim().is_empty() {
            return Err(SubtrackError::Validation(
                "service name must not be empty".into(),
            ));
        }
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(SubtrackError::Validation(format!(
                "price must be positive, got {}",
                self.price
            )));
        }
        if !(1..=31).contains(&self.charge_day) {
            return Err(SubtrackError::Validation(format!(
                "billing day must be within 1..=31, got {}",
                self.charge_day
            )));
        }
        Ok(())
    }
}

/// Result of adding a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new row was inserted.
    Created(i64),
    /// A soft-deleted row for the same service was brought back.
    Reactivated(i64),
    /// An active subscription with that name already exists.
    AlreadyExists,
}

/// Result of a soft delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Result of changing the next charge date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    NotFound,
}

/// Per-user reminder preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationSetting {
    /// Days before the charge to remind; 0 means on the charge day itself.
    pub days_before: u32,
    pub enabled: bool,
}

impl Default for NotificationSetting {
    fn default() -> Self {
        Self {
            days_before: DEFAULT_DAYS_BEFORE,
            enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_sub(name: &str, price: f64, day: u32) -> NewSubscription {
        NewSubscription {
            user_id: 1,
            service_name: name.into(),
            price,
            charge_day: day,
            next_charge_date: None,
        }
    }

    #[test]
    fn test_validate_accepts_valid_values() {
        assert!(new_sub("Netflix", 599.0, 15).validate().is_ok());
        assert!(new_sub("Netflix", 0.01, 1).validate().is_ok());
        assert!(new_sub("Netflix", 1.0, 31).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(new_sub("  ", 599.0, 15).validate().is_err());
        assert!(new_sub("Netflix", 0.0, 15).validate().is_err());
        assert!(new_sub("Netflix", -5.0, 15).validate().is_err());
        assert!(new_sub("Netflix", f64::NAN, 15).validate().is_err());
        assert!(new_sub("Netflix", 599.0, 0).validate().is_err());
        assert!(new_sub("Netflix", 599.0, 32).validate().is_err());
    }

    #[test]
    fn test_default_notification_setting() {
        let s = NotificationSetting::default();
        assert_eq!(s.days_before, 3);
        assert!(s.enabled);
    }
}
