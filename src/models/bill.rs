//! Bill model
//!
//! A recurring obligation with a due date, a paid/unpaid flag, a payment
//! history and reminder preferences.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::BillId;
use super::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    #[default]
    Unpaid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderMethod {
    Push,
    Email,
    Sms,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderSettings {
    pub enabled: bool,
    pub days_before: u32,
    pub methods: Vec<ReminderMethod>,
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            days_before: 5,
            methods: vec![ReminderMethod::Push],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub paid_date: NaiveDate,
    pub amount: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub id: BillId,
    pub name: String,
    pub amount: Money,
    pub due_date: NaiveDate,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub payment_status: PaymentStatus,

    #[serde(default)]
    pub payment_history: Vec<Payment>,

    #[serde(default)]
    pub reminder: ReminderSettings,

    #[serde(default)]
    pub notes: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bill {
    pub fn new(name: impl Into<String>, amount: Money, due_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: BillId::new(),
            name: name.into(),
            amount,
            due_date,
            category: String::new(),
            payment_status: PaymentStatus::Unpaid,
            payment_history: Vec::new(),
            reminder: ReminderSettings::default(),
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// Negative once the due date has passed
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }

    /// Due strictly after `today` and strictly before `today + days`.
    /// A window reaching past the calendar range has no upper bound.
    pub fn is_upcoming(&self, today: NaiveDate, days: i64) -> bool {
        let horizon = Duration::try_days(days).and_then(|d| today.checked_add_signed(d));
        self.due_date > today && horizon.map_or(true, |end| self.due_date < end)
    }

    /// Unpaid and past its due date
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_paid() && self.due_date < today
    }

    pub fn status(&self, today: NaiveDate, due_soon_days: i64) -> BillStatus {
        if self.is_paid() {
            return BillStatus::Paid;
        }
        let days = self.days_until_due(today);
        if days < 0 {
            BillStatus::Overdue
        } else if days <= due_soon_days {
            BillStatus::DueSoon
        } else {
            BillStatus::Upcoming
        }
    }

    pub fn record_payment(&mut self, amount: Money, paid_date: NaiveDate) {
        self.payment_status = PaymentStatus::Paid;
        self.payment_history.push(Payment { paid_date, amount });
        self.updated_at = Utc::now();
    }

    pub fn validate(&self) -> Result<(), BillValidationError> {
        if self.name.trim().is_empty() {
            return Err(BillValidationError::EmptyName);
        }
        if !self.amount.is_positive() {
            return Err(BillValidationError::NonPositiveAmount);
        }
        Ok(())
    }
}

impl fmt::Display for Bill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} due {}", self.name, self.amount, self.due_date)
    }
}

/// Display classification of a bill relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillStatus {
    Paid,
    Overdue,
    DueSoon,
    Upcoming,
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Paid => write!(f, "Paid"),
            Self::Overdue => write!(f, "Overdue"),
            Self::DueSoon => write!(f, "Due Soon"),
            Self::Upcoming => write!(f, "Upcoming"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillValidationError {
    EmptyName,
    NonPositiveAmount,
}

impl fmt::Display for BillValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Bill name is required"),
            Self::NonPositiveAmount => write!(f, "Bill amount must be greater than 0"),
        }
    }
}

impl std::error::Error for BillValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_classification() {
        let today = date(2024, 3, 10);
        let bill = |due| Bill::new("Rent", Money::from_major(1200), due);

        assert_eq!(bill(date(2024, 3, 9)).status(today, 3), BillStatus::Overdue);
        assert_eq!(bill(date(2024, 3, 10)).status(today, 3), BillStatus::DueSoon);
        assert_eq!(bill(date(2024, 3, 13)).status(today, 3), BillStatus::DueSoon);
        assert_eq!(bill(date(2024, 3, 14)).status(today, 3), BillStatus::Upcoming);

        let mut paid = bill(date(2024, 3, 1));
        paid.record_payment(Money::from_major(1200), today);
        assert_eq!(paid.status(today, 3), BillStatus::Paid);
        assert_eq!(paid.payment_history.len(), 1);
    }

    #[test]
    fn test_default_reminders() {
        let bill = Bill::new("Internet", Money::from_major(60), date(2024, 3, 20));
        assert!(bill.reminder.enabled);
        assert_eq!(bill.reminder.days_before, 5);
        assert_eq!(bill.reminder.methods, vec![ReminderMethod::Push]);
    }

    #[test]
    fn test_validation() {
        let bill = Bill::new("", Money::from_major(60), date(2024, 3, 20));
        assert_eq!(bill.validate(), Err(BillValidationError::EmptyName));
        let bill = Bill::new("Water", Money::zero(), date(2024, 3, 20));
        assert_eq!(bill.validate(), Err(BillValidationError::NonPositiveAmount));
    }

    #[test]
    fn test_upcoming_window() {
        let today = date(2024, 3, 1);
        let bill = |due| Bill::new("Gym", Money::from_major(40), due);

        assert!(!bill(today).is_upcoming(today, 30));
        assert!(bill(date(2024, 3, 30)).is_upcoming(today, 30));
        assert!(!bill(date(2024, 3, 31)).is_upcoming(today, 30));
    }

    #[test]
    fn test_huge_upcoming_window_is_unbounded() {
        let today = date(2024, 3, 1);
        let far = Bill::new("Mortgage", Money::from_major(900), date(2060, 1, 1));

        assert!(far.is_upcoming(today, 200_000_000));
        assert!(far.is_upcoming(today, i64::MAX));
        assert!(!far.is_upcoming(date(2061, 1, 1), i64::MAX));
    }
}
