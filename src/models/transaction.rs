//! Transaction model
//!
//! A dated income or expense record. The category is referenced by name,
//! not by id, so renaming a category orphans its history.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::FlowKind;
use super::ids::TransactionId;
use super::money::Money;
use super::month::BudgetMonth;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,

    /// Always positive; direction comes from `kind`
    pub amount: Money,

    pub kind: FlowKind,

    /// Category name
    pub category: String,

    #[serde(default)]
    pub description: String,

    pub date: NaiveDate,

    #[serde(default)]
    pub payment_method: String,

    #[serde(default)]
    pub account_id: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(kind: FlowKind, amount: Money, category: impl Into<String>, date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            amount,
            kind,
            category: category.into(),
            description: String::new(),
            date,
            payment_method: String::new(),
            account_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn expense(amount: Money, category: impl Into<String>, date: NaiveDate) -> Self {
        Self::new(FlowKind::Expense, amount, category, date)
    }

    pub fn income(amount: Money, category: impl Into<String>, date: NaiveDate) -> Self {
        Self::new(FlowKind::Income, amount, category, date)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn is_expense(&self) -> bool {
        self.kind == FlowKind::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == FlowKind::Income
    }

    pub fn in_month(&self, month: BudgetMonth) -> bool {
        month.contains(self.date)
    }

    /// Inclusive on both ends
    pub fn in_range(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.date >= start && self.date <= end
    }

    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if !self.amount.is_positive() {
            return Err(TransactionValidationError::NonPositiveAmount);
        }
        if self.category.trim().is_empty() {
            return Err(TransactionValidationError::MissingCategory);
        }
        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_expense() { "-" } else { "+" };
        write!(f, "{} {}{} {}", self.date, sign, self.amount, self.category)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    NonPositiveAmount,
    MissingCategory,
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount => write!(f, "Amount must be greater than 0"),
            Self::MissingCategory => write!(f, "Category is required"),
        }
    }
}

impl std::error::Error for TransactionValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_validation() {
        let txn = Transaction::expense(Money::from_major(50), "Food", date(2024, 3, 5));
        assert!(txn.validate().is_ok());

        let zero = Transaction::expense(Money::zero(), "Food", date(2024, 3, 5));
        assert_eq!(zero.validate(), Err(TransactionValidationError::NonPositiveAmount));

        let uncategorized = Transaction::expense(Money::from_major(1), " ", date(2024, 3, 5));
        assert_eq!(
            uncategorized.validate(),
            Err(TransactionValidationError::MissingCategory)
        );
    }

    #[test]
    fn test_in_month_and_range() {
        let txn = Transaction::expense(Money::from_major(20), "Food", date(2024, 4, 1));
        assert!(txn.in_month(BudgetMonth::new(2024, 4).unwrap()));
        assert!(!txn.in_month(BudgetMonth::new(2024, 3).unwrap()));
        assert!(txn.in_range(date(2024, 4, 1), date(2024, 4, 1)));
        assert!(!txn.in_range(date(2024, 4, 2), date(2024, 4, 30)));
    }

    #[test]
    fn test_display() {
        let txn = Transaction::income(Money::from_cents(125000), "Salary", date(2024, 3, 1));
        assert_eq!(txn.to_string(), "2024-03-01 +$1250.00 Salary");
    }
}
