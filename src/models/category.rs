//! Category model
//!
//! Categories tag transactions as income or expense. Transactions refer to
//! a category by name, budgets copy it by value when they are created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CategoryId;
use super::money::Money;

/// Whether money flows in or out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    Income,
    Expense,
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "income"),
            Self::Expense => write!(f, "expense"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,

    /// Display key, unique across the registry
    pub name: String,

    pub kind: FlowKind,

    #[serde(default)]
    pub color: String,

    #[serde(default)]
    pub icon: String,

    /// Default monthly spending limit used when a budget is generated
    #[serde(default)]
    pub budget_limit: Option<Money>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: impl Into<String>, kind: FlowKind) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryId::new(),
            name: name.into(),
            kind,
            color: String::new(),
            icon: String::new(),
            budget_limit: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn expense(name: impl Into<String>) -> Self {
        Self::new(name, FlowKind::Expense)
    }

    pub fn income(name: impl Into<String>) -> Self {
        Self::new(name, FlowKind::Income)
    }

    pub fn with_limit(mut self, limit: Money) -> Self {
        self.budget_limit = Some(limit);
        self
    }

    pub fn with_style(mut self, color: impl Into<String>, icon: impl Into<String>) -> Self {
        self.color = color.into();
        self.icon = icon.into();
        self
    }

    pub fn is_expense(&self) -> bool {
        self.kind == FlowKind::Expense
    }

    /// The limit to seed a new budget with. A missing or zero limit falls
    /// back to `default`.
    pub fn effective_limit(&self, default: Money) -> Money {
        match self.budget_limit {
            Some(limit) if limit.is_positive() => limit,
            _ => default,
        }
    }

    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        if self.name.trim().is_empty() {
            return Err(CategoryValidationError::EmptyName);
        }

        if self.name.chars().count() > 50 {
            return Err(CategoryValidationError::NameTooLong(self.name.chars().count()));
        }

        if let Some(limit) = self.budget_limit {
            if limit.is_negative() {
                return Err(CategoryValidationError::NegativeLimit);
            }
        }

        Ok(())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong(usize),
    NegativeLimit,
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Category name cannot be empty"),
            Self::NameTooLong(len) => write!(f, "Category name too long ({} chars, max 50)", len),
            Self::NegativeLimit => write!(f, "Budget limit cannot be negative"),
        }
    }
}

impl std::error::Error for CategoryValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_limit_falls_back() {
        let default = Money::from_major(500);
        assert_eq!(Category::expense("Food").effective_limit(default), default);
        assert_eq!(
            Category::expense("Food")
                .with_limit(Money::zero())
                .effective_limit(default),
            default
        );
        assert_eq!(
            Category::expense("Food")
                .with_limit(Money::from_major(300))
                .effective_limit(default),
            Money::from_major(300)
        );
    }

    #[test]
    fn test_validation() {
        let mut category = Category::expense("Food");
        assert!(category.validate().is_ok());

        category.name = "  ".into();
        assert_eq!(category.validate(), Err(CategoryValidationError::EmptyName));

        category.name = "a".repeat(51);
        assert!(matches!(
            category.validate(),
            Err(CategoryValidationError::NameTooLong(51))
        ));

        category.name = "Food".into();
        category.budget_limit = Some(Money::from_cents(-1));
        assert_eq!(category.validate(), Err(CategoryValidationError::NegativeLimit));
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let category = Category::income("Salary");
        let json = serde_json::to_value(&category).unwrap();
        assert_eq!(json["kind"], "income");
    }
}
