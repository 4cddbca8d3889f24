//! Monthly budget model
//!
//! A budget holds one month's spending limits per expense category. The
//! category list is a value snapshot taken when the budget is created; it
//! does not follow later renames or limit changes in the category registry.
//! `spent` on each line is a display cache and is recomputed by the
//! reconciler on every read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::category::Category;
use super::ids::{BudgetId, CategoryId};
use super::money::Money;
use super::month::BudgetMonth;

/// Usage at which a line is flagged as close to its limit
pub const DEFAULT_WARNING_PERCENT: f64 = 80.0;

/// One category line inside a budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCategory {
    pub category_id: CategoryId,

    /// Name copied from the category at snapshot time; matched against
    /// `Transaction::category` during reconciliation
    pub name: String,

    pub budget_limit: Money,

    #[serde(default)]
    pub spent: Money,
}

impl BudgetCategory {
    pub fn new(category_id: CategoryId, name: impl Into<String>, budget_limit: Money) -> Self {
        Self {
            category_id,
            name: name.into(),
            budget_limit,
            spent: Money::zero(),
        }
    }

    /// Snapshot a registry category with the given limit
    pub fn from_category(category: &Category, budget_limit: Money) -> Self {
        Self::new(category.id, category.name.clone(), budget_limit)
    }

    /// Negative when over the limit
    pub fn remaining(&self) -> Money {
        self.budget_limit - self.spent
    }

    /// Percentage of the limit used, capped at 100 for progress display
    pub fn usage_percent(&self) -> f64 {
        self.spent.percent_of(self.budget_limit).min(100.0)
    }

    pub fn status(&self) -> SpendStatus {
        SpendStatus::classify(self.spent, self.budget_limit, DEFAULT_WARNING_PERCENT)
    }

    pub fn status_with_threshold(&self, warning_percent: f64) -> SpendStatus {
        SpendStatus::classify(self.spent, self.budget_limit, warning_percent)
    }
}

/// How close a line is to its limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpendStatus {
    OnTrack,
    Warning,
    OverLimit,
}

impl SpendStatus {
    pub fn classify(spent: Money, limit: Money, warning_percent: f64) -> Self {
        let percent = spent.percent_of(limit);
        if percent >= 100.0 {
            Self::OverLimit
        } else if percent >= warning_percent {
            Self::Warning
        } else {
            Self::OnTrack
        }
    }
}

impl fmt::Display for SpendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnTrack => write!(f, "on track"),
            Self::Warning => write!(f, "near limit"),
            Self::OverLimit => write!(f, "over limit"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,

    /// Unique across all budgets and fixed once created
    pub month: BudgetMonth,

    pub categories: Vec<BudgetCategory>,

    /// Sum of category limits when the budget was last written. Not a live
    /// aggregate.
    pub total_limit: Money,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    pub fn new(month: BudgetMonth, categories: Vec<BudgetCategory>, total_limit: Money) -> Self {
        let now = Utc::now();
        Self {
            id: BudgetId::new(),
            month,
            categories,
            total_limit,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sum of the current line limits
    pub fn limit_sum(&self) -> Money {
        self.categories.iter().map(|c| c.budget_limit).sum()
    }

    pub fn category(&self, name: &str) -> Option<&BudgetCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn totals(&self) -> BudgetTotals {
        BudgetTotals::from_categories(&self.categories)
    }

    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        validate_lines(&self.categories)?;
        if self.total_limit.is_negative() {
            return Err(BudgetValidationError::NegativeTotal);
        }
        Ok(())
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} categories, limit {})",
            self.month.long_name(),
            self.categories.len(),
            self.total_limit
        )
    }
}

/// Check the line items of a budget
pub fn validate_lines(lines: &[BudgetCategory]) -> Result<(), BudgetValidationError> {
    let mut seen = HashSet::new();
    for line in lines {
        if line.name.trim().is_empty() {
            return Err(BudgetValidationError::EmptyCategoryName);
        }
        if !line.budget_limit.is_positive() {
            return Err(BudgetValidationError::NonPositiveLimit(line.name.clone()));
        }
        if line.spent.is_negative() {
            return Err(BudgetValidationError::NegativeSpent(line.name.clone()));
        }
        if !seen.insert(line.name.as_str()) {
            return Err(BudgetValidationError::DuplicateCategory(line.name.clone()));
        }
    }
    Ok(())
}

/// Aggregate figures for a reconciled budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetTotals {
    pub total_budget: Money,
    pub total_spent: Money,
    pub remaining: Money,
}

impl BudgetTotals {
    pub fn from_categories(categories: &[BudgetCategory]) -> Self {
        let total_budget: Money = categories.iter().map(|c| c.budget_limit).sum();
        let total_spent: Money = categories.iter().map(|c| c.spent).sum();
        Self {
            total_budget,
            total_spent,
            remaining: total_budget - total_spent,
        }
    }

    pub fn is_over_budget(&self) -> bool {
        self.remaining.is_negative()
    }

    /// Whole-unit figures for display
    pub fn rounded(&self) -> (i64, i64, i64) {
        (
            self.total_budget.rounded_units(),
            self.total_spent.rounded_units(),
            self.remaining.rounded_units(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetValidationError {
    EmptyCategoryName,
    NonPositiveLimit(String),
    NegativeSpent(String),
    DuplicateCategory(String),
    NegativeTotal,
}

impl fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCategoryName => write!(f, "Budget category name cannot be empty"),
            Self::NonPositiveLimit(name) => {
                write!(f, "Budget limit for '{}' must be greater than 0", name)
            }
            Self::NegativeSpent(name) => write!(f, "Spent amount for '{}' cannot be negative", name),
            Self::DuplicateCategory(name) => {
                write!(f, "Category '{}' appears more than once in the budget", name)
            }
            Self::NegativeTotal => write!(f, "Total limit cannot be negative"),
        }
    }
}

impl std::error::Error for BudgetValidationError {}
