//! Savings goal model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::GoalId;
use super::money::Money;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub id: GoalId,
    pub name: String,
    pub target_amount: Money,

    #[serde(default)]
    pub current_amount: Money,

    #[serde(default)]
    pub deadline: Option<NaiveDate>,

    #[serde(default)]
    pub category: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SavingsGoal {
    pub fn new(name: impl Into<String>, target_amount: Money) -> Self {
        let now = Utc::now();
        Self {
            id: GoalId::new(),
            name: name.into(),
            target_amount,
            current_amount: Money::zero(),
            deadline: None,
            category: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn contribute(&mut self, amount: Money) {
        self.current_amount += amount;
        self.updated_at = Utc::now();
    }

    /// Progress toward the target, capped at 100
    pub fn progress_percent(&self) -> f64 {
        self.current_amount.percent_of(self.target_amount).min(100.0)
    }

    pub fn is_completed(&self) -> bool {
        self.current_amount >= self.target_amount
    }

    /// Amount still missing, never negative
    pub fn remaining(&self) -> Money {
        if self.is_completed() {
            Money::zero()
        } else {
            self.target_amount - self.current_amount
        }
    }

    pub fn validate(&self) -> Result<(), GoalValidationError> {
        if self.name.trim().is_empty() {
            return Err(GoalValidationError::EmptyName);
        }
        if !self.target_amount.is_positive() {
            return Err(GoalValidationError::NonPositiveTarget);
        }
        if self.current_amount.is_negative() {
            return Err(GoalValidationError::NegativeCurrent);
        }
        Ok(())
    }
}

impl fmt::Display for SavingsGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} of {})", self.name, self.current_amount, self.target_amount)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalValidationError {
    EmptyName,
    NonPositiveTarget,
    NegativeCurrent,
}

impl fmt::Display for GoalValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Goal name is required"),
            Self::NonPositiveTarget => write!(f, "Target amount must be greater than 0"),
            Self::NegativeCurrent => write!(f, "Current amount cannot be negative"),
        }
    }
}

impl std::error::Error for GoalValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_and_completion() {
        let mut goal = SavingsGoal::new("Vacation", Money::from_major(1000));
        goal.contribute(Money::from_major(250));
        assert!((goal.progress_percent() - 25.0).abs() < 1e-9);
        assert_eq!(goal.remaining(), Money::from_major(750));
        assert!(!goal.is_completed());

        goal.contribute(Money::from_major(800));
        assert!(goal.is_completed());
        assert_eq!(goal.progress_percent(), 100.0);
        assert_eq!(goal.remaining(), Money::zero());
    }

    #[test]
    fn test_validation() {
        assert!(SavingsGoal::new("Car", Money::from_major(1)).validate().is_ok());
        assert_eq!(
            SavingsGoal::new("Car", Money::zero()).validate(),
            Err(GoalValidationError::NonPositiveTarget)
        );
        assert_eq!(
            SavingsGoal::new("", Money::from_major(1)).validate(),
            Err(GoalValidationError::EmptyName)
        );
    }
}
