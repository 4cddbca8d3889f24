//! Custom error types for fintrack
//!
//! A single error enum covers domain failures (duplicate budget month,
//! missing entity, bad input) and storage failures. Callers branch on the
//! `is_*` predicates rather than matching message text.

use thiserror::Error;

use crate::models::BudgetMonth;

/// The main error type for fintrack operations
#[derive(Error, Debug)]
pub enum FintrackError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Caller supplied malformed or missing fields
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Uniqueness conflicts (budget month, category name, record id)
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// The backing store failed or was unreachable
    #[error("Storage error: {0}")]
    Storage(String),
}

impl FintrackError {
    /// A budget already exists for `month`
    pub fn budget_exists(month: BudgetMonth) -> Self {
        Self::Duplicate {
            entity_type: "Budget",
            identifier: month.to_string(),
        }
    }

    pub fn budget_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Budget",
            identifier: identifier.into(),
        }
    }

    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    pub fn goal_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Savings goal",
            identifier: identifier.into(),
        }
    }

    pub fn bill_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Bill",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a uniqueness conflict
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Transport-level failures can be retried with the same request.
    /// Domain errors cannot.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Io(_) | Self::Json(_))
    }
}

impl From<std::io::Error> for FintrackError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for FintrackError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for fintrack operations
pub type FintrackResult<T> = Result<T, FintrackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FintrackError::Config("bad value".into());
        assert_eq!(err.to_string(), "Configuration error: bad value");
    }

    #[test]
    fn test_budget_exists_error() {
        let month = BudgetMonth::new(2024, 3).unwrap();
        let err = FintrackError::budget_exists(month);
        assert_eq!(err.to_string(), "Budget already exists: 2024-03");
        assert!(err.is_duplicate());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_not_found_error() {
        let err = FintrackError::budget_not_found("bud-1234");
        assert_eq!(err.to_string(), "Budget not found: bud-1234");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_retryable_classification() {
        assert!(FintrackError::Storage("timeout".into()).is_retryable());
        assert!(!FintrackError::Validation("amount".into()).is_retryable());
        assert!(!FintrackError::category_not_found("x").is_retryable());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FintrackError = io_err.into();
        assert!(matches!(err, FintrackError::Io(_)));
        assert!(err.is_retryable());
    }
}
