//! Budget service
//!
//! Owns the lifecycle of monthly budgets: at most one budget per month,
//! the month fixed once chosen, and `spent` recomputed from the ledger
//! whenever a budget is read for display.

use chrono::Utc;
use tracing::{debug, info};

use crate::audit::EntityType;
use crate::error::{FintrackError, FintrackResult};
use crate::models::budget::validate_lines;
use crate::models::{Budget, BudgetCategory, BudgetId, BudgetMonth, Category, Money};
use crate::storage::Storage;

use super::reconcile::reconciled;

/// Service for budget management
pub struct BudgetService<'a> {
    storage: &'a Storage,
}

/// Fields to change on an existing budget. The month cannot change.
#[derive(Debug, Clone, Default)]
pub struct BudgetPatch {
    /// Replaces the whole line list
    pub categories: Option<Vec<BudgetCategory>>,
    /// Recomputed from the resulting lines when absent
    pub total_limit: Option<Money>,
}

impl<'a> BudgetService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Snapshot every expense category into budget lines. Categories with
    /// no positive limit get `default_limit`.
    pub fn snapshot_lines(categories: &[Category], default_limit: Money) -> Vec<BudgetCategory> {
        categories
            .iter()
            .filter(|c| c.is_expense())
            .map(|c| BudgetCategory::from_category(c, c.effective_limit(default_limit)))
            .collect()
    }

    /// Create the budget for `month`.
    ///
    /// Fails with `Duplicate` if one already exists for that month, leaving
    /// the store unchanged. `total_limit` defaults to the sum of the line
    /// limits.
    pub fn create(
        &self,
        month: BudgetMonth,
        categories: Vec<BudgetCategory>,
        total_limit: Option<Money>,
    ) -> FintrackResult<Budget> {
        validate_lines(&categories).map_err(|e| FintrackError::Validation(e.to_string()))?;

        let _guard = self.storage.lock_budgets()?;
        if self.find_by_month(month)?.is_some() {
            return Err(FintrackError::budget_exists(month));
        }

        let total_limit = total_limit.unwrap_or_else(|| categories.iter().map(|c| c.budget_limit).sum());
        let budget = Budget::new(month, categories, total_limit);
        budget
            .validate()
            .map_err(|e| FintrackError::Validation(e.to_string()))?;

        self.storage.budgets.insert(budget.clone())?;
        if let Err(e) = self.storage.budgets.save() {
            // keep memory consistent with the store that rejected the write
            self.storage.budgets.delete(budget.id)?;
            return Err(e);
        }

        self.storage.log_create(
            EntityType::Budget,
            budget.id.to_string(),
            Some(month.long_name()),
            &budget,
        );

        info!(id = %budget.id, %month, lines = budget.categories.len(), "budget created");
        Ok(budget)
    }

    pub fn get(&self, id: BudgetId) -> FintrackResult<Option<Budget>> {
        self.storage.budgets.get(id)
    }

    /// All budgets, most recent month first
    pub fn list(&self) -> FintrackResult<Vec<Budget>> {
        self.storage.budgets.get_all()
    }

    pub fn find_by_month(&self, month: BudgetMonth) -> FintrackResult<Option<Budget>> {
        Ok(self.list()?.into_iter().find(|b| b.month == month))
    }

    /// The budget with `spent` recomputed from the current ledger
    pub fn get_reconciled(&self, id: BudgetId) -> FintrackResult<Budget> {
        let budget = self
            .get(id)?
            .ok_or_else(|| FintrackError::budget_not_found(id.to_string()))?;
        let transactions = self.storage.transactions.get_all()?;
        debug!(%id, transactions = transactions.len(), "reconciling budget");
        Ok(reconciled(&budget, &transactions))
    }

    pub fn update(&self, id: BudgetId, patch: BudgetPatch) -> FintrackResult<Budget> {
        let _guard = self.storage.lock_budgets()?;

        let mut budget = self
            .storage
            .budgets
            .get(id)?
            .ok_or_else(|| FintrackError::budget_not_found(id.to_string()))?;

        let before = budget.clone();

        if let Some(categories) = patch.categories {
            validate_lines(&categories).map_err(|e| FintrackError::Validation(e.to_string()))?;
            budget.categories = categories;
            if patch.total_limit.is_none() {
                budget.total_limit = budget.limit_sum();
            }
        }
        if let Some(total_limit) = patch.total_limit {
            budget.total_limit = total_limit;
        }
        budget.updated_at = Utc::now();

        budget
            .validate()
            .map_err(|e| FintrackError::Validation(e.to_string()))?;

        self.storage.budgets.upsert(budget.clone())?;
        if let Err(e) = self.storage.budgets.save() {
            self.storage.budgets.upsert(before)?;
            return Err(e);
        }

        self.storage.log_update(
            EntityType::Budget,
            budget.id.to_string(),
            Some(budget.month.long_name()),
            &before,
            &budget,
        );

        info!(%id, month = %budget.month, "budget updated");
        Ok(budget)
    }

    pub fn delete(&self, id: BudgetId) -> FintrackResult<Budget> {
        let _guard = self.storage.lock_budgets()?;

        let budget = self
            .storage
            .budgets
            .get(id)?
            .ok_or_else(|| FintrackError::budget_not_found(id.to_string()))?;

        self.storage.budgets.delete(id)?;
        self.storage.budgets.save()?;

        self.storage.log_delete(
            EntityType::Budget,
            id.to_string(),
            Some(budget.month.long_name()),
            &budget,
        );

        info!(%id, month = %budget.month, "budget deleted");
        Ok(budget)
    }
}
