//! Spend reconciliation
//!
//! Recomputes `spent` for every line of a budget from the transaction
//! ledger. A transaction counts toward a line when it is an expense, its
//! category name equals the line name exactly, and its date falls in the
//! budget's month. Anything else is ignored without error.
//!
//! Stored `spent` values are never read here; the result depends only on
//! the budget's lines and the transactions passed in.

use std::collections::HashMap;

use tracing::debug;

use crate::models::{Budget, BudgetCategory, Money, Transaction};

/// The budget's lines with `spent` recomputed, in the same order
pub fn reconcile(budget: &Budget, transactions: &[Transaction]) -> Vec<BudgetCategory> {
    let mut spent_by_name: HashMap<&str, Money> = budget
        .categories
        .iter()
        .map(|line| (line.name.as_str(), Money::zero()))
        .collect();

    let mut matched = 0usize;
    for txn in transactions
        .iter()
        .filter(|t| t.is_expense() && t.in_month(budget.month))
    {
        if let Some(spent) = spent_by_name.get_mut(txn.category.as_str()) {
            *spent += txn.amount;
            matched += 1;
        }
    }

    debug!(
        month = %budget.month,
        lines = budget.categories.len(),
        matched,
        "reconciled budget"
    );

    budget
        .categories
        .iter()
        .map(|line| BudgetCategory {
            spent: spent_by_name
                .get(line.name.as_str())
                .copied()
                .unwrap_or_default(),
            ..line.clone()
        })
        .collect()
}

/// A copy of `budget` with reconciled lines
pub fn reconciled(budget: &Budget, transactions: &[Transaction]) -> Budget {
    Budget {
        categories: reconcile(budget, transactions),
        ..budget.clone()
    }
}
