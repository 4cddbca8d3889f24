//! Budget planner
//!
//! Decides which budget is active and creates new ones. A load reads
//! categories, budgets and transactions in parallel, then picks the
//! current month's budget or, failing that, the most recent one, and
//! reconciles it against the ledger.
//!
//! New budgets target the current month while nothing is active and the
//! following month once a budget is on screen.

use std::thread;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::{FintrackError, FintrackResult};
use crate::models::{
    Budget, BudgetCategory, BudgetId, BudgetMonth, BudgetTotals, Category, Money, SpendStatus,
    Transaction,
};
use crate::notify::Notifier;
use crate::storage::{join_fetch, Storage};

use super::budget::{BudgetPatch, BudgetService};
use super::reconcile::reconciled;

/// Which budgets exist relative to the current month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetState {
    NoBudgets,
    HasCurrentMonth,
    HasOnlyPastBudgets,
}

/// A loaded snapshot of everything the budget screen needs
#[derive(Debug, Clone)]
pub struct BudgetBoard {
    pub today: NaiveDate,
    pub categories: Vec<Category>,
    /// Most recent month first, `spent` as stored
    pub budgets: Vec<Budget>,
    pub transactions: Vec<Transaction>,
    /// Reconciled copy of the budget on display
    pub active: Option<Budget>,
    /// False while `active` is only the default pick
    pub explicitly_selected: bool,
}

impl BudgetBoard {
    fn empty(today: NaiveDate) -> Self {
        Self {
            today,
            categories: Vec::new(),
            budgets: Vec::new(),
            transactions: Vec::new(),
            active: None,
            explicitly_selected: false,
        }
    }

    pub fn current_month(&self) -> BudgetMonth {
        BudgetMonth::from_date(self.today)
    }

    pub fn state(&self) -> BudgetState {
        let current = self.current_month();
        if self.budgets.is_empty() {
            BudgetState::NoBudgets
        } else if self.budgets.iter().any(|b| b.month == current) {
            BudgetState::HasCurrentMonth
        } else {
            BudgetState::HasOnlyPastBudgets
        }
    }

    pub fn active_totals(&self) -> Option<BudgetTotals> {
        self.active.as_ref().map(Budget::totals)
    }

    /// Current month's budget, else the most recent
    fn default_pick(&self) -> Option<&Budget> {
        let current = self.current_month();
        self.budgets
            .iter()
            .find(|b| b.month == current)
            .or_else(|| self.budgets.first())
    }

    fn activate(&mut self, budget: &Budget, explicit: bool) {
        self.active = Some(reconciled(budget, &self.transactions));
        self.explicitly_selected = explicit;
    }
}

/// Selector and creator for monthly budgets
pub struct BudgetPlanner<'a> {
    storage: &'a Storage,
    notifier: &'a dyn Notifier,
    default_limit: Money,
    warning_percent: f64,
    board: BudgetBoard,
}

impl<'a> BudgetPlanner<'a> {
    pub fn new(storage: &'a Storage, notifier: &'a dyn Notifier, settings: &Settings) -> Self {
        Self {
            storage,
            notifier,
            default_limit: settings.default_budget_limit,
            warning_percent: settings.warning_threshold_percent,
            board: BudgetBoard::empty(BudgetMonth::current().first_day()),
        }
    }

    pub fn board(&self) -> &BudgetBoard {
        &self.board
    }

    pub fn state(&self) -> BudgetState {
        self.board.state()
    }

    pub fn active(&self) -> Option<&Budget> {
        self.board.active.as_ref()
    }

    /// Lines of the active budget classified against the configured
    /// warning threshold
    pub fn active_line_statuses(&self) -> Vec<(&BudgetCategory, SpendStatus)> {
        self.board
            .active
            .iter()
            .flat_map(|budget| budget.categories.iter())
            .map(|line| (line, line.status_with_threshold(self.warning_percent)))
            .collect()
    }

    /// Fetch everything and pick the active budget.
    ///
    /// On failure the previous board is kept and the error is returned so
    /// the caller can offer a retry.
    pub fn load(&mut self, today: NaiveDate) -> FintrackResult<&BudgetBoard> {
        match self.fetch(today) {
            Ok(board) => {
                self.board = board;
                if let Some(pick) = self.board.default_pick().cloned() {
                    self.board.activate(&pick, false);
                }
                debug!(
                    state = ?self.board.state(),
                    budgets = self.board.budgets.len(),
                    "budget board loaded"
                );
                Ok(&self.board)
            }
            Err(e) => {
                warn!(error = %e, "failed to load budget data");
                self.notifier.error("Failed to load budget data");
                Err(e)
            }
        }
    }

    fn fetch(&self, today: NaiveDate) -> FintrackResult<BudgetBoard> {
        let storage = self.storage;
        let (categories, budgets, transactions) = thread::scope(|s| {
            let categories = s.spawn(|| storage.categories.get_all());
            let budgets = s.spawn(|| storage.budgets.get_all());
            let transactions = s.spawn(|| storage.transactions.get_all());
            (join_fetch(categories), join_fetch(budgets), join_fetch(transactions))
        });

        Ok(BudgetBoard {
            today,
            categories: categories?,
            budgets: budgets?,
            transactions: transactions?,
            active: None,
            explicitly_selected: false,
        })
    }

    /// Make a loaded budget the active one
    pub fn select(&mut self, id: BudgetId) -> FintrackResult<&Budget> {
        let budget = self
            .board
            .budgets
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| FintrackError::budget_not_found(id.to_string()))?;

        self.board.activate(&budget, true);
        self.board
            .active
            .as_ref()
            .ok_or_else(|| FintrackError::budget_not_found(id.to_string()))
    }

    /// Drop a manual selection and return to the default pick
    pub fn clear_selection(&mut self) {
        match self.board.default_pick().cloned() {
            Some(pick) => self.board.activate(&pick, false),
            None => {
                self.board.active = None;
                self.board.explicitly_selected = false;
            }
        }
    }

    /// The month a new budget would be created for
    pub fn target_month(&self, today: NaiveDate) -> BudgetMonth {
        let current = BudgetMonth::from_date(today);
        if self.board.active.is_some() {
            current.next()
        } else {
            current
        }
    }

    /// Create a budget from the expense categories, for the current month
    /// if nothing is active yet and the next month otherwise
    pub fn create_budget(&mut self, today: NaiveDate) -> FintrackResult<Budget> {
        let month = self.target_month(today);
        self.create_for_month(month)
    }

    /// Create a budget for an explicitly chosen month.
    ///
    /// Lines are snapshotted from the category registry as it is now, not
    /// from the board, so categories added since the last load are kept.
    pub fn create_for_month(&mut self, month: BudgetMonth) -> FintrackResult<Budget> {
        let categories = match self.storage.categories.get_all() {
            Ok(categories) => categories,
            Err(e) => {
                warn!(%month, error = %e, "failed to read categories for new budget");
                self.notifier.error("Failed to create budget");
                return Err(e);
            }
        };
        let lines = BudgetService::snapshot_lines(&categories, self.default_limit);
        self.board.categories = categories;
        let total_limit: Money = lines.iter().map(|l| l.budget_limit).sum();

        match BudgetService::new(self.storage).create(month, lines, Some(total_limit)) {
            Ok(budget) => {
                self.board.budgets.push(budget.clone());
                self.board.budgets.sort_by(|a, b| b.month.cmp(&a.month));
                self.board.activate(&budget, true);
                self.notifier.success("Budget created successfully!");
                info!(%month, "budget created from planner");
                Ok(budget)
            }
            Err(e) => {
                if e.is_duplicate() {
                    self.notifier.error(&duplicate_message(month));
                } else {
                    self.notifier.error("Failed to create budget");
                }
                warn!(%month, error = %e, "budget creation failed");
                Err(e)
            }
        }
    }

    /// Edit the active budget and refresh it on the board
    pub fn update_active(&mut self, patch: BudgetPatch) -> FintrackResult<Budget> {
        let Some(id) = self.board.active.as_ref().map(|b| b.id) else {
            self.notifier.error("Failed to update budget");
            return Err(FintrackError::Validation("No active budget to update".into()));
        };

        match BudgetService::new(self.storage).update(id, patch) {
            Ok(budget) => {
                if let Some(slot) = self.board.budgets.iter_mut().find(|b| b.id == id) {
                    *slot = budget.clone();
                }
                let explicit = self.board.explicitly_selected;
                self.board.activate(&budget, explicit);
                self.notifier.success("Budget updated successfully!");
                Ok(budget)
            }
            Err(e) => {
                warn!(%id, error = %e, "budget update failed");
                self.notifier.error("Failed to update budget");
                Err(e)
            }
        }
    }
}

/// Message shown when the target month already has a budget
pub fn duplicate_message(month: BudgetMonth) -> String {
    format!(
        "A budget already exists for {}. Please edit the existing budget or create one for a different month.",
        month.long_name()
    )
}
