//! Dashboard summary
//!
//! Headline figures for the landing screen. Reads the repositories in
//! parallel, the same way the budget board loads.

use std::thread;

use chrono::NaiveDate;
use tracing::debug;

use crate::config::Settings;
use crate::error::FintrackResult;
use crate::models::{Bill, BillStatus, BudgetMonth, Money, SavingsGoal, Transaction};
use crate::services::goal::overview_of;
use crate::storage::{join_fetch, Storage};

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    /// All-time income minus expenses
    pub total_balance: Money,
    pub monthly_income: Money,
    pub monthly_expenses: Money,
    /// Saved over targeted across all goals, in percent
    pub goal_progress: f64,
    /// Due within the settings' upcoming window
    pub upcoming_bills: usize,
    /// Unpaid and due within the settings' due-soon window
    pub due_soon_bills: usize,
    pub overdue_bills: usize,
    pub unpaid_bills: usize,
}

impl DashboardSummary {
    pub fn generate(storage: &Storage, settings: &Settings, today: NaiveDate) -> FintrackResult<Self> {
        let (transactions, goals, bills) = thread::scope(|s| {
            let transactions = s.spawn(|| storage.transactions.get_all());
            let goals = s.spawn(|| storage.goals.get_all());
            let bills = s.spawn(|| storage.bills.get_all());
            (join_fetch(transactions), join_fetch(goals), join_fetch(bills))
        });

        let summary = Self::from_parts(&transactions?, &goals?, &bills?, settings, today);
        debug!(?summary, "dashboard generated");
        Ok(summary)
    }

    pub fn from_parts(
        transactions: &[Transaction],
        goals: &[SavingsGoal],
        bills: &[Bill],
        settings: &Settings,
        today: NaiveDate,
    ) -> Self {
        let month = BudgetMonth::from_date(today);
        let total_income = total(transactions, |t| t.is_income());
        let total_expenses = total(transactions, |t| t.is_expense());
        let monthly_income = total(transactions, |t| t.is_income() && t.in_month(month));
        let monthly_expenses = total(transactions, |t| t.is_expense() && t.in_month(month));

        let upcoming_bills = bills
            .iter()
            .filter(|b| b.is_upcoming(today, settings.upcoming_days))
            .count();
        let due_soon_bills = bills
            .iter()
            .filter(|b| b.status(today, settings.due_soon_days) == BillStatus::DueSoon)
            .count();
        let overdue_bills = bills.iter().filter(|b| b.is_overdue(today)).count();

        Self {
            total_balance: total_income - total_expenses,
            monthly_income,
            monthly_expenses,
            goal_progress: overview_of(goals).progress_percent,
            upcoming_bills,
            due_soon_bills,
            overdue_bills,
            unpaid_bills: bills.iter().filter(|b| !b.is_paid()).count(),
        }
    }
}

fn total(transactions: &[Transaction], pred: impl Fn(&Transaction) -> bool) -> Money {
    transactions.iter().filter(|t| pred(t)).map(|t| t.amount).sum()
}
