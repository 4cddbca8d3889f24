//! Spending Report
//!
//! Income, expenses and the biggest expense categories over a date range,
//! plus this month's expenses compared with last month's.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::config::Settings;
use crate::error::{FintrackError, FintrackResult};
use crate::models::{BudgetMonth, Money, Transaction};
use crate::services::TransactionService;
use crate::storage::Storage;

/// How many categories the report ranks
pub const TOP_CATEGORY_COUNT: usize = 5;

/// Period a report covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportRange {
    ThisMonth,
    LastMonth,
    /// This month and the two before it
    LastThreeMonths,
    Custom { start: NaiveDate, end: NaiveDate },
}

impl ReportRange {
    /// Inclusive start and end dates relative to `today`
    pub fn bounds(&self, today: NaiveDate) -> FintrackResult<(NaiveDate, NaiveDate)> {
        let current = BudgetMonth::from_date(today);
        let bounds = match *self {
            Self::ThisMonth => (current.first_day(), current.last_day()),
            Self::LastMonth => {
                let last = current.prev();
                (last.first_day(), last.last_day())
            }
            Self::LastThreeMonths => (current.prev().prev().first_day(), current.last_day()),
            Self::Custom { start, end } => (start, end),
        };
        if bounds.0 > bounds.1 {
            return Err(FintrackError::Validation(format!(
                "Report start {} is after end {}",
                bounds.0, bounds.1
            )));
        }
        Ok(bounds)
    }
}

/// Expense total for one category name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySpending {
    pub category: String,
    pub amount: Money,
    pub transaction_count: usize,
}

/// Expenses this calendar month against the previous one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyComparison {
    pub current: Money,
    pub previous: Money,
    /// Percent change, zero when there was nothing last month
    pub change_percent: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpendingReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_income: Money,
    pub total_expenses: Money,
    pub net_income: Money,
    /// Largest first, at most [`TOP_CATEGORY_COUNT`]
    pub top_categories: Vec<CategorySpending>,
    pub monthly_comparison: MonthlyComparison,
    pub total_transactions: usize,
}

impl SpendingReport {
    /// Generate a spending report for `range`
    pub fn generate(storage: &Storage, range: ReportRange, today: NaiveDate) -> FintrackResult<Self> {
        let (start_date, end_date) = range.bounds(today)?;
        let all = TransactionService::new(storage).list()?;
        Ok(Self::from_transactions(&all, start_date, end_date, today))
    }

    /// Build the report from an already-fetched ledger
    pub fn from_transactions(
        transactions: &[Transaction],
        start_date: NaiveDate,
        end_date: NaiveDate,
        today: NaiveDate,
    ) -> Self {
        let in_range: Vec<&Transaction> = transactions
            .iter()
            .filter(|t| t.in_range(start_date, end_date))
            .collect();

        let total_income: Money = in_range.iter().filter(|t| t.is_income()).map(|t| t.amount).sum();
        let total_expenses: Money = in_range.iter().filter(|t| t.is_expense()).map(|t| t.amount).sum();

        let mut by_category: HashMap<&str, (Money, usize)> = HashMap::new();
        for txn in in_range.iter().filter(|t| t.is_expense()) {
            let entry = by_category
                .entry(txn.category.as_str())
                .or_insert((Money::zero(), 0));
            entry.0 += txn.amount;
            entry.1 += 1;
        }

        let mut top_categories: Vec<CategorySpending> = by_category
            .into_iter()
            .map(|(category, (amount, transaction_count))| CategorySpending {
                category: category.to_string(),
                amount,
                transaction_count,
            })
            .collect();
        // name breaks ties so the ranking is stable
        top_categories.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.category.cmp(&b.category)));
        top_categories.truncate(TOP_CATEGORY_COUNT);

        Self {
            start_date,
            end_date,
            total_income,
            total_expenses,
            net_income: total_income - total_expenses,
            top_categories,
            monthly_comparison: monthly_comparison(transactions, today),
            total_transactions: in_range.len(),
        }
    }

    /// Format the report for terminal display, amounts in the configured
    /// currency
    pub fn format_terminal(&self, settings: &Settings) -> String {
        let money = |amount: Money| amount.format_with_symbol(&settings.currency_symbol);
        let mut output = String::new();

        output.push_str(&format!(
            "Spending Report: {} to {}\n",
            self.start_date, self.end_date
        ));
        output.push_str(&"=".repeat(60));
        output.push('\n');
        output.push_str(&format!("Total Income:   {}\n", money(self.total_income)));
        output.push_str(&format!("Total Expenses: {}\n", money(self.total_expenses)));
        output.push_str(&format!("Net:            {}\n\n", money(self.net_income)));

        output.push_str(&format!("{:<35} {:>12} {:>8}\n", "Top Categories", "Amount", "Count"));
        output.push_str(&"-".repeat(60));
        output.push('\n');
        for category in &self.top_categories {
            output.push_str(&format!(
                "{:<35} {:>12} {:>8}\n",
                category.category,
                money(category.amount),
                category.transaction_count
            ));
        }

        let change = self.monthly_comparison.change_percent;
        output.push_str(&format!(
            "\nThis month vs last: {} vs {} ({}{:.1}%)\n",
            money(self.monthly_comparison.current),
            money(self.monthly_comparison.previous),
            if change > 0.0 { "+" } else { "" },
            change
        ));

        output
    }
}

fn monthly_comparison(transactions: &[Transaction], today: NaiveDate) -> MonthlyComparison {
    let current_month = BudgetMonth::from_date(today);
    let previous_month = current_month.prev();

    let expenses_in = |month: BudgetMonth| -> Money {
        transactions
            .iter()
            .filter(|t| t.is_expense() && t.in_month(month))
            .map(|t| t.amount)
            .sum()
    };

    let current = expenses_in(current_month);
    let previous = expenses_in(previous_month);
    let change_percent = if previous.is_positive() {
        (current - previous).percent_of(previous)
    } else {
        0.0
    };

    MonthlyComparison {
        current,
        previous,
        change_percent,
    }
}
