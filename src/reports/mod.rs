//! Reports module for fintrack
//!
//! Read-only summaries computed from the ledger: the dashboard headline
//! figures and the date-range spending report.

pub mod dashboard;
pub mod spending;

pub use dashboard::DashboardSummary;
pub use spending::{CategorySpending, MonthlyComparison, ReportRange, SpendingReport};
