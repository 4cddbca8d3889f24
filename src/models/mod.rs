//! Core data models for fintrack
//!
//! Categories, transactions, monthly budgets, savings goals and bills, plus
//! the value types they are built from.

pub mod bill;
pub mod budget;
pub mod category;
pub mod goal;
pub mod ids;
pub mod money;
pub mod month;
pub mod transaction;

pub use bill::{Bill, BillStatus, Payment, PaymentStatus, ReminderMethod, ReminderSettings};
pub use budget::{Budget, BudgetCategory, BudgetTotals, SpendStatus};
pub use category::{Category, FlowKind};
pub use goal::SavingsGoal;
pub use ids::{BillId, BudgetId, CategoryId, GoalId, TransactionId};
pub use money::Money;
pub use month::BudgetMonth;
pub use transaction::Transaction;
