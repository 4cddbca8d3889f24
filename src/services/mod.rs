//! Service layer for fintrack
//!
//! Services borrow a [`Storage`](crate::storage::Storage) and add
//! validation, audit logging and cross-entity rules on top of the raw
//! repositories.

pub mod bill;
pub mod budget;
pub mod category;
pub mod goal;
pub mod planner;
pub mod reconcile;
pub mod transaction;

pub use bill::{BillFilter, BillPatch, BillService, CreateBillInput, PaymentStats, ReminderUpdate};
pub use budget::{BudgetPatch, BudgetService};
pub use category::{CategoryPatch, CategoryService, CreateCategoryInput};
pub use goal::{CreateGoalInput, GoalPatch, GoalService, GoalsOverview};
pub use planner::{BudgetBoard, BudgetPlanner, BudgetState};
pub use reconcile::{reconcile, reconciled};
pub use transaction::{CreateTransactionInput, TransactionPatch, TransactionService};
