//! fintrack - personal finance core
//!
//! This library holds the domain logic behind a personal finance tracker:
//! spending categories, a transaction ledger, monthly budgets reconciled
//! against that ledger, savings goals and recurring bills. It has no user
//! interface of its own; embedders drive it through the service layer.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `logging`: `tracing` subscriber setup for embedders
//! - `models`: Core data models (categories, transactions, budgets, goals, bills)
//! - `storage`: Repository traits and the JSON file backend
//! - `services`: Business logic layer, including the budget planner
//! - `notify`: User-facing success and error notices
//! - `reports`: Dashboard and spending reports
//! - `audit`: Audit logging system
//!
//! # Example
//!
//! ```rust,ignore
//! use fintrack::config::{FintrackPaths, Settings};
//! use fintrack::notify::TracingNotifier;
//! use fintrack::services::BudgetPlanner;
//! use fintrack::storage::{initialize_storage, needs_initialization, Storage};
//!
//! fintrack::logging::init_tracing();
//!
//! let paths = FintrackPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::new(paths)?;
//! storage.load_all()?;
//! if needs_initialization(&storage)? {
//!     initialize_storage(&storage)?;
//! }
//!
//! let notifier = TracingNotifier;
//! let mut planner = BudgetPlanner::new(&storage, &notifier, &settings);
//! let today = chrono::Local::now().date_naive();
//! planner.load(today)?;
//! let budget = planner.create_budget(today)?;
//! ```

pub mod audit;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod notify;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{FintrackError, FintrackResult};
