//! Storage layer for fintrack
//!
//! One repository per entity kind plus the audit log. File-backed storage
//! writes each repository to its own JSON file with atomic renames;
//! in-memory storage keeps everything in the process and logs nothing.

pub mod file_io;
pub mod init;
pub mod repository;

pub use file_io::{read_json, write_json_atomic};
pub use init::{initialize_storage, needs_initialization};
pub use repository::{JsonRepository, Record, Repository};

use std::sync::{Mutex, MutexGuard};
use std::thread::ScopedJoinHandle;

use serde::Serialize;
use tracing::warn;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::FintrackPaths;
use crate::error::{FintrackError, FintrackResult};
use crate::models::{Bill, Budget, Category, SavingsGoal, Transaction};

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: Option<FintrackPaths>,
    pub categories: Box<dyn Repository<Category>>,
    pub transactions: Box<dyn Repository<Transaction>>,
    pub budgets: Box<dyn Repository<Budget>>,
    pub goals: Box<dyn Repository<SavingsGoal>>,
    pub bills: Box<dyn Repository<Bill>>,
    audit: AuditLogger,
    // held across check-then-insert on the month key
    budget_lock: Mutex<()>,
    // held across the unique-name check and the write
    category_lock: Mutex<()>,
}

/// Repositories for [`Storage::with_backends`]
pub struct Backends {
    pub categories: Box<dyn Repository<Category>>,
    pub transactions: Box<dyn Repository<Transaction>>,
    pub budgets: Box<dyn Repository<Budget>>,
    pub goals: Box<dyn Repository<SavingsGoal>>,
    pub bills: Box<dyn Repository<Bill>>,
}

impl Default for Backends {
    fn default() -> Self {
        Self {
            categories: Box::new(JsonRepository::<Category>::in_memory()),
            transactions: Box::new(JsonRepository::<Transaction>::in_memory()),
            budgets: Box::new(JsonRepository::<Budget>::in_memory()),
            goals: Box::new(JsonRepository::<SavingsGoal>::in_memory()),
            bills: Box::new(JsonRepository::<Bill>::in_memory()),
        }
    }
}

impl Storage {
    /// File-backed storage under `paths`. Call [`Storage::load_all`] to
    /// read existing data.
    pub fn new(paths: FintrackPaths) -> FintrackResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            categories: Box::new(JsonRepository::<Category>::new(paths.categories_file())),
            transactions: Box::new(JsonRepository::<Transaction>::new(paths.transactions_file())),
            budgets: Box::new(JsonRepository::<Budget>::new(paths.budgets_file())),
            goals: Box::new(JsonRepository::<SavingsGoal>::new(paths.goals_file())),
            bills: Box::new(JsonRepository::<Bill>::new(paths.bills_file())),
            audit: AuditLogger::new(paths.audit_log()),
            budget_lock: Mutex::new(()),
            category_lock: Mutex::new(()),
            paths: Some(paths),
        })
    }

    /// Volatile storage with auditing disabled
    pub fn in_memory() -> Self {
        Self::with_backends(Backends::default())
    }

    /// Storage over caller-supplied repositories, e.g. a remote backend
    pub fn with_backends(backends: Backends) -> Self {
        Self {
            paths: None,
            categories: backends.categories,
            transactions: backends.transactions,
            budgets: backends.budgets,
            goals: backends.goals,
            bills: backends.bills,
            audit: AuditLogger::disabled(),
            budget_lock: Mutex::new(()),
            category_lock: Mutex::new(()),
        }
    }

    /// `None` for in-memory storage
    pub fn paths(&self) -> Option<&FintrackPaths> {
        self.paths.as_ref()
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Serialises budget writes so the one-budget-per-month rule holds
    /// under concurrent callers
    pub fn lock_budgets(&self) -> FintrackResult<MutexGuard<'_, ()>> {
        self.budget_lock
            .lock()
            .map_err(|e| FintrackError::Storage(format!("Budget lock poisoned: {}", e)))
    }

    /// Serialises category writes so names stay unique
    pub fn lock_categories(&self) -> FintrackResult<MutexGuard<'_, ()>> {
        self.category_lock
            .lock()
            .map_err(|e| FintrackError::Storage(format!("Category lock poisoned: {}", e)))
    }

    /// Load all data from the backing store
    pub fn load_all(&self) -> FintrackResult<()> {
        self.categories.load()?;
        self.transactions.load()?;
        self.budgets.load()?;
        self.goals.load()?;
        self.bills.load()?;
        Ok(())
    }

    /// Save all data to the backing store
    pub fn save_all(&self) -> FintrackResult<()> {
        self.categories.save()?;
        self.transactions.save()?;
        self.budgets.save()?;
        self.goals.save()?;
        self.bills.save()?;
        Ok(())
    }

    /// Record a create. The data is already saved, so a failed audit
    /// write is logged and not returned.
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) {
        self.append_audit(AuditEntry::create(entity_type, entity_id, entity_name, entity));
    }

    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) {
        self.append_audit(AuditEntry::update(entity_type, entity_id, entity_name, before, after));
    }

    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) {
        self.append_audit(AuditEntry::delete(entity_type, entity_id, entity_name, entity));
    }

    fn append_audit(&self, entry: AuditEntry) {
        if let Err(e) = self.audit.log(&entry) {
            warn!(
                error = %e,
                operation = %entry.operation,
                entity = %entry.entity_type,
                id = %entry.entity_id,
                "audit entry not written"
            );
        }
    }
}

/// Join a scoped fetch thread, mapping a panic to a storage error
pub(crate) fn join_fetch<T>(handle: ScopedJoinHandle<'_, FintrackResult<T>>) -> FintrackResult<T> {
    handle
        .join()
        .map_err(|_| FintrackError::Storage("Fetch thread panicked".into()))?
}
