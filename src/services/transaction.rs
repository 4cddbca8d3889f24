//! Transaction service
//!
//! Provides CRUD operations and the filtered views the budget and report
//! code build on.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::audit::EntityType;
use crate::error::{FintrackError, FintrackResult};
use crate::models::{FlowKind, Money, Transaction, TransactionId};
use crate::storage::Storage;

/// Service for transaction management
pub struct TransactionService<'a> {
    storage: &'a Storage,
}

/// Input for creating a new transaction
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    pub kind: FlowKind,
    pub amount: Money,
    pub category: String,
    /// Defaults to `today` when absent
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub payment_method: Option<String>,
    pub account_id: Option<String>,
}

impl CreateTransactionInput {
    pub fn new(kind: FlowKind, amount: Money, category: impl Into<String>) -> Self {
        Self {
            kind,
            amount,
            category: category.into(),
            date: None,
            description: None,
            payment_method: None,
            account_id: None,
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Fields to change on an existing transaction
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    pub kind: Option<FlowKind>,
    pub amount: Option<Money>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub payment_method: Option<String>,
    /// `Some(None)` clears the account
    pub account_id: Option<Option<String>>,
}

impl<'a> TransactionService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, input: CreateTransactionInput, today: NaiveDate) -> FintrackResult<Transaction> {
        let mut txn = Transaction::new(
            input.kind,
            input.amount,
            input.category.trim(),
            input.date.unwrap_or(today),
        );
        if let Some(description) = input.description {
            txn.description = description;
        }
        if let Some(method) = input.payment_method {
            txn.payment_method = method;
        }
        txn.account_id = input.account_id;

        txn.validate()
            .map_err(|e| FintrackError::Validation(e.to_string()))?;

        self.storage.transactions.insert(txn.clone())?;
        self.storage.transactions.save()?;

        self.storage.log_create(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(format!("{} {}", txn.date, txn.category)),
            &txn,
        );

        info!(id = %txn.id, amount = %txn.amount, category = %txn.category, "transaction created");
        Ok(txn)
    }

    pub fn get(&self, id: TransactionId) -> FintrackResult<Option<Transaction>> {
        self.storage.transactions.get(id)
    }

    /// All transactions, newest first
    pub fn list(&self) -> FintrackResult<Vec<Transaction>> {
        self.storage.transactions.get_all()
    }

    /// Transactions dated within `start..=end`
    pub fn by_date_range(&self, start: NaiveDate, end: NaiveDate) -> FintrackResult<Vec<Transaction>> {
        let mut transactions = self.list()?;
        transactions.retain(|t| t.in_range(start, end));
        debug!(%start, %end, count = transactions.len(), "transactions in range");
        Ok(transactions)
    }

    pub fn by_category(&self, category: &str) -> FintrackResult<Vec<Transaction>> {
        let mut transactions = self.list()?;
        transactions.retain(|t| t.category == category);
        Ok(transactions)
    }

    pub fn by_kind(&self, kind: FlowKind) -> FintrackResult<Vec<Transaction>> {
        let mut transactions = self.list()?;
        transactions.retain(|t| t.kind == kind);
        Ok(transactions)
    }

    pub fn update(&self, id: TransactionId, patch: TransactionPatch) -> FintrackResult<Transaction> {
        let mut txn = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| FintrackError::transaction_not_found(id.to_string()))?;

        let before = txn.clone();

        if let Some(kind) = patch.kind {
            txn.kind = kind;
        }
        if let Some(amount) = patch.amount {
            txn.amount = amount;
        }
        if let Some(category) = patch.category {
            txn.category = category.trim().to_string();
        }
        if let Some(date) = patch.date {
            txn.date = date;
        }
        if let Some(description) = patch.description {
            txn.description = description;
        }
        if let Some(method) = patch.payment_method {
            txn.payment_method = method;
        }
        if let Some(account_id) = patch.account_id {
            txn.account_id = account_id;
        }
        txn.updated_at = Utc::now();

        txn.validate()
            .map_err(|e| FintrackError::Validation(e.to_string()))?;

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;

        self.storage.log_update(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(format!("{} {}", txn.date, txn.category)),
            &before,
            &txn,
        );

        info!(id = %txn.id, "transaction updated");
        Ok(txn)
    }

    pub fn delete(&self, id: TransactionId) -> FintrackResult<Transaction> {
        let txn = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| FintrackError::transaction_not_found(id.to_string()))?;

        self.storage.transactions.delete(id)?;
        self.storage.transactions.save()?;

        self.storage.log_delete(
            EntityType::Transaction,
            id.to_string(),
            Some(format!("{} {}", txn.date, txn.category)),
            &txn,
        );

        info!(%id, "transaction deleted");
        Ok(txn)
    }
}
