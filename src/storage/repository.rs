//! Generic record repository
//!
//! Every entity kind is stored the same way: a map from id to record behind
//! an `RwLock`, optionally mirrored to a JSON file. Services only see the
//! [`Repository`] trait, so a remote backend can be swapped in without
//! touching them.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{FintrackError, FintrackResult};
use crate::models::{
    Bill, BillId, Budget, BudgetId, Category, CategoryId, GoalId, SavingsGoal, Transaction,
    TransactionId,
};

use super::file_io::{read_json, write_json_atomic};

/// A persisted entity
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Id: Copy + Eq + Hash + Display + Send + Sync + 'static;

    /// Name used in error messages
    const ENTITY: &'static str;

    fn id(&self) -> Self::Id;

    /// Order used by `get_all`
    fn ordering(a: &Self, b: &Self) -> Ordering;
}

impl Record for Category {
    type Id = CategoryId;
    const ENTITY: &'static str = "Category";

    fn id(&self) -> CategoryId {
        self.id
    }

    fn ordering(a: &Self, b: &Self) -> Ordering {
        a.name.to_lowercase().cmp(&b.name.to_lowercase())
    }
}

impl Record for Transaction {
    type Id = TransactionId;
    const ENTITY: &'static str = "Transaction";

    fn id(&self) -> TransactionId {
        self.id
    }

    /// Newest first
    fn ordering(a: &Self, b: &Self) -> Ordering {
        b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at))
    }
}

impl Record for Budget {
    type Id = BudgetId;
    const ENTITY: &'static str = "Budget";

    fn id(&self) -> BudgetId {
        self.id
    }

    /// Most recent month first
    fn ordering(a: &Self, b: &Self) -> Ordering {
        b.month.cmp(&a.month)
    }
}

impl Record for SavingsGoal {
    type Id = GoalId;
    const ENTITY: &'static str = "Savings goal";

    fn id(&self) -> GoalId {
        self.id
    }

    fn ordering(a: &Self, b: &Self) -> Ordering {
        a.created_at.cmp(&b.created_at)
    }
}

impl Record for Bill {
    type Id = BillId;
    const ENTITY: &'static str = "Bill";

    fn id(&self) -> BillId {
        self.id
    }

    fn ordering(a: &Self, b: &Self) -> Ordering {
        a.due_date.cmp(&b.due_date).then_with(|| a.name.cmp(&b.name))
    }
}

/// Data access for one entity kind
pub trait Repository<R: Record>: Send + Sync {
    /// Replace the in-memory state with the backing store's contents
    fn load(&self) -> FintrackResult<()>;

    /// Flush the in-memory state to the backing store
    fn save(&self) -> FintrackResult<()>;

    fn get_all(&self) -> FintrackResult<Vec<R>>;

    fn get(&self, id: R::Id) -> FintrackResult<Option<R>>;

    /// Add a new record. Fails with `Duplicate` if the id is taken.
    fn insert(&self, record: R) -> FintrackResult<()>;

    /// Insert or replace by id
    fn upsert(&self, record: R) -> FintrackResult<()>;

    /// Returns whether a record was removed
    fn delete(&self, id: R::Id) -> FintrackResult<bool>;

    fn count(&self) -> FintrackResult<usize>;
}

#[derive(Serialize, Deserialize)]
#[serde(bound(serialize = "R: Serialize", deserialize = "R: DeserializeOwned"))]
struct RecordFile<R> {
    #[serde(default)]
    records: Vec<R>,
}

impl<R> Default for RecordFile<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

/// `RwLock<HashMap>` store, mirrored to a JSON file when given a path
pub struct JsonRepository<R: Record> {
    path: Option<PathBuf>,
    records: RwLock<HashMap<R::Id, R>>,
}

impl<R: Record> JsonRepository<R> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path: Some(path),
            records: RwLock::new(HashMap::new()),
        }
    }

    /// No backing file; `load` and `save` are no-ops
    pub fn in_memory() -> Self {
        Self {
            path: None,
            records: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> FintrackResult<RwLockReadGuard<'_, HashMap<R::Id, R>>> {
        self.records
            .read()
            .map_err(|e| FintrackError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> FintrackResult<RwLockWriteGuard<'_, HashMap<R::Id, R>>> {
        self.records
            .write()
            .map_err(|e| FintrackError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    fn sorted(records: &HashMap<R::Id, R>) -> Vec<R> {
        let mut list: Vec<R> = records.values().cloned().collect();
        list.sort_by(R::ordering);
        list
    }
}

impl<R: Record> Repository<R> for JsonRepository<R> {
    fn load(&self) -> FintrackResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let file: RecordFile<R> = read_json(path)?;

        let mut records = self.write()?;
        records.clear();
        for record in file.records {
            records.insert(record.id(), record);
        }
        Ok(())
    }

    fn save(&self) -> FintrackResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let records = self.read()?;
        let file = RecordFile {
            records: Self::sorted(&records),
        };
        write_json_atomic(path, &file)
    }

    fn get_all(&self) -> FintrackResult<Vec<R>> {
        Ok(Self::sorted(&*self.read()?))
    }

    fn get(&self, id: R::Id) -> FintrackResult<Option<R>> {
        Ok(self.read()?.get(&id).cloned())
    }

    fn insert(&self, record: R) -> FintrackResult<()> {
        let mut records = self.write()?;
        let id = record.id();
        if records.contains_key(&id) {
            return Err(FintrackError::Duplicate {
                entity_type: R::ENTITY,
                identifier: id.to_string(),
            });
        }
        records.insert(id, record);
        Ok(())
    }

    fn upsert(&self, record: R) -> FintrackResult<()> {
        self.write()?.insert(record.id(), record);
        Ok(())
    }

    fn delete(&self, id: R::Id) -> FintrackResult<bool> {
        Ok(self.write()?.remove(&id).is_some())
    }

    fn count(&self) -> FintrackResult<usize> {
        Ok(self.read()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetMonth, Money};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn budget(month: &str) -> Budget {
        Budget::new(month.parse().unwrap(), Vec::new(), Money::zero())
    }

    #[test]
    fn test_empty_load() {
        let temp_dir = TempDir::new().unwrap();
        let repo: JsonRepository<Budget> = JsonRepository::new(temp_dir.path().join("budgets.json"));
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_insert_rejects_same_id() {
        let repo: JsonRepository<Budget> = JsonRepository::in_memory();
        let b = budget("2024-03");
        repo.insert(b.clone()).unwrap();

        let err = repo.insert(b).unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_get_all_uses_record_ordering() {
        let repo: JsonRepository<Budget> = JsonRepository::in_memory();
        for month in ["2024-01", "2024-03", "2023-12"] {
            repo.insert(budget(month)).unwrap();
        }

        let months: Vec<BudgetMonth> = repo.get_all().unwrap().iter().map(|b| b.month).collect();
        assert_eq!(
            months,
            vec![
                "2024-03".parse().unwrap(),
                "2024-01".parse().unwrap(),
                "2023-12".parse().unwrap()
            ]
        );
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("transactions.json");
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let txn = Transaction::expense(Money::from_major(50), "Food", date);

        let repo: JsonRepository<Transaction> = JsonRepository::new(path.clone());
        repo.upsert(txn.clone()).unwrap();
        repo.save().unwrap();

        let reloaded: JsonRepository<Transaction> = JsonRepository::new(path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.get(txn.id).unwrap(), Some(txn));
    }

    #[test]
    fn test_delete_reports_presence() {
        let repo: JsonRepository<Budget> = JsonRepository::in_memory();
        let b = budget("2024-03");
        let id = b.id;
        repo.insert(b).unwrap();

        assert!(repo.delete(id).unwrap());
        assert!(!repo.delete(id).unwrap());
    }
}
