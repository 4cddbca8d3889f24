//! End-to-end budget lifecycle over file-backed and injected storage

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use chrono::NaiveDate;
use tempfile::TempDir;

use fintrack::config::{FintrackPaths, Settings};
use fintrack::error::{FintrackError, FintrackResult};
use fintrack::models::{Budget, BudgetCategory, BudgetId, BudgetMonth, CategoryId, FlowKind, Money};
use fintrack::notify::{NoticeLevel, RecordingNotifier};
use fintrack::services::{
    reconciled, BudgetPlanner, BudgetService, BudgetState, CategoryService, CreateCategoryInput,
    CreateTransactionInput, TransactionService,
};
use fintrack::storage::{Backends, JsonRepository, Repository, Storage};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn month(s: &str) -> BudgetMonth {
    s.parse().unwrap()
}

fn file_storage(temp_dir: &TempDir) -> Storage {
    let paths = FintrackPaths::with_base_dir(temp_dir.path().to_path_buf());
    let storage = Storage::new(paths).unwrap();
    storage.load_all().unwrap();
    storage
}

fn spend(storage: &Storage, amount: i64, category: &str, on: NaiveDate) {
    TransactionService::new(storage)
        .create(
            CreateTransactionInput::new(FlowKind::Expense, Money::from_major(amount), category).on(on),
            on,
        )
        .unwrap();
}

#[test]
fn creates_budget_from_expense_categories() {
    let temp_dir = TempDir::new().unwrap();
    let storage = file_storage(&temp_dir);
    let categories = CategoryService::new(&storage);
    categories
        .create(CreateCategoryInput::new("Food", FlowKind::Expense).limit(Money::from_major(300)))
        .unwrap();
    categories
        .create(CreateCategoryInput::new("Salary", FlowKind::Income))
        .unwrap();

    let notifier = RecordingNotifier::new();
    let mut planner = BudgetPlanner::new(&storage, &notifier, &Settings::default());
    planner.load(date(2024, 3, 10)).unwrap();
    assert_eq!(planner.state(), BudgetState::NoBudgets);

    let budget = planner.create_budget(date(2024, 3, 10)).unwrap();
    assert_eq!(budget.month, month("2024-03"));
    assert_eq!(budget.categories.len(), 1);
    assert_eq!(budget.categories[0].name, "Food");
    assert_eq!(budget.categories[0].budget_limit, Money::from_major(300));
    assert_eq!(budget.categories[0].spent, Money::zero());
    assert_eq!(budget.total_limit, Money::from_major(300));

    assert_eq!(notifier.last().unwrap().message, "Budget created successfully!");
    assert_eq!(planner.state(), BudgetState::HasCurrentMonth);
    assert!(planner.board().explicitly_selected);
}

#[test]
fn duplicate_month_leaves_store_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let original = {
        let storage = file_storage(&temp_dir);
        let service = BudgetService::new(&storage);
        let line = BudgetCategory::new(CategoryId::new(), "Food", Money::from_major(300));
        let original = service.create(month("2024-03"), vec![line], None).unwrap();

        let other = BudgetCategory::new(CategoryId::new(), "Travel", Money::from_major(900));
        let err = service.create(month("2024-03"), vec![other], None).unwrap_err();
        assert!(err.is_duplicate());
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Budget already exists: 2024-03");
        original
    };

    let reopened = file_storage(&temp_dir);
    let budgets = BudgetService::new(&reopened).list().unwrap();
    assert_eq!(budgets, vec![original]);
}

#[test]
fn concurrent_creates_for_one_month_admit_a_single_budget() {
    let storage = Storage::in_memory();
    let target = month("2024-05");

    let results: Vec<FintrackResult<Budget>> = thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let storage = &storage;
                s.spawn(move || {
                    let line = BudgetCategory::new(CategoryId::new(), format!("Line {}", i), Money::from_major(100));
                    BudgetService::new(storage).create(target, vec![line], None)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(FintrackError::is_duplicate));
    assert_eq!(storage.budgets.count().unwrap(), 1);
}

#[test]
fn reconciliation_counts_only_matching_month_and_category() {
    let temp_dir = TempDir::new().unwrap();
    let storage = file_storage(&temp_dir);
    let service = BudgetService::new(&storage);
    let lines = vec![
        BudgetCategory::new(CategoryId::new(), "Food", Money::from_major(300)),
        BudgetCategory::new(CategoryId::new(), "Transport", Money::from_major(100)),
    ];
    let budget = service.create(month("2024-03"), lines, None).unwrap();

    spend(&storage, 50, "Food", date(2024, 3, 5));
    spend(&storage, 20, "Food", date(2024, 4, 1));
    spend(&storage, 15, "Snacks", date(2024, 3, 6));
    spend(&storage, 9, "food", date(2024, 3, 7));

    let fresh = service.get_reconciled(budget.id).unwrap();
    assert_eq!(fresh.category("Food").unwrap().spent, Money::from_major(50));
    assert_eq!(fresh.category("Transport").unwrap().spent, Money::zero());
    assert_eq!(fresh.totals().total_spent, Money::from_major(50));

    // stored copy is never the source of truth
    let stored = service.get(budget.id).unwrap().unwrap();
    assert_eq!(stored.category("Food").unwrap().spent, Money::zero());
}

#[test]
fn totals_for_an_overspent_line() {
    let budget = Budget::new(
        month("2024-03"),
        vec![
            BudgetCategory::new(CategoryId::new(), "Food", Money::from_major(300)),
            BudgetCategory::new(CategoryId::new(), "Transport", Money::from_major(100)),
        ],
        Money::from_major(400),
    );
    let ledger = vec![
        fintrack::models::Transaction::expense(Money::from_major(320), "Food", date(2024, 3, 2)),
        fintrack::models::Transaction::expense(Money::from_major(40), "Transport", date(2024, 3, 3)),
    ];

    let totals = reconciled(&budget, &ledger).totals();
    assert_eq!(totals.total_budget, Money::from_major(400));
    assert_eq!(totals.total_spent, Money::from_major(360));
    assert_eq!(totals.remaining, Money::from_major(40));
    assert_eq!(totals.rounded(), (400, 360, 40));
    assert!(!totals.is_over_budget());
}

#[test]
fn next_budget_targets_following_month() {
    let storage = Storage::in_memory();
    CategoryService::new(&storage)
        .create(CreateCategoryInput::new("Food", FlowKind::Expense))
        .unwrap();

    let notifier = RecordingNotifier::new();
    let mut planner = BudgetPlanner::new(&storage, &notifier, &Settings::default());
    let today = date(2024, 12, 20);
    planner.load(today).unwrap();

    let first = planner.create_budget(today).unwrap();
    assert_eq!(first.month, month("2024-12"));
    // missing limit falls back to the configured default
    assert_eq!(first.categories[0].budget_limit, Money::from_major(500));

    let second = planner.create_budget(today).unwrap();
    assert_eq!(second.month, month("2025-01"));

    let err = planner.create_for_month(month("2024-12")).unwrap_err();
    assert!(err.is_duplicate());
    let notice = notifier.last().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.message.starts_with("A budget already exists for December 2024."));
}

/// Budget backend that fails on demand, standing in for an unreachable store
struct FlakyBudgets {
    inner: JsonRepository<Budget>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyBudgets {
    fn check(flag: &AtomicBool) -> FintrackResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(FintrackError::Storage("connection refused".into()));
        }
        Ok(())
    }
}

impl Repository<Budget> for FlakyBudgets {
    fn load(&self) -> FintrackResult<()> {
        Self::check(&self.fail_reads)?;
        self.inner.load()
    }

    fn save(&self) -> FintrackResult<()> {
        Self::check(&self.fail_writes)?;
        self.inner.save()
    }

    fn get_all(&self) -> FintrackResult<Vec<Budget>> {
        Self::check(&self.fail_reads)?;
        self.inner.get_all()
    }

    fn get(&self, id: BudgetId) -> FintrackResult<Option<Budget>> {
        Self::check(&self.fail_reads)?;
        self.inner.get(id)
    }

    fn insert(&self, record: Budget) -> FintrackResult<()> {
        self.inner.insert(record)
    }

    fn upsert(&self, record: Budget) -> FintrackResult<()> {
        self.inner.upsert(record)
    }

    fn delete(&self, id: BudgetId) -> FintrackResult<bool> {
        self.inner.delete(id)
    }

    fn count(&self) -> FintrackResult<usize> {
        self.inner.count()
    }
}

fn flaky_storage() -> (Storage, Arc<AtomicBool>, Arc<AtomicBool>) {
    let fail_reads = Arc::new(AtomicBool::new(false));
    let fail_writes = Arc::new(AtomicBool::new(false));
    let storage = Storage::with_backends(Backends {
        budgets: Box::new(FlakyBudgets {
            inner: JsonRepository::in_memory(),
            fail_reads: Arc::clone(&fail_reads),
            fail_writes: Arc::clone(&fail_writes),
        }),
        ..Default::default()
    });
    (storage, fail_reads, fail_writes)
}

#[test]
fn failed_load_reports_and_can_be_retried() {
    let (storage, fail_reads, _) = flaky_storage();
    let notifier = RecordingNotifier::new();
    let mut planner = BudgetPlanner::new(&storage, &notifier, &Settings::default());

    fail_reads.store(true, Ordering::SeqCst);
    let err = planner.load(date(2024, 3, 1)).unwrap_err();
    assert!(err.is_retryable());
    let notice = notifier.last().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert_eq!(notice.message, "Failed to load budget data");

    fail_reads.store(false, Ordering::SeqCst);
    let board = planner.load(date(2024, 3, 1)).unwrap();
    assert!(board.budgets.is_empty());
    assert_eq!(planner.state(), BudgetState::NoBudgets);
}

#[test]
fn failed_save_rolls_back_the_create() {
    let (storage, _, fail_writes) = flaky_storage();
    let service = BudgetService::new(&storage);
    let line = BudgetCategory::new(CategoryId::new(), "Food", Money::from_major(300));

    fail_writes.store(true, Ordering::SeqCst);
    let err = service
        .create(month("2024-03"), vec![line.clone()], None)
        .unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(storage.budgets.count().unwrap(), 0);

    fail_writes.store(false, Ordering::SeqCst);
    let budget = service.create(month("2024-03"), vec![line], None).unwrap();
    assert_eq!(service.list().unwrap(), vec![budget]);
}
