//! Bill service
//!
//! Due-date queries, payment tracking and reminder settings for recurring
//! bills. Every date comparison is against a caller-supplied `today`.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::audit::EntityType;
use crate::error::{FintrackError, FintrackResult};
use crate::models::{Bill, BillId, Money, PaymentStatus, ReminderMethod, ReminderSettings};
use crate::storage::Storage;

/// Service for bill management
pub struct BillService<'a> {
    storage: &'a Storage,
}

/// Input for creating a new bill
#[derive(Debug, Clone)]
pub struct CreateBillInput {
    pub name: String,
    pub amount: Money,
    pub due_date: NaiveDate,
    pub category: Option<String>,
    pub notes: Option<String>,
    pub reminder: Option<ReminderUpdate>,
}

impl CreateBillInput {
    pub fn new(name: impl Into<String>, amount: Money, due_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            amount,
            due_date,
            category: None,
            notes: None,
            reminder: None,
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct BillPatch {
    pub name: Option<String>,
    pub amount: Option<Money>,
    pub due_date: Option<NaiveDate>,
    pub category: Option<String>,
    pub notes: Option<String>,
}

/// Partial reminder settings, merged over the bill's current ones
#[derive(Debug, Clone, Default)]
pub struct ReminderUpdate {
    pub enabled: Option<bool>,
    pub days_before: Option<u32>,
    pub methods: Option<Vec<ReminderMethod>>,
}

impl ReminderUpdate {
    fn apply(self, settings: &mut ReminderSettings) {
        if let Some(enabled) = self.enabled {
            settings.enabled = enabled;
        }
        if let Some(days) = self.days_before {
            settings.days_before = days;
        }
        if let Some(methods) = self.methods {
            settings.methods = methods;
        }
    }
}

/// Which bills a list view shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BillFilter {
    #[default]
    All,
    Paid,
    Unpaid,
    Overdue,
}

/// Payment statistics across all bills
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentStats {
    pub total_bills: usize,
    pub paid_bills: usize,
    pub unpaid_bills: usize,
    pub total_amount: Money,
    pub paid_amount: Money,
    pub unpaid_amount: Money,
    /// Share of bills paid, zero when there are none
    pub payment_rate: f64,
}

impl<'a> BillService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, input: CreateBillInput) -> FintrackResult<Bill> {
        let mut bill = Bill::new(input.name.trim(), input.amount, input.due_date);
        if let Some(category) = input.category {
            bill.category = category;
        }
        if let Some(notes) = input.notes {
            bill.notes = notes;
        }
        if let Some(reminder) = input.reminder {
            reminder.apply(&mut bill.reminder);
        }

        bill.validate()
            .map_err(|e| FintrackError::Validation(e.to_string()))?;

        self.storage.bills.insert(bill.clone())?;
        self.storage.bills.save()?;

        self.storage.log_create(
            EntityType::Bill,
            bill.id.to_string(),
            Some(bill.name.clone()),
            &bill,
        );

        info!(id = %bill.id, name = %bill.name, due = %bill.due_date, "bill created");
        Ok(bill)
    }

    pub fn get(&self, id: BillId) -> FintrackResult<Option<Bill>> {
        self.storage.bills.get(id)
    }

    /// All bills by due date
    pub fn list(&self) -> FintrackResult<Vec<Bill>> {
        self.storage.bills.get_all()
    }

    /// Bills due strictly after `today` and strictly before `today + days`
    pub fn upcoming(&self, today: NaiveDate, days: i64) -> FintrackResult<Vec<Bill>> {
        let mut bills = self.list()?;
        bills.retain(|b| b.is_upcoming(today, days));
        debug!(%today, days, count = bills.len(), "upcoming bills");
        Ok(bills)
    }

    /// Unpaid bills due before `today`
    pub fn overdue(&self, today: NaiveDate) -> FintrackResult<Vec<Bill>> {
        let mut bills = self.list()?;
        bills.retain(|b| b.is_overdue(today));
        Ok(bills)
    }

    /// Case-insensitive category match
    pub fn by_category(&self, category: &str) -> FintrackResult<Vec<Bill>> {
        let wanted = category.to_lowercase();
        let mut bills = self.list()?;
        bills.retain(|b| b.category.to_lowercase() == wanted);
        Ok(bills)
    }

    /// Bills matching `filter` whose name or category contains `search`,
    /// ignoring case
    pub fn filter(&self, filter: BillFilter, search: &str, today: NaiveDate) -> FintrackResult<Vec<Bill>> {
        let needle = search.to_lowercase();
        let mut bills = self.list()?;
        bills.retain(|b| {
            let matches_search = b.name.to_lowercase().contains(&needle)
                || b.category.to_lowercase().contains(&needle);
            matches_search
                && match filter {
                    BillFilter::All => true,
                    BillFilter::Paid => b.is_paid(),
                    BillFilter::Unpaid => !b.is_paid(),
                    BillFilter::Overdue => b.is_overdue(today),
                }
        });
        Ok(bills)
    }

    pub fn update(&self, id: BillId, patch: BillPatch) -> FintrackResult<Bill> {
        let before = self.require(id)?;
        let mut bill = before.clone();

        if let Some(name) = patch.name {
            bill.name = name.trim().to_string();
        }
        if let Some(amount) = patch.amount {
            bill.amount = amount;
        }
        if let Some(due_date) = patch.due_date {
            bill.due_date = due_date;
        }
        if let Some(category) = patch.category {
            bill.category = category;
        }
        if let Some(notes) = patch.notes {
            bill.notes = notes;
        }
        bill.updated_at = Utc::now();

        self.write_update(&before, bill)
    }

    /// Record a payment. The amount defaults to the bill amount.
    pub fn mark_paid(&self, id: BillId, amount: Option<Money>, today: NaiveDate) -> FintrackResult<Bill> {
        let before = self.require(id)?;
        let mut bill = before.clone();

        let amount = match amount {
            Some(a) if a.is_positive() => a,
            Some(_) => {
                return Err(FintrackError::Validation(
                    "Payment amount must be greater than 0".into(),
                ))
            }
            None => bill.amount,
        };
        bill.record_payment(amount, today);

        self.write_update(&before, bill)
    }

    /// Flip back to unpaid; the payment history is kept
    pub fn mark_unpaid(&self, id: BillId) -> FintrackResult<Bill> {
        let before = self.require(id)?;
        let mut bill = before.clone();
        bill.payment_status = PaymentStatus::Unpaid;
        bill.updated_at = Utc::now();

        self.write_update(&before, bill)
    }

    pub fn update_reminders(&self, id: BillId, update: ReminderUpdate) -> FintrackResult<Bill> {
        let before = self.require(id)?;
        let mut bill = before.clone();
        update.apply(&mut bill.reminder);
        bill.updated_at = Utc::now();

        self.write_update(&before, bill)
    }

    pub fn delete(&self, id: BillId) -> FintrackResult<Bill> {
        let bill = self.require(id)?;

        self.storage.bills.delete(id)?;
        self.storage.bills.save()?;

        self.storage.log_delete(
            EntityType::Bill,
            id.to_string(),
            Some(bill.name.clone()),
            &bill,
        );

        info!(%id, "bill deleted");
        Ok(bill)
    }

    pub fn payment_stats(&self) -> FintrackResult<PaymentStats> {
        let bills = self.list()?;

        let total_bills = bills.len();
        let paid: Vec<&Bill> = bills.iter().filter(|b| b.is_paid()).collect();
        let total_amount: Money = bills.iter().map(|b| b.amount).sum();
        let paid_amount: Money = paid.iter().map(|b| b.amount).sum();

        Ok(PaymentStats {
            total_bills,
            paid_bills: paid.len(),
            unpaid_bills: total_bills - paid.len(),
            total_amount,
            paid_amount,
            unpaid_amount: total_amount - paid_amount,
            payment_rate: if total_bills > 0 {
                paid.len() as f64 / total_bills as f64 * 100.0
            } else {
                0.0
            },
        })
    }

    fn require(&self, id: BillId) -> FintrackResult<Bill> {
        self.storage
            .bills
            .get(id)?
            .ok_or_else(|| FintrackError::bill_not_found(id.to_string()))
    }

    fn write_update(&self, before: &Bill, bill: Bill) -> FintrackResult<Bill> {
        bill.validate()
            .map_err(|e| FintrackError::Validation(e.to_string()))?;

        self.storage.bills.upsert(bill.clone())?;
        self.storage.bills.save()?;

        self.storage.log_update(
            EntityType::Bill,
            bill.id.to_string(),
            Some(bill.name.clone()),
            before,
            &bill,
        );

        info!(id = %bill.id, status = ?bill.payment_status, "bill updated");
        Ok(bill)
    }
}
