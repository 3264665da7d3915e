use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::{
    core::services::summary_service::{Period, SummaryService},
    errors::{LedgerError, Result},
    ledger::{
        AddOutcome, CategoryRegistry, CategoryStore, LedgerStore, NewTransaction, RecordId,
        Transaction, TransactionKind, TransactionPatch,
    },
};

/// Entry as typed by a user: the amount is a positive magnitude, signed by `kind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInput {
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub description: String,
    pub category: String,
    pub magnitude: Decimal,
}

/// Fields to change on an existing entry. `magnitude` is unsigned like [`EntryInput`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryEdit {
    pub date: Option<NaiveDate>,
    pub kind: Option<TransactionKind>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub magnitude: Option<Decimal>,
}

/// Provides validated CRUD helpers for ledger entries and keeps the category
/// registry in step with what gets written. Categories are registered only after
/// the ledger write succeeded.
#[derive(Debug)]
pub struct TransactionService {
    store: LedgerStore,
    categories: CategoryStore,
}

impl TransactionService {
    pub fn new(store: LedgerStore, categories: CategoryStore) -> Self {
        Self { store, categories }
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn categories(&self) -> Result<CategoryRegistry> {
        self.categories.load()
    }

    pub fn add_category(&self, kind: TransactionKind, label: &str) -> Result<AddOutcome> {
        self.categories.add_label(kind, label)
    }

    /// Reloads the ledger and returns the owner's records inside `period`.
    pub fn list(&mut self, period: Period) -> Result<Vec<Transaction>> {
        let snapshot = self.store.load()?;
        Ok(SummaryService::filter_period(&snapshot, period))
    }

    pub fn add(&mut self, input: EntryInput) -> Result<Transaction> {
        ensure_magnitude(input.magnitude)?;
        let new = NewTransaction::new(
            input.date,
            input.kind,
            input.description,
            input.category,
            input.kind.signed(input.magnitude),
        );
        new.validate()?;
        self.store.load()?;
        let record = self.store.append(new)?;
        self.register_category(record.kind, &record.category)?;
        Ok(record)
    }

    /// Applies `edit` to `id`. Switching kind without a new magnitude re-signs the
    /// stored amount so the record stays valid.
    pub fn edit(&mut self, id: RecordId, edit: EntryEdit) -> Result<Transaction> {
        if let Some(magnitude) = edit.magnitude {
            ensure_magnitude(magnitude)?;
        }
        self.store.load()?;
        let current = self
            .store
            .get(id)
            .cloned()
            .ok_or(LedgerError::NotFound(id))?;
        let kind = edit.kind.unwrap_or(current.kind);
        let amount = match edit.magnitude {
            Some(magnitude) => Some(kind.signed(magnitude)),
            None if kind != current.kind => Some(kind.signed(current.amount)),
            None => None,
        };
        let patch = TransactionPatch {
            date: edit.date,
            kind: edit.kind,
            description: edit.description,
            category: edit.category,
            amount,
        };
        let updated = self.store.update(id, &patch)?;
        if patch.category.is_some() || patch.kind.is_some() {
            self.register_category(updated.kind, &updated.category)?;
        }
        Ok(updated)
    }

    pub fn remove(&mut self, id: RecordId) -> Result<Transaction> {
        self.store.load()?;
        self.store.delete(id)
    }

    fn register_category(&self, kind: TransactionKind, label: &str) -> Result<()> {
        if self.categories.add_label(kind, label)? == AddOutcome::Added {
            debug!(%kind, label, "registered category on write");
        }
        Ok(())
    }
}

fn ensure_magnitude(magnitude: Decimal) -> Result<()> {
    if magnitude <= Decimal::ZERO {
        return Err(LedgerError::validation(format!(
            "amount must be positive, got {magnitude}"
        )));
    }
    Ok(())
}
