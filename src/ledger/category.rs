//! Category labels per transaction kind, persisted as a CSV table beside the ledger.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{
    errors::{LedgerError, Result},
    ledger::transaction::TransactionKind,
    storage::{csv_backend, read_if_exists, write_atomic},
};

/// Ordered, duplicate-free labels for each kind. Labels are case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRegistry {
    income: Vec<String>,
    expense: Vec<String>,
    investment: Vec<String>,
}

impl CategoryRegistry {
    pub fn empty() -> Self {
        Self {
            income: Vec::new(),
            expense: Vec::new(),
            investment: Vec::new(),
        }
    }

    pub fn labels(&self, kind: TransactionKind) -> &[String] {
        match kind {
            TransactionKind::Income => &self.income,
            TransactionKind::Expense => &self.expense,
            TransactionKind::Investment => &self.investment,
        }
    }

    pub fn contains(&self, kind: TransactionKind, label: &str) -> bool {
        self.labels(kind).iter().any(|existing| existing == label)
    }

    /// Appends `label` unless already present. Returns `false` for duplicates.
    pub(crate) fn push_unique(&mut self, kind: TransactionKind, label: &str) -> bool {
        if self.contains(kind, label) {
            return false;
        }
        self.labels_mut(kind).push(label.to_string());
        true
    }

    fn labels_mut(&mut self, kind: TransactionKind) -> &mut Vec<String> {
        match kind {
            TransactionKind::Income => &mut self.income,
            TransactionKind::Expense => &mut self.expense,
            TransactionKind::Investment => &mut self.investment,
        }
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        let list = |labels: &[&str]| labels.iter().map(|label| label.to_string()).collect();
        Self {
            income: list(&["Salary", "Other"]),
            expense: list(&["Food", "Rent", "Leisure", "Health", "Transport", "Other"]),
            investment: list(&["Emergency Fund", "Stocks", "Other"]),
        }
    }
}

/// Result of adding a label. An existing label is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadyExists,
}

/// File-backed [`CategoryRegistry`]. Every call reloads from disk.
#[derive(Debug, Clone)]
pub struct CategoryStore {
    path: PathBuf,
}

impl CategoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the registry. A missing file is created with the default labels.
    pub fn load(&self) -> Result<CategoryRegistry> {
        match read_if_exists(&self.path)? {
            Some(bytes) => {
                let registry = csv_backend::decode_categories(&bytes, &self.path)?;
                debug!(path = %self.path.display(), "loaded category registry");
                Ok(registry)
            }
            None => {
                let registry = CategoryRegistry::default();
                self.save(&registry)?;
                info!(path = %self.path.display(), "created default category registry");
                Ok(registry)
            }
        }
    }

    pub fn save(&self, registry: &CategoryRegistry) -> Result<()> {
        let bytes = csv_backend::encode_categories(registry)?;
        write_atomic(&self.path, &bytes)?;
        Ok(())
    }

    pub fn add_label(&self, kind: TransactionKind, label: &str) -> Result<AddOutcome> {
        let label = label.trim();
        if label.is_empty() {
            return Err(LedgerError::validation("category label must not be empty"));
        }
        let mut registry = self.load()?;
        if !registry.push_unique(kind, label) {
            debug!(%kind, label, "category already registered");
            return Ok(AddOutcome::AlreadyExists);
        }
        self.save(&registry)?;
        info!(%kind, label, "category added");
        Ok(AddOutcome::Added)
    }
}
