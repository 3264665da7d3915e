//! Durable, owner-scoped list of ledger records backed by one CSV file.
//!
//! The store keeps the snapshot read by the last [`LedgerStore::load`] and applies
//! mutations to it, rewriting the whole file each time. Ids live in their own column
//! and are never recomputed from row position.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    errors::{LedgerError, Result},
    ledger::transaction::{NewTransaction, Owner, RecordId, Transaction, TransactionPatch},
    storage::{
        csv_backend::{self, LedgerTable},
        read_if_exists, write_atomic, Revision,
    },
};

/// How a rewrite treats changes made to the file by someone else since it was loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Refuse to rewrite a file that changed since the snapshot was read.
    #[default]
    Optimistic,
    /// Overwrite unconditionally; a concurrent writer's change is lost.
    LastWriteWins,
}

#[derive(Debug, Clone)]
struct Snapshot {
    table: LedgerTable,
    revision: Revision,
}

#[derive(Debug)]
pub struct LedgerStore {
    path: PathBuf,
    owner: Owner,
    mode: WriteMode,
    snapshot: Option<Snapshot>,
    high_water: RecordId,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>, owner: Owner) -> Self {
        Self {
            path: path.into(),
            owner,
            mode: WriteMode::default(),
            snapshot: None,
            high_water: RecordId(0),
        }
    }

    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    pub fn write_mode(&self) -> WriteMode {
        self.mode
    }

    /// Re-reads the file and returns the owner's records in file order. A missing file
    /// is created with the canonical header.
    pub fn load(&mut self) -> Result<Vec<Transaction>> {
        let snapshot = match read_if_exists(&self.path)? {
            Some(bytes) => Snapshot {
                table: csv_backend::decode_ledger(&bytes, &self.path)?,
                revision: Revision::of(Some(bytes.as_slice())),
            },
            None => {
                let table = LedgerTable::empty();
                let bytes = csv_backend::encode_ledger(&table)?;
                write_atomic(&self.path, &bytes)?;
                info!(path = %self.path.display(), "created ledger file");
                Snapshot {
                    table,
                    revision: Revision::of(Some(bytes.as_slice())),
                }
            }
        };
        if let Some(max) = snapshot.table.records.iter().map(|record| record.id).max() {
            self.high_water = self.high_water.max(max);
        }
        debug!(
            path = %self.path.display(),
            total = snapshot.table.records.len(),
            "loaded ledger snapshot"
        );
        self.snapshot = Some(snapshot);
        Ok(self.records().into_iter().cloned().collect())
    }

    /// Owner's records from the cached snapshot. Empty until the first load.
    pub fn records(&self) -> Vec<&Transaction> {
        self.snapshot
            .iter()
            .flat_map(|snapshot| snapshot.table.records.iter())
            .filter(|record| record.owner == self.owner)
            .collect()
    }

    pub fn get(&self, id: RecordId) -> Option<&Transaction> {
        self.records().into_iter().find(|record| record.id == id)
    }

    /// Pure read over the cached snapshot; keeps relative order.
    pub fn filter<P>(&self, predicate: P) -> Vec<Transaction>
    where
        P: Fn(&Transaction) -> bool,
    {
        self.records()
            .into_iter()
            .filter(|record| predicate(*record))
            .cloned()
            .collect()
    }

    pub fn append(&mut self, new: NewTransaction) -> Result<Transaction> {
        new.validate()?;
        let mut table = self.loaded_table()?;
        if !table.layout.has_owner() && !self.owner.is_single_user() {
            return Err(LedgerError::validation(format!(
                "`{}` has no Owner column; only the single-user ledger can write to it",
                self.path.display()
            )));
        }
        let highest = table
            .records
            .iter()
            .map(|record| record.id)
            .max()
            .unwrap_or(RecordId(0));
        let id = highest
            .max(self.high_water)
            .next()
            .ok_or_else(|| LedgerError::validation("no record ids left to assign"))?;
        let record = new.into_record(id, self.owner.clone());
        table.records.push(record.clone());
        self.commit(table)?;
        self.high_water = id;
        info!(%id, owner = %self.owner, kind = %record.kind, "appended record");
        Ok(record)
    }

    /// Replaces the named fields of `id`; order and the other fields stay as they are.
    pub fn update(&mut self, id: RecordId, patch: &TransactionPatch) -> Result<Transaction> {
        let mut table = self.loaded_table()?;
        let position = self.position_of(&table, id)?;
        if patch.is_empty() {
            return Ok(table.records[position].clone());
        }
        let updated = patch.applied_to(&table.records[position]);
        updated.validate()?;
        table.records[position] = updated.clone();
        self.commit(table)?;
        info!(%id, owner = %self.owner, "updated record");
        Ok(updated)
    }

    /// Removes `id` and returns the removed record.
    pub fn delete(&mut self, id: RecordId) -> Result<Transaction> {
        let mut table = self.loaded_table()?;
        let position = self.position_of(&table, id)?;
        let removed = table.records.remove(position);
        self.commit(table)?;
        info!(%id, owner = %self.owner, "deleted record");
        Ok(removed)
    }

    /// Writes the cached snapshot back unchanged.
    pub fn save(&mut self) -> Result<()> {
        let table = self.loaded_table()?;
        self.commit(table)
    }

    fn loaded_table(&mut self) -> Result<LedgerTable> {
        if self.snapshot.is_none() {
            self.load()?;
        }
        self.snapshot
            .as_ref()
            .map(|snapshot| snapshot.table.clone())
            .ok_or_else(|| LedgerError::corrupt(&self.path, "snapshot unavailable after load"))
    }

    fn position_of(&self, table: &LedgerTable, id: RecordId) -> Result<usize> {
        table
            .records
            .iter()
            .position(|record| record.id == id && record.owner == self.owner)
            .ok_or_else(|| {
                warn!(%id, owner = %self.owner, "record not found");
                LedgerError::NotFound(id)
            })
    }

    fn commit(&mut self, table: LedgerTable) -> Result<()> {
        if self.mode == WriteMode::Optimistic {
            let expected = self.snapshot.as_ref().map(|snapshot| snapshot.revision);
            let current = Revision::current(&self.path)?;
            if expected != Some(current) {
                warn!(path = %self.path.display(), "ledger changed on disk, refusing to overwrite");
                return Err(LedgerError::Conflict(self.path.clone()));
            }
        }
        let bytes = csv_backend::encode_ledger(&table)?;
        write_atomic(&self.path, &bytes)?;
        self.snapshot = Some(Snapshot {
            table,
            revision: Revision::of(Some(bytes.as_slice())),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::transaction::TransactionKind;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::fs;
    use tempfile::tempdir;

    fn groceries() -> NewTransaction {
        NewTransaction::new(
            NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            TransactionKind::Expense,
            "Groceries",
            "Food",
            Decimal::new(-8990, 2),
        )
    }

    #[test]
    fn load_of_missing_file_establishes_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        let mut store = LedgerStore::new(&path, Owner::single_user());
        assert!(store.load().unwrap().is_empty());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Id,Owner,Date,Kind,Description,Category,Amount\n"
        );
    }

    #[test]
    fn ids_are_not_reused_after_deleting_the_newest_record() {
        let dir = tempdir().unwrap();
        let mut store = LedgerStore::new(dir.path().join("ledger.csv"), Owner::single_user());
        let first = store.append(groceries()).unwrap();
        let second = store.append(groceries()).unwrap();
        store.delete(second.id).unwrap();
        let third = store.append(groceries()).unwrap();
        assert_eq!(first.id, RecordId(1));
        assert_eq!(third.id, RecordId(3));
    }

    #[test]
    fn invalid_input_leaves_file_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        let mut store = LedgerStore::new(&path, Owner::single_user());
        store.append(groceries()).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let mut bad = groceries();
        bad.amount = Decimal::new(10, 0);
        assert!(matches!(store.append(bad), Err(LedgerError::Validation(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
        assert_eq!(store.records().len(), 1);
    }

    #[test]
    fn records_of_other_owners_are_invisible_but_preserved() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        let mut ana = LedgerStore::new(&path, Owner::new("ana"));
        let mut bia = LedgerStore::new(&path, Owner::new("bia"));

        let anas = ana.append(groceries()).unwrap();
        bia.load().unwrap();
        bia.append(groceries()).unwrap();

        assert!(matches!(bia.delete(anas.id), Err(LedgerError::NotFound(_))));
        assert_eq!(bia.records().len(), 1);
        assert_eq!(ana.load().unwrap(), vec![anas]);
    }

    #[test]
    fn ownerless_file_rejects_named_owner_writes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ledger.csv");
        fs::write(&path, "Id,Date,Kind,Description,Category,Amount\n").unwrap();
        let mut store = LedgerStore::new(&path, Owner::new("ana"));
        assert!(matches!(
            store.append(groceries()),
            Err(LedgerError::Validation(_))
        ));
    }
}
