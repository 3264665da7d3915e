//! Ledger records, the category registry, and the file-backed ledger store.

pub mod category;
pub mod store;
pub mod transaction;

pub use category::{AddOutcome, CategoryRegistry, CategoryStore};
pub use store::{LedgerStore, WriteMode};
pub use transaction::{
    parse_date, parse_magnitude, NewTransaction, Owner, RecordId, Transaction, TransactionKind,
    TransactionPatch,
};
