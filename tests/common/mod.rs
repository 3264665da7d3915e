#![allow(dead_code)]

use std::path::PathBuf;

use assert_fs::{prelude::*, TempDir};
use chrono::NaiveDate;
use finance_ledger::ledger::{NewTransaction, TransactionKind};
use rust_decimal::Decimal;

/// Isolated directory plus the ledger path inside it. Keep the guard alive for the test.
pub fn ledger_dir() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.child("ledger.csv").path().to_path_buf();
    (dir, path)
}

/// Entry dated 2024-01-15 with `cents` already signed for `kind`.
pub fn entry(kind: TransactionKind, category: &str, cents: i64) -> NewTransaction {
    dated(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(), kind, category, cents)
}

pub fn dated(date: NaiveDate, kind: TransactionKind, category: &str, cents: i64) -> NewTransaction {
    NewTransaction::new(
        date,
        kind,
        format!("{category} entry"),
        category,
        Decimal::new(cents, 2),
    )
}
