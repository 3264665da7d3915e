use std::{fs, path::Path};

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use finance_ledger::{
    core::services::{Period, SummaryService},
    ledger::{LedgerStore, Owner, Transaction, TransactionKind},
};
use rust_decimal::Decimal;
use tempfile::tempdir;

const CATEGORIES: [&str; 5] = ["Food", "Rent", "Leisure", "Health", "Transport"];

/// Writes `count` mixed-kind rows straight to a ledger file.
fn seed_file(path: &Path, count: usize) {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut csv = String::from("Id,Owner,Date,Kind,Description,Category,Amount\n");
    for idx in 0..count {
        let kind = TransactionKind::ALL[idx % 3];
        let category = match kind {
            TransactionKind::Income => "Salary",
            TransactionKind::Investment => "Stocks",
            TransactionKind::Expense => CATEGORIES[idx % CATEGORIES.len()],
        };
        let date = start + Duration::days((idx % 730) as i64);
        let amount = kind.signed(Decimal::new(1000 + (idx % 500) as i64, 2));
        csv.push_str(&format!(
            "{},local,{},{},entry {},{},{}\n",
            idx + 1,
            date.format("%Y-%m-%d"),
            kind,
            idx,
            category,
            amount
        ));
    }
    fs::write(path, csv).expect("seed ledger");
}

fn seeded_records(count: usize) -> Vec<Transaction> {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("ledger.csv");
    seed_file(&path, count);
    LedgerStore::new(&path, Owner::single_user())
        .load()
        .expect("load")
}

fn bench_aggregation(c: &mut Criterion) {
    let records = seeded_records(2_000);

    c.bench_function("summarize_2k", |b| {
        b.iter(|| black_box(SummaryService::summarize(black_box(&records))))
    });

    c.bench_function("filter_month_then_top_n_2k", |b| {
        b.iter(|| {
            let month = SummaryService::filter_period(&records, Period::month(2024, 6));
            black_box(SummaryService::top_n_categories(
                &month,
                TransactionKind::Expense,
                3,
            ))
        })
    });

    c.bench_function("monthly_totals_2k", |b| {
        b.iter(|| black_box(SummaryService::monthly_totals(&records, 2024)))
    });
}

fn bench_store_io(c: &mut Criterion) {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("ledger.csv");
    seed_file(&path, 2_000);
    let mut store = LedgerStore::new(&path, Owner::single_user());

    c.bench_function("ledger_load_2k", |b| {
        b.iter(|| black_box(store.load().expect("load")))
    });
}

criterion_group!(benches, bench_aggregation, bench_store_io);
criterion_main!(benches);
