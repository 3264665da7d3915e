mod common;

use chrono::NaiveDate;
use finance_ledger::{
    cli::output::render_summary,
    config::Config,
    core::services::{Period, SummaryService},
    errors::LedgerError,
    ledger::{LedgerStore, Owner, Transaction, TransactionKind},
};
use rust_decimal::Decimal;

use common::{dated, ledger_dir};

fn ledger_fixture() -> Vec<Transaction> {
    let (_dir, path) = ledger_dir();
    let mut store = LedgerStore::new(&path, Owner::new("ana"));
    let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
    for (date, kind, category, cents) in [
        (day(5), TransactionKind::Income, "Salary", 500000),
        (day(7), TransactionKind::Expense, "Rent", -150000),
        (day(9), TransactionKind::Expense, "Food", -32050),
        (day(20), TransactionKind::Investment, "Stocks", -100000),
        (day(28), TransactionKind::Expense, "Food", -17950),
    ] {
        store.append(dated(date, kind, category, cents)).unwrap();
    }
    store
        .append(dated(
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            TransactionKind::Expense,
            "Leisure",
            -9900,
        ))
        .unwrap();
    store.load().unwrap()
}

fn january_fixture() -> Vec<Transaction> {
    SummaryService::filter_period(&ledger_fixture(), Period::month(2024, 1))
}

#[test]
fn totals_match_hand_computed_values() {
    let records = january_fixture();
    assert_eq!(records.len(), 5);
    assert_eq!(
        SummaryService::sum_by_kind(&records, TransactionKind::Income).unwrap(),
        Decimal::new(500000, 2)
    );
    assert_eq!(
        SummaryService::sum_by_kind(&records, TransactionKind::Expense).unwrap(),
        Decimal::new(-200000, 2)
    );
    assert_eq!(
        SummaryService::sum_by_kind(&records, TransactionKind::Investment).unwrap(),
        Decimal::new(-100000, 2)
    );
    assert_eq!(SummaryService::net_balance(&records).unwrap(), Decimal::new(200000, 2));
    assert_eq!(
        SummaryService::top_n_categories(&records, TransactionKind::Expense, 1).unwrap(),
        vec![("Rent".to_string(), Decimal::new(150000, 2))]
    );
}

#[test]
fn goal_progress_examples() {
    let goal = Decimal::new(30000, 0);
    assert_eq!(
        SummaryService::goal_progress(Decimal::new(15000, 0), goal).unwrap(),
        Decimal::new(5, 1)
    );
    assert_eq!(
        SummaryService::goal_progress(Decimal::new(40000, 0), goal).unwrap(),
        Decimal::ONE
    );
    assert!(matches!(
        SummaryService::goal_progress(Decimal::ZERO, Decimal::ZERO),
        Err(LedgerError::DivisionByZero)
    ));
}

#[test]
fn rendered_summary_for_a_month() {
    let records = january_fixture();
    let rendered = render_summary(
        Period::month(2024, 1),
        &records,
        Some(Decimal::new(30000, 0)),
        &Config::default(),
    )
    .unwrap();
    insta::assert_snapshot!(rendered.trim_end(), @r###"
Summary for 2024-01
  Income               R$ 5.000,00
  Expense              R$ 2.000,00
  Investment           R$ 1.000,00
  Net balance          R$ 2.000,00
Income by category
  Salary               R$ 5.000,00  100%
Expense by category
  Rent                 R$ 1.500,00   75%
  Food                   R$ 500,00   25%
Investment by category
  Stocks               R$ 1.000,00  100%
Top expenses: Rent, Food
Savings goal: R$ 1.000,00 of R$ 30.000,00 (3%)
"###);
}

#[test]
fn zero_goal_renders_as_undefined() {
    let rendered =
        render_summary(Period::all(), &[], Some(Decimal::ZERO), &Config::default()).unwrap();
    assert!(rendered.ends_with("Savings goal: undefined (goal is zero)\n"));
    assert!(rendered.starts_with("Summary for all time\n"));
}

#[test]
fn year_summary_adds_monthly_table() {
    let records = SummaryService::filter_period(&ledger_fixture(), Period::year(2024));
    let rendered =
        render_summary(Period::year(2024), &records, None, &Config::default()).unwrap();
    let monthly: Vec<&str> = rendered
        .lines()
        .skip_while(|line| !line.starts_with("Monthly totals for 2024"))
        .collect();
    assert_eq!(monthly.len(), 1 + 1 + 12 + 1);
    assert!(monthly[2].starts_with("  01"));
    assert!(monthly[2].ends_with("R$ 2.000,00"));
    assert!(monthly[3].starts_with("  02"));
    assert!(monthly[3].contains("R$ 99,00"));
    assert!(monthly[3].ends_with("R$ -99,00"));
    assert_eq!(monthly[14], "Savings goal: not set");
}

#[test]
fn overflowing_totals_fail_the_summary() {
    let (_dir, path) = ledger_dir();
    let mut store = LedgerStore::new(&path, Owner::new("ana"));
    for _ in 0..2 {
        let mut bonus = dated(
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            TransactionKind::Income,
            "Bonus",
            0,
        );
        bonus.amount = Decimal::MAX;
        store.append(bonus).unwrap();
    }
    let records = store.load().unwrap();

    assert!(matches!(
        SummaryService::summarize(&records),
        Err(LedgerError::Validation(_))
    ));
    assert!(render_summary(Period::all(), &records, None, &Config::default()).is_err());
}
