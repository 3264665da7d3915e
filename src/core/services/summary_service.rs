//! Period filtering and aggregation over ledger snapshots.
//!
//! Every function is pure: callers pass a snapshot already scoped to one owner.
//! Expense and investment amounts are stored negative, so kind sums are signed.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::{
    errors::{LedgerError, Result},
    ledger::{Transaction, TransactionKind},
};

/// Year/month filter. `None` matches every value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Period {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl Period {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn year(year: i32) -> Self {
        Self {
            year: Some(year),
            month: None,
        }
    }

    pub fn month(year: i32, month: u32) -> Self {
        Self {
            year: Some(year),
            month: Some(month),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.year.map_or(true, |year| date.year() == year)
            && self.month.map_or(true, |month| date.month() == month)
    }

    pub fn label(&self) -> String {
        match (self.year, self.month) {
            (Some(year), Some(month)) => format!("{year}-{month:02}"),
            (Some(year), None) => year.to_string(),
            (None, Some(month)) => format!("month {month:02}"),
            (None, None) => "all time".to_string(),
        }
    }
}

/// Signed totals per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindTotals {
    pub income: Decimal,
    pub expense: Decimal,
    pub investment: Decimal,
}

impl KindTotals {
    pub fn net(&self) -> Result<Decimal> {
        [self.expense, self.investment]
            .into_iter()
            .try_fold(self.income, checked_total)
    }

    fn add(&mut self, record: &Transaction) -> Result<()> {
        let slot = match record.kind {
            TransactionKind::Income => &mut self.income,
            TransactionKind::Expense => &mut self.expense,
            TransactionKind::Investment => &mut self.investment,
        };
        *slot = checked_total(*slot, record.amount)?;
        Ok(())
    }
}

/// Category label with its absolute total.
pub type CategoryTotal = (String, Decimal);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodSummary {
    pub totals: KindTotals,
    pub net_balance: Decimal,
    pub income_by_category: Vec<CategoryTotal>,
    pub expense_by_category: Vec<CategoryTotal>,
    pub investment_by_category: Vec<CategoryTotal>,
}

/// Adds `value` to `total`, failing instead of overflowing the decimal range.
pub fn checked_total(total: Decimal, value: Decimal) -> Result<Decimal> {
    total
        .checked_add(value)
        .ok_or_else(|| LedgerError::validation("total overflows the supported amount range"))
}

pub struct SummaryService;

impl SummaryService {
    pub fn filter_period(snapshot: &[Transaction], period: Period) -> Vec<Transaction> {
        snapshot
            .iter()
            .filter(|record| period.contains(record.date))
            .cloned()
            .collect()
    }

    /// Raw signed sum; callers take `abs()` for display of expense and investment.
    pub fn sum_by_kind(snapshot: &[Transaction], kind: TransactionKind) -> Result<Decimal> {
        snapshot
            .iter()
            .filter(|record| record.kind == kind)
            .try_fold(Decimal::ZERO, |total, record| checked_total(total, record.amount))
    }

    pub fn totals(snapshot: &[Transaction]) -> Result<KindTotals> {
        let mut totals = KindTotals::default();
        for record in snapshot {
            totals.add(record)?;
        }
        Ok(totals)
    }

    pub fn net_balance(snapshot: &[Transaction]) -> Result<Decimal> {
        Self::totals(snapshot)?.net()
    }

    /// Absolute total per category in first-encountered order. Zero totals are omitted.
    pub fn group_by_category(
        snapshot: &[Transaction],
        kind: TransactionKind,
    ) -> Result<Vec<CategoryTotal>> {
        let mut groups: Vec<CategoryTotal> = Vec::new();
        for record in snapshot.iter().filter(|record| record.kind == kind) {
            match groups.iter_mut().find(|(category, _)| *category == record.category) {
                Some((_, total)) => *total = checked_total(*total, record.amount.abs())?,
                None => groups.push((record.category.clone(), record.amount.abs())),
            }
        }
        groups.retain(|(_, total)| !total.is_zero());
        Ok(groups)
    }

    /// Largest categories first; equal totals keep first-encountered order.
    pub fn top_n_categories(
        snapshot: &[Transaction],
        kind: TransactionKind,
        n: usize,
    ) -> Result<Vec<CategoryTotal>> {
        let mut groups = Self::group_by_category(snapshot, kind)?;
        groups.sort_by(|a, b| b.1.cmp(&a.1));
        groups.truncate(n);
        Ok(groups)
    }

    /// `min(total_saved / goal_amount, 1)`, floored at zero.
    pub fn goal_progress(total_saved: Decimal, goal_amount: Decimal) -> Result<Decimal> {
        if goal_amount.is_zero() {
            return Err(LedgerError::DivisionByZero);
        }
        let ratio = total_saved.checked_div(goal_amount).ok_or_else(|| {
            LedgerError::validation(format!("{total_saved} / {goal_amount} overflows"))
        })?;
        Ok(ratio.clamp(Decimal::ZERO, Decimal::ONE))
    }

    /// Amount put aside in the snapshot: the magnitude of the investment total.
    pub fn savings_total(snapshot: &[Transaction]) -> Result<Decimal> {
        Ok(Self::sum_by_kind(snapshot, TransactionKind::Investment)?.abs())
    }

    /// Per-kind totals for each month 1..=12 of `year`.
    pub fn monthly_totals(snapshot: &[Transaction], year: i32) -> Result<Vec<(u32, KindTotals)>> {
        let mut months: Vec<(u32, KindTotals)> =
            (1..=12).map(|month| (month, KindTotals::default())).collect();
        for record in snapshot.iter().filter(|record| record.date.year() == year) {
            let slot = record.date.month0() as usize;
            months[slot].1.add(record)?;
        }
        Ok(months)
    }

    pub fn summarize(snapshot: &[Transaction]) -> Result<PeriodSummary> {
        let totals = Self::totals(snapshot)?;
        Ok(PeriodSummary {
            totals,
            net_balance: totals.net()?,
            income_by_category: Self::group_by_category(snapshot, TransactionKind::Income)?,
            expense_by_category: Self::group_by_category(snapshot, TransactionKind::Expense)?,
            investment_by_category: Self::group_by_category(snapshot, TransactionKind::Investment)?,
        })
    }
}
