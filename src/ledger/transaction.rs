//! Ledger records and the parsing rules for user-entered fields.

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::{LedgerError, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Permanent identity of a ledger record. Assigned once, never derived from row position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(pub u64);

impl RecordId {
    /// The id after this one; `None` once the id space is used up.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(RecordId)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u64>()
            .map(RecordId)
            .map_err(|_| LedgerError::validation(format!("`{}` is not a record id", s.trim())))
    }
}

/// Identity of the user a record belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Owner(String);

impl Owner {
    /// Owner used when the ledger is not partitioned between users.
    pub const SINGLE_USER: &'static str = "local";

    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    pub fn single_user() -> Self {
        Self::new(Self::SINGLE_USER)
    }

    pub fn is_single_user(&self) -> bool {
        self.0 == Self::SINGLE_USER
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Direction of a cash flow. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransactionKind {
    Income,
    Expense,
    Investment,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 3] = [
        TransactionKind::Income,
        TransactionKind::Expense,
        TransactionKind::Investment,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
            TransactionKind::Investment => "Investment",
        }
    }

    /// Applies the stored sign convention to a magnitude: income positive, the rest negative.
    pub fn signed(self, magnitude: Decimal) -> Decimal {
        match self {
            TransactionKind::Income => magnitude.abs(),
            TransactionKind::Expense | TransactionKind::Investment => -magnitude.abs(),
        }
    }

    /// Zero is accepted for every kind.
    pub fn accepts(self, amount: Decimal) -> bool {
        match self {
            TransactionKind::Income => !amount.is_sign_negative() || amount.is_zero(),
            TransactionKind::Expense | TransactionKind::Investment => {
                amount.is_sign_negative() || amount.is_zero()
            }
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TransactionKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            "investment" => Ok(TransactionKind::Investment),
            other => Err(LedgerError::validation(format!(
                "unknown kind `{other}` (expected income, expense or investment)"
            ))),
        }
    }
}

/// One persisted ledger row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: RecordId,
    pub owner: Owner,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub description: String,
    pub category: String,
    pub amount: Decimal,
}

impl Transaction {
    pub fn validate(&self) -> Result<()> {
        validate_fields(self.kind, &self.description, &self.category, self.amount)
    }
}

/// A record that has not been assigned an identity yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub description: String,
    pub category: String,
    pub amount: Decimal,
}

impl NewTransaction {
    pub fn new(
        date: NaiveDate,
        kind: TransactionKind,
        description: impl Into<String>,
        category: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            date,
            kind,
            description: description.into(),
            category: category.into(),
            amount,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_fields(self.kind, &self.description, &self.category, self.amount)
    }

    pub(crate) fn into_record(self, id: RecordId, owner: Owner) -> Transaction {
        Transaction {
            id,
            owner,
            date: self.date,
            kind: self.kind,
            description: self.description.trim().to_string(),
            category: self.category.trim().to_string(),
            amount: self.amount,
        }
    }
}

/// Partial update; `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionPatch {
    pub date: Option<NaiveDate>,
    pub kind: Option<TransactionKind>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub amount: Option<Decimal>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.kind.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.amount.is_none()
    }

    /// Returns a copy of `record` with the named fields replaced. Id and owner never change.
    pub fn applied_to(&self, record: &Transaction) -> Transaction {
        let mut updated = record.clone();
        if let Some(date) = self.date {
            updated.date = date;
        }
        if let Some(kind) = self.kind {
            updated.kind = kind;
        }
        if let Some(description) = &self.description {
            updated.description = description.trim().to_string();
        }
        if let Some(category) = &self.category {
            updated.category = category.trim().to_string();
        }
        if let Some(amount) = self.amount {
            updated.amount = amount;
        }
        updated
    }
}

fn validate_fields(
    kind: TransactionKind,
    description: &str,
    category: &str,
    amount: Decimal,
) -> Result<()> {
    if description.trim().is_empty() {
        return Err(LedgerError::validation("description must not be empty"));
    }
    if category.trim().is_empty() {
        return Err(LedgerError::validation("category must not be empty"));
    }
    if !kind.accepts(amount) {
        return Err(LedgerError::validation(format!(
            "{kind} amounts must be {}, got {amount}",
            if kind == TransactionKind::Income {
                "positive"
            } else {
                "negative"
            }
        )));
    }
    Ok(())
}

/// Parses a user-entered magnitude. Unparseable text and values `<= 0` are rejected
/// rather than coerced.
pub fn parse_magnitude(raw: &str) -> Result<Decimal> {
    let trimmed = raw.trim();
    let normalized = if trimmed.contains(',') && !trimmed.contains('.') {
        trimmed.replace(',', ".")
    } else {
        trimmed.to_string()
    };
    let value = Decimal::from_str(&normalized)
        .map_err(|_| LedgerError::validation(format!("`{trimmed}` is not a valid amount")))?;
    if value <= Decimal::ZERO {
        return Err(LedgerError::validation(format!(
            "amount must be positive, got {value}"
        )));
    }
    Ok(value)
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        LedgerError::validation(format!("`{}` is not a date (use YYYY-MM-DD)", raw.trim()))
    })
}
