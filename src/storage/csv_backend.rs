//! CSV layouts for the ledger table and the category table.
//!
//! The ledger file carries one header row naming its columns; the order is free on
//! read and preserved on write so an untouched snapshot is written back unchanged.
//! The category file has one column per kind, short columns padded with empty cells.

use std::{collections::HashSet, path::Path, str::FromStr};

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use rust_decimal::Decimal;

use crate::{
    errors::{LedgerError, Result},
    ledger::{
        category::CategoryRegistry,
        transaction::{Owner, RecordId, Transaction, TransactionKind, DATE_FORMAT},
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Owner,
    Date,
    Kind,
    Description,
    Category,
    Amount,
}

impl Column {
    const ALL: [Column; 7] = [
        Column::Id,
        Column::Owner,
        Column::Date,
        Column::Kind,
        Column::Description,
        Column::Category,
        Column::Amount,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::Id => "Id",
            Column::Owner => "Owner",
            Column::Date => "Date",
            Column::Kind => "Kind",
            Column::Description => "Description",
            Column::Category => "Category",
            Column::Amount => "Amount",
        }
    }

    fn from_header(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|column| column.header().eq_ignore_ascii_case(raw.trim()))
    }
}

/// Column order of a ledger file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerLayout {
    columns: Vec<Column>,
}

impl LedgerLayout {
    /// `Id,Owner,Date,Kind,Description,Category,Amount`, used for new files.
    pub fn canonical() -> Self {
        Self {
            columns: Column::ALL.to_vec(),
        }
    }

    pub fn has_owner(&self) -> bool {
        self.columns.contains(&Column::Owner)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn position(&self, column: Column) -> Option<usize> {
        self.columns.iter().position(|candidate| *candidate == column)
    }

    fn from_headers(headers: &StringRecord, path: &Path) -> Result<Self> {
        let mut columns = Vec::with_capacity(headers.len());
        for raw in headers.iter() {
            let column = Column::from_header(raw).ok_or_else(|| {
                LedgerError::corrupt(path, format!("unexpected column `{}`", raw.trim()))
            })?;
            if columns.contains(&column) {
                return Err(LedgerError::corrupt(
                    path,
                    format!("column `{}` appears twice", column.header()),
                ));
            }
            columns.push(column);
        }
        let missing: Vec<&str> = Column::ALL
            .into_iter()
            .filter(|column| *column != Column::Owner && !columns.contains(column))
            .map(Column::header)
            .collect();
        if !missing.is_empty() {
            return Err(LedgerError::corrupt(
                path,
                format!("missing column(s) {}", missing.join(", ")),
            ));
        }
        Ok(Self { columns })
    }
}

/// Decoded ledger file: its layout plus every record, for all owners, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerTable {
    pub layout: LedgerLayout,
    pub records: Vec<Transaction>,
}

impl LedgerTable {
    pub fn empty() -> Self {
        Self {
            layout: LedgerLayout::canonical(),
            records: Vec::new(),
        }
    }
}

pub fn decode_ledger(bytes: &[u8], path: &Path) -> Result<LedgerTable> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::Headers)
        .from_reader(bytes);
    let headers = reader
        .headers()
        .map_err(|err| LedgerError::corrupt(path, err.to_string()))?
        .clone();
    if headers.is_empty() {
        return Err(LedgerError::corrupt(path, "missing header row"));
    }
    let layout = LedgerLayout::from_headers(&headers, path)?;

    let mut seen = HashSet::new();
    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|err| LedgerError::corrupt(path, err.to_string()))?;
        let line = row.position().map(|pos| pos.line()).unwrap_or_default();
        let record = decode_row(&layout, &row)
            .map_err(|reason| LedgerError::corrupt(path, format!("line {line}: {reason}")))?;
        if !seen.insert(record.id) {
            return Err(LedgerError::corrupt(
                path,
                format!("line {line}: duplicate id {}", record.id),
            ));
        }
        records.push(record);
    }
    Ok(LedgerTable { layout, records })
}

fn cell<'a>(layout: &LedgerLayout, row: &'a StringRecord, column: Column) -> &'a str {
    layout
        .position(column)
        .and_then(|idx| row.get(idx))
        .unwrap_or("")
}

fn decode_row(layout: &LedgerLayout, row: &StringRecord) -> std::result::Result<Transaction, String> {
    let field = |column: Column| cell(layout, row, column);

    let id = field(Column::Id)
        .trim()
        .parse::<u64>()
        .map(RecordId)
        .map_err(|_| format!("id `{}` is not an integer", field(Column::Id)))?;
    let owner = if layout.has_owner() {
        let raw = field(Column::Owner).trim();
        if raw.is_empty() {
            return Err("owner is empty".into());
        }
        Owner::new(raw)
    } else {
        Owner::single_user()
    };
    let date = NaiveDate::parse_from_str(field(Column::Date).trim(), DATE_FORMAT)
        .map_err(|_| format!("date `{}` is not YYYY-MM-DD", field(Column::Date)))?;
    let kind = TransactionKind::from_str(field(Column::Kind)).map_err(|err| err.to_string())?;
    let category = field(Column::Category).to_string();
    if category.trim().is_empty() {
        return Err("category is empty".into());
    }
    let amount = Decimal::from_str(field(Column::Amount).trim())
        .map_err(|_| format!("amount `{}` is not a decimal", field(Column::Amount)))?;

    Ok(Transaction {
        id,
        owner,
        date,
        kind,
        description: field(Column::Description).to_string(),
        category,
        amount,
    })
}

pub fn encode_ledger(table: &LedgerTable) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(table.layout.columns().iter().map(|column| column.header()))?;
    for record in &table.records {
        let row: Vec<String> = table
            .layout
            .columns()
            .iter()
            .map(|column| match column {
                Column::Id => record.id.to_string(),
                Column::Owner => record.owner.to_string(),
                Column::Date => record.date.format(DATE_FORMAT).to_string(),
                Column::Kind => record.kind.label().to_string(),
                Column::Description => record.description.clone(),
                Column::Category => record.category.clone(),
                Column::Amount => record.amount.to_string(),
            })
            .collect();
        writer.write_record(&row)?;
    }
    writer
        .into_inner()
        .map_err(|err| LedgerError::Io(err.into_error()))
}

pub fn decode_categories(bytes: &[u8], path: &Path) -> Result<CategoryRegistry> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(bytes);
    let headers = reader
        .headers()
        .map_err(|err| LedgerError::corrupt(path, err.to_string()))?
        .clone();

    let mut kinds = Vec::with_capacity(headers.len());
    for raw in headers.iter() {
        let kind = TransactionKind::from_str(raw)
            .map_err(|_| LedgerError::corrupt(path, format!("unexpected column `{raw}`")))?;
        if kinds.contains(&kind) {
            return Err(LedgerError::corrupt(
                path,
                format!("column `{kind}` appears twice"),
            ));
        }
        kinds.push(kind);
    }
    if let Some(missing) = TransactionKind::ALL
        .into_iter()
        .find(|kind| !kinds.contains(kind))
    {
        return Err(LedgerError::corrupt(
            path,
            format!("missing column `{missing}`"),
        ));
    }

    let mut registry = CategoryRegistry::empty();
    for row in reader.records() {
        let row = row.map_err(|err| LedgerError::corrupt(path, err.to_string()))?;
        for (kind, label) in kinds.iter().zip(row.iter()) {
            // Empty cells pad the shorter columns.
            if label.is_empty() {
                continue;
            }
            if !registry.push_unique(*kind, label) {
                return Err(LedgerError::corrupt(
                    path,
                    format!("duplicate {kind} category `{label}`"),
                ));
            }
        }
    }
    Ok(registry)
}

pub fn encode_categories(registry: &CategoryRegistry) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(TransactionKind::ALL.iter().map(|kind| kind.label()))?;
    let depth = TransactionKind::ALL
        .iter()
        .map(|kind| registry.labels(*kind).len())
        .max()
        .unwrap_or(0);
    for row in 0..depth {
        let cells: Vec<&str> = TransactionKind::ALL
            .iter()
            .map(|kind| {
                registry
                    .labels(*kind)
                    .get(row)
                    .map(String::as_str)
                    .unwrap_or("")
            })
            .collect();
        writer.write_record(&cells)?;
    }
    writer
        .into_inner()
        .map_err(|err| LedgerError::Io(err.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PATH: &str = "ledger.csv";

    #[test]
    fn decodes_canonical_layout() {
        let data = "Id,Owner,Date,Kind,Description,Category,Amount\n\
                    1,ana,2024-01-05,Income,Paycheck,Salary,3500.00\n\
                    2,ana,2024-01-07,Expense,\"Rent, January\",Rent,-1200.00\n";
        let table = decode_ledger(data.as_bytes(), Path::new(PATH)).unwrap();
        assert_eq!(table.layout, LedgerLayout::canonical());
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[1].description, "Rent, January");
        assert_eq!(table.records[1].amount, Decimal::new(-120000, 2));
        assert_eq!(table.records[0].owner, Owner::new("ana"));
    }

    #[test]
    fn ownerless_layout_defaults_to_single_user() {
        let data = "Id,Date,Kind,Description,Category,Amount\n3,2024-02-01,Expense,Bus,Transport,-4.40\n";
        let table = decode_ledger(data.as_bytes(), Path::new(PATH)).unwrap();
        assert!(!table.layout.has_owner());
        assert!(table.records[0].owner.is_single_user());
    }

    #[test]
    fn reordered_columns_round_trip_unchanged() {
        let data = "Amount,Category,Description,Kind,Date,Owner,Id\n-9.90,Food,Lunch,Expense,2024-03-02,local,4\n";
        let table = decode_ledger(data.as_bytes(), Path::new(PATH)).unwrap();
        let encoded = encode_ledger(&table).unwrap();
        assert_eq!(String::from_utf8(encoded).unwrap(), data);
    }

    #[test]
    fn unexpected_schema_is_corrupt() {
        let data = "Date,Kind,Description,Category,Amount\n2024-01-01,Income,x,Salary,1\n";
        let err = decode_ledger(data.as_bytes(), Path::new(PATH)).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::StorageCorrupt { ref reason, .. } if reason.contains("Id")
        ));

        let data = "Id,Date,Kind,Description,Category,Amount,Notes\n";
        assert!(matches!(
            decode_ledger(data.as_bytes(), Path::new(PATH)),
            Err(LedgerError::StorageCorrupt { .. })
        ));
    }

    #[test]
    fn unparseable_amount_is_not_coerced_to_zero() {
        let data = "Id,Date,Kind,Description,Category,Amount\n1,2024-01-01,Expense,Tea,Food,abc\n";
        let err = decode_ledger(data.as_bytes(), Path::new(PATH)).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::StorageCorrupt { ref reason, .. } if reason.contains("line 2") && reason.contains("abc")
        ));
    }

    #[test]
    fn duplicate_ids_are_corrupt() {
        let data = "Id,Date,Kind,Description,Category,Amount\n\
                    1,2024-01-01,Expense,Tea,Food,-1\n\
                    1,2024-01-02,Expense,Cake,Food,-2\n";
        assert!(matches!(
            decode_ledger(data.as_bytes(), Path::new(PATH)),
            Err(LedgerError::StorageCorrupt { ref reason, .. }) if reason.contains("duplicate id 1")
        ));
    }

    #[test]
    fn category_table_pads_short_columns() {
        let mut registry = CategoryRegistry::empty();
        registry.push_unique(TransactionKind::Income, "Salary");
        registry.push_unique(TransactionKind::Expense, "Food");
        registry.push_unique(TransactionKind::Expense, "Rent");
        let encoded = String::from_utf8(encode_categories(&registry).unwrap()).unwrap();
        assert_eq!(encoded, "Income,Expense,Investment\nSalary,Food,\n,Rent,\n");

        let decoded = decode_categories(encoded.as_bytes(), Path::new("categories.csv")).unwrap();
        assert_eq!(decoded, registry);
    }

    #[test]
    fn duplicate_category_labels_are_corrupt() {
        let data = "Income,Expense,Investment\nSalary,Food,Stocks\nSalary,,\n";
        assert!(matches!(
            decode_categories(data.as_bytes(), Path::new("categories.csv")),
            Err(LedgerError::StorageCorrupt { .. })
        ));
    }
}
