pub mod summary_service;
pub mod transaction_service;

pub use summary_service::{CategoryTotal, KindTotals, Period, PeriodSummary, SummaryService};
pub use transaction_service::{EntryEdit, EntryInput, TransactionService};
