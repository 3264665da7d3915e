use std::path::PathBuf;

use thiserror::Error;

use crate::ledger::RecordId;

/// Error type that captures ledger, registry and access failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Storage file `{}` is corrupt: {reason}", .path.display())]
    StorageCorrupt { path: PathBuf, reason: String },
    #[error("Record {0} not found")]
    NotFound(RecordId),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Goal amount must not be zero")]
    DivisionByZero,
    #[error("Ledger file `{}` changed on disk since it was loaded", .0.display())]
    Conflict(PathBuf),
    #[error("Access denied: {0}")]
    Access(String),
}

impl LedgerError {
    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        LedgerError::StorageCorrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
