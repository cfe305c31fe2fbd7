//! Audit log error types
//!
//! Failures surface from opening, writing or reading back the CSV audit log.
//! A malformed version word or an unpopulated device slot is never an error.

use std::path::PathBuf;
use thiserror::Error;

/// Audit log operation error
#[derive(Debug, Error)]
pub enum ExportError {
    /// The audit log could not be opened
    #[error("Unable to open {}: {source}", path.display())]
    Open {
        /// Target path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Writing or flushing rows failed after the file was opened
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        /// Target path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// CSV encoder or decoder error
    #[error("CSV error: {0}")]
    Csv(String),

    /// A row read back from the audit log does not have the expected shape
    #[error("Malformed audit row at line {line}: {reason}")]
    Malformed {
        /// 1-based line number
        line: u64,
        /// What is wrong with the row
        reason: String,
    },
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Csv(err.to_string())
    }
}

/// Result type for audit log operations
pub type ExportResult<T> = Result<T, ExportError>;
