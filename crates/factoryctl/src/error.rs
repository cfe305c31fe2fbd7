//! Error types for factoryctl

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid unit report {}: {reason}", path.display())]
    InvalidReport { path: PathBuf, reason: String },

    #[error("Unsupported report format: {} (expected .json, .yaml or .yml)", .0.display())]
    UnsupportedReport(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid version word: {0}")]
    InvalidVersion(#[from] kobuki_factory_record::VersionParseError),

    #[error("Audit log error: {0}")]
    AuditLog(#[from] kobuki_factory_record::ExportError),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::InvalidReport { .. }
            | CliError::UnsupportedReport(_)
            | CliError::InvalidVersion(_) => 2,
            CliError::AuditLog(_) => 3,
            CliError::InvalidConfiguration(_) => 4,
        }
    }
}
