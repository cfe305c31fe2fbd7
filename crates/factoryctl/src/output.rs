//! Output formatting for CLI responses

use anyhow::{Error, Result};
use colored::*;
use kobuki_factory_record::{AuditSummary, DiagnosticRecord, ExportOutcome};
use serde::Serialize;
use serde_json::json;
use std::path::Path;

use crate::error::CliError;

/// One appended unit, as reported back to the operator.
#[derive(Debug, Serialize)]
pub struct UnitLine {
    pub serial: String,
    pub version: String,
    pub passed: bool,
    pub rows: usize,
    pub failed_devices: Vec<String>,
}

impl UnitLine {
    pub fn new(record: &DiagnosticRecord, outcome: &ExportOutcome) -> Self {
        Self {
            serial: record.serial().to_string(),
            version: record.version_nb('/'),
            passed: outcome.passed,
            rows: outcome.rows_written,
            failed_devices: record
                .failed_devices()
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Print appended units in the requested format
pub fn print_units(units: &[UnitLine], json: bool) -> Result<()> {
    if json {
        let output = json!({
            "success": true,
            "units": units,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for unit in units {
        let verdict = if unit.passed {
            "PASS".green()
        } else {
            "FAIL".red()
        };
        println!(
            "{}  {}  {}  rows={}",
            unit.serial.bold(),
            unit.version,
            verdict,
            unit.rows
        );
        if !unit.failed_devices.is_empty() {
            println!("    failed: {}", unit.failed_devices.join(", "));
        }
    }
    Ok(())
}

/// Print an audit log summary
pub fn print_summary(path: &Path, summary: &AuditSummary, json: bool) -> Result<()> {
    if json {
        let output = json!({
            "success": true,
            "audit_log": path.display().to_string(),
            "units": summary.units,
            "passed": summary.passed,
            "failed": summary.failed,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display().to_string().bold());
        println!("  units:  {}", summary.units);
        println!("  passed: {}", summary.passed.to_string().green());
        println!("  failed: {}", summary.failed.to_string().red());
    }
    Ok(())
}

fn error_type_name(error: &Error) -> &'static str {
    match error.downcast_ref::<CliError>() {
        Some(CliError::InvalidReport { .. }) => "InvalidReport",
        Some(CliError::UnsupportedReport(_)) => "UnsupportedReport",
        Some(CliError::InvalidConfiguration(_)) => "InvalidConfiguration",
        Some(CliError::InvalidVersion(_)) => "InvalidVersion",
        Some(CliError::AuditLog(_)) => "AuditLog",
        None => "Error",
    }
}

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "type": error_type_name(error)
        }
    });
    match serde_json::to_string_pretty(&error_json) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format error as JSON: {e}"),
    }
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}
