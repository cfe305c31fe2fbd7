//! Append unit reports to the audit log

use anyhow::Result;
use kobuki_factory_record::{AuditLog, DiagnosticRecord, RecordList};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::CliError;
use crate::output::{self, UnitLine};

/// Load every unit from one report file, in file order.
///
/// A report file holds either one unit or a list of units. The shape is
/// picked from the parsed document, then the text is decoded again as that
/// shape so parse errors keep their location and the offending name.
pub fn load_report(path: &Path) -> Result<Vec<DiagnosticRecord>, CliError> {
    let invalid = |reason: String| CliError::InvalidReport {
        path: path.to_path_buf(),
        reason,
    };
    let text = fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("json") => {
            let document: serde_json::Value =
                serde_json::from_str(&text).map_err(|e| invalid(e.to_string()))?;
            let units = if document.is_array() {
                serde_json::from_str::<Vec<DiagnosticRecord>>(&text)
            } else {
                serde_json::from_str::<DiagnosticRecord>(&text).map(|record| vec![record])
            };
            units.map_err(|e| invalid(e.to_string()))
        }
        Some("yaml" | "yml") => {
            let document: serde_yaml::Value =
                serde_yaml::from_str(&text).map_err(|e| invalid(e.to_string()))?;
            let units = if document.is_sequence() {
                serde_yaml::from_str::<Vec<DiagnosticRecord>>(&text)
            } else {
                serde_yaml::from_str::<DiagnosticRecord>(&text).map(|record| vec![record])
            };
            units.map_err(|e| invalid(e.to_string()))
        }
        _ => Err(CliError::UnsupportedReport(path.to_path_buf())),
    }
}

/// Execute the record command
pub fn execute(reports: &[PathBuf], audit_log: &Path, json: bool) -> Result<()> {
    // Reject the whole batch before touching the log if any report is bad.
    let mut batch = RecordList::new();
    for path in reports {
        let units = load_report(path)?;
        debug!(path = %path.display(), units = units.len(), "Loaded unit report");
        batch.extend(units);
    }

    let log = AuditLog::new(audit_log);
    let mut lines = Vec::with_capacity(batch.len());
    for record in batch.iter_mut() {
        let outcome = log.append(record).map_err(CliError::from)?;
        lines.push(UnitLine::new(record, &outcome));
    }

    info!(
        units = lines.len(),
        audit_log = %audit_log.display(),
        "Batch appended"
    );
    output::print_units(&lines, json)
}
