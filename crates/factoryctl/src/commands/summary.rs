//! Audit log summary

use anyhow::Result;
use kobuki_factory_record::{read_audit_rows, summarize};
use std::path::Path;
use tracing::debug;

use crate::error::CliError;
use crate::output;

/// Execute the summary command
pub fn execute(csv: &Path, json: bool) -> Result<()> {
    let rows = read_audit_rows(csv).map_err(CliError::from)?;
    debug!(rows = rows.len(), path = %csv.display(), "Read audit log");
    let summary = summarize(&rows);
    output::print_summary(csv, &summary, json)
}
