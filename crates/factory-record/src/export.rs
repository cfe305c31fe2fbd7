//! CSV audit log
//!
//! Every finalized unit is appended to a line-audit CSV file. The file is
//! opened in append mode and created if absent; a fresh file gets the
//! [`CSV_HEADER`] line first. Each unit then contributes one row of raw
//! readings, and a failing unit a second row carrying its pass flags in the
//! same column positions.
//!
//! # Format stability
//!
//! Column count and order are consumed by downstream audit tooling and must
//! not change. Note the header labels the version columns `VER,FW,HW` and
//! the power columns `JACK,DOCK` while the cells hold hardware, firmware,
//! software and then the dock reading before the jack reading; the cell
//! order is the contract.
//!
//! # Concurrency
//!
//! [`export_csv`] assumes a single writer. Stations testing several units in
//! parallel share one [`AuditLog`], which serializes appends so the rows of
//! different units never interleave.

use crate::collection::RecordList;
use crate::device::Device;
use crate::error::{ExportError, ExportResult};
use crate::record::DiagnosticRecord;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Number of columns in every audit row.
pub const CSV_COLUMNS: usize = 29;

/// Header line written once at the top of a fresh audit log.
pub const CSV_HEADER: [&str; CSV_COLUMNS] = [
    "SN", "VER", "FW", "HW", "JACK", "DOCK", "CHR", "PSD-L", "PSD-C", "PSD-R", "BMP-L", "BMP-C",
    "BMP-R", "IRD-L", "IRD-C", "IRD-R", "WD-L", "WD-R", "MOT-L", "MOT-R", "IMU-DIFF", "IMU",
    "BUT-1", "BUT-2", "BUT-3", "LED-1", "LED-2", "SND", "RESULT",
];

/// Devices reported by raw value in the primary row, after the version columns.
const VALUE_COLUMNS: [Device; 16] = [
    Device::PwrDock,
    Device::PwrJack,
    Device::Charging,
    Device::CliffL,
    Device::CliffC,
    Device::CliffR,
    Device::BumperL,
    Device::BumperC,
    Device::BumperR,
    Device::IrDockL,
    Device::IrDockC,
    Device::IrDockR,
    Device::WDropL,
    Device::WDropR,
    Device::MotorL,
    Device::MotorR,
];

/// Devices reported by pass flag in both rows, after the IMU diff column.
const FLAG_COLUMNS: [Device; 7] = [
    Device::ImuDev,
    Device::Button0,
    Device::Button1,
    Device::Button2,
    Device::Led1,
    Device::Led2,
    Device::Sounds,
];

const RESULT_COLUMN: usize = CSV_COLUMNS - 1;

/// What one export appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOutcome {
    /// The file was empty and received the header line
    pub header_written: bool,
    /// Data rows appended: 1 for a passing unit, 2 for a failing one
    pub rows_written: usize,
    /// The unit's overall verdict
    pub passed: bool,
}

fn flag(ok: bool) -> String {
    if ok { "1" } else { "0" }.to_string()
}

/// Format a float the way a default C++ output stream does (`%g`, six
/// significant digits), which is what existing audit logs contain.
pub fn format_general(value: f64) -> String {
    const PRECISION: usize = 6;
    const MAX_FIXED_EXPONENT: i32 = 6;

    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value.is_sign_negative() { "-inf" } else { "inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Round to the target precision first; rounding may bump the exponent.
    let scientific = format!("{:.*e}", PRECISION - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if !(-4..MAX_FIXED_EXPONENT).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            trim_fraction(mantissa),
            exponent.unsigned_abs()
        )
    } else {
        let decimals = usize::try_from(MAX_FIXED_EXPONENT - 1 - exponent).unwrap_or(0);
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}

/// Row of raw readings written for every unit.
pub fn primary_row(record: &DiagnosticRecord, passed: bool) -> Vec<String> {
    let version = record.version();
    let mut row = Vec::with_capacity(CSV_COLUMNS);
    row.push(record.serial().to_string());
    row.push(version.hardware().to_string());
    row.push(version.firmware().to_string());
    row.push(version.software().to_string());
    row.extend(
        VALUE_COLUMNS
            .iter()
            .map(|&device| record.devices().value(device).to_string()),
    );
    push_trailer(&mut row, record, passed);
    row
}

/// Detail row written after the primary row of a failing unit.
///
/// It mirrors the primary row with pass flags in place of every raw value;
/// the three version cells all carry the version flag.
pub fn fallback_row(record: &DiagnosticRecord, passed: bool) -> Vec<String> {
    let version_ok = flag(record.devices().is_ok(Device::VInfo));
    let mut row = Vec::with_capacity(CSV_COLUMNS);
    row.push(record.serial().to_string());
    row.push(version_ok.clone());
    row.push(version_ok.clone());
    row.push(version_ok);
    row.extend(
        VALUE_COLUMNS
            .iter()
            .map(|&device| flag(record.devices().is_ok(device))),
    );
    push_trailer(&mut row, record, passed);
    row
}

fn push_trailer(row: &mut Vec<String>, record: &DiagnosticRecord, passed: bool) {
    row.push(format_general(record.imu_diff()));
    row.extend(
        FLAG_COLUMNS
            .iter()
            .map(|&device| flag(record.devices().is_ok(device))),
    );
    row.push(flag(passed));
}

fn open_for_append(path: &Path) -> ExportResult<File> {
    OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|source| ExportError::Open {
            path: path.to_path_buf(),
            source,
        })
}

/// Finalize `record` and append it to the audit log at `path`.
///
/// The header is written only when the file is empty at open time. Parent
/// directories are never created, so an unreachable path leaves nothing
/// behind.
///
/// # Errors
///
/// Returns [`ExportError::Open`] if the file cannot be opened for append,
/// and [`ExportError::Write`] or [`ExportError::Csv`] if writing fails
/// afterwards.
pub fn export_csv(record: &mut DiagnosticRecord, path: &Path) -> ExportResult<ExportOutcome> {
    let passed = record.finalize();
    let file = open_for_append(path)?;
    let fresh = file
        .metadata()
        .map_err(|source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        })?
        .len()
        == 0;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(file);

    if fresh {
        debug!(path = %path.display(), "Empty audit log; writing header");
        writer.write_record(CSV_HEADER)?;
    }

    writer.write_record(primary_row(record, passed))?;
    let mut rows_written = 1;

    if !passed {
        warn!(
            serial = record.serial(),
            failed = ?record.failed_devices(),
            "Unit failed; appending pass flags row"
        );
        writer.write_record(fallback_row(record, passed))?;
        rows_written += 1;
    }

    writer.flush().map_err(|source| ExportError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        serial = record.serial(),
        version = %record.version(),
        passed,
        rows = rows_written,
        "Unit appended to audit log"
    );

    Ok(ExportOutcome {
        header_written: fresh,
        rows_written,
        passed,
    })
}

impl DiagnosticRecord {
    /// Append this unit to the audit log at `path`, reporting success as a
    /// boolean. Failures are logged, never raised.
    pub fn save_to_csv(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match export_csv(self, path) {
            Ok(_) => true,
            Err(err) => {
                error!(serial = self.serial(), error = %err, "Audit log export failed");
                false
            }
        }
    }
}

struct AuditLogInner {
    path: PathBuf,
    append_lock: Mutex<()>,
}

/// Shared handle to one audit log file.
///
/// Clones refer to the same file and the same lock; each append holds the
/// lock for the whole open-write-close cycle.
#[derive(Clone)]
pub struct AuditLog {
    inner: Arc<AuditLogInner>,
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog")
            .field("path", &self.inner.path)
            .finish_non_exhaustive()
    }
}

impl AuditLog {
    /// Handle for the audit log at `path`. Nothing is opened until the first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(AuditLogInner {
                path: path.into(),
                append_lock: Mutex::new(()),
            }),
        }
    }

    /// Audit log location.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Finalize and append one unit.
    ///
    /// # Errors
    ///
    /// See [`export_csv`].
    pub fn append(&self, record: &mut DiagnosticRecord) -> ExportResult<ExportOutcome> {
        let _guard = self.inner.append_lock.lock();
        export_csv(record, &self.inner.path)
    }

    /// Append every unit of a batch in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// See [`export_csv`]; units after the failing one are not written.
    pub fn append_all(&self, records: &mut RecordList) -> ExportResult<Vec<ExportOutcome>> {
        records
            .iter_mut()
            .map(|record| self.append(record))
            .collect()
    }
}

/// One data row read back from an audit log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditRow {
    /// 1-based line number in the file
    pub line: u64,
    /// Unit serial
    pub serial: String,
    /// All cells, serial included
    pub cells: Vec<String>,
    /// RESULT column
    pub passed: bool,
}

/// Read every data row of the audit log at `path`.
///
/// # Errors
///
/// Returns [`ExportError::Open`] if the file cannot be opened and
/// [`ExportError::Malformed`] for a wrong header or a row that does not have
/// [`CSV_COLUMNS`] cells.
pub fn read_audit_rows(path: &Path) -> ExportResult<Vec<AuditRow>> {
    let file = File::open(path).map_err(|source| ExportError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers = reader.headers()?;
    if !headers.iter().eq(CSV_HEADER.iter().copied()) {
        return Err(ExportError::Malformed {
            line: 1,
            reason: "unexpected header".to_string(),
        });
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, csv::Position::line);
        if record.len() != CSV_COLUMNS {
            return Err(ExportError::Malformed {
                line,
                reason: format!("expected {CSV_COLUMNS} columns, got {}", record.len()),
            });
        }
        let cells: Vec<String> = record.iter().map(str::to_string).collect();
        let passed = match cells.get(RESULT_COLUMN).map(String::as_str) {
            Some("1") => true,
            Some("0") => false,
            other => {
                return Err(ExportError::Malformed {
                    line,
                    reason: format!("RESULT must be 0 or 1, got {other:?}"),
                });
            }
        };
        rows.push(AuditRow {
            line,
            serial: cells.first().cloned().unwrap_or_default(),
            cells,
            passed,
        });
    }
    Ok(rows)
}

/// Unit counts over an audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AuditSummary {
    /// Units found
    pub units: usize,
    /// Units whose RESULT is 1
    pub passed: usize,
    /// Units whose RESULT is 0
    pub failed: usize,
}

/// Count units in rows read by [`read_audit_rows`].
///
/// A row directly following a failing row with the same serial is that
/// unit's pass flags row and is not counted again.
pub fn summarize(rows: &[AuditRow]) -> AuditSummary {
    let mut summary = AuditSummary::default();
    let mut previous: Option<&AuditRow> = None;
    for row in rows {
        let is_detail_row = previous
            .is_some_and(|prev| !prev.passed && !row.passed && prev.serial == row.serial);
        if is_detail_row {
            // Only the primary row counts; the next row starts fresh.
            previous = None;
            continue;
        }
        summary.units += 1;
        if row.passed {
            summary.passed += 1;
        } else {
            summary.failed += 1;
        }
        previous = Some(row);
    }
    summary
}
