//! Per-unit diagnostic record for the Kobuki end-of-line test station
//!
//! Every robot base leaving the line is exercised subsystem by subsystem
//! (power, bumpers, cliff sensors, dock IR, buttons, wheel drops, motors,
//! IMU, LEDs, buzzer). This crate holds the result of that pass for one unit,
//! rolls it up into composite verdicts, decodes the packed version word and
//! appends the unit to the CSV audit log used for production-line auditing.
//!
//! # Architecture
//!
//! - [`device`]: the closed [`Device`] set and the per-unit [`DeviceTable`]
//! - [`record`]: [`DiagnosticRecord`] and its health predicates
//! - [`version`]: [`VersionWord`] decoding
//! - [`collection`]: [`RecordList`], one entry per unit of a run
//! - [`export`]: the CSV audit log format, [`export_csv`] and the shared [`AuditLog`]
//! - [`error`]: error types for audit log operations
//!
//! Sequencing the checks, talking to the sensors and the operator UI live
//! elsewhere; the test driver only writes into a record and appends it.
//!
//! # Example
//!
//! ```no_run
//! use kobuki_factory_record::prelude::*;
//!
//! # fn main() -> ExportResult<()> {
//! let log = AuditLog::new("kobuki_factory_test.csv");
//!
//! let mut record = DiagnosticRecord::new(1024);
//! record.devices_mut().record(Device::VInfo, true, 0x0001_0002_0000_0003);
//! record.devices_mut().record(Device::MotorL, true, 2);
//! record.devices_mut().record(Device::MotorR, true, 0);
//! assert!(record.motors_ok());
//!
//! let outcome = log.append(&mut record)?;
//! println!("{} rows, passed: {}", outcome.rows_written, outcome.passed);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod collection;
pub mod device;
pub mod error;
pub mod export;
pub mod prelude;
pub mod record;
pub mod state;
pub mod version;

pub use collection::RecordList;
pub use device::{Device, DeviceTable, UnknownDevice};
pub use error::{ExportError, ExportResult};
pub use export::{
    AuditLog, AuditRow, AuditSummary, CSV_COLUMNS, CSV_HEADER, ExportOutcome, export_csv,
    fallback_row, format_general, primary_row, read_audit_rows, summarize,
};
pub use record::{DeviceReading, DiagnosticRecord, IMU_SAMPLES, MOTOR_FAULT_THRESHOLD};
pub use state::ClassificationState;
pub use version::{VersionParseError, VersionWord};
