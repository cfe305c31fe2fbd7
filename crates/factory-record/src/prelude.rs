//! Prelude module for convenient station imports.
//!
//! # Example
//!
//! ```
//! use kobuki_factory_record::prelude::*;
//!
//! let mut record = DiagnosticRecord::new(1);
//! record.devices_mut().set_ok(Device::Sounds, true);
//! ```

pub use crate::collection::RecordList;
pub use crate::device::{Device, DeviceTable, UnknownDevice};
pub use crate::error::{ExportError, ExportResult};
pub use crate::export::{
    AuditLog, AuditRow, AuditSummary, CSV_COLUMNS, CSV_HEADER, ExportOutcome, export_csv,
    read_audit_rows, summarize,
};
pub use crate::record::{DeviceReading, DiagnosticRecord, MOTOR_FAULT_THRESHOLD};
pub use crate::state::ClassificationState;
pub use crate::version::{VersionParseError, VersionWord};
