//! Station configuration
//!
//! Loaded from a YAML file when `--config` is given; every field has a
//! default so an empty file is valid.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CliError;

/// Default audit log written next to the station's working directory.
pub const DEFAULT_AUDIT_LOG: &str = "kobuki_factory_test.csv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StationConfig {
    /// CSV audit log every finished unit is appended to
    pub audit_log: PathBuf,
    /// Station identifier attached to log output
    pub station_id: Option<String>,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            audit_log: PathBuf::from(DEFAULT_AUDIT_LOG),
            station_id: None,
        }
    }
}

impl StationConfig {
    /// Load from `path`, or fall back to defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path).map_err(|e| {
            CliError::InvalidConfiguration(format!("cannot read {}: {e}", path.display()))
        })?;
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&text).map_err(|e| {
            CliError::InvalidConfiguration(format!("{}: {e}", path.display()))
        })
    }

    /// Apply the command-line override for the audit log path.
    pub fn with_audit_log(mut self, audit_log: Option<PathBuf>) -> Self {
        if let Some(audit_log) = audit_log {
            self.audit_log = audit_log;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn test_defaults_without_file() -> TestResult {
        let config = StationConfig::load(None)?;
        assert_eq!(config, StationConfig::default());
        assert_eq!(config.audit_log, PathBuf::from(DEFAULT_AUDIT_LOG));
        Ok(())
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() -> TestResult {
        let config: StationConfig = serde_yaml::from_str("station_id: line-3\n")?;
        assert_eq!(config.station_id.as_deref(), Some("line-3"));
        assert_eq!(config.audit_log, PathBuf::from(DEFAULT_AUDIT_LOG));
        Ok(())
    }

    #[test]
    fn test_unknown_field_rejected() {
        let parsed = serde_yaml::from_str::<StationConfig>("audit_lgo: x.csv\n");
        assert!(matches!(parsed, Err(_)));
    }

    #[test]
    fn test_override_wins() {
        let config = StationConfig::default().with_audit_log(Some(PathBuf::from("/tmp/a.csv")));
        assert_eq!(config.audit_log, PathBuf::from("/tmp/a.csv"));
        let config = config.with_audit_log(None);
        assert_eq!(config.audit_log, PathBuf::from("/tmp/a.csv"));
    }
}
