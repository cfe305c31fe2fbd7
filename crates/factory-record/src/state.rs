//! Overall classification of a unit under test.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification assigned to a unit by the test driver.
///
/// Records start as [`ClassificationState::Unknown`]; the record never moves
/// out of it on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassificationState {
    /// Not yet classified
    #[default]
    Unknown,
    /// Unit passed
    Ok,
    /// Unit passed with warnings
    Warn,
    /// Unit failed
    Error,
}

impl ClassificationState {
    /// Legacy numeric code used by station tooling.
    pub const fn code(self) -> i8 {
        match self {
            ClassificationState::Unknown => -1,
            ClassificationState::Ok => 0,
            ClassificationState::Warn => 1,
            ClassificationState::Error => 2,
        }
    }
}

impl fmt::Display for ClassificationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClassificationState::Unknown => "UNKNOWN",
            ClassificationState::Ok => "OK",
            ClassificationState::Warn => "WARN",
            ClassificationState::Error => "ERROR",
        };
        f.write_str(name)
    }
}
