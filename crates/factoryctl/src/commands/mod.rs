//! Command implementations for factoryctl

pub mod record;
pub mod summary;
pub mod version;

use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Append finished unit reports to the audit log
    Record {
        /// Unit report files (.json, .yaml or .yml), each holding one unit or a list
        #[arg(required = true)]
        reports: Vec<PathBuf>,
    },

    /// Print the audit log header line
    Header,

    /// Decode a packed hardware/firmware/software version word
    DecodeVersion {
        /// Raw word, decimal or 0x-prefixed hex
        #[arg(allow_hyphen_values = true)]
        word: String,
        /// Separator placed between the three fields
        #[arg(short, long, default_value_t = '/')]
        separator: char,
    },

    /// Count units, passes and failures in an audit log
    Summary {
        /// Audit log to read (defaults to the configured one)
        csv: Option<PathBuf>,
    },
}
