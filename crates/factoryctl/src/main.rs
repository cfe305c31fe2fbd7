//! factoryctl - Kobuki end-of-line station CLI
//!
//! Appends finished unit reports to the production audit log and inspects
//! existing logs.

#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod config;
mod error;
mod output;

use anyhow::Result;
use clap::Parser;
use kobuki_factory_record::CSV_HEADER;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::Commands;
use crate::config::StationConfig;
use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(name = "factoryctl")]
#[command(about = "Kobuki factory test station - append and inspect the unit audit log")]
#[command(version)]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(long, global = true, help = "Output in JSON format for machine parsing")]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Station configuration file (YAML)
    #[arg(long, global = true, env = "FACTORYCTL_CONFIG")]
    config: Option<PathBuf>,

    /// Audit log path, overriding the configuration
    #[arg(long, global = true, env = "FACTORYCTL_AUDIT_LOG")]
    audit_log: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("factoryctl={log_level},kobuki_factory_record={log_level}").into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match execute_command(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }

            let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn execute_command(cli: &Cli) -> Result<()> {
    let config = StationConfig::load(cli.config.as_deref())?.with_audit_log(cli.audit_log.clone());
    let _station = tracing::info_span!(
        "station",
        id = config.station_id.as_deref().unwrap_or("-")
    )
    .entered();

    match &cli.command {
        Commands::Record { reports } => {
            commands::record::execute(reports, &config.audit_log, cli.json)
        }
        Commands::Header => {
            println!("{}", CSV_HEADER.join(","));
            Ok(())
        }
        Commands::DecodeVersion { word, separator } => {
            commands::version::execute(word, *separator, cli.json)
        }
        Commands::Summary { csv } => {
            let path = csv.as_deref().unwrap_or(&config.audit_log);
            commands::summary::execute(path, cli.json)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn parse_record_defaults() -> TestResult {
        let cli = Cli::try_parse_from(["factoryctl", "record", "unit.json"])?;
        assert!(!cli.json);
        assert_eq!(cli.verbose, 0);
        assert!(matches!(
            cli.command,
            Commands::Record { ref reports } if reports == &[PathBuf::from("unit.json")]
        ));
        Ok(())
    }

    #[test]
    fn parse_record_requires_reports() {
        let parsed = Cli::try_parse_from(["factoryctl", "record"]);
        assert!(matches!(parsed, Err(_)));
    }

    #[test]
    fn parse_decode_version_separator() -> TestResult {
        let cli = Cli::try_parse_from(["factoryctl", "decode-version", "0x10", "-s", "."])?;
        assert!(matches!(
            cli.command,
            Commands::DecodeVersion { ref word, separator: '.' } if word == "0x10"
        ));
        Ok(())
    }

    #[test]
    fn parse_global_flags_after_subcommand() -> TestResult {
        let cli = Cli::try_parse_from([
            "factoryctl",
            "summary",
            "--json",
            "-vv",
            "--audit-log",
            "line.csv",
        ])?;
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.audit_log, Some(PathBuf::from("line.csv")));
        Ok(())
    }
}
