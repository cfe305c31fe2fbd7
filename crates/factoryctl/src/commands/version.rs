//! Decode packed version words

use anyhow::Result;
use kobuki_factory_record::VersionWord;
use serde_json::json;

use crate::error::CliError;

/// Execute the decode-version command
pub fn execute(word: &str, separator: char, json: bool) -> Result<()> {
    let version: VersionWord = word.parse().map_err(CliError::from)?;

    if json {
        let output = json!({
            "success": true,
            "raw": version.raw(),
            "hardware": version.hardware(),
            "firmware": version.firmware(),
            "software": version.software(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", version.format(separator));
    }
    Ok(())
}
