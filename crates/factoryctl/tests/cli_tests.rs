//! Integration tests for factoryctl
//!
//! Runs the binary against temporary unit reports and audit logs and checks
//! output and exit codes.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const HEADER: &str = "SN,VER,FW,HW,JACK,DOCK,CHR,PSD-L,PSD-C,PSD-R,BMP-L,BMP-C,BMP-R,IRD-L,IRD-C,IRD-R,WD-L,WD-R,MOT-L,MOT-R,IMU-DIFF,IMU,BUT-1,BUT-2,BUT-3,LED-1,LED-2,SND,RESULT";

const DEVICES: [&str; 27] = [
    "V_INFO", "IR_DOCK_L", "IR_DOCK_C", "IR_DOCK_R", "IMU_DEV", "BUTTON_0", "BUTTON_1",
    "BUTTON_2", "BUMPER_L", "BUMPER_C", "BUMPER_R", "W_DROP_L", "W_DROP_R", "CLIFF_L", "CLIFF_C",
    "CLIFF_R", "PWR_JACK", "PWR_DOCK", "CHARGING", "EXT_PWR", "INPUT", "OUTPUT", "LED_1", "LED_2",
    "SOUNDS", "MOTOR_L", "MOTOR_R",
];

fn factoryctl() -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("factoryctl")?;
    cmd.env("NO_COLOR", "1")
        .env_remove("FACTORYCTL_AUDIT_LOG")
        .env_remove("FACTORYCTL_CONFIG")
        .env_remove("RUST_LOG");
    Ok(cmd)
}

/// Unit report with every device passing except `failing`.
fn unit_report(sequence_number: u32, failing: &[&str]) -> Value {
    let devices: serde_json::Map<String, Value> = DEVICES
        .iter()
        .map(|name| {
            let value = if *name == "V_INFO" { 281_483_566_645_251_i64 } else { 0 };
            (
                (*name).to_string(),
                serde_json::json!({ "ok": !failing.contains(name), "value": value }),
            )
        })
        .collect();
    serde_json::json!({
        "sequence_number": sequence_number,
        "devices": devices,
        "imu_data": [0.0, 0.75, 0.0, 0.25, 0.0],
    })
}

fn write_json(dir: &TempDir, name: &str, value: &Value) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string_pretty(value)?)?;
    Ok(path)
}

#[test]
fn test_header_command() -> TestResult {
    factoryctl()?
        .arg("header")
        .assert()
        .success()
        .stdout(format!("{HEADER}\n"));
    Ok(())
}

#[test]
fn test_decode_version() -> TestResult {
    factoryctl()?
        .args(["decode-version", "0x0001000200000003"])
        .assert()
        .success()
        .stdout("1/2/3\n");

    factoryctl()?
        .args(["decode-version", "281483566645251", "--separator", ","])
        .assert()
        .success()
        .stdout("1,2,3\n");
    Ok(())
}

#[test]
fn test_decode_version_json() -> TestResult {
    let output = factoryctl()?
        .args(["--json", "decode-version", "0x0001000200000003"])
        .output()?;
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["hardware"], 1);
    assert_eq!(value["firmware"], 2);
    assert_eq!(value["software"], 3);
    Ok(())
}

#[test]
fn test_decode_version_rejects_garbage() -> TestResult {
    factoryctl()?
        .args(["decode-version", "v1.2"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid version word"));
    Ok(())
}

#[test]
fn test_record_appends_units() -> TestResult {
    let dir = TempDir::new()?;
    let log = dir.path().join("audit.csv");
    let pass = write_json(&dir, "pass.json", &unit_report(101, &[]))?;
    let fail = write_json(&dir, "fail.json", &unit_report(102, &["CLIFF_R", "SOUNDS"]))?;

    factoryctl()?
        .arg("--audit-log")
        .arg(&log)
        .arg("record")
        .arg(&pass)
        .arg(&fail)
        .assert()
        .success()
        .stdout(predicate::str::contains("101"))
        .stdout(predicate::str::contains("PASS"))
        .stdout(predicate::str::contains("FAIL"))
        .stdout(predicate::str::contains("CLIFF_R, SOUNDS"));

    let content = fs::read_to_string(&log)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines.first().copied(), Some(HEADER));
    assert!(lines.get(1).is_some_and(|line| line.starts_with("101,1,2,3,")));
    assert!(lines.get(1).is_some_and(|line| line.ends_with(",0.5,1,1,1,1,1,1,1,1")));
    assert!(lines.get(2).is_some_and(|line| line.starts_with("102,1,2,3,")));
    assert!(lines.get(3).is_some_and(|line| line.starts_with("102,1,1,1,")));
    Ok(())
}

#[test]
fn test_record_twice_keeps_single_header() -> TestResult {
    let dir = TempDir::new()?;
    let log = dir.path().join("audit.csv");
    let pass = write_json(&dir, "pass.json", &unit_report(7, &[]))?;

    for _ in 0..2 {
        factoryctl()?
            .env("FACTORYCTL_AUDIT_LOG", &log)
            .arg("record")
            .arg(&pass)
            .assert()
            .success();
    }

    let content = fs::read_to_string(&log)?;
    assert_eq!(content.matches(HEADER).count(), 1);
    assert_eq!(content.lines().count(), 3);
    Ok(())
}

#[test]
fn test_record_uses_config_audit_log() -> TestResult {
    let dir = TempDir::new()?;
    let log = dir.path().join("from-config.csv");
    let config = dir.path().join("station.yaml");
    fs::write(
        &config,
        format!("audit_log: {}\nstation_id: line-2\n", log.display()),
    )?;
    let pass = write_json(&dir, "pass.json", &unit_report(9, &[]))?;

    factoryctl()?
        .arg("--config")
        .arg(&config)
        .arg("record")
        .arg(&pass)
        .assert()
        .success();
    assert!(log.exists());
    Ok(())
}

#[test]
fn test_bad_config_exit_code() -> TestResult {
    let dir = TempDir::new()?;
    let config = dir.path().join("station.yaml");
    fs::write(&config, "audit_lgo: typo.csv\n")?;

    factoryctl()?
        .arg("--config")
        .arg(&config)
        .arg("header")
        .assert()
        .code(4);
    Ok(())
}

#[test]
fn test_invalid_report_writes_nothing() -> TestResult {
    let dir = TempDir::new()?;
    let log = dir.path().join("audit.csv");
    let pass = write_json(&dir, "pass.json", &unit_report(1, &[]))?;
    let broken = dir.path().join("broken.json");
    fs::write(&broken, "{ not json")?;

    factoryctl()?
        .arg("--audit-log")
        .arg(&log)
        .arg("record")
        .arg(&pass)
        .arg(&broken)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid unit report"));
    assert!(!log.exists());
    Ok(())
}

#[test]
fn test_misspelled_device_is_named_in_error() -> TestResult {
    let dir = TempDir::new()?;
    let log = dir.path().join("audit.csv");
    let report = dir.path().join("unit.json");
    fs::write(&report, r#"{"sequence_number":1,"devices":{"CLIF_L":{"ok":true}}}"#)?;

    factoryctl()?
        .arg("--audit-log")
        .arg(&log)
        .arg("record")
        .arg(&report)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown variant `CLIF_L`"))
        .stderr(predicate::str::contains("untagged").not());
    assert!(!log.exists());
    Ok(())
}

#[test]
fn test_nan_imu_sample_report_is_recorded() -> TestResult {
    let dir = TempDir::new()?;
    let log = dir.path().join("audit.csv");
    let mut unit = unit_report(11, &[]);
    unit["imu_data"] = serde_json::json!([0.0, null, 0.0, 0.25, 0.0]);
    let report = write_json(&dir, "unit.json", &unit)?;

    factoryctl()?
        .arg("--audit-log")
        .arg(&log)
        .arg("record")
        .arg(&report)
        .assert()
        .success();

    let content = fs::read_to_string(&log)?;
    assert!(content.lines().nth(1).is_some_and(|line| line.contains(",nan,")));
    Ok(())
}

#[test]
fn test_unwritable_audit_log_exit_code() -> TestResult {
    let dir = TempDir::new()?;
    let log = dir.path().join("missing-dir").join("audit.csv");
    let pass = write_json(&dir, "pass.json", &unit_report(1, &[]))?;

    factoryctl()?
        .arg("--audit-log")
        .arg(&log)
        .arg("record")
        .arg(&pass)
        .assert()
        .code(3);
    assert!(!log.exists());
    Ok(())
}

#[test]
fn test_summary_counts_units() -> TestResult {
    let dir = TempDir::new()?;
    let log = dir.path().join("audit.csv");
    let batch = Value::Array(vec![
        unit_report(1, &[]),
        unit_report(2, &["MOTOR_L"]),
        unit_report(3, &[]),
    ]);
    let reports = write_json(&dir, "batch.json", &batch)?;

    factoryctl()?
        .arg("--audit-log")
        .arg(&log)
        .arg("record")
        .arg(&reports)
        .assert()
        .success();

    let output = factoryctl()?
        .arg("--json")
        .arg("summary")
        .arg(&log)
        .output()?;
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["units"], 3);
    assert_eq!(value["passed"], 2);
    assert_eq!(value["failed"], 1);
    Ok(())
}
