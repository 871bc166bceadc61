use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn comisiones_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("comisiones"))
}

#[test]
fn test_help() {
    comisiones_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Sales commission reporting for Zoho Books/Inventory",
        ));
}

#[test]
fn test_version() {
    comisiones_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("comisiones"));
}

#[test]
fn test_init_creates_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("comisiones-config");

    comisiones_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized comisiones config"));

    assert!(config_path.join("config.toml").exists());
    let template = fs::read_to_string(config_path.join("config.toml")).unwrap();
    assert!(template.contains("[zoho]"));
    assert!(template.contains("[commission]"));
}

#[test]
fn test_init_fails_if_exists() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("comisiones-config");

    comisiones_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    comisiones_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_report_without_init() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent");

    comisiones_cmd()
        .args(["-C", config_path.to_str().unwrap(), "report"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_report_rejects_invalid_date() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("comisiones-config");

    comisiones_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    comisiones_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "report",
            "--from",
            "01/02/2025",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}

#[test]
fn test_report_rejects_out_of_range_rate() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("comisiones-config");

    comisiones_cmd()
        .args(["-C", config_path.to_str().unwrap(), "init"])
        .assert()
        .success();

    comisiones_cmd()
        .args([
            "-C",
            config_path.to_str().unwrap(),
            "report",
            "--rate-vida",
            "250",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid rate"));
}

#[test]
fn test_report_requires_credentials() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("comisiones-config");
    fs::create_dir_all(&config_path).unwrap();
    fs::write(
        config_path.join("config.toml"),
        r#"[zoho]
client_id = ""
client_secret = "secret"
refresh_token = "token"
organization_id = "42"
"#,
    )
    .unwrap();

    comisiones_cmd()
        .args(["-C", config_path.to_str().unwrap(), "report"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing Zoho credential"));
}

#[test]
fn test_salespersons_without_init() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nonexistent");

    comisiones_cmd()
        .args(["-C", config_path.to_str().unwrap(), "salespersons"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_report_rejects_malformed_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("comisiones-config");
    fs::create_dir_all(&config_path).unwrap();
    fs::write(config_path.join("config.toml"), "not valid toml [").unwrap();

    comisiones_cmd()
        .args(["-C", config_path.to_str().unwrap(), "report"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}
