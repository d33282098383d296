//! Smoke tests to verify command wiring. None of these reach a database.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A command isolated from the caller's DBCON, .env and settings file
fn ftpusers(dir: &TempDir) -> Command {
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "").unwrap();

    let mut cmd = Command::cargo_bin("ftpusers").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("DBCON")
        .env_remove("FTPUSERS_PASSWORD")
        .arg("--config")
        .arg(config);
    cmd
}

#[test]
fn test_top_level_help() {
    let mut cmd = Command::cargo_bin("ftpusers").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("account"))
        .stdout(predicate::str::contains("mapping"))
        .stdout(predicate::str::contains("login"));
}

#[test]
fn test_account_list_help() {
    let mut cmd = Command::cargo_bin("ftpusers").unwrap();
    cmd.arg("account").arg("list").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Page number"))
        .stdout(predicate::str::contains("--search"));
}

#[test]
fn test_mapping_set_help() {
    let mut cmd = Command::cargo_bin("ftpusers").unwrap();
    cmd.arg("mapping").arg("set").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Account id to map to"));
}

#[test]
fn test_account_get_rejects_non_numeric_id() {
    let dir = TempDir::new().unwrap();
    let mut cmd = ftpusers(&dir);
    cmd.arg("account").arg("get").arg("bob");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_missing_datasource() {
    let dir = TempDir::new().unwrap();
    let mut cmd = ftpusers(&dir);
    cmd.arg("account").arg("get").arg("1");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no datasource configured"));
}

#[test]
fn test_unsupported_protocol() {
    let dir = TempDir::new().unwrap();
    let mut cmd = ftpusers(&dir);
    cmd.arg("--datasource")
        .arg("sqlite://accounts.db")
        .arg("account")
        .arg("get")
        .arg("1");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("protocol sqlite not supported"));
}

#[test]
fn test_datasource_from_settings_file() {
    let dir = TempDir::new().unwrap();
    let mut cmd = ftpusers(&dir);
    std::fs::write(
        dir.path().join("config.toml"),
        "datasource = \"oracle://scott:tiger@db/orcl\"\n",
    )
    .unwrap();
    cmd.arg("mapping").arg("directory").arg("BillSys1");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("protocol oracle not supported"));
}
