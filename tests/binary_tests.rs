//! Integration tests for the queryguard binary.

use std::fs;

use assert_cmd::{Command, cargo::cargo_bin_cmd};
use predicates::prelude::*;
use tempfile::TempDir;

/// Command isolated from settings files of the machine running the tests
fn cmd(workdir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("queryguard");
    cmd.current_dir(workdir.path())
        .env("HOME", workdir.path())
        .env_remove("QUERYGUARD_SELECT")
        .env_remove("QUERYGUARD_ENABLED")
        .env_remove("QUERYGUARD_IGNORE")
        .env_remove("QUERYGUARD_DISABLED")
        .env_remove("QUERYGUARD_OUTPUT")
        .env_remove("QUERYGUARD_DEBUG");
    cmd
}

fn workspace(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("sql")).unwrap();
    for (name, content) in files {
        fs::write(dir.path().join("sql").join(name), content).unwrap();
    }
    dir
}

#[test]
fn test_clean_directory_exits_zero() {
    let dir = workspace(&[("select.sql", "SELECT id FROM dbo.orders;")]);
    cmd(&dir)
        .args(["sql", "--no-color"])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("Passed"));
}

#[test]
fn test_violations_exit_one() {
    let dir = workspace(&[
        ("a.sql", "SELECT 1;"),
        ("b.sql", "CREATE LOGIN alice WITH PASSWORD = 'p';")
    ]);
    cmd(&dir)
        .args(["sql", "--no-color"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("NoCreateLogin (S001)"))
        .stdout(predicate::str::contains("Failed"));
}

#[test]
fn test_json_output() {
    let dir = workspace(&[("deploy.sql", "EXEC ('SELECT 1')\nGO\n")]);
    let output = cmd(&dir)
        .args(["sql/deploy.sql", "--output", "json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["status"], "Failed");
    assert_eq!(json[0]["violations"][0]["id"], "S013");
    assert_eq!(json[0]["violations"][0]["statement"], "EXEC ('SELECT 1')");
}

#[test]
fn test_select_and_ignore() {
    let dir = workspace(&[("deploy.sql", "DROP LOGIN alice; EXEC ('SELECT 1');")]);
    cmd(&dir)
        .args(["sql", "--no-color", "--ignore", "S002,S013"])
        .assert()
        .code(0);
    cmd(&dir)
        .args(["sql", "--no-color", "--select", "S013"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("S013"))
        .stdout(predicate::str::contains("S002").not());
}

#[test]
fn test_settings_file_in_working_directory() {
    let dir = workspace(&[("deploy.sql", "DROP LOGIN alice;")]);
    fs::write(
        dir.path().join("queryguard.toml"),
        "[tool.queryguard]\ndisabled = [\"S002\"]\n"
    )
    .unwrap();
    cmd(&dir).args(["sql"]).assert().code(0);
}

#[test]
fn test_environment_settings() {
    let dir = workspace(&[("deploy.sql", "DROP LOGIN alice;")]);
    cmd(&dir)
        .env("QUERYGUARD_OUTPUT", "yaml")
        .args(["sql"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("id: S002"));
}

#[test]
fn test_explicit_settings_file() {
    let dir = workspace(&[("deploy.sql", "DROP LOGIN alice;")]);
    fs::write(dir.path().join("ci.toml"), "output = \"json\"\n").unwrap();
    cmd(&dir)
        .args(["sql", "--settings", "ci.toml"])
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("["));
}

#[test]
fn test_missing_path_exits_two() {
    let dir = TempDir::new().unwrap();
    cmd(&dir)
        .arg("does-not-exist")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_unknown_selector_exits_two() {
    let dir = workspace(&[("deploy.sql", "SELECT 1;")]);
    cmd(&dir)
        .args(["sql", "--select", "X01"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_invalid_output_setting_exits_two() {
    let dir = workspace(&[("deploy.sql", "SELECT 1;")]);
    cmd(&dir)
        .env("QUERYGUARD_OUTPUT", "sarif")
        .arg("sql")
        .assert()
        .code(2);
}

#[test]
fn test_no_arguments_is_usage_error() {
    let dir = TempDir::new().unwrap();
    cmd(&dir).assert().code(2);
}

#[test]
fn test_list_rules() {
    let dir = TempDir::new().unwrap();
    cmd(&dir)
        .args(["--list-rules", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::contains("S001  NoCreateLogin"))
        .stdout(predicate::str::contains("S024"));
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    cmd(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("queryguard"));
}

#[test]
fn test_debug_logs_to_stderr() {
    let dir = workspace(&[("deploy.sql", "SELECT 1;")]);
    cmd(&dir)
        .args(["sql", "--debug", "--output", "json"])
        .assert()
        .code(0)
        .stderr(predicate::str::contains("resolved setting"))
        .stderr(predicate::str::contains("discovered SQL files"));
}
