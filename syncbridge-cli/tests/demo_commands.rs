use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn syncbridge_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("syncbridge"));
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("RUST_LOG", "warn")
        .env("NO_COLOR", "1");
    cmd
}

fn demo_file(home: &Path, rel: &str) -> PathBuf {
    home.join("SyncBridge").join(rel)
}

fn status_json(home: &Path, paths: &[PathBuf]) -> Value {
    let assert = syncbridge_cmd(home)
        .arg("--demo")
        .arg("status")
        .args(paths)
        .arg("--json")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("stdout utf8");
    serde_json::from_str(&stdout).expect("status JSON")
}

#[test]
fn status_reports_demo_files_as_json() {
    let home = TempDir::new().expect("home");
    let report = status_json(
        home.path(),
        &[
            demo_file(home.path(), "Documents/report.odt"),
            demo_file(home.path(), "Photos/trip.jpg"),
            home.path().join("elsewhere.txt"),
        ],
    );

    assert_eq!(report["daemon_running"], Value::Bool(true));
    assert_eq!(
        report["sync_root"],
        home.path().join("SyncBridge").display().to_string()
    );
    let files = report["files"].as_array().expect("files array");
    assert_eq!(files.len(), 3);
    assert_eq!(files[0]["status"], "synced");
    assert_eq!(files[0]["in_sync_root"], Value::Bool(true));
    assert_eq!(files[1]["status"], "cloud-only");
    assert_eq!(files[1]["label"], "Cloud Only");
    assert_eq!(files[2]["status"], "unknown");
    assert_eq!(files[2]["in_sync_root"], Value::Bool(false));
}

#[test]
fn status_table_shows_labels() {
    let home = TempDir::new().expect("home");
    syncbridge_cmd(home.path())
        .arg("--demo")
        .arg("status")
        .arg(demo_file(home.path(), "budget.xlsx"))
        .assert()
        .success()
        .stdout(contains("Conflict"))
        .stdout(contains("Sync root:"));
}

#[test]
fn relative_paths_resolve_against_working_directory() {
    let home = TempDir::new().expect("home");
    let root = home.path().join("SyncBridge");
    fs::create_dir_all(&root).expect("create root");

    let assert = syncbridge_cmd(home.path())
        .current_dir(&root)
        .args(["--demo", "status", "notes.md", "--json"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("stdout utf8");
    let report: Value = serde_json::from_str(&stdout).expect("status JSON");
    assert_eq!(report["files"][0]["status"], "syncing");
}

#[test]
fn status_requires_a_path() {
    let home = TempDir::new().expect("home");
    syncbridge_cmd(home.path())
        .args(["--demo", "status"])
        .assert()
        .failure();
}

#[test]
fn pin_succeeds_for_cloud_only_file() {
    let home = TempDir::new().expect("home");
    syncbridge_cmd(home.path())
        .arg("--demo")
        .arg("pin")
        .arg(demo_file(home.path(), "Photos/trip.jpg"))
        .assert()
        .success()
        .stdout(contains("ok pin"));
}

#[test]
fn failed_action_prints_notification_and_exits_nonzero() {
    let home = TempDir::new().expect("home");
    syncbridge_cmd(home.path())
        .arg("--demo")
        .arg("unpin")
        .arg(demo_file(home.path(), "Documents/report.odt"))
        .arg(demo_file(home.path(), "locked.xlsx"))
        .assert()
        .failure()
        .stdout(contains("ok unpin"))
        .stdout(contains("failed unpin"))
        .stdout(contains("File In Use"))
        .stderr(contains("1 of 2 unpin request(s) failed"));
}

#[test]
fn root_prints_resolved_sync_root() {
    let home = TempDir::new().expect("home");
    let expected = home.path().join("SyncBridge");
    syncbridge_cmd(home.path())
        .args(["--demo", "root"])
        .assert()
        .success()
        .stdout(contains(expected.display().to_string()));
}

#[test]
fn watch_prints_status_changes() {
    let home = TempDir::new().expect("home");
    let notes = demo_file(home.path(), "notes.md");
    syncbridge_cmd(home.path())
        .args(["--demo", "watch", "--for-secs", "1"])
        .assert()
        .success()
        .stdout(contains("watching (daemon available)"))
        .stdout(contains(format!("status-changed {} synced", notes.display())));
}

#[test]
fn malformed_config_is_reported() {
    let home = TempDir::new().expect("home");
    let dir = home.path().join(".config").join("syncbridge");
    fs::create_dir_all(&dir).expect("config dir");
    fs::write(dir.join("client.yaml"), "query_timeout_ms: [unterminated\n").expect("write config");

    syncbridge_cmd(home.path())
        .args(["--demo", "root"])
        .assert()
        .failure()
        .stderr(contains("failed to load client config"));
}

#[test]
fn excluded_emblem_follows_config_policy() {
    let home = TempDir::new().expect("home");
    let thumbs = demo_file(home.path(), ".cache/thumbs.db");

    let report = status_json(home.path(), std::slice::from_ref(&thumbs));
    assert_eq!(report["files"][0]["status"], "excluded");
    assert_eq!(report["files"][0]["emblem"], Value::Null);

    let dir = home.path().join(".config").join("syncbridge");
    fs::create_dir_all(&dir).expect("config dir");
    fs::write(dir.join("client.yaml"), "excluded_marker: distinct\n").expect("write config");

    let report = status_json(home.path(), &[thumbs]);
    assert_eq!(report["files"][0]["emblem"], "syncbridge-excluded");
}

#[test]
fn menu_offers_actions_by_status() {
    let home = TempDir::new().expect("home");
    syncbridge_cmd(home.path())
        .arg("--demo")
        .arg("menu")
        .arg(demo_file(home.path(), "Photos/trip.jpg"))
        .arg(demo_file(home.path(), "Documents/report.odt"))
        .assert()
        .success()
        .stdout(contains("Keep Available Offline"))
        .stdout(contains("Free Up Space"))
        .stdout(contains("Sync Now"));
}

#[test]
fn menu_is_empty_outside_sync_root() {
    let home = TempDir::new().expect("home");
    syncbridge_cmd(home.path())
        .arg("--demo")
        .arg("menu")
        .arg(home.path().join("Downloads/setup.bin"))
        .assert()
        .success()
        .stdout(contains("no actions"));
}

#[test]
fn menu_uses_the_daemon_reported_root() {
    let home = TempDir::new().expect("home");
    syncbridge_cmd(home.path())
        .arg("--demo")
        .arg("menu")
        .arg(home.path().join("OneDrive/report.odt"))
        .assert()
        .success()
        .stdout(contains("no actions"))
        .stdout(contains(home.path().join("SyncBridge").display().to_string()));
}
