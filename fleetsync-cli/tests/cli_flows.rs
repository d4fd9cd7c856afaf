use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn fleetsync(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_fleetsync"));
    cmd.env("FLEETSYNC_HOME", home).env("RUST_LOG", "warn");
    cmd
}

fn put_driver(home: &Path, id: &str) {
    fleetsync(home)
        .args([
            "user",
            "put",
            id,
            "--role",
            "driver",
            "--first-name",
            "Ann",
            "--last-name",
            "Lee",
            "--email",
            "a@x.com",
        ])
        .assert()
        .success()
        .stdout(contains("created"));
}

fn drivers_json(home: &Path) -> serde_json::Value {
    let output = fleetsync(home)
        .args(["driver", "list", "--json"])
        .output()
        .expect("run driver list");
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).expect("driver list json")
}

#[test]
fn putting_a_driver_user_shows_up_in_driver_list() {
    let home = TempDir::new().expect("home");
    put_driver(home.path(), "u1");

    fleetsync(home.path())
        .args(["driver", "list"])
        .assert()
        .success()
        .stdout(contains("Ann Lee").and(contains("a@x.com")));

    let drivers = drivers_json(home.path());
    let records = drivers.as_array().expect("array");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["driverId"], "u1");
    assert_eq!(records[0]["status"], "active");
    assert_eq!(records[0]["assignedBusNumber"], "");
    assert!(home.path().join(".fleetsync/store.yaml").exists());
}

#[test]
fn switching_to_rider_deactivates() {
    let home = TempDir::new().expect("home");
    put_driver(home.path(), "u1");

    fleetsync(home.path())
        .args(["user", "put", "u1", "--role", "rider"])
        .assert()
        .success()
        .stdout(contains("deactivated"));

    assert_eq!(drivers_json(home.path())[0]["status"], "inactive");
}

#[test]
fn assign_requires_caller_identity() {
    let home = TempDir::new().expect("home");
    put_driver(home.path(), "u1");

    fleetsync(home.path())
        .args(["driver", "assign", "u1", "--bus", "B12"])
        .assert()
        .failure()
        .stderr(contains("User must be authenticated"));

    fleetsync(home.path())
        .args(["driver", "assign", "u1", "--bus", "B12", "--route", "R7", "--as", "op"])
        .assert()
        .success()
        .stdout(contains("Driver assignment updated"));

    let drivers = drivers_json(home.path());
    assert_eq!(drivers[0]["assignedBusNumber"], "B12");
    assert_eq!(drivers[0]["assignedRoute"], "R7");
}

#[test]
fn assign_unknown_driver_fails() {
    let home = TempDir::new().expect("home");
    fleetsync(home.path())
        .args(["driver", "assign", "ghost", "--as", "op"])
        .assert()
        .failure()
        .stderr(contains("Driver not found"));
}

#[test]
fn reconcile_is_admin_only() {
    let home = TempDir::new().expect("home");
    put_driver(home.path(), "u1");

    fleetsync(home.path())
        .args(["reconcile", "--as", "op"])
        .assert()
        .failure()
        .stderr(contains("Only admins can sync drivers"));

    fleetsync(home.path())
        .args(["admin", "grant", "op"])
        .assert()
        .success();

    let output = fleetsync(home.path())
        .args(["reconcile", "--as", "op", "--json"])
        .output()
        .expect("run reconcile");
    assert!(output.status.success());
    let response: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(response["message"], "Driver sync completed");
    assert_eq!(response["created"], 0);
    assert_eq!(response["updated"], 1);
    assert_eq!(response["total"], 1);
}

#[test]
fn config_file_enables_reactivation() {
    let home = TempDir::new().expect("home");
    std::fs::create_dir_all(home.path().join(".fleetsync")).expect("data dir");
    std::fs::write(
        home.path().join(".fleetsync/config.yaml"),
        "reactivate_on_return: true\n",
    )
    .expect("write config");

    put_driver(home.path(), "u1");
    fleetsync(home.path())
        .args(["user", "put", "u1", "--role", "rider"])
        .assert()
        .success();
    fleetsync(home.path())
        .args(["user", "put", "u1", "--role", "driver"])
        .assert()
        .success()
        .stdout(contains("reactivated"));

    assert_eq!(drivers_json(home.path())[0]["status"], "active");
}

#[test]
fn removing_unknown_user_fails() {
    let home = TempDir::new().expect("home");
    fleetsync(home.path())
        .args(["user", "rm", "nobody"])
        .assert()
        .failure()
        .stderr(contains("does not exist"));
}
