#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! migration

mod common;

use assert_cmd::Command;
use common::{TestProject, VALID_PROJECT};
use predicates::prelude::*;

fn fleetform() -> Command {
    let mut cmd = Command::cargo_bin("fleetform").unwrap();
    cmd.env_remove("FLEETFORM_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_cli_help() {
    fleetform()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("GameLift"))
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_cli_version() {
    fleetform()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fleetform"));
}

#[test]
fn test_create_help() {
    fleetform()
        .args(["create", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<NAME>"))
        .stdout(predicate::str::contains("--replace"));
}

#[test]
fn test_invalid_command() {
    fleetform().arg("invalid-command").assert().failure();
}

#[test]
fn test_missing_project_file() {
    let project = TestProject::new();
    let config_home = tempfile::tempdir().unwrap();
    fleetform()
        .current_dir(project.path())
        .env("XDG_CONFIG_HOME", config_home.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Project file not found"));
}

#[test]
fn test_validate_ok() {
    let project = TestProject::new();
    project.write_project_file(VALID_PROJECT);
    fleetform()
        .current_dir(project.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("arena"))
        .stdout(predicate::str::contains("Project file is valid"));
}

#[test]
fn test_validate_reports_bad_fleet() {
    let project = TestProject::new();
    let file = project.write_project_file(
        r#"
fleets:
  arena:
    ec2_instance_type: c5.large
    name: fleet-A
    ec2_inbound_permissions:
      - from_port: 0
        to_port: 7780
        ip_range: 0.0.0.0/0
        protocol: SCTP
"#,
    );
    fleetform()
        .arg("--config")
        .arg(&file)
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("build_id is required"))
        .stderr(predicate::str::contains("protocol must be TCP or UDP"));
}

#[test]
fn test_validate_rejects_unknown_field() {
    let project = TestProject::new();
    let file = project.write_project_file(
        "fleets:\n  arena:\n    name: fleet-A\n    routing_strategy: SIMPLE\n",
    );
    fleetform()
        .arg("--config")
        .arg(&file)
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse"));
}

#[test]
fn test_list_without_state() {
    let project = TestProject::new();
    project.write_project_file(VALID_PROJECT);
    fleetform()
        .current_dir(project.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("not created"));
}

#[test]
fn test_list_with_recorded_fleets() {
    let project = TestProject::new();
    project.write_project_file(VALID_PROJECT);
    project.write_state(
        r#"{
  "version": 1,
  "updated_at": "2026-01-01T00:00:00Z",
  "resources": {
    "gamelift_fleet:arena": {
      "id": "fleet-123",
      "resource_type": "gamelift_fleet",
      "status": "active",
      "remote_status": "ACTIVE",
      "attributes": {},
      "updated_at": "2026-01-01T00:00:00Z"
    },
    "gamelift_fleet:retired": {
      "id": "fleet-9",
      "resource_type": "gamelift_fleet",
      "status": "active",
      "updated_at": "2026-01-01T00:00:00Z"
    }
  }
}"#,
    );
    fleetform()
        .current_dir(project.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("fleet-123"))
        .stdout(predicate::str::contains("no longer declared"))
        .stdout(predicate::str::contains("fleet-9"));
}

#[test]
fn test_create_undeclared_fleet() {
    let project = TestProject::new();
    project.write_project_file(VALID_PROJECT);
    fleetform()
        .current_dir(project.path())
        .args(["create", "lobby"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not declared"));
}

#[test]
fn test_delete_unmanaged_fleet() {
    let project = TestProject::new();
    project.write_project_file(VALID_PROJECT);
    fleetform()
        .current_dir(project.path())
        .args(["delete", "arena"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to delete"));
    assert!(!project.path().join(".fleetform/lock.json").exists());
}
