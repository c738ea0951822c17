//! End-to-end tests for `zmk-config new` command.

use std::fs;
use tempfile::TempDir;

mod fixtures;
use fixtures::*;

#[test]
fn test_new_writes_skeleton() {
    let settings = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let path = work.path().join("board.json");

    let output = isolated_command(
        &["new", "--name", "My Board", "--id", "my_board", "--output", path.to_str().unwrap()],
        settings.path(),
    )
    .output()
    .expect("Failed to execute command");

    assert_eq!(
        output.status.code(),
        Some(0),
        "New should succeed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains('\n'), "Pretty output by default");
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value["_config_name"], "My Board");
    assert_eq!(value["_config_id"], "my_board");
    assert_eq!(value["_shield_directory"], "my_board");
    assert_eq!(value["_mcu"], "NiceNanoV2");
    assert!(value["_driver"].get("MatrixDriver").is_some());
    assert_eq!(value["_split_config"], false);
}

#[test]
fn test_new_rejects_taken_name() {
    let settings = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let path = work.path().join("board.json");

    let output = isolated_command(
        &["new", "--name", "Corne", "--id", "my_corne", "--output", path.to_str().unwrap()],
        settings.path(),
    )
    .output()
    .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    assert!(!path.exists());
}

#[test]
fn test_new_rejects_bad_id() {
    let settings = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let path = work.path().join("board.json");

    let output = isolated_command(
        &["new", "--name", "My Board", "--id", "My-Board", "--output", path.to_str().unwrap()],
        settings.path(),
    )
    .output()
    .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_new_respects_overwrite() {
    let settings = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let path = work.path().join("board.json");
    fs::write(&path, "{}").unwrap();
    let path_str = path.to_str().unwrap();

    let refused = isolated_command(
        &["new", "--name", "My Board", "--id", "my_board", "--output", path_str],
        settings.path(),
    )
    .output()
    .expect("Failed to execute command");
    assert_eq!(refused.status.code(), Some(1));
    assert_eq!(fs::read_to_string(&path).unwrap(), "{}");

    let replaced = isolated_command(
        &["new", "--name", "My Board", "--id", "my_board", "--output", path_str, "--overwrite"],
        settings.path(),
    )
    .output()
    .expect("Failed to execute command");
    assert_eq!(replaced.status.code(), Some(0));
    assert_ne!(fs::read_to_string(&path).unwrap(), "{}");
}

#[test]
fn test_new_then_validate_reports_missing_pins() {
    let settings = TempDir::new().unwrap();
    let work = TempDir::new().unwrap();
    let path = work.path().join("board.json");
    let path_str = path.to_str().unwrap();

    let created = isolated_command(
        &["new", "--name", "My Board", "--id", "my_board", "--split", "--output", path_str],
        settings.path(),
    )
    .output()
    .expect("Failed to execute command");
    assert_eq!(created.status.code(), Some(0));

    let output = isolated_command(&["validate", "--config", path_str, "--json"], settings.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let result = stdout_json(&output);
    let errors = result["errors"].as_array().unwrap();
    assert!(errors.iter().any(|error| error["kind"] == "InvalidDriver"));
}
