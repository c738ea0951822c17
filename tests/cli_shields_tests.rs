//! End-to-end tests for `zmk-config shields` command.

use tempfile::TempDir;

mod fixtures;
use fixtures::*;

#[test]
fn test_shields_list_json() {
    let settings = TempDir::new().unwrap();
    let output = isolated_command(&["shields", "--json"], settings.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let result = stdout_json(&output);
    let shields = result["shields"].as_array().unwrap();
    assert_eq!(result["total"], shields.len());
    assert!(shields
        .iter()
        .any(|shield| shield["name"] == "Corne" && shield["directory_name"] == "corne"));
}

#[test]
fn test_shields_taken_name() {
    let settings = TempDir::new().unwrap();
    let output = isolated_command(&["shields", "--name", "Corne", "--json"], settings.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1), "Taken name should exit 1");
    let result = stdout_json(&output);
    assert_eq!(result["available"], false);
    assert_eq!(result["checks"][0]["field"], "name");
    assert_eq!(result["checks"][0]["available"], false);
}

#[test]
fn test_shields_available_values() {
    let settings = TempDir::new().unwrap();
    let output = isolated_command(
        &["shields", "--name", "My Board", "--id", "my_board", "--directory", "my_board", "--json"],
        settings.path(),
    )
    .output()
    .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let result = stdout_json(&output);
    assert_eq!(result["available"], true);
    assert_eq!(result["checks"].as_array().unwrap().len(), 3);
}

#[test]
fn test_shields_name_check_is_case_sensitive() {
    let settings = TempDir::new().unwrap();
    let output = isolated_command(&["shields", "--name", "corne"], settings.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("available"));
}
