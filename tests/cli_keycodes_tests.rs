//! End-to-end tests for `zmk-config keycodes` command.

use tempfile::TempDir;

mod fixtures;
use fixtures::*;

#[test]
fn test_keycodes_output_catalog_json() {
    let settings = TempDir::new().unwrap();
    let output = isolated_command(&["keycodes", "--catalog", "output", "--json"], settings.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let result = stdout_json(&output);
    let keycodes = result["keycodes"].as_array().unwrap();
    assert_eq!(result["total"], keycodes.len());
    assert!(!keycodes.is_empty());
    assert!(keycodes
        .iter()
        .all(|code| code["catalog"] == "output key code"));
    assert!(keycodes.iter().any(|code| code["name"] == "OUT_USB"));
}

#[test]
fn test_keycodes_search_ranks_exact_name_first() {
    let settings = TempDir::new().unwrap();
    let output = isolated_command(
        &["keycodes", "--catalog", "key", "--search", "a", "--json"],
        settings.path(),
    )
    .output()
    .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let result = stdout_json(&output);
    let first = &result["keycodes"][0];
    assert_eq!(first["name"], "A");
    assert_eq!(first["description"], "Letter A");
    assert_eq!(first["context"], "Keyboard Letters");
}

#[test]
fn test_keycodes_all_catalogs() {
    let settings = TempDir::new().unwrap();
    let output = isolated_command(&["keycodes", "--json"], settings.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let result = stdout_json(&output);
    let keycodes = result["keycodes"].as_array().unwrap();
    for catalog in [
        "key code",
        "function modifier",
        "bluetooth key code",
        "output key code",
    ] {
        assert!(
            keycodes.iter().any(|code| code["catalog"] == catalog),
            "missing {catalog}"
        );
    }
}

#[test]
fn test_keycodes_search_without_match() {
    let settings = TempDir::new().unwrap();
    let output = isolated_command(&["keycodes", "--search", "zzz_no_such_code"], settings.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_keycodes_search_without_match_json() {
    let settings = TempDir::new().unwrap();
    let output = isolated_command(
        &["keycodes", "--search", "zzz_no_such_code", "--json"],
        settings.path(),
    )
    .output()
    .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let result = stdout_json(&output);
    assert_eq!(result["total"], 0);
    assert!(result["keycodes"].as_array().unwrap().is_empty());
}

#[test]
fn test_keycodes_invalid_catalog() {
    let settings = TempDir::new().unwrap();
    let output = isolated_command(&["keycodes", "--catalog", "mouse"], settings.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(2), "clap rejects unknown values");
}
