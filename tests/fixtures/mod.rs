//! Shared test fixtures for E2E CLI tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use zmk_config::behaviours::Behaviour;
use zmk_config::catalog::Catalogs;
use zmk_config::codes::{BluetoothKeyCode, KeyCode};
use zmk_config::hardware::{Driver, Mcu};
use zmk_config::options::{ConfigOption, OptionKind};
use zmk_config::properties::Value;
use zmk_config::shields::ShieldRegistry;
use zmk_config::ZmkConfig;

/// Path to the zmk-config binary
pub fn zmk_config_bin() -> &'static str {
    env!("CARGO_BIN_EXE_zmk-config")
}

/// Creates a Command whose settings live in `settings_dir` instead of the
/// user's config directory.
pub fn isolated_command(args: &[&str], settings_dir: &Path) -> Command {
    let mut cmd = Command::new(zmk_config_bin());
    cmd.env("ZMK_CONFIG_DIR", settings_dir);
    cmd.env_remove("RUST_LOG");
    cmd.args(args);
    cmd
}

fn pins(values: &[i64]) -> Value {
    Value::List(values.iter().copied().map(Value::Integer).collect())
}

/// A complete 2x2 macro pad on a nice!nano v2.
///
/// Keys: `&kp A`, `&mo 1`, `&bt BT_CLR`, `&trans`.
pub fn macropad_config() -> ZmkConfig {
    let catalogs = Catalogs::load().unwrap();
    let shields = ShieldRegistry::load().unwrap();

    let mut config = ZmkConfig::new();
    config.set_config_name("Test Pad", &shields).unwrap();
    config.set_config_id("test_pad", &shields).unwrap();
    config.set_shield_directory("test_pad", &shields).unwrap();
    config.set_mcu(Mcu::NiceNanoV2);
    config.set_driver(Driver::matrix());
    config.set_driver_property("row-gpios", pins(&[4, 5])).unwrap();
    config.set_driver_property("col-gpios", pins(&[6, 7])).unwrap();
    config
        .set_driver_property("diode-direction", "col2row".into())
        .unwrap();
    for (row, col) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
        config.transform_mut().add_key(row, col, None).unwrap();
    }

    let a = KeyCode::new("A", &catalogs).unwrap();
    let clear = BluetoothKeyCode::new("BT_CLR", None, &catalogs).unwrap();
    config.modify_key_binding(0, Behaviour::key_press(a).unwrap()).unwrap();
    config.modify_key_binding(1, Behaviour::momentary_layer(1).unwrap()).unwrap();
    config.modify_key_binding(2, Behaviour::bluetooth(clear)).unwrap();
    config.modify_key_binding(3, Behaviour::Transparent).unwrap();

    let name = ConfigOption::new(OptionKind::KeyboardName, &config, Some("Test Pad".into())).unwrap();
    config.add_default_config_option(name).unwrap();
    config
}

/// The macro pad with mismatched bluetooth limits, valid but warned about.
pub fn macropad_with_warning() -> ZmkConfig {
    let mut config = macropad_config();
    let conn = ConfigOption::new(OptionKind::BtMaxConn, &config, Some(Value::Integer(3))).unwrap();
    config.add_config_option(conn).unwrap();
    let paired = ConfigOption::new(OptionKind::BtMaxPaired, &config, Some(Value::Integer(2))).unwrap();
    config.add_config_option(paired).unwrap();
    config
}

/// Saves `config` into a fresh temp directory.
///
/// Returns the file path and the TempDir (which must be kept alive).
pub fn create_temp_config_file(config: &ZmkConfig) -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    config.save_config(&path, false).unwrap();
    (path, temp_dir)
}

/// Writes raw `content` as a config file into a fresh temp directory.
pub fn create_raw_config_file(content: &str) -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, content).unwrap();
    (path, temp_dir)
}

/// Minimal export document: every core key present, nothing configured.
pub fn empty_config_json() -> serde_json::Value {
    serde_json::json!({
        "_config_name": null,
        "_features": [],
        "_mcu": null,
        "_default_config_options": [],
        "_config_options": [],
        "_driver": null,
        "_split_config_options": {"central": [], "peripheral": []},
        "_behaviours": [],
        "_keymap": []
    })
}

/// Parses stdout of a finished command as JSON.
pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("Should parse JSON output")
}
