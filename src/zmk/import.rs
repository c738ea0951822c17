//! Loading an exported configuration.
//!
//! The file is parsed into an [`ExportedConfig`] and replayed through the
//! regular setters, so a loaded configuration passes the same checks as one
//! built by hand: catalog names are resolved again, identity is checked
//! against the shield registry and options are validated against the
//! restored split state.

use super::{ExportedConfig, OptionTarget, SplitSide, ZmkConfig};
use crate::catalog::Catalogs;
use crate::error::{Result, ZmkError};
use crate::models::DynamicArray;
use crate::shields::ShieldRegistry;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

impl ZmkConfig {
    /// Reads and re-validates a configuration saved with
    /// [`save_config`](Self::save_config).
    pub fn load_config(path: &Path, catalogs: &Catalogs, shields: &ShieldRegistry) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let exported: ExportedConfig = serde_json::from_str(&content)?;
        let config = Self::from_export(exported, catalogs, shields)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Rebuilds a configuration from its exported form.
    pub fn from_export(
        exported: ExportedConfig,
        catalogs: &Catalogs,
        shields: &ShieldRegistry,
    ) -> Result<Self> {
        if !exported.features.is_empty() {
            return Err(ZmkError::NotImplemented("features"));
        }

        let mut config = Self::new();

        if let Some(name) = &exported.config_name {
            config.set_config_name(name, shields)?;
        }
        if let Some(id) = &exported.config_id {
            config.set_config_id(id, shields)?;
        }
        if let Some(directory) = &exported.shield_directory {
            config.set_shield_directory(directory, shields)?;
        }
        if let Some(directory) = &exported.working_directory {
            // Saved files move between machines; a stale directory is dropped.
            if let Err(e) = config.set_working_directory(directory) {
                warn!("Ignoring working directory: {}", e);
            }
        }

        // Before any key data, since a layout change clears it.
        config.set_physical_layout(exported.physical_layout);
        config.set_split(exported.split);

        if let Some(mcu) = exported.mcu {
            config.set_mcu(mcu);
        }
        if let Some(driver) = exported.driver {
            config.set_driver(driver.fresh());
            for property in driver.get_properties() {
                if let Some(value) = property.value {
                    config.set_driver_property(property.name, value)?;
                }
            }
        }

        for option in exported.default_config_options {
            config.add_option(OptionTarget::Default, option)?;
        }
        for option in exported.config_options {
            config.add_option(OptionTarget::Regular, option)?;
        }
        for (side, options) in [
            (SplitSide::Central, exported.split_config_options.central),
            (SplitSide::Peripheral, exported.split_config_options.peripheral),
        ] {
            for option in options {
                config.add_option(OptionTarget::Split(side), option)?;
            }
        }

        for mut behaviour in exported.behaviours {
            behaviour.relink(catalogs)?;
            config.add_behaviour(behaviour);
        }

        let mut slots = Vec::with_capacity(exported.keymap.len());
        for slot in exported.keymap.iter() {
            let slot = match slot {
                Some(behaviour) => {
                    let mut behaviour = behaviour.clone();
                    behaviour.relink(catalogs)?;
                    Some(behaviour)
                }
                None => None,
            };
            slots.push(slot);
        }
        config.set_keymap(DynamicArray::from_slots(slots));
        config.set_transform(exported.transform);

        debug!(
            "Restored {} keymap slots, {} transform slots",
            config.keymap.len(),
            config.transform.len()
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviours::Behaviour;
    use crate::codes::{BluetoothKeyCode, FunctionModifier, KeyBinding, KeyCode};
    use crate::hardware::{Driver, Mcu};
    use crate::models::PhysicalKey;
    use crate::options::{ConfigOption, OptionKind};
    use crate::properties::Value;
    use serde_json::json;
    use tempfile::TempDir;

    fn catalogs() -> Catalogs {
        Catalogs::load().unwrap()
    }

    fn shields() -> ShieldRegistry {
        ShieldRegistry::load().unwrap()
    }

    fn full_config(dir: &Path) -> ZmkConfig {
        let catalogs = catalogs();
        let shields = shields();
        let mut config = ZmkConfig::new();
        config.set_config_name("Round Trip", &shields).unwrap();
        config.set_config_id("round_trip", &shields).unwrap();
        config.set_shield_directory("round_trip", &shields).unwrap();
        config.set_working_directory(dir).unwrap();
        config.set_physical_layout(vec![
            PhysicalKey::new(0.0, 0.0),
            PhysicalKey::new(1.0, 0.0).with_rotation(15.0, 1.0, 0.0),
            PhysicalKey::new(2.0, 0.0).with_width(1.5),
        ]);
        config.set_split(true);
        config.set_mcu(Mcu::NiceNanoV2);
        config.set_driver(Driver::matrix());
        config
            .set_driver_property("row-gpios", Value::List(vec![Value::Integer(4)]))
            .unwrap();
        config
            .set_driver_property("col-gpios", Value::List(vec!["A0".into(), Value::Integer(5)]))
            .unwrap();

        config.transform_mut().add_key(0, 0, None).unwrap();
        config.transform_mut().add_key(0, 1, Some(2)).unwrap();

        let a = KeyCode::new("A", &catalogs).unwrap();
        let ctrl_a = FunctionModifier::new("LC(xx)", a.clone(), &catalogs).unwrap();
        let bt = BluetoothKeyCode::new("BT_SEL(xx)", Some(1), &catalogs).unwrap();
        config.modify_key_binding(0, Behaviour::layer_tap(1, ctrl_a).unwrap()).unwrap();
        config.modify_key_binding(2, Behaviour::bluetooth(bt)).unwrap();
        config.add_behaviour(Behaviour::key_press(a).unwrap());

        let conn = ConfigOption::new(OptionKind::BtMaxConn, &config, Some(Value::Integer(3))).unwrap();
        config.add_split_config_option(SplitSide::Central, conn).unwrap();
        let role = ConfigOption::new(OptionKind::SplitRoleCentral, &config, Some(Value::Bool(true))).unwrap();
        config.add_split_config_option(SplitSide::Central, role).unwrap();
        let name = ConfigOption::new(OptionKind::KeyboardName, &config, Some("Round Trip".into())).unwrap();
        config.add_default_config_option(name).unwrap();
        config
    }

    #[test]
    fn test_save_then_load_is_lossless() {
        let dir = TempDir::new().unwrap();
        let config = full_config(dir.path());
        let path = dir.path().join("round_trip.json");
        config.save_config(&path, false).unwrap();

        let loaded = ZmkConfig::load_config(&path, &catalogs(), &shields()).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.get_keymap().len(), 3);
        assert!(loaded.get_keymap().get(1).unwrap().is_none());
    }

    #[test]
    fn test_relinks_descriptions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("board.json");
        full_config(dir.path()).save_config(&path, false).unwrap();

        let loaded = ZmkConfig::load_config(&path, &catalogs(), &shields()).unwrap();
        let Some(Behaviour::KeyPress {
            binding: Some(binding),
        }) = loaded.behaviours().first()
        else {
            panic!("expected a key press behaviour");
        };
        assert_eq!(binding.to_string(), "KeyCode('A')");
        let KeyBinding::KeyCode(code) = binding else {
            panic!("expected a key code");
        };
        assert_eq!(code.description(), "Letter A");
    }

    fn load_value(value: serde_json::Value) -> Result<ZmkConfig> {
        let exported: ExportedConfig = serde_json::from_value(value)?;
        ZmkConfig::from_export(exported, &catalogs(), &shields())
    }

    fn minimal() -> serde_json::Value {
        json!({
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

    #[test]
    fn test_load_minimal_core_keys() {
        let config = load_value(minimal()).unwrap();
        assert_eq!(config, ZmkConfig::new());
    }

    #[test]
    fn test_load_rejects_unknown_key_code() {
        let mut value = minimal();
        value["_keymap"] = json!([{"KeyPress": {"binding": {"KeyCode": {"name": "NOT_A_KEY"}}}}]);
        assert!(matches!(load_value(value), Err(ZmkError::UnknownKey { .. })));
    }

    #[test]
    fn test_load_rejects_taken_name() {
        let mut value = minimal();
        value["_config_name"] = json!("Corne");
        assert!(matches!(load_value(value), Err(ZmkError::AlreadyTaken { .. })));
    }

    #[test]
    fn test_load_rejects_features() {
        let mut value = minimal();
        value["_features"] = json!([{"name": "encoder"}]);
        assert!(matches!(load_value(value), Err(ZmkError::NotImplemented(_))));
    }

    #[test]
    fn test_load_revalidates_options_against_split() {
        let mut value = minimal();
        value["_split_config"] = json!(true);
        value["_config_options"] = json!([{"BT_MAX_PAIRED": 1}]);
        assert!(matches!(load_value(value), Err(ZmkError::InvalidValue { .. })));
    }

    #[test]
    fn test_load_revalidates_driver_pins() {
        let mut value = minimal();
        value["_mcu"] = json!("NiceNanoV2");
        value["_driver"] = json!({"MatrixDriver": {"row-gpios": [11]}});
        assert!(matches!(load_value(value), Err(ZmkError::UnknownKey { .. })));
    }

    #[test]
    fn test_load_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let err = ZmkConfig::load_config(&path, &catalogs(), &shields()).unwrap_err();
        assert!(matches!(err, ZmkError::Json(_)));
    }
}
