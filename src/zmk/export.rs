//! JSON snapshot of a configuration and saving it to disk.

use super::{Feature, SplitOptions, ZmkConfig};
use crate::behaviours::Behaviour;
use crate::error::{Result, ZmkError};
use crate::hardware::{Driver, Mcu};
use crate::models::{DynamicArray, PhysicalKey};
use crate::options::ConfigOption;
use crate::transform::MatrixTransform;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Exported form of a [`ZmkConfig`].
///
/// Entities are tagged with their variant name, e.g.
/// `{"KeyPress": {"binding": {"KeyCode": {"name": "A"}}}}`. Fields beyond the
/// nine core keys default when absent so older exports still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedConfig {
    /// Keyboard name
    #[serde(rename = "_config_name")]
    pub config_name: Option<String>,
    /// Shield id
    #[serde(rename = "_config_id", default)]
    pub config_id: Option<String>,
    /// Shield directory name
    #[serde(rename = "_shield_directory", default)]
    pub shield_directory: Option<String>,
    /// Directory generated files are meant for
    #[serde(
        rename = "_working_directory",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub working_directory: Option<PathBuf>,
    /// Optional features
    #[serde(rename = "_features", default)]
    pub features: Vec<Feature>,
    /// Controller board
    #[serde(rename = "_mcu")]
    pub mcu: Option<Mcu>,
    /// Options rendered into `Kconfig.defconfig`
    #[serde(rename = "_default_config_options", default)]
    pub default_config_options: Vec<ConfigOption>,
    /// Options rendered into `<id>.conf`
    #[serde(rename = "_config_options", default)]
    pub config_options: Vec<ConfigOption>,
    /// Scan driver
    #[serde(rename = "_driver")]
    pub driver: Option<Driver>,
    /// Whether the keyboard is split
    #[serde(rename = "_split_config", default)]
    pub split: bool,
    /// Per-side options
    #[serde(rename = "_split_config_options", default)]
    pub split_config_options: SplitOptions,
    /// Behaviour list
    #[serde(rename = "_behaviours", default)]
    pub behaviours: Vec<Behaviour>,
    /// Keymap, `null` for unset slots
    #[serde(rename = "_keymap", default)]
    pub keymap: DynamicArray<Behaviour>,
    /// Matrix transform, `null` for unset slots
    #[serde(rename = "_transform", default)]
    pub transform: MatrixTransform,
    /// Physical key layout
    #[serde(rename = "_physical_layout", default)]
    pub physical_layout: Vec<PhysicalKey>,
}

impl ExportedConfig {
    /// Serializes to indented or compact JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

impl ZmkConfig {
    /// Snapshot of the configuration in its exported form. Incomplete
    /// configurations export too; unset fields become `null`.
    #[must_use]
    pub fn export_config(&self) -> ExportedConfig {
        ExportedConfig {
            config_name: self.config_name.clone(),
            config_id: self.config_id.clone(),
            shield_directory: self.shield_directory.clone(),
            working_directory: self.working_directory.clone(),
            features: self.features.clone(),
            mcu: self.mcu,
            default_config_options: self.default_config_options.clone(),
            config_options: self.config_options.clone(),
            driver: self.driver.clone(),
            split: self.split,
            split_config_options: self.split_config_options.clone(),
            behaviours: self.behaviours.clone(),
            keymap: self.keymap.clone(),
            transform: self.transform.clone(),
            physical_layout: self.physical_layout.clone(),
        }
    }

    /// Writes the export as indented JSON.
    ///
    /// Fails with `AlreadyExists` when `path` exists and `overwrite` is
    /// false. The file is written to a sibling temp file first and renamed
    /// into place.
    pub fn save_config(&self, path: &Path, overwrite: bool) -> Result<()> {
        self.write_config(path, overwrite, true)
    }

    /// Like [`save_config`](Self::save_config), with compact output when
    /// `pretty` is false.
    pub fn write_config(&self, path: &Path, overwrite: bool, pretty: bool) -> Result<()> {
        if path.exists() && !overwrite {
            return Err(ZmkError::AlreadyExists(path.to_path_buf()));
        }

        let content = self.export_config().to_json(pretty)?;
        let temp_path = path.with_extension("json.tmp");
        if let Err(e) = fs::write(&temp_path, content).and_then(|()| fs::rename(&temp_path, path)) {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }

        info!("Saved configuration to {}", path.display());
        Ok(())
    }
}
