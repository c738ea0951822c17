//! Application settings.
//!
//! Settings are stored as TOML in the platform config directory and only
//! affect where data comes from and how files are saved; the configuration
//! object model never reads them.

use crate::catalog::Catalogs;
use crate::constants::{CONFIG_DIR_ENV, CONFIG_DIR_NAME};
use crate::shields::ShieldRegistry;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Data file locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Directory whose catalog JSON files replace the embedded ones
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_dir: Option<PathBuf>,
    /// Shield registry JSON replacing the embedded one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shields_file: Option<PathBuf>,
    /// Default working directory for new configurations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_directory: Option<PathBuf>,
}

/// How configurations are saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Replace existing files without asking
    #[serde(default)]
    pub overwrite: bool,
    /// Indent saved JSON
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

const fn default_pretty() -> bool {
    true
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            overwrite: false,
            pretty: default_pretty(),
        }
    }
}

/// Application configuration.
///
/// # File Location
///
/// - Linux: `~/.config/ZmkConfigurator/config.toml`
/// - macOS: `~/Library/Application Support/ZmkConfigurator/config.toml`
/// - Windows: `%APPDATA%\ZmkConfigurator\config.toml`
///
/// # Validation
///
/// - `catalog_dir` and `working_directory` must be existing directories
/// - `shields_file` must be an existing file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Data file locations
    #[serde(default)]
    pub paths: PathConfig,
    /// Save behaviour
    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the platform-specific config directory path.
    ///
    /// `ZMK_CONFIG_DIR` replaces it when set.
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(CONFIG_DIR_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Loads configuration from `path`, defaulting when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the config file.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Saves configuration to `path` using temp file + rename.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let temp_path = path.with_extension("toml.tmp");
        let written = fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write temp config file: {}", temp_path.display()))
            .and_then(|()| {
                fs::rename(&temp_path, path).with_context(|| {
                    format!("Failed to rename temp config file to: {}", path.display())
                })
            });
        if written.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        written?;

        debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        if let Some(dir) = &self.paths.catalog_dir {
            if !dir.is_dir() {
                anyhow::bail!("Catalog directory does not exist: {}", dir.display());
            }
        }
        if let Some(file) = &self.paths.shields_file {
            if !file.is_file() {
                anyhow::bail!("Shields file does not exist: {}", file.display());
            }
        }
        if let Some(dir) = &self.paths.working_directory {
            if !dir.is_dir() {
                anyhow::bail!("Working directory does not exist: {}", dir.display());
            }
        }
        Ok(())
    }

    /// Loads the code catalogs, honouring `paths.catalog_dir`.
    pub fn catalogs(&self) -> Result<Catalogs> {
        match &self.paths.catalog_dir {
            Some(dir) => Catalogs::load_from_dir(dir),
            None => Catalogs::load(),
        }
    }

    /// Loads the shield registry, honouring `paths.shields_file`.
    pub fn shields(&self) -> Result<ShieldRegistry> {
        match &self.paths.shields_file {
            Some(file) => ShieldRegistry::load_from(file),
            None => ShieldRegistry::load(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert!(config.paths.catalog_dir.is_none());
        assert!(!config.export.overwrite);
        assert!(config.export.pretty);
    }

    #[test]
    fn test_config_validate() {
        assert!(Config::new().validate().is_ok());

        let mut config = Config::new();
        config.paths.catalog_dir = Some(PathBuf::from("/nonexistent/catalogs"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Catalog directory"));
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::new();
        config.paths.working_directory = Some(temp_dir.path().to_path_buf());
        config.export.overwrite = true;
        config.save_to(&path).unwrap();

        assert!(!path.with_extension("toml.tmp").exists());
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_failed_save_removes_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        assert!(Config::new().save_to(&path).is_err());
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn test_load_missing_file_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = Config::load_from(&temp_dir.path().join("missing.toml")).unwrap();
        assert_eq!(loaded, Config::new());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[export]\noverwrite = true\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.export.overwrite);
        assert!(loaded.export.pretty);
        assert!(loaded.paths.shields_file.is_none());
    }

    #[test]
    fn test_shields_override() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("shields.json");
        fs::write(&path, r#"[{"directory_name": "mine", "name": "Mine", "id": "mine"}]"#).unwrap();

        let mut config = Config::new();
        config.paths.shields_file = Some(path);
        let shields = config.shields().unwrap();
        assert!(shields.is_id_taken("mine"));
        assert!(!shields.is_name_taken("Corne"));
    }
}
