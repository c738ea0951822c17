//! The configuration aggregate.
//!
//! [`ZmkConfig`] owns every piece of a keyboard configuration. Fields are set
//! independently and each setter validates before it mutates, so a failed
//! call leaves the configuration as it was. Completeness is only demanded by
//! [`ZmkConfig::build_config`]; [`ZmkConfig::check_config`] reports what is
//! still missing.

pub mod build;
pub mod export;
pub mod import;
pub mod validator;

use crate::behaviours::Behaviour;
use crate::error::{Result, ZmkError};
use crate::hardware::{Driver, Mcu};
use crate::models::{DynamicArray, PhysicalKey};
use crate::options::{ConfigOption, OptionKind};
use crate::properties::Value;
use crate::shields::ShieldRegistry;
use crate::transform::MatrixTransform;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};

pub use export::ExportedConfig;
pub use validator::{
    CheckSection, ValidationError, ValidationErrorKind, ValidationReport, ValidationWarning,
};

/// Identifier format for config ids and shield directories.
const IDENT_PATTERN: &str = r"^[a-z][a-z0-9_]*$";

/// Optional firmware feature (encoders, displays, ...).
///
/// Features are modelled so configurations can carry them, but none is
/// implemented: adding or removing one fails with `NotImplemented`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    /// Feature name
    pub name: String,
}

/// Half of a split keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitSide {
    /// Half that talks to the host
    Central,
    /// Half that talks to the central half
    Peripheral,
}

impl SplitSide {
    /// Lowercase side name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Central => "central",
            Self::Peripheral => "peripheral",
        }
    }
}

impl fmt::Display for SplitSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-side option lists of a split keyboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitOptions {
    /// Options for the central half only
    #[serde(default)]
    pub central: Vec<ConfigOption>,
    /// Options for the peripheral half only
    #[serde(default)]
    pub peripheral: Vec<ConfigOption>,
}

impl SplitOptions {
    /// Options of one side.
    #[must_use]
    pub const fn side(&self, side: SplitSide) -> &Vec<ConfigOption> {
        match side {
            SplitSide::Central => &self.central,
            SplitSide::Peripheral => &self.peripheral,
        }
    }

    fn side_mut(&mut self, side: SplitSide) -> &mut Vec<ConfigOption> {
        match side {
            SplitSide::Central => &mut self.central,
            SplitSide::Peripheral => &mut self.peripheral,
        }
    }

    /// Returns true when neither side has options.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.central.is_empty() && self.peripheral.is_empty()
    }
}

/// Which option list an option operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionTarget {
    /// Defaults rendered into `Kconfig.defconfig`
    Default,
    /// Regular options rendered into `<id>.conf`
    Regular,
    /// One side of a split keyboard
    Split(SplitSide),
}

impl fmt::Display for OptionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default options"),
            Self::Regular => f.write_str("config options"),
            Self::Split(side) => write!(f, "{side} split options"),
        }
    }
}

/// A keyboard configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZmkConfig {
    config_name: Option<String>,
    config_id: Option<String>,
    shield_directory: Option<String>,
    working_directory: Option<PathBuf>,
    features: Vec<Feature>,
    mcu: Option<Mcu>,
    driver: Option<Driver>,
    default_config_options: Vec<ConfigOption>,
    config_options: Vec<ConfigOption>,
    split: bool,
    split_config_options: SplitOptions,
    behaviours: Vec<Behaviour>,
    keymap: DynamicArray<Behaviour>,
    transform: MatrixTransform,
    physical_layout: Vec<PhysicalKey>,
}

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(IDENT_PATTERN).expect("identifier pattern is a valid regex"));

fn check_identifier(field: &str, value: &str) -> Result<()> {
    if IDENTIFIER.is_match(value) {
        Ok(())
    } else {
        Err(ZmkError::invalid_value(
            field,
            format!("'{value}' must start with a lowercase letter and contain only a-z, 0-9 and _"),
        ))
    }
}

impl ZmkConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Identity

    /// Sets the keyboard name, failing with `AlreadyTaken` when an upstream
    /// shield uses it.
    pub fn set_config_name(&mut self, name: &str, shields: &ShieldRegistry) -> Result<()> {
        if name.trim().is_empty() {
            return Err(ZmkError::invalid_value("config_name", "must not be empty"));
        }
        if shields.is_name_taken(name) {
            return Err(ZmkError::AlreadyTaken {
                field: "name",
                value: name.to_string(),
            });
        }
        self.config_name = Some(name.to_string());
        Ok(())
    }

    /// Keyboard name.
    #[must_use]
    pub fn config_name(&self) -> Option<&str> {
        self.config_name.as_deref()
    }

    /// Sets the shield id (`^[a-z][a-z0-9_]*$`, not used upstream).
    pub fn set_config_id(&mut self, id: &str, shields: &ShieldRegistry) -> Result<()> {
        check_identifier("config_id", id)?;
        if shields.is_id_taken(id) {
            return Err(ZmkError::AlreadyTaken {
                field: "id",
                value: id.to_string(),
            });
        }
        self.config_id = Some(id.to_string());
        Ok(())
    }

    /// Shield id.
    #[must_use]
    pub fn config_id(&self) -> Option<&str> {
        self.config_id.as_deref()
    }

    /// Sets the shield directory (`^[a-z][a-z0-9_]*$`, not used upstream).
    pub fn set_shield_directory(&mut self, directory: &str, shields: &ShieldRegistry) -> Result<()> {
        check_identifier("shield_directory", directory)?;
        if shields.is_directory_taken(directory) {
            return Err(ZmkError::AlreadyTaken {
                field: "directory",
                value: directory.to_string(),
            });
        }
        self.shield_directory = Some(directory.to_string());
        Ok(())
    }

    /// Shield directory name.
    #[must_use]
    pub fn shield_directory(&self) -> Option<&str> {
        self.shield_directory.as_deref()
    }

    /// Sets the directory generated files are meant for. It must exist.
    pub fn set_working_directory(&mut self, directory: impl AsRef<Path>) -> Result<()> {
        let directory = directory.as_ref();
        if !directory.is_dir() {
            return Err(ZmkError::invalid_value(
                "working_directory",
                format!("{} is not an existing directory", directory.display()),
            ));
        }
        self.working_directory = Some(directory.to_path_buf());
        Ok(())
    }

    /// Working directory.
    #[must_use]
    pub fn working_directory(&self) -> Option<&Path> {
        self.working_directory.as_deref()
    }

    // Features

    /// Not implemented.
    pub fn add_feature(&mut self, _feature: Feature) -> Result<()> {
        Err(ZmkError::NotImplemented("features"))
    }

    /// Not implemented.
    pub fn del_feature(&mut self, _name: &str) -> Result<Feature> {
        Err(ZmkError::NotImplemented("features"))
    }

    /// Features carried by the configuration.
    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    // Hardware

    /// Selects the controller board.
    pub fn set_mcu(&mut self, mcu: Mcu) {
        self.mcu = Some(mcu);
    }

    /// Selected controller board.
    #[must_use]
    pub const fn mcu(&self) -> Option<Mcu> {
        self.mcu
    }

    /// Installs a scan driver.
    pub fn set_driver(&mut self, driver: Driver) {
        self.driver = Some(driver);
    }

    /// Installed scan driver.
    #[must_use]
    pub const fn driver(&self) -> Option<&Driver> {
        self.driver.as_ref()
    }

    /// Sets one property of the installed driver, validated against the
    /// selected MCU.
    pub fn set_driver_property(&mut self, name: &str, value: Value) -> Result<()> {
        let driver = self
            .driver
            .as_ref()
            .ok_or_else(|| ZmkError::incomplete("no driver installed"))?;
        let update = driver.validate_property(self, name, &value)?;
        if let Some(driver) = self.driver.as_mut() {
            driver.apply(update);
        }
        Ok(())
    }

    /// Replaces the matrix transform.
    pub fn set_transform(&mut self, transform: MatrixTransform) {
        self.transform = transform;
    }

    /// Matrix transform.
    #[must_use]
    pub const fn transform(&self) -> &MatrixTransform {
        &self.transform
    }

    /// Mutable matrix transform.
    pub fn transform_mut(&mut self) -> &mut MatrixTransform {
        &mut self.transform
    }

    /// Replaces the physical layout. A layout that differs from the current
    /// one invalidates every key-indexed table, so key data is cleared.
    pub fn set_physical_layout(&mut self, keys: Vec<PhysicalKey>) {
        if keys != self.physical_layout {
            info!(
                "Physical layout changed ({} -> {} keys), clearing key data",
                self.physical_layout.len(),
                keys.len()
            );
            self.clear_key_data();
        }
        self.physical_layout = keys;
    }

    /// Physical layout, one entry per key index.
    #[must_use]
    pub fn physical_layout(&self) -> &[PhysicalKey] {
        &self.physical_layout
    }

    // Behaviours and keymap

    /// Appends a behaviour to the behaviour list.
    pub fn add_behaviour(&mut self, behaviour: Behaviour) {
        self.behaviours.push(behaviour);
    }

    /// Removes the behaviour at `index`.
    pub fn del_behaviour(&mut self, index: usize) -> Result<Behaviour> {
        if index >= self.behaviours.len() {
            return Err(ZmkError::invalid_value(
                "index",
                format!("{index} is out of range for {} behaviours", self.behaviours.len()),
            ));
        }
        Ok(self.behaviours.remove(index))
    }

    /// Behaviour list.
    #[must_use]
    pub fn behaviours(&self) -> &[Behaviour] {
        &self.behaviours
    }

    /// Replaces the keymap.
    pub fn set_keymap(&mut self, keymap: DynamicArray<Behaviour>) {
        self.keymap = keymap;
    }

    /// Keymap, one slot per key index.
    #[must_use]
    pub const fn get_keymap(&self) -> &DynamicArray<Behaviour> {
        &self.keymap
    }

    /// Binds `behaviour` to key `index`, growing the keymap if needed.
    pub fn modify_key_binding(&mut self, index: isize, behaviour: Behaviour) -> Result<()> {
        self.keymap.insert(index, behaviour)
    }

    /// Unbinds key `index`. The slot must exist.
    pub fn clear_key_binding(&mut self, index: isize) -> Result<()> {
        self.keymap.get(index)?;
        self.keymap.clear_slot(index)
    }

    /// Resets keymap, behaviours, driver and transform to fresh instances.
    pub fn clear_key_data(&mut self) {
        self.keymap = DynamicArray::new();
        self.behaviours.clear();
        self.driver = self.driver.as_ref().map(Driver::fresh);
        self.transform = MatrixTransform::new();
    }

    // Config options

    /// Enables or disables the split configuration.
    pub fn set_split(&mut self, split: bool) {
        debug!("Split configuration {}", if split { "enabled" } else { "disabled" });
        self.split = split;
    }

    /// Whether the keyboard is split.
    #[must_use]
    pub const fn is_split(&self) -> bool {
        self.split
    }

    /// Options of one list.
    #[must_use]
    pub const fn options(&self, target: OptionTarget) -> &Vec<ConfigOption> {
        match target {
            OptionTarget::Default => &self.default_config_options,
            OptionTarget::Regular => &self.config_options,
            OptionTarget::Split(side) => self.split_config_options.side(side),
        }
    }

    fn options_mut(&mut self, target: OptionTarget) -> &mut Vec<ConfigOption> {
        match target {
            OptionTarget::Default => &mut self.default_config_options,
            OptionTarget::Regular => &mut self.config_options,
            OptionTarget::Split(side) => self.split_config_options.side_mut(side),
        }
    }

    fn check_option(&self, target: OptionTarget, option: &ConfigOption) -> Result<()> {
        if target == OptionTarget::Split(SplitSide::Peripheral) && option.kind().is_bluetooth() {
            return Err(ZmkError::invalid_value(
                option.kind().symbol(),
                "bluetooth limits belong on the central half",
            ));
        }
        match option.value() {
            Some(value) => option.kind().check(self, value),
            None => Err(ZmkError::incomplete(format!(
                "config option {} has no value",
                option.kind()
            ))),
        }
    }

    /// Adds an option to a list. Fails with `InvalidValue` when the list
    /// already holds an option of the same kind or the value does not fit
    /// the configuration.
    pub fn add_option(&mut self, target: OptionTarget, option: ConfigOption) -> Result<()> {
        self.check_option(target, &option)?;
        if self.options(target).iter().any(|o| o.kind() == option.kind()) {
            return Err(ZmkError::invalid_value(
                option.kind().symbol(),
                format!("already present in {target}"),
            ));
        }
        self.options_mut(target).push(option);
        Ok(())
    }

    /// Replaces the option of the same kind, failing with `UnknownKey` when
    /// there is none.
    pub fn change_option(&mut self, target: OptionTarget, option: ConfigOption) -> Result<()> {
        self.check_option(target, &option)?;
        let position = self.option_position(target, option.kind())?;
        self.options_mut(target)[position] = option;
        Ok(())
    }

    /// Removes the option of `kind`, failing with `UnknownKey` when absent.
    pub fn del_option(&mut self, target: OptionTarget, kind: OptionKind) -> Result<ConfigOption> {
        let position = self.option_position(target, kind)?;
        Ok(self.options_mut(target).remove(position))
    }

    /// Sets the value of an existing option after validating it against
    /// this configuration.
    pub fn update_config_option(&mut self, target: OptionTarget, kind: OptionKind, value: Value) -> Result<()> {
        let position = self.option_position(target, kind)?;
        let mut option = self.options(target)[position].clone();
        option.set_config_property(self, value)?;
        self.options_mut(target)[position] = option;
        Ok(())
    }

    fn option_position(&self, target: OptionTarget, kind: OptionKind) -> Result<usize> {
        self.options(target)
            .iter()
            .position(|option| option.kind() == kind)
            .ok_or_else(|| ZmkError::unknown_key(target.to_string(), kind.symbol()))
    }

    /// Adds a default option (`Kconfig.defconfig`).
    pub fn add_default_config_option(&mut self, option: ConfigOption) -> Result<()> {
        self.add_option(OptionTarget::Default, option)
    }

    /// Replaces a default option of the same kind.
    pub fn change_default_config_option(&mut self, option: ConfigOption) -> Result<()> {
        self.change_option(OptionTarget::Default, option)
    }

    /// Removes a default option.
    pub fn del_default_config_option(&mut self, kind: OptionKind) -> Result<ConfigOption> {
        self.del_option(OptionTarget::Default, kind)
    }

    /// Default options.
    #[must_use]
    pub fn get_default_config_options(&self) -> &[ConfigOption] {
        &self.default_config_options
    }

    /// Adds a regular option (`<id>.conf`).
    pub fn add_config_option(&mut self, option: ConfigOption) -> Result<()> {
        self.add_option(OptionTarget::Regular, option)
    }

    /// Replaces a regular option of the same kind.
    pub fn change_config_option(&mut self, option: ConfigOption) -> Result<()> {
        self.change_option(OptionTarget::Regular, option)
    }

    /// Removes a regular option.
    pub fn del_config_option(&mut self, kind: OptionKind) -> Result<ConfigOption> {
        self.del_option(OptionTarget::Regular, kind)
    }

    /// Regular options.
    #[must_use]
    pub fn get_config_options(&self) -> &[ConfigOption] {
        &self.config_options
    }

    /// Adds an option to one side of a split keyboard.
    pub fn add_split_config_option(&mut self, side: SplitSide, option: ConfigOption) -> Result<()> {
        self.add_option(OptionTarget::Split(side), option)
    }

    /// Removes an option from one side of a split keyboard.
    pub fn del_split_config_option(&mut self, side: SplitSide, kind: OptionKind) -> Result<ConfigOption> {
        self.del_option(OptionTarget::Split(side), kind)
    }

    /// Per-side options.
    #[must_use]
    pub const fn get_split_config_options(&self) -> &SplitOptions {
        &self.split_config_options
    }
}
