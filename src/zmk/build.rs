//! Folding entity fragments into a [`ConfigBuild`].

use super::{OptionTarget, SplitSide, ZmkConfig};
use crate::build::{list_union, BuildFragment, ConfigBuild, KeymapSection};
use crate::error::{Result, ZmkError};
use crate::options::ConfigOption;
use tracing::{debug, info};

impl ZmkConfig {
    /// Builds every fragment of the configuration and merges them per
    /// destination file.
    ///
    /// Runs [`check_config`](Self::check_config) first and fails with
    /// `IncompleteState` carrying the formatted report when it finds errors.
    /// Warnings do not block a build.
    pub fn build_config(&self) -> Result<ConfigBuild> {
        let report = self.check_config();
        if !report.is_valid() {
            return Err(ZmkError::incomplete(report.format_message()));
        }

        let id = self
            .config_id
            .clone()
            .ok_or_else(|| ZmkError::incomplete("config id is not set"))?;
        let name = self
            .config_name
            .clone()
            .ok_or_else(|| ZmkError::incomplete("config name is not set"))?;
        let mcu = self
            .mcu
            .ok_or_else(|| ZmkError::incomplete("no MCU selected"))?;
        let driver = self
            .driver
            .as_ref()
            .ok_or_else(|| ZmkError::incomplete("no driver installed"))?;

        info!("Building configuration '{}' ({} keys)", id, self.keymap.len());

        let keymap = self.build_keymap()?;

        let mut hardware = mcu.build(self);
        hardware.merge(driver.build(self)?);
        hardware.merge(self.transform.build()?);

        let (central_conf, peripheral_conf) = if self.split {
            (
                self.option_lines(OptionTarget::Split(SplitSide::Central))?,
                self.option_lines(OptionTarget::Split(SplitSide::Peripheral))?,
            )
        } else {
            (Vec::new(), Vec::new())
        };

        let build = ConfigBuild {
            id,
            name,
            split: self.split,
            keymap,
            conf: self.option_lines(OptionTarget::Regular)?,
            defconfig: self.option_lines(OptionTarget::Default)?,
            central_conf,
            peripheral_conf,
            build_yaml: hardware.build_yaml,
            keyboard_zmk_yml: hardware.keyboard_zmk_yml,
            overlay: hardware.overlay,
            matrix_transform: hardware.matrix_transform.unwrap_or_default(),
        };
        debug!(
            "Build produced {} bindings, {} includes",
            build.keymap.bindings.len(),
            build.keymap.include.len()
        );
        Ok(build)
    }

    fn build_keymap(&self) -> Result<KeymapSection> {
        let mut section = KeymapSection::default();

        for (index, slot) in self.keymap.iter().enumerate() {
            let behaviour = slot
                .as_ref()
                .ok_or_else(|| ZmkError::incomplete(format!("key {index} has no behaviour")))?;
            if let Some(fragment) = behaviour.build()?.keymap {
                section.include = list_union(&section.include, &fragment.include);
                section.bindings.push(fragment.binding);
            }
        }

        // Listed behaviours contribute their headers even when unbound.
        for behaviour in &self.behaviours {
            if let Some(fragment) = behaviour.build()?.keymap {
                section.include = list_union(&section.include, &fragment.include);
            }
        }

        Ok(section)
    }

    fn option_lines(&self, target: OptionTarget) -> Result<Vec<String>> {
        let mut merged = BuildFragment::default();
        for option in self.options(target) {
            merged.merge(self.build_option(target, option)?);
        }
        Ok(merged.conf)
    }

    fn build_option(&self, target: OptionTarget, option: &ConfigOption) -> Result<BuildFragment> {
        self.check_option(target, option)?;
        option.build(self)
    }
}
