//! Create a new configuration file.

use crate::cli::common::{load_settings, CliError, CliResult};
use crate::hardware::{Driver, Mcu};
use crate::zmk::ZmkConfig;
use clap::Args;
use std::path::PathBuf;

/// Create a configuration file with identity, MCU and an empty matrix driver
#[derive(Debug, Clone, Args)]
pub struct NewArgs {
    /// Keyboard name (must not be used by an upstream shield)
    #[arg(long, value_name = "NAME")]
    pub name: String,

    /// Shield id (lowercase identifier)
    #[arg(long, value_name = "ID")]
    pub id: String,

    /// Shield directory (defaults to the id)
    #[arg(long, value_name = "DIR")]
    pub directory: Option<String>,

    /// Configure a split keyboard
    #[arg(long)]
    pub split: bool,

    /// Where to write the configuration JSON
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Replace an existing file
    #[arg(long)]
    pub overwrite: bool,
}

impl NewArgs {
    /// Execute the new command
    pub fn execute(&self) -> CliResult<()> {
        let settings = load_settings()?;
        let shields = settings
            .shields()
            .map_err(|e| CliError::io(format!("Failed to load shields: {e:#}")))?;

        let mut config = ZmkConfig::new();
        config.set_config_name(&self.name, &shields)?;
        config.set_config_id(&self.id, &shields)?;
        config.set_shield_directory(self.directory.as_deref().unwrap_or(&self.id), &shields)?;
        if let Some(dir) = &settings.paths.working_directory {
            config.set_working_directory(dir)?;
        }
        config.set_split(self.split);
        config.set_mcu(Mcu::NiceNanoV2);
        config.set_driver(Driver::matrix());

        let overwrite = self.overwrite || settings.export.overwrite;
        config.write_config(&self.output, overwrite, settings.export.pretty)?;

        println!("✓ Created {}", self.output.display());
        Ok(())
    }
}
