//! Settings management CLI commands.

use crate::cli::common::{load_settings, print_json, CliError, CliResult};
use crate::config::{Config, ExportConfig, PathConfig};
use crate::constants::{APP_BINARY_NAME, APP_NAME};
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

/// Settings management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current settings
    Show(ConfigShowArgs),
    /// Set settings values
    Set(ConfigSetArgs),
}

/// Display current settings
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Set settings values
#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// Directory with catalog JSON files overriding the built-in ones
    #[arg(long, value_name = "DIR")]
    catalog_dir: Option<PathBuf>,

    /// Shield registry JSON overriding the built-in one
    #[arg(long, value_name = "FILE")]
    shields_file: Option<PathBuf>,

    /// Default working directory
    #[arg(long, value_name = "DIR")]
    working_dir: Option<PathBuf>,

    /// Overwrite existing files when saving (true or false)
    #[arg(long, value_name = "BOOL")]
    overwrite: Option<bool>,

    /// Indent saved JSON (true or false)
    #[arg(long, value_name = "BOOL")]
    pretty: Option<bool>,
}

/// JSON-serializable settings for output
#[derive(Serialize, Debug)]
struct ConfigOutput<'a> {
    config_file: String,
    paths: &'a PathConfig,
    export: &'a ExportConfig,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(),
            ConfigCommand::Set(args) => args.execute(),
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self) -> CliResult<()> {
        let config = load_settings()?;
        let config_file = Config::config_file_path()
            .map(|path| path.display().to_string())
            .map_err(|e| CliError::io(format!("{e:#}")))?;

        if self.json {
            print_json(&ConfigOutput {
                config_file,
                paths: &config.paths,
                export: &config.export,
            })?;
        } else {
            output_human_readable(&config, &config_file);
        }

        Ok(())
    }
}

impl ConfigSetArgs {
    const fn is_empty(&self) -> bool {
        self.catalog_dir.is_none()
            && self.shields_file.is_none()
            && self.working_dir.is_none()
            && self.overwrite.is_none()
            && self.pretty.is_none()
    }

    /// Execute set command
    pub fn execute(&self) -> CliResult<()> {
        if self.is_empty() {
            return Err(CliError::validation(
                "At least one setting must be specified: --catalog-dir, --shields-file, --working-dir, --overwrite or --pretty",
            ));
        }

        let mut config = load_settings()?;

        if let Some(dir) = &self.catalog_dir {
            config.paths.catalog_dir = Some(dir.clone());
        }
        if let Some(file) = &self.shields_file {
            config.paths.shields_file = Some(file.clone());
        }
        if let Some(dir) = &self.working_dir {
            config.paths.working_directory = Some(dir.clone());
        }
        if let Some(overwrite) = self.overwrite {
            config.export.overwrite = overwrite;
        }
        if let Some(pretty) = self.pretty {
            config.export.pretty = pretty;
        }

        // Reject paths that do not exist before anything is written
        config
            .validate()
            .map_err(|e| CliError::validation(format!("{e:#}")))?;

        // The data files must also parse
        config
            .catalogs()
            .map_err(|e| CliError::validation(format!("Invalid catalog directory: {e:#}")))?;
        config
            .shields()
            .map_err(|e| CliError::validation(format!("Invalid shields file: {e:#}")))?;

        config
            .save()
            .map_err(|e| CliError::io(format!("Failed to save configuration: {e:#}")))?;

        println!("Configuration updated successfully.");

        Ok(())
    }
}

/// Output settings in human-readable format
fn output_human_readable(config: &Config, config_file: &str) {
    let show = |path: Option<&PathBuf>| {
        path.map_or_else(|| "(built-in)".to_string(), |p| p.display().to_string())
    };

    let title = format!("{APP_NAME} Settings");
    println!("{title}");
    println!("{}", "=".repeat(title.len()));
    println!("File: {config_file}");
    println!();

    println!("Paths:");
    println!("  Catalog Directory: {}", show(config.paths.catalog_dir.as_ref()));
    println!("  Shields File:      {}", show(config.paths.shields_file.as_ref()));
    println!(
        "  Working Directory: {}",
        config
            .paths
            .working_directory
            .as_ref()
            .map_or_else(|| "(not set)".to_string(), |p| p.display().to_string())
    );
    println!();

    println!("Export:");
    println!("  Overwrite: {}", config.export.overwrite);
    println!("  Pretty:    {}", config.export.pretty);
    println!();
    println!("Change with: {APP_BINARY_NAME} config set --help");
}
