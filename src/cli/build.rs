//! Build command: render the shield files of a saved configuration.

use crate::cli::common::{load_settings, print_json, CliError, CliResult};
use crate::zmk::ZmkConfig;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Generate ZMK shield files from a saved configuration
#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    /// Path to configuration JSON file
    #[arg(short, long, value_name = "FILE")]
    pub config: PathBuf,

    /// Write the files into this directory instead of printing them
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct GeneratedFile {
    path: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct BuildResponse {
    id: String,
    shields: Vec<String>,
    files: Vec<GeneratedFile>,
}

impl BuildArgs {
    /// Execute the build command
    pub fn execute(&self) -> CliResult<()> {
        let settings = load_settings()?;
        let catalogs = settings
            .catalogs()
            .map_err(|e| CliError::io(format!("Failed to load catalogs: {e:#}")))?;
        let shields = settings
            .shields()
            .map_err(|e| CliError::io(format!("Failed to load shields: {e:#}")))?;

        let config = ZmkConfig::load_config(&self.config, &catalogs, &shields)?;

        // Validate before generating
        let report = config.check_config();
        if !report.is_valid() {
            return Err(CliError::validation(format!(
                "Configuration validation failed:\n{}",
                report.format_message()
            )));
        }

        let build = config.build_config()?;
        let files: Vec<GeneratedFile> = build
            .files()?
            .into_iter()
            .map(|(path, content)| GeneratedFile { path, content })
            .collect();

        if let Some(out_dir) = &self.out_dir {
            std::fs::create_dir_all(out_dir)
                .map_err(|e| CliError::io(format!("Failed to create output directory: {e}")))?;
            for file in &files {
                std::fs::write(out_dir.join(&file.path), &file.content)
                    .map_err(|e| CliError::io(format!("Failed to write {}: {e}", file.path)))?;
            }
            info!("Wrote {} files to {}", files.len(), out_dir.display());
        }

        if self.json {
            print_json(&BuildResponse {
                id: build.id.clone(),
                shields: build.shield_names(),
                files,
            })?;
        } else if let Some(out_dir) = &self.out_dir {
            println!("✓ Generated {} files for {}", files.len(), build.id);
            for file in &files {
                println!("  {}", file.path);
            }
            println!("  Output: {}", out_dir.display());
        } else {
            for file in &files {
                println!("==> {} <==", file.path);
                println!("{}", file.content);
            }
        }

        Ok(())
    }
}
