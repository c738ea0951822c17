//! Validation command for saved configurations.

use crate::cli::common::{load_settings, print_json, CliError, CliResult};
use crate::zmk::{ValidationReport, ZmkConfig};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

/// Validate a saved configuration for errors and warnings
#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Path to configuration JSON file
    #[arg(short, long, value_name = "FILE")]
    pub config: PathBuf,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Treat warnings as errors (exit non-zero)
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Serialize)]
struct ValidationResponse<'a> {
    valid: bool,
    #[serde(flatten)]
    report: &'a ValidationReport,
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> CliResult<()> {
        let settings = load_settings()?;
        let catalogs = settings
            .catalogs()
            .map_err(|e| CliError::io(format!("Failed to load catalogs: {e:#}")))?;
        let shields = settings
            .shields()
            .map_err(|e| CliError::io(format!("Failed to load shields: {e:#}")))?;

        // A file that does not survive re-validation on load is reported
        // like any other validation failure.
        let config = ZmkConfig::load_config(&self.config, &catalogs, &shields).map_err(|e| {
            let error = CliError::from(e);
            CliError {
                message: format!("Failed to load configuration: {}", error.message),
                ..error
            }
        })?;

        let report = config.check_config();
        let valid = report.is_valid();

        if self.json {
            print_json(&ValidationResponse {
                valid,
                report: &report,
            })?;
        } else if valid && report.warnings.is_empty() {
            println!("✓ Validation passed");
        } else {
            if valid {
                println!("✓ Validation passed with warnings");
            } else {
                println!("✗ Validation failed");
            }
            println!();
            print!("{}", report.format_message());
        }

        if !valid {
            return Err(CliError::validation("Validation failed"));
        }
        if self.strict && !report.warnings.is_empty() {
            return Err(CliError::validation("Warnings found in strict mode"));
        }

        Ok(())
    }
}
