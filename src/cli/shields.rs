//! Shield registry listing and availability checks.

use crate::cli::common::{load_settings, print_json, CliError, CliResult};
use crate::shields::Shield;
use clap::Args;
use serde::Serialize;

/// List upstream shields or check whether a name, id or directory is free
#[derive(Debug, Clone, Args)]
pub struct ShieldsArgs {
    /// Keyboard name to check
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Shield id to check
    #[arg(long, value_name = "ID")]
    pub id: Option<String>,

    /// Shield directory to check
    #[arg(long, value_name = "DIR")]
    pub directory: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct Availability<'a> {
    field: &'static str,
    value: &'a str,
    available: bool,
}

#[derive(Debug, Serialize)]
struct AvailabilityResponse<'a> {
    available: bool,
    checks: Vec<Availability<'a>>,
}

#[derive(Debug, Serialize)]
struct ListResponse<'a> {
    shields: &'a [Shield],
    total: usize,
}

impl ShieldsArgs {
    /// Execute the shields command
    pub fn execute(&self) -> CliResult<()> {
        let settings = load_settings()?;
        let registry = settings
            .shields()
            .map_err(|e| CliError::io(format!("Failed to load shields: {e:#}")))?;

        let mut checks = Vec::new();
        if let Some(name) = &self.name {
            checks.push(Availability {
                field: "name",
                value: name,
                available: !registry.is_name_taken(name),
            });
        }
        if let Some(id) = &self.id {
            checks.push(Availability {
                field: "id",
                value: id,
                available: !registry.is_id_taken(id),
            });
        }
        if let Some(directory) = &self.directory {
            checks.push(Availability {
                field: "directory",
                value: directory,
                available: !registry.is_directory_taken(directory),
            });
        }

        if checks.is_empty() {
            let shields = registry.shields();
            if self.json {
                print_json(&ListResponse {
                    shields,
                    total: shields.len(),
                })?;
            } else {
                for shield in shields {
                    println!("{:<28} {:<28} {}", shield.name, shield.id, shield.directory_name);
                }
                println!("\n{} shields", shields.len());
            }
            return Ok(());
        }

        let response = AvailabilityResponse {
            available: checks.iter().all(|check| check.available),
            checks,
        };

        if self.json {
            print_json(&response)?;
        } else {
            for check in &response.checks {
                let status = if check.available { "✓ available" } else { "✗ taken" };
                println!("{:<10} {:<28} {}", check.field, check.value, status);
            }
        }

        if !response.available {
            return Err(CliError::validation("Already taken by an existing shield"));
        }
        Ok(())
    }
}
