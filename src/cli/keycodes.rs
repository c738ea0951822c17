//! Catalog listing and search command.

use crate::catalog::CatalogKind;
use crate::cli::common::{load_settings, print_json, CliError, CliResult};
use clap::{Args, ValueEnum};
use serde::Serialize;

/// Catalog selector for the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CatalogArg {
    /// Plain key codes
    Key,
    /// Function modifiers (`LC(xx)`, ...)
    Modifier,
    /// Bluetooth commands
    Bluetooth,
    /// Output selection
    Output,
}

impl From<CatalogArg> for CatalogKind {
    fn from(arg: CatalogArg) -> Self {
        match arg {
            CatalogArg::Key => Self::KeyCodes,
            CatalogArg::Modifier => Self::FunctionModifiers,
            CatalogArg::Bluetooth => Self::BluetoothKeyCodes,
            CatalogArg::Output => Self::OutputKeyCodes,
        }
    }
}

/// List or search the code catalogs
#[derive(Debug, Clone, Args)]
pub struct KeycodesArgs {
    /// Only list one catalog
    #[arg(long, value_enum)]
    pub catalog: Option<CatalogArg>,

    /// Filter by name, description or context
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct KeycodeEntry<'a> {
    name: &'a str,
    description: &'a str,
    context: &'a str,
    catalog: String,
}

#[derive(Debug, Serialize)]
struct KeycodesResponse<'a> {
    keycodes: Vec<KeycodeEntry<'a>>,
    total: usize,
}

impl KeycodesArgs {
    /// Execute the keycodes command
    pub fn execute(&self) -> CliResult<()> {
        let settings = load_settings()?;
        let catalogs = settings
            .catalogs()
            .map_err(|e| CliError::io(format!("Failed to load catalogs: {e:#}")))?;

        let kinds = match self.catalog {
            Some(arg) => vec![CatalogKind::from(arg)],
            None => CatalogKind::ALL.to_vec(),
        };
        let query = self.search.as_deref().unwrap_or("");

        let keycodes: Vec<KeycodeEntry> = kinds
            .iter()
            .flat_map(|kind| {
                catalogs
                    .get(*kind)
                    .search(query)
                    .into_iter()
                    .map(move |(name, info)| KeycodeEntry {
                        name,
                        description: &info.description,
                        context: &info.context,
                        catalog: kind.to_string(),
                    })
            })
            .collect();

        let no_match = keycodes.is_empty();

        if self.json {
            let total = keycodes.len();
            print_json(&KeycodesResponse { keycodes, total })?;
        } else {
            for entry in &keycodes {
                println!("{:<24} {:<36} {}", entry.name, entry.description, entry.context);
            }
            println!("\n{} codes", keycodes.len());
        }

        if no_match && self.search.is_some() {
            return Err(CliError::validation("No codes matched the search"));
        }

        Ok(())
    }
}
