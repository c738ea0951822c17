//! Registry of shields that already ship with ZMK.
//!
//! A new configuration may not reuse the name, id or directory of an
//! existing shield, since its files would collide with the upstream ones.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

const EMBEDDED_SHIELDS: &str = include_str!("shields.json");

/// One upstream shield.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shield {
    /// Directory under `app/boards/shields/`
    pub directory_name: String,
    /// Display name
    pub name: String,
    /// Shield id used in `build.yaml`
    pub id: String,
}

/// Read-only list of upstream shields.
#[derive(Debug, Clone, Default)]
pub struct ShieldRegistry {
    shields: Vec<Shield>,
}

impl ShieldRegistry {
    /// Loads the registry embedded in the binary.
    pub fn load() -> anyhow::Result<Self> {
        Self::from_json(EMBEDDED_SHIELDS).context("Failed to parse embedded shields.json")
    }

    /// Loads a registry from a JSON file.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read shields file: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse shields file: {}", path.display()))
    }

    /// Parses `[{directory_name, name, id}, ...]`.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let shields: Vec<Shield> = serde_json::from_str(json)?;
        debug!("Loaded {} shields", shields.len());
        Ok(Self { shields })
    }

    /// Creates a registry from an explicit list.
    #[must_use]
    pub const fn from_shields(shields: Vec<Shield>) -> Self {
        Self { shields }
    }

    /// All shields, in file order.
    #[must_use]
    pub fn shields(&self) -> &[Shield] {
        &self.shields
    }

    /// Returns true when a shield already uses `name`. Case-sensitive.
    #[must_use]
    pub fn is_name_taken(&self, name: &str) -> bool {
        self.shields.iter().any(|shield| shield.name == name)
    }

    /// Returns true when a shield already uses `id`. Case-sensitive.
    #[must_use]
    pub fn is_id_taken(&self, id: &str) -> bool {
        self.shields.iter().any(|shield| shield.id == id)
    }

    /// Returns true when a shield already uses `directory`. Case-sensitive.
    #[must_use]
    pub fn is_directory_taken(&self, directory: &str) -> bool {
        self.shields
            .iter()
            .any(|shield| shield.directory_name == directory)
    }
}
