//! ZMK code catalogs.
//!
//! Four read-only lookup tables (key codes, function modifiers, bluetooth
//! codes, output codes) map a code name to its description and context.
//! The tables are embedded in the binary and parsed once by
//! [`Catalogs::load`]; callers keep the result and pass it by reference to
//! every constructor that needs a lookup.

use crate::error::{Result, ZmkError};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Metadata attached to one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeInfo {
    /// What the code does (e.g. "Letter A")
    pub description: String,
    /// Group the code belongs to (e.g. "Keyboard Letters")
    pub context: String,
}

/// Which of the four catalogs a table is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    /// Plain key codes (`A`, `RET`, `C_VOL_UP`, ...)
    KeyCodes,
    /// Modifier functions wrapping another code (`LC(xx)`, ...)
    FunctionModifiers,
    /// Bluetooth profile codes (`BT_CLR`, `BT_SEL(xx)`, ...)
    BluetoothKeyCodes,
    /// Output selection codes (`OUT_USB`, ...)
    OutputKeyCodes,
}

impl CatalogKind {
    /// All catalog kinds in a stable order.
    pub const ALL: [Self; 4] = [
        Self::KeyCodes,
        Self::FunctionModifiers,
        Self::BluetoothKeyCodes,
        Self::OutputKeyCodes,
    ];

    /// File name of the catalog data file.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::KeyCodes => "key_codes.json",
            Self::FunctionModifiers => "function_modifiers.json",
            Self::BluetoothKeyCodes => "bluetooth_keycodes.json",
            Self::OutputKeyCodes => "output_keycodes.json",
        }
    }

    /// Noun used in error messages.
    #[must_use]
    pub const fn vocabulary(self) -> &'static str {
        match self {
            Self::KeyCodes => "key code",
            Self::FunctionModifiers => "function modifier",
            Self::BluetoothKeyCodes => "bluetooth key code",
            Self::OutputKeyCodes => "output key code",
        }
    }

    const fn embedded(self) -> &'static str {
        match self {
            Self::KeyCodes => include_str!("key_codes.json"),
            Self::FunctionModifiers => include_str!("function_modifiers.json"),
            Self::BluetoothKeyCodes => include_str!("bluetooth_keycodes.json"),
            Self::OutputKeyCodes => include_str!("output_keycodes.json"),
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.vocabulary())
    }
}

/// One read-only code table.
#[derive(Debug, Clone)]
pub struct Catalog {
    kind: CatalogKind,
    entries: BTreeMap<String, CodeInfo>,
}

impl Catalog {
    /// Parses a catalog from its JSON text (`{"NAME": {"description", "context"}}`).
    pub fn from_json(kind: CatalogKind, json: &str) -> anyhow::Result<Self> {
        let entries: BTreeMap<String, CodeInfo> = serde_json::from_str(json)
            .with_context(|| format!("Failed to parse {}", kind.file_name()))?;
        Ok(Self { kind, entries })
    }

    /// Which catalog this is.
    #[must_use]
    pub const fn kind(&self) -> CatalogKind {
        self.kind
    }

    /// Returns true if `name` is in the catalog. Matching is exact.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Looks up `name`, failing with `UnknownKey` when absent.
    pub fn get(&self, name: &str) -> Result<&CodeInfo> {
        self.entries
            .get(name)
            .ok_or_else(|| ZmkError::unknown_key(self.kind.vocabulary(), name))
    }

    /// Iterates over code names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over `(name, info)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CodeInfo)> {
        self.entries.iter().map(|(name, info)| (name.as_str(), info))
    }

    /// Number of codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the catalog has no codes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive search over names, descriptions and contexts.
    ///
    /// Exact name matches rank first, then prefix matches, then substring
    /// matches on the name, then matches in the description or context.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<(&str, &CodeInfo)> {
        if query.is_empty() {
            return self.iter().collect();
        }

        let query_lower = query.to_lowercase();
        let mut results: Vec<((&str, &CodeInfo), i32)> = self
            .iter()
            .filter_map(|(name, info)| {
                let name_lower = name.to_lowercase();
                let score = if name_lower == query_lower {
                    100
                } else if name_lower.starts_with(&query_lower) {
                    50
                } else if name_lower.contains(&query_lower) {
                    10
                } else if info.description.to_lowercase().contains(&query_lower)
                    || info.context.to_lowercase().contains(&query_lower)
                {
                    5
                } else {
                    return None;
                };
                Some(((name, info), score))
            })
            .collect();

        // Stable sort keeps name order within one score
        results.sort_by(|a, b| b.1.cmp(&a.1));
        results.into_iter().map(|(entry, _)| entry).collect()
    }
}

/// The four catalogs, loaded together.
#[derive(Debug, Clone)]
pub struct Catalogs {
    /// Key code catalog
    pub key_codes: Catalog,
    /// Function modifier catalog
    pub function_modifiers: Catalog,
    /// Bluetooth key code catalog
    pub bluetooth_key_codes: Catalog,
    /// Output key code catalog
    pub output_key_codes: Catalog,
}

impl Catalogs {
    /// Loads the catalogs embedded in the binary.
    pub fn load() -> anyhow::Result<Self> {
        Self::build(|kind| Ok(kind.embedded().to_string()))
    }

    /// Loads catalogs from `dir`, falling back to the embedded copy for
    /// every file that is not present there.
    pub fn load_from_dir(dir: &Path) -> anyhow::Result<Self> {
        Self::build(|kind| {
            let path = dir.join(kind.file_name());
            if path.is_file() {
                debug!("Loading {} from {}", kind, path.display());
                fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read catalog file: {}", path.display()))
            } else {
                Ok(kind.embedded().to_string())
            }
        })
    }

    fn build(mut source: impl FnMut(CatalogKind) -> anyhow::Result<String>) -> anyhow::Result<Self> {
        let mut parse = |kind| -> anyhow::Result<Catalog> {
            let json = source(kind)?;
            Catalog::from_json(kind, &json)
        };

        let catalogs = Self {
            key_codes: parse(CatalogKind::KeyCodes)?,
            function_modifiers: parse(CatalogKind::FunctionModifiers)?,
            bluetooth_key_codes: parse(CatalogKind::BluetoothKeyCodes)?,
            output_key_codes: parse(CatalogKind::OutputKeyCodes)?,
        };
        debug!(
            "Loaded catalogs: {} key codes, {} modifiers, {} bluetooth, {} output",
            catalogs.key_codes.len(),
            catalogs.function_modifiers.len(),
            catalogs.bluetooth_key_codes.len(),
            catalogs.output_key_codes.len()
        );
        Ok(catalogs)
    }

    /// Returns the catalog of the given kind.
    #[must_use]
    pub const fn get(&self, kind: CatalogKind) -> &Catalog {
        match kind {
            CatalogKind::KeyCodes => &self.key_codes,
            CatalogKind::FunctionModifiers => &self.function_modifiers,
            CatalogKind::BluetoothKeyCodes => &self.bluetooth_key_codes,
            CatalogKind::OutputKeyCodes => &self.output_key_codes,
        }
    }
}
