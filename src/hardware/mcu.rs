//! Microcontroller boards.

use super::interconnect::Interconnect;
use crate::build::{BoardFragment, BuildFragment, RequiresFragment};
use crate::zmk::ZmkConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A supported controller board. Exported as its bare variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mcu {
    /// nice!nano v2 (nRF52840, Pro Micro footprint)
    NiceNanoV2,
}

impl Mcu {
    /// Every supported board.
    pub const ALL: [Self; 1] = [Self::NiceNanoV2];

    /// Zephyr board identifier.
    #[must_use]
    pub const fn board(self) -> &'static str {
        match self {
            Self::NiceNanoV2 => "nice_nano_v2",
        }
    }

    /// Pin header the board exposes.
    #[must_use]
    pub const fn interconnect(self) -> Interconnect {
        match self {
            Self::NiceNanoV2 => Interconnect::ProMicro,
        }
    }

    /// Whether the board can host `config`. Every configuration fits a
    /// nice!nano.
    #[must_use]
    pub const fn check_config(self, _config: &ZmkConfig) -> bool {
        match self {
            Self::NiceNanoV2 => true,
        }
    }

    /// Board selection for `build.yaml` and `<id>.zmk.yml`.
    #[must_use]
    pub fn build(self, _config: &ZmkConfig) -> BuildFragment {
        BuildFragment {
            build_yaml: Some(BoardFragment {
                board: self.board().to_string(),
            }),
            keyboard_zmk_yml: Some(RequiresFragment {
                requires: self.board().to_string(),
            }),
            ..BuildFragment::default()
        }
    }

    /// Exported form: the variant name.
    #[must_use]
    pub const fn export(self) -> &'static str {
        match self {
            Self::NiceNanoV2 => "NiceNanoV2",
        }
    }
}

impl fmt::Display for Mcu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.export())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_selects_board() {
        let fragment = Mcu::NiceNanoV2.build(&ZmkConfig::new());
        assert_eq!(fragment.build_yaml.unwrap().board, "nice_nano_v2");
        assert_eq!(fragment.keyboard_zmk_yml.unwrap().requires, "nice_nano_v2");
        assert!(fragment.keymap.is_none());
    }

    #[test]
    fn test_export_matches_serde() {
        assert_eq!(
            serde_json::to_value(Mcu::NiceNanoV2).unwrap(),
            serde_json::json!(Mcu::NiceNanoV2.export())
        );
        assert_eq!(Mcu::NiceNanoV2.interconnect(), Interconnect::ProMicro);
    }
}
