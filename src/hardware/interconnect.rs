//! Board-to-shield pin headers.

use crate::error::{Result, ZmkError};
use crate::properties::Value;
use serde::{Deserialize, Serialize};

/// Pro Micro header: pin number and the silkscreen names it goes by.
const PRO_MICRO_PINS: &[(u8, &[&str])] = &[
    (0, &["D0"]),
    (1, &["D1"]),
    (2, &["D2"]),
    (3, &["D3"]),
    (4, &["D4", "A6"]),
    (5, &["D5"]),
    (6, &["D6", "A7"]),
    (7, &["D7"]),
    (8, &["D8", "A8"]),
    (9, &["D9", "A9"]),
    (10, &["D10", "A10"]),
    (14, &["D14"]),
    (15, &["D15"]),
    (16, &["D16"]),
    (18, &["D18", "A0"]),
    (19, &["D19", "A1"]),
    (20, &["D20", "A2"]),
    (21, &["D21", "A3"]),
];

/// A pin header layout shared by compatible controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interconnect {
    /// SparkFun Pro Micro footprint
    ProMicro,
}

impl Interconnect {
    /// Devicetree node label of the header (`&pro_micro`).
    #[must_use]
    pub const fn dt_label(self) -> &'static str {
        match self {
            Self::ProMicro => "pro_micro",
        }
    }

    /// Pin numbers with their aliases, in pin order.
    #[must_use]
    pub const fn gpio_map(self) -> &'static [(u8, &'static [&'static str])] {
        match self {
            Self::ProMicro => PRO_MICRO_PINS,
        }
    }

    /// Every alias of every pin, in pin order.
    #[must_use]
    pub fn gpio_names(self) -> Vec<&'static str> {
        self.gpio_map()
            .iter()
            .flat_map(|(_, names)| names.iter().copied())
            .collect()
    }

    /// Aliases of pin `number`, failing with `UnknownKey`.
    pub fn get_gpio_pin_name(self, number: u8) -> Result<&'static [&'static str]> {
        self.gpio_map()
            .iter()
            .find(|(pin, _)| *pin == number)
            .map(|(_, names)| *names)
            .ok_or_else(|| ZmkError::unknown_key("gpio pin", number.to_string()))
    }

    /// Pin number for an alias such as `D4` or `A6`, failing with `UnknownKey`.
    pub fn get_gpio_pin_number(self, name: &str) -> Result<u8> {
        self.gpio_map()
            .iter()
            .find(|(_, names)| names.contains(&name))
            .map(|(pin, _)| *pin)
            .ok_or_else(|| ZmkError::unknown_key("gpio pin name", name))
    }

    /// Resolves a pin given as a number or an alias.
    pub fn resolve_pin(self, field: &str, pin: &Value) -> Result<u8> {
        match pin {
            Value::Integer(number) => {
                let number = u8::try_from(*number)
                    .map_err(|_| ZmkError::unknown_key("gpio pin", number.to_string()))?;
                self.get_gpio_pin_name(number).map(|_| number)
            }
            Value::Text(name) => self.get_gpio_pin_number(name),
            other => Err(ZmkError::invalid_type(field, "int | str", other.kind().to_string())),
        }
    }
}
