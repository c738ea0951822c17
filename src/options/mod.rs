//! Kconfig options written to the shield's `.conf` and defconfig files.
//!
//! An option's validity can depend on the rest of the configuration (the
//! bluetooth connection limits need a higher minimum on split keyboards),
//! so every check takes the aggregate.

use crate::build::BuildFragment;
use crate::constants::KEYBOARD_NAME_MAX_LEN;
use crate::error::{Result, ZmkError};
use crate::properties::{PropertySpec, Value, ValueKind};
use crate::zmk::ZmkConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The supported Kconfig symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OptionKind {
    /// Name advertised over USB and bluetooth
    #[serde(rename = "ZMK_KEYBOARD_NAME")]
    KeyboardName,
    /// Number of consumer keys reported at once
    #[serde(rename = "ZMK_HID_CONSUMER_REPORT_SIZE")]
    HidConsumerReportSize,
    /// Maximum simultaneous bluetooth connections
    #[serde(rename = "BT_MAX_CONN")]
    BtMaxConn,
    /// Maximum paired bluetooth hosts
    #[serde(rename = "BT_MAX_PAIRED")]
    BtMaxPaired,
    /// Keyboard is split into two halves
    #[serde(rename = "ZMK_SPLIT")]
    Split,
    /// This half is the central one
    #[serde(rename = "ZMK_SPLIT_ROLE_CENTRAL")]
    SplitRoleCentral,
}

impl OptionKind {
    /// Every option kind.
    pub const ALL: [Self; 6] = [
        Self::KeyboardName,
        Self::HidConsumerReportSize,
        Self::BtMaxConn,
        Self::BtMaxPaired,
        Self::Split,
        Self::SplitRoleCentral,
    ];

    /// Kconfig symbol without the `CONFIG_` prefix.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::KeyboardName => "ZMK_KEYBOARD_NAME",
            Self::HidConsumerReportSize => "ZMK_HID_CONSUMER_REPORT_SIZE",
            Self::BtMaxConn => "BT_MAX_CONN",
            Self::BtMaxPaired => "BT_MAX_PAIRED",
            Self::Split => "ZMK_SPLIT",
            Self::SplitRoleCentral => "ZMK_SPLIT_ROLE_CENTRAL",
        }
    }

    /// Looks up a kind by its Kconfig symbol.
    pub fn from_symbol(symbol: &str) -> Result<Self> {
        let symbol = symbol.strip_prefix("CONFIG_").unwrap_or(symbol);
        Self::ALL
            .into_iter()
            .find(|kind| kind.symbol() == symbol)
            .ok_or_else(|| ZmkError::unknown_key("config option", symbol))
    }

    /// Name and accepted value kind.
    #[must_use]
    pub const fn spec(self) -> PropertySpec {
        match self {
            Self::KeyboardName => PropertySpec::new(self.symbol(), &[ValueKind::Text]),
            Self::HidConsumerReportSize | Self::BtMaxConn | Self::BtMaxPaired => {
                PropertySpec::new(self.symbol(), &[ValueKind::Integer])
            }
            Self::Split | Self::SplitRoleCentral => {
                PropertySpec::new(self.symbol(), &[ValueKind::Bool])
            }
        }
    }

    /// Bluetooth limits belong on the central half only.
    #[must_use]
    pub const fn is_bluetooth(self) -> bool {
        matches!(self, Self::BtMaxConn | Self::BtMaxPaired)
    }

    /// Validates `value` for this kind against `config`.
    pub fn check(self, config: &ZmkConfig, value: &Value) -> Result<()> {
        self.spec().check_type(value)?;
        let symbol = self.symbol();
        match (self, value) {
            (Self::KeyboardName, Value::Text(name)) => {
                let length = name.chars().count();
                if length > KEYBOARD_NAME_MAX_LEN {
                    return Err(ZmkError::invalid_value(
                        symbol,
                        format!("must be at most {KEYBOARD_NAME_MAX_LEN} characters, got {length}"),
                    ));
                }
            }
            (Self::HidConsumerReportSize, Value::Integer(size)) if *size < 0 => {
                return Err(ZmkError::invalid_value(symbol, format!("must be >= 0, got {size}")));
            }
            (Self::BtMaxConn | Self::BtMaxPaired, Value::Integer(count)) => {
                let minimum = if config.is_split() { 2 } else { 1 };
                if *count < minimum {
                    return Err(ZmkError::invalid_value(
                        symbol,
                        format!("must be >= {minimum}, got {count}"),
                    ));
                }
            }
            (Self::SplitRoleCentral, Value::Bool(true)) if !config.is_split() => {
                return Err(ZmkError::invalid_value(
                    symbol,
                    "the keyboard is not split",
                ));
            }
            _ => {}
        }
        Ok(())
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One Kconfig option and its value.
///
/// Serialized as `{"SYMBOL": value}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "OptionEntry", try_from = "OptionEntry")]
pub struct ConfigOption {
    kind: OptionKind,
    value: Option<Value>,
}

type OptionEntry = BTreeMap<OptionKind, Option<Value>>;

impl From<ConfigOption> for OptionEntry {
    fn from(option: ConfigOption) -> Self {
        Self::from([(option.kind, option.value)])
    }
}

impl TryFrom<OptionEntry> for ConfigOption {
    type Error = String;

    fn try_from(entry: OptionEntry) -> std::result::Result<Self, Self::Error> {
        let mut entries = entry.into_iter();
        match (entries.next(), entries.next()) {
            (Some((kind, value)), None) => Ok(Self { kind, value }),
            _ => Err("a config option must have exactly one symbol".to_string()),
        }
    }
}

impl ConfigOption {
    /// Creates an option, validating `value` against `config` when given.
    pub fn new(kind: OptionKind, config: &ZmkConfig, value: Option<Value>) -> Result<Self> {
        let mut option = Self { kind, value: None };
        if let Some(value) = value {
            option.set_config_property(config, value)?;
        }
        Ok(option)
    }

    /// Which Kconfig symbol this is.
    #[must_use]
    pub const fn kind(&self) -> OptionKind {
        self.kind
    }

    /// Current value, if set.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Checks `value`, or the stored value when `None`, against `config`.
    ///
    /// Returns false instead of failing; an unset option is not valid.
    #[must_use]
    pub fn check_config_property(&self, config: &ZmkConfig, value: Option<&Value>) -> bool {
        value
            .or(self.value.as_ref())
            .is_some_and(|value| self.kind.check(config, value).is_ok())
    }

    /// Stores `value` after validating it against `config`.
    pub fn set_config_property(&mut self, config: &ZmkConfig, value: Value) -> Result<()> {
        self.kind.check(config, &value)?;
        self.value = Some(value);
        Ok(())
    }

    /// The `CONFIG_SYMBOL=value` line, if a value is set.
    #[must_use]
    pub fn conf_line(&self) -> Option<String> {
        let value = match self.value.as_ref()? {
            Value::Bool(true) => "y".to_string(),
            Value::Bool(false) => "n".to_string(),
            Value::Text(text) => format!("\"{}\"", escape_kconfig(text)),
            other => other.to_string(),
        };
        Some(format!("CONFIG_{}={}", self.kind.symbol(), value))
    }

    /// Builds `{.conf: [line]}` after re-validating against `config`.
    pub fn build(&self, config: &ZmkConfig) -> Result<BuildFragment> {
        let (Some(value), Some(line)) = (self.value.as_ref(), self.conf_line()) else {
            return Err(ZmkError::incomplete(format!(
                "config option {} has no value",
                self.kind
            )));
        };
        self.kind.check(config, value)?;
        Ok(BuildFragment::from_conf_line(line))
    }
}

/// Escapes a Kconfig string literal body.
fn escape_kconfig(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

impl fmt::Display for ConfigOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", self.kind, value),
            None => write!(f, "{}=None", self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn split_config() -> ZmkConfig {
        let mut config = ZmkConfig::new();
        config.set_split(true);
        config
    }

    #[test]
    fn test_keyboard_name_length() {
        let config = ZmkConfig::new();
        let option = ConfigOption::new(OptionKind::KeyboardName, &config, Some("Corne".into())).unwrap();
        assert_eq!(option.conf_line().unwrap(), "CONFIG_ZMK_KEYBOARD_NAME=\"Corne\"");

        let too_long = ConfigOption::new(
            OptionKind::KeyboardName,
            &config,
            Some("A name that is far too long".into()),
        );
        assert!(matches!(too_long, Err(ZmkError::InvalidValue { .. })));
    }

    #[test]
    fn test_keyboard_name_is_escaped() {
        let config = ZmkConfig::new();
        let option =
            ConfigOption::new(OptionKind::KeyboardName, &config, Some("My \"Pad\" \\1".into())).unwrap();
        assert_eq!(
            option.conf_line().unwrap(),
            r#"CONFIG_ZMK_KEYBOARD_NAME="My \"Pad\" \\1""#
        );
    }

    #[test]
    fn test_wrong_type_is_invalid_type() {
        let config = ZmkConfig::new();
        let err = ConfigOption::new(OptionKind::Split, &config, Some(Value::Integer(1))).unwrap_err();
        assert!(matches!(err, ZmkError::InvalidType { .. }));
    }

    #[test]
    fn test_bt_minimum_depends_on_split() {
        let unsplit = ZmkConfig::new();
        let split = split_config();
        let option = ConfigOption::new(OptionKind::BtMaxConn, &unsplit, None).unwrap();

        assert!(option.check_config_property(&unsplit, Some(&Value::Integer(1))));
        assert!(!option.check_config_property(&split, Some(&Value::Integer(1))));
        assert!(option.check_config_property(&split, Some(&Value::Integer(2))));
    }

    #[test]
    fn test_check_without_value_uses_stored_value() {
        let config = ZmkConfig::new();
        let mut option = ConfigOption::new(OptionKind::BtMaxPaired, &config, None).unwrap();
        assert!(!option.check_config_property(&config, None));

        option.set_config_property(&config, Value::Integer(3)).unwrap();
        assert!(option.check_config_property(&config, None));
    }

    #[test]
    fn test_failed_set_keeps_previous_value() {
        let config = ZmkConfig::new();
        let mut option =
            ConfigOption::new(OptionKind::HidConsumerReportSize, &config, Some(Value::Integer(6))).unwrap();
        let err = option.set_config_property(&config, Value::Integer(-1)).unwrap_err();
        assert!(matches!(err, ZmkError::InvalidValue { .. }));
        assert_eq!(option.value(), Some(&Value::Integer(6)));
    }

    #[test]
    fn test_split_role_central_requires_split() {
        let err = ConfigOption::new(
            OptionKind::SplitRoleCentral,
            &ZmkConfig::new(),
            Some(Value::Bool(true)),
        )
        .unwrap_err();
        assert!(matches!(err, ZmkError::InvalidValue { .. }));

        let option =
            ConfigOption::new(OptionKind::SplitRoleCentral, &split_config(), Some(Value::Bool(true)))
                .unwrap();
        assert_eq!(option.conf_line().unwrap(), "CONFIG_ZMK_SPLIT_ROLE_CENTRAL=y");
    }

    #[test]
    fn test_build() {
        let config = ZmkConfig::new();
        let option =
            ConfigOption::new(OptionKind::HidConsumerReportSize, &config, Some(Value::Integer(6))).unwrap();
        let fragment = option.build(&config).unwrap();
        assert_eq!(fragment.conf, vec!["CONFIG_ZMK_HID_CONSUMER_REPORT_SIZE=6"]);

        let unset = ConfigOption::new(OptionKind::Split, &config, None).unwrap();
        assert!(matches!(unset.build(&config), Err(ZmkError::IncompleteState(_))));
    }

    #[test]
    fn test_serializes_as_symbol_map() {
        let config = ZmkConfig::new();
        let option = ConfigOption::new(OptionKind::Split, &config, Some(Value::Bool(false))).unwrap();
        let value = serde_json::to_value(&option).unwrap();
        assert_eq!(value, json!({"ZMK_SPLIT": false}));

        let back: ConfigOption = serde_json::from_value(value).unwrap();
        assert_eq!(back, option);
        assert!(serde_json::from_value::<ConfigOption>(json!({})).is_err());
    }

    #[test]
    fn test_from_symbol() {
        assert_eq!(OptionKind::from_symbol("CONFIG_BT_MAX_CONN").unwrap(), OptionKind::BtMaxConn);
        assert_eq!(OptionKind::from_symbol("ZMK_SPLIT").unwrap(), OptionKind::Split);
        assert!(OptionKind::from_symbol("ZMK_WPM").is_err());
    }
}
