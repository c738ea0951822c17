//! Typed property values shared by behaviours, drivers and config options.
//!
//! Each settable property is described by a [`PropertySpec`]: a name and the
//! set of value kinds it accepts. Setters check the kind with
//! [`PropertySpec::check_type`] and then apply their own predicate.

use crate::codes::{BluetoothKeyCode, CodeEntity, FunctionModifier, KeyCode, OutputKeyCode};
use crate::error::{Result, ZmkError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value passed to a property setter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Integer value
    Integer(i64),
    /// Boolean value
    Bool(bool),
    /// String value
    Text(String),
    /// Homogeneous list (e.g. GPIO pins)
    List(Vec<Value>),
    /// A code entity
    Code(CodeEntity),
}

/// The kind of a [`Value`], used in allowed-type sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// `Value::Integer`
    Integer,
    /// `Value::Bool`
    Bool,
    /// `Value::Text`
    Text,
    /// `Value::List`
    List,
    /// `Value::Code` holding a key code
    KeyCode,
    /// `Value::Code` holding a function modifier
    FunctionModifier,
    /// `Value::Code` holding a bluetooth code
    BluetoothKeyCode,
    /// `Value::Code` holding an output code
    OutputKeyCode,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Integer => "int",
            Self::Bool => "bool",
            Self::Text => "str",
            Self::List => "list",
            Self::KeyCode => "KeyCode",
            Self::FunctionModifier => "FunctionModifier",
            Self::BluetoothKeyCode => "BluetoothKeyCode",
            Self::OutputKeyCode => "OutputKeyCode",
        };
        f.write_str(name)
    }
}

impl Value {
    /// The kind of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Integer(_) => ValueKind::Integer,
            Self::Bool(_) => ValueKind::Bool,
            Self::Text(_) => ValueKind::Text,
            Self::List(_) => ValueKind::List,
            Self::Code(CodeEntity::KeyCode(_)) => ValueKind::KeyCode,
            Self::Code(CodeEntity::FunctionModifier(_)) => ValueKind::FunctionModifier,
            Self::Code(CodeEntity::BluetoothKeyCode(_)) => ValueKind::BluetoothKeyCode,
            Self::Code(CodeEntity::OutputKeyCode(_)) => ValueKind::OutputKeyCode,
        }
    }

    /// Returns the integer, if this is one.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the boolean, if this is one.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the string, if this is one.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "'{value}'"),
            Self::List(values) => {
                let items: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", items.join(", "))
            }
            Self::Code(code) => fmt::Display::fmt(code, f),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<CodeEntity> for Value {
    fn from(code: CodeEntity) -> Self {
        Self::Code(code)
    }
}

macro_rules! value_from_code {
    ($($code:ty),*) => {
        $(
            impl From<$code> for Value {
                fn from(code: $code) -> Self {
                    Self::Code(code.into())
                }
            }
        )*
    };
}

value_from_code!(KeyCode, FunctionModifier, BluetoothKeyCode, OutputKeyCode);

/// Name and allowed value kinds of one property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PropertySpec {
    /// Property name as used by `set_property`
    pub name: &'static str,
    /// Accepted value kinds
    pub types: &'static [ValueKind],
}

impl PropertySpec {
    /// Creates a property descriptor.
    #[must_use]
    pub const fn new(name: &'static str, types: &'static [ValueKind]) -> Self {
        Self { name, types }
    }

    /// Fails with `InvalidType` unless `value` is one of the allowed kinds.
    pub fn check_type(&self, value: &Value) -> Result<()> {
        if self.types.contains(&value.kind()) {
            Ok(())
        } else {
            Err(ZmkError::invalid_type(
                self.name,
                self.expected(),
                value.kind().to_string(),
            ))
        }
    }

    /// Allowed kinds joined with `|`.
    #[must_use]
    pub fn expected(&self) -> String {
        self.types
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// A property descriptor paired with its current value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Property {
    /// Property name
    pub name: &'static str,
    /// Accepted value kinds
    pub types: &'static [ValueKind],
    /// Current value, `None` when unset
    pub value: Option<Value>,
}

impl Property {
    /// Pairs `spec` with `value`.
    #[must_use]
    pub const fn new(spec: PropertySpec, value: Option<Value>) -> Self {
        Self {
            name: spec.name,
            types: spec.types,
            value,
        }
    }

    /// Returns true when a value is stored.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.value.is_some()
    }
}

/// Finds the descriptor named `name`, failing with `UnknownKey`.
pub fn find_spec(owner: &str, specs: &[PropertySpec], name: &str) -> Result<PropertySpec> {
    specs
        .iter()
        .find(|spec| spec.name == name)
        .copied()
        .ok_or_else(|| ZmkError::unknown_key(format!("property of {owner}"), name))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYER: PropertySpec = PropertySpec::new("layer", &[ValueKind::Integer]);

    #[test]
    fn test_check_type_accepts_allowed_kind() {
        assert!(LAYER.check_type(&Value::Integer(1)).is_ok());
    }

    #[test]
    fn test_check_type_rejects_other_kind() {
        let err = LAYER.check_type(&Value::from("1")).unwrap_err();
        assert!(matches!(err, ZmkError::InvalidType { .. }));
        assert_eq!(
            err.to_string(),
            "invalid type for 'layer': expected int, found str"
        );
    }

    #[test]
    fn test_find_spec_unknown() {
        let err = find_spec("MomentaryLayer", &[LAYER], "binding").unwrap_err();
        assert!(matches!(err, ZmkError::UnknownKey { .. }));
        assert!(err.to_string().contains("property of MomentaryLayer"));
    }

    #[test]
    fn test_value_display() {
        let list = Value::List(vec![Value::Integer(4), Value::from("D5")]);
        assert_eq!(list.to_string(), "[4, 'D5']");
    }

    #[test]
    fn test_untagged_value_from_json() {
        let value: Value = serde_json::from_str("[1, true, \"x\"]").unwrap();
        assert_eq!(
            value,
            Value::List(vec![Value::Integer(1), Value::Bool(true), Value::from("x")])
        );
    }
}
