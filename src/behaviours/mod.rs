//! Key behaviours: what a key does when pressed.
//!
//! Each variant carries its properties as optional typed fields. Properties
//! are set through [`Behaviour::set_property`], which checks the value kind
//! and predicate before storing, and must all be set before
//! [`Behaviour::build`] succeeds.

use crate::build::{list_union, BuildFragment, KeymapFragment};
use crate::catalog::Catalogs;
use crate::codes::{BluetoothKeyCode, CodeEntity, KeyBinding, OutputKeyCode};
use crate::constants::BEHAVIORS_HEADER;
use crate::error::{Result, ZmkError};
use crate::properties::{find_spec, Property, PropertySpec, Value, ValueKind};
use serde::{Deserialize, Serialize};
use std::fmt;

const BINDING: PropertySpec = PropertySpec::new(
    "binding",
    &[ValueKind::KeyCode, ValueKind::FunctionModifier],
);
const LAYER: PropertySpec = PropertySpec::new("layer", &[ValueKind::Integer]);
const BT_BINDING: PropertySpec = PropertySpec::new("binding", &[ValueKind::BluetoothKeyCode]);
const OUT_BINDING: PropertySpec = PropertySpec::new("binding", &[ValueKind::OutputKeyCode]);

/// A key behaviour.
///
/// Serialized with the variant name as tag, for example
/// `{"MomentaryLayer": {"layer": 1}}` or `"Transparent"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behaviour {
    /// `&kp` - send a key code
    KeyPress {
        /// Key code or modifier to send
        #[serde(default)]
        binding: Option<KeyBinding>,
    },
    /// `&mo` - layer active while held
    MomentaryLayer {
        /// Layer index
        #[serde(default)]
        layer: Option<u32>,
    },
    /// `&lt` - layer while held, key code on tap
    LayerTap {
        /// Layer index
        #[serde(default)]
        layer: Option<u32>,
        /// Key sent on tap
        #[serde(default)]
        binding: Option<KeyBinding>,
    },
    /// `&tog` - toggle a layer
    ToggleLayer {
        /// Layer index
        #[serde(default)]
        layer: Option<u32>,
    },
    /// `&trans` - fall through to the next active layer
    Transparent,
    /// `&none` - do nothing
    NoneBehaviour,
    /// `&reset` - reset the keyboard
    Reset,
    /// `&bootloader` - enter the bootloader
    BootloaderReset,
    /// `&bt` - bluetooth profile command
    Bluetooth {
        /// Bluetooth command
        #[serde(default)]
        binding: Option<BluetoothKeyCode>,
    },
    /// `&out` - select the output endpoint
    OutputSelection {
        /// Output command
        #[serde(default)]
        binding: Option<OutputKeyCode>,
    },
}

impl Behaviour {
    /// Names of all behaviour variants.
    pub const NAMES: [&'static str; 10] = [
        "KeyPress",
        "MomentaryLayer",
        "LayerTap",
        "ToggleLayer",
        "Transparent",
        "NoneBehaviour",
        "Reset",
        "BootloaderReset",
        "Bluetooth",
        "OutputSelection",
    ];

    /// Creates the variant named `name` with every property unset.
    pub fn empty(name: &str) -> Result<Self> {
        Ok(match name {
            "KeyPress" => Self::KeyPress { binding: None },
            "MomentaryLayer" => Self::MomentaryLayer { layer: None },
            "LayerTap" => Self::LayerTap {
                layer: None,
                binding: None,
            },
            "ToggleLayer" => Self::ToggleLayer { layer: None },
            "Transparent" => Self::Transparent,
            "NoneBehaviour" => Self::NoneBehaviour,
            "Reset" => Self::Reset,
            "BootloaderReset" => Self::BootloaderReset,
            "Bluetooth" => Self::Bluetooth { binding: None },
            "OutputSelection" => Self::OutputSelection { binding: None },
            other => return Err(ZmkError::unknown_key("behaviour", other)),
        })
    }

    /// `&kp binding`.
    pub fn key_press(binding: impl Into<CodeEntity>) -> Result<Self> {
        let mut behaviour = Self::KeyPress { binding: None };
        behaviour.set_property("binding", Value::Code(binding.into()))?;
        Ok(behaviour)
    }

    /// `&mo layer`. Negative layers are `InvalidValue`.
    pub fn momentary_layer(layer: i64) -> Result<Self> {
        Ok(Self::MomentaryLayer {
            layer: Some(check_layer(layer)?),
        })
    }

    /// `&lt layer binding`.
    pub fn layer_tap(layer: i64, binding: impl Into<CodeEntity>) -> Result<Self> {
        let mut behaviour = Self::LayerTap {
            layer: Some(check_layer(layer)?),
            binding: None,
        };
        behaviour.set_property("binding", Value::Code(binding.into()))?;
        Ok(behaviour)
    }

    /// `&tog layer`.
    pub fn toggle_layer(layer: i64) -> Result<Self> {
        Ok(Self::ToggleLayer {
            layer: Some(check_layer(layer)?),
        })
    }

    /// `&bt binding`.
    pub const fn bluetooth(binding: BluetoothKeyCode) -> Self {
        Self::Bluetooth {
            binding: Some(binding),
        }
    }

    /// `&out binding`.
    pub const fn output_selection(binding: OutputKeyCode) -> Self {
        Self::OutputSelection {
            binding: Some(binding),
        }
    }

    /// Variant name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::KeyPress { .. } => "KeyPress",
            Self::MomentaryLayer { .. } => "MomentaryLayer",
            Self::LayerTap { .. } => "LayerTap",
            Self::ToggleLayer { .. } => "ToggleLayer",
            Self::Transparent => "Transparent",
            Self::NoneBehaviour => "NoneBehaviour",
            Self::Reset => "Reset",
            Self::BootloaderReset => "BootloaderReset",
            Self::Bluetooth { .. } => "Bluetooth",
            Self::OutputSelection { .. } => "OutputSelection",
        }
    }

    const fn specs(&self) -> &'static [PropertySpec] {
        match self {
            Self::KeyPress { .. } => &[BINDING],
            Self::MomentaryLayer { .. } | Self::ToggleLayer { .. } => &[LAYER],
            Self::LayerTap { .. } => &[LAYER, BINDING],
            Self::Bluetooth { .. } => &[BT_BINDING],
            Self::OutputSelection { .. } => &[OUT_BINDING],
            Self::Transparent | Self::NoneBehaviour | Self::Reset | Self::BootloaderReset => &[],
        }
    }

    /// Properties in declaration order, with their current values.
    #[must_use]
    pub fn get_properties(&self) -> Vec<Property> {
        self.specs()
            .iter()
            .map(|spec| Property::new(*spec, self.property_value(spec.name)))
            .collect()
    }

    fn property_value(&self, name: &str) -> Option<Value> {
        let layer = |layer: &Option<u32>| layer.map(|l| Value::Integer(i64::from(l)));
        let binding = |binding: &Option<KeyBinding>| {
            binding.clone().map(|b| Value::Code(CodeEntity::from(b)))
        };
        match (self, name) {
            (Self::KeyPress { binding: b }, "binding") => binding(b),
            (Self::LayerTap { binding: b, .. }, "binding") => binding(b),
            (
                Self::MomentaryLayer { layer: l }
                | Self::ToggleLayer { layer: l }
                | Self::LayerTap { layer: l, .. },
                "layer",
            ) => layer(l),
            (Self::Bluetooth { binding }, "binding") => binding.clone().map(Value::from),
            (Self::OutputSelection { binding }, "binding") => binding.clone().map(Value::from),
            _ => None,
        }
    }

    /// Sets a property.
    ///
    /// Fails with `UnknownKey` for names the variant does not have,
    /// `InvalidType` when the value kind is not allowed and `InvalidValue`
    /// when it fails the predicate. Nothing changes on failure.
    pub fn set_property(&mut self, name: &str, value: Value) -> Result<()> {
        let spec = find_spec(self.name(), self.specs(), name)?;
        spec.check_type(&value)?;

        match (self, value) {
            (
                Self::MomentaryLayer { layer } | Self::ToggleLayer { layer } | Self::LayerTap { layer, .. },
                Value::Integer(value),
            ) if name == "layer" => *layer = Some(check_layer(value)?),
            (Self::KeyPress { binding } | Self::LayerTap { binding, .. }, Value::Code(code)) => {
                *binding = Some(KeyBinding::from_entity(name, code)?);
            }
            (Self::Bluetooth { binding }, Value::Code(CodeEntity::BluetoothKeyCode(code))) => {
                *binding = Some(code);
            }
            (Self::OutputSelection { binding }, Value::Code(CodeEntity::OutputKeyCode(code))) => {
                *binding = Some(code);
            }
            (behaviour, value) => {
                return Err(ZmkError::invalid_type(
                    name,
                    spec.expected(),
                    format!("{} for {}", value.kind(), behaviour.name()),
                ))
            }
        }
        Ok(())
    }

    /// Names of properties that are still unset.
    #[must_use]
    pub fn unset_properties(&self) -> Vec<&'static str> {
        self.get_properties()
            .into_iter()
            .filter(|property| !property.is_set())
            .map(|property| property.name)
            .collect()
    }

    /// Builds `{.keymap: {include, return}}`.
    ///
    /// Fails with `IncompleteState` while any property is unset.
    pub fn build(&self) -> Result<BuildFragment> {
        let unset = self.unset_properties();
        if !unset.is_empty() {
            return Err(ZmkError::incomplete(format!(
                "{} has unset properties: {}",
                self.name(),
                unset.join(", ")
            )));
        }

        let keymap = match self {
            Self::KeyPress {
                binding: Some(binding),
            } => with_binding("&kp", &binding.keymap_fragment()),
            Self::MomentaryLayer { layer: Some(layer) } => plain(format!("&mo {layer}")),
            Self::LayerTap {
                layer: Some(layer),
                binding: Some(binding),
            } => with_binding(&format!("&lt {layer}"), &binding.keymap_fragment()),
            Self::ToggleLayer { layer: Some(layer) } => plain(format!("&tog {layer}")),
            Self::Transparent => plain("&trans"),
            Self::NoneBehaviour => plain("&none"),
            Self::Reset => plain("&reset"),
            Self::BootloaderReset => plain("&bootloader"),
            Self::Bluetooth {
                binding: Some(binding),
            } => with_binding("&bt", &binding.keymap_fragment()),
            Self::OutputSelection {
                binding: Some(binding),
            } => with_binding("&out", &binding.keymap_fragment()),
            other => {
                return Err(ZmkError::incomplete(format!(
                    "{} has unset properties",
                    other.name()
                )))
            }
        };
        Ok(BuildFragment::from_keymap(keymap))
    }

    /// JSON form of the behaviour, children included.
    pub fn export(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Re-validates nested codes after deserialization.
    pub fn relink(&mut self, catalogs: &Catalogs) -> Result<()> {
        match self {
            Self::KeyPress {
                binding: Some(binding),
            }
            | Self::LayerTap {
                binding: Some(binding),
                ..
            } => binding.relink(catalogs),
            Self::Bluetooth {
                binding: Some(binding),
            } => binding.relink(catalogs),
            Self::OutputSelection {
                binding: Some(binding),
            } => binding.relink(catalogs),
            _ => Ok(()),
        }
    }
}

fn check_layer(layer: i64) -> Result<u32> {
    u32::try_from(layer)
        .map_err(|_| ZmkError::invalid_value("layer", format!("must be >= 0, got {layer}")))
}

fn plain(binding: impl Into<String>) -> KeymapFragment {
    KeymapFragment::new([BEHAVIORS_HEADER], binding)
}

fn with_binding(prefix: &str, inner: &KeymapFragment) -> KeymapFragment {
    KeymapFragment {
        include: list_union(&[BEHAVIORS_HEADER.to_string()], &inner.include),
        binding: format!("{prefix} {}", inner.binding),
    }
}

impl fmt::Display for Behaviour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values: Vec<String> = self
            .get_properties()
            .into_iter()
            .map(|property| {
                property
                    .value
                    .map_or_else(|| "None".to_string(), |value| value.to_string())
            })
            .collect();
        write!(f, "{}({})", self.name(), values.join(", "))
    }
}
