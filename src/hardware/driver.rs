//! Keyboard scan drivers.

use super::interconnect::Interconnect;
use crate::build::{BuildFragment, KscanFragment};
use crate::constants::KSCAN_MATRIX_COMPATIBLE;
use crate::error::{Result, ZmkError};
use crate::properties::{find_spec, Property, PropertySpec, Value, ValueKind};
use crate::zmk::ZmkConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

const ROW_GPIOS: PropertySpec = PropertySpec::new("row-gpios", &[ValueKind::List]);
const COL_GPIOS: PropertySpec = PropertySpec::new("col-gpios", &[ValueKind::List]);
const DIODE_DIRECTION: PropertySpec = PropertySpec::new("diode-direction", &[ValueKind::Text]);
const MATRIX_SPECS: &[PropertySpec] = &[ROW_GPIOS, COL_GPIOS, DIODE_DIRECTION];

/// Which way the switch diodes point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiodeDirection {
    /// Current flows from column to row; columns are driven
    #[serde(rename = "col2row")]
    Col2Row,
    /// Current flows from row to column; rows are driven
    #[serde(rename = "row2col")]
    Row2Col,
}

impl DiodeDirection {
    /// Devicetree spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Col2Row => "col2row",
            Self::Row2Col => "row2col",
        }
    }

    fn parse(text: &str) -> Result<Self> {
        match text {
            "col2row" => Ok(Self::Col2Row),
            "row2col" => Ok(Self::Row2Col),
            other => Err(ZmkError::invalid_value(
                DIODE_DIRECTION.name,
                format!("expected col2row or row2col, got '{other}'"),
            )),
        }
    }
}

/// GPIO row/column matrix scanner (`zmk,kscan-gpio-matrix`).
///
/// Pins are stored as interconnect pin numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MatrixDriver {
    #[serde(default)]
    row_gpios: Option<Vec<u8>>,
    #[serde(default)]
    col_gpios: Option<Vec<u8>>,
    #[serde(default)]
    diode_direction: Option<DiodeDirection>,
}

/// A validated property assignment, ready to store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverUpdate {
    /// New row pins
    RowGpios(Vec<u8>),
    /// New column pins
    ColGpios(Vec<u8>),
    /// New diode direction
    DiodeDirection(DiodeDirection),
}

impl MatrixDriver {
    /// Creates a driver with every property unset.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            row_gpios: None,
            col_gpios: None,
            diode_direction: None,
        }
    }

    /// Row pin numbers.
    #[must_use]
    pub fn row_gpios(&self) -> Option<&[u8]> {
        self.row_gpios.as_deref()
    }

    /// Column pin numbers.
    #[must_use]
    pub fn col_gpios(&self) -> Option<&[u8]> {
        self.col_gpios.as_deref()
    }

    /// Diode direction.
    #[must_use]
    pub const fn diode_direction(&self) -> Option<DiodeDirection> {
        self.diode_direction
    }

    fn get_properties(&self) -> Vec<Property> {
        let pins = |pins: &Option<Vec<u8>>| {
            pins.as_ref().map(|pins| {
                Value::List(pins.iter().map(|pin| Value::Integer(i64::from(*pin))).collect())
            })
        };
        vec![
            Property::new(ROW_GPIOS, pins(&self.row_gpios)),
            Property::new(COL_GPIOS, pins(&self.col_gpios)),
            Property::new(
                DIODE_DIRECTION,
                self.diode_direction.map(|d| Value::from(d.as_str())),
            ),
        ]
    }

    fn validate(&self, interconnect: Interconnect, name: &str, value: &Value) -> Result<DriverUpdate> {
        let spec = find_spec("MatrixDriver", MATRIX_SPECS, name)?;
        spec.check_type(value)?;

        match (spec.name, value) {
            ("diode-direction", Value::Text(text)) => {
                DiodeDirection::parse(text).map(DriverUpdate::DiodeDirection)
            }
            (field, Value::List(items)) => {
                let pins = items
                    .iter()
                    .map(|item| interconnect.resolve_pin(field, item))
                    .collect::<Result<Vec<_>>>()?;
                let other = if field == ROW_GPIOS.name {
                    self.col_gpios.as_deref()
                } else {
                    self.row_gpios.as_deref()
                };
                check_unique(field, &pins, other.unwrap_or_default())?;
                Ok(if field == ROW_GPIOS.name {
                    DriverUpdate::RowGpios(pins)
                } else {
                    DriverUpdate::ColGpios(pins)
                })
            }
            (field, other) => Err(ZmkError::invalid_type(
                field,
                spec.expected(),
                other.kind().to_string(),
            )),
        }
    }

    fn apply(&mut self, update: DriverUpdate) {
        match update {
            DriverUpdate::RowGpios(pins) => self.row_gpios = Some(pins),
            DriverUpdate::ColGpios(pins) => self.col_gpios = Some(pins),
            DriverUpdate::DiodeDirection(direction) => self.diode_direction = Some(direction),
        }
    }

    fn build(&self, interconnect: Interconnect) -> Result<BuildFragment> {
        let (Some(rows), Some(cols), Some(direction)) =
            (&self.row_gpios, &self.col_gpios, self.diode_direction)
        else {
            return Err(ZmkError::incomplete("matrix driver has unset properties"));
        };
        for pin in rows.iter().chain(cols) {
            interconnect.get_gpio_pin_name(*pin)?;
        }

        let label = interconnect.dt_label();
        let input = |pin: &u8| format!("<&{label} {pin} (GPIO_ACTIVE_HIGH | GPIO_PULL_DOWN)>");
        let output = |pin: &u8| format!("<&{label} {pin} GPIO_ACTIVE_HIGH>");
        let (row_gpios, col_gpios) = match direction {
            DiodeDirection::Col2Row => (
                rows.iter().map(input).collect(),
                cols.iter().map(output).collect(),
            ),
            DiodeDirection::Row2Col => (
                rows.iter().map(output).collect(),
                cols.iter().map(input).collect(),
            ),
        };

        Ok(BuildFragment {
            overlay: Some(KscanFragment {
                compatible: KSCAN_MATRIX_COMPATIBLE.to_string(),
                diode_direction: direction.as_str().to_string(),
                row_gpios,
                col_gpios,
            }),
            ..BuildFragment::default()
        })
    }
}

fn check_unique(field: &str, pins: &[u8], other: &[u8]) -> Result<()> {
    let mut seen: HashSet<u8> = other.iter().copied().collect();
    for pin in pins {
        if !seen.insert(*pin) {
            return Err(ZmkError::invalid_value(
                field,
                format!("pin {pin} is already used"),
            ));
        }
    }
    Ok(())
}

/// A scan driver. Exported as `{"MatrixDriver": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Driver {
    /// GPIO matrix
    #[serde(rename = "MatrixDriver")]
    Matrix(MatrixDriver),
}

impl Driver {
    /// A matrix driver with nothing set.
    #[must_use]
    pub const fn matrix() -> Self {
        Self::Matrix(MatrixDriver::new())
    }

    /// A fresh, unset driver of the same variant.
    #[must_use]
    pub const fn fresh(&self) -> Self {
        match self {
            Self::Matrix(_) => Self::matrix(),
        }
    }

    /// Variant name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Matrix(_) => "MatrixDriver",
        }
    }

    /// Properties with their current values.
    #[must_use]
    pub fn get_properties(&self) -> Vec<Property> {
        match self {
            Self::Matrix(driver) => driver.get_properties(),
        }
    }

    /// Validates an assignment against the MCU selected in `config`.
    ///
    /// Pins must exist on the MCU's interconnect and may not be used twice.
    /// Fails with `IncompleteState` when no MCU is selected.
    pub fn validate_property(&self, config: &ZmkConfig, name: &str, value: &Value) -> Result<DriverUpdate> {
        let interconnect = interconnect_of(config)?;
        match self {
            Self::Matrix(driver) => driver.validate(interconnect, name, value),
        }
    }

    /// Returns true when [`validate_property`](Self::validate_property) would succeed.
    #[must_use]
    pub fn check_property(&self, config: &ZmkConfig, name: &str, value: &Value) -> bool {
        self.validate_property(config, name, value).is_ok()
    }

    /// Stores an update produced by [`validate_property`](Self::validate_property).
    pub fn apply(&mut self, update: DriverUpdate) {
        match self {
            Self::Matrix(driver) => driver.apply(update),
        }
    }

    /// Validates and stores a property on a driver not yet owned by `config`.
    pub fn set_property(&mut self, config: &ZmkConfig, name: &str, value: Value) -> Result<()> {
        let update = self.validate_property(config, name, &value)?;
        self.apply(update);
        Ok(())
    }

    /// Returns true when the stored pins are valid for `config`'s MCU.
    #[must_use]
    pub fn check(&self, config: &ZmkConfig) -> bool {
        self.build(config).is_ok()
    }

    /// Builds the `.overlay` kscan node.
    pub fn build(&self, config: &ZmkConfig) -> Result<BuildFragment> {
        let interconnect = interconnect_of(config)?;
        match self {
            Self::Matrix(driver) => driver.build(interconnect),
        }
    }

    /// JSON form of the driver.
    pub fn export(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// The matrix driver, if this is one.
    #[must_use]
    pub const fn as_matrix(&self) -> Option<&MatrixDriver> {
        match self {
            Self::Matrix(driver) => Some(driver),
        }
    }
}

fn interconnect_of(config: &ZmkConfig) -> Result<Interconnect> {
    config
        .mcu()
        .map(|mcu| mcu.interconnect())
        .ok_or_else(|| ZmkError::incomplete("select an MCU before configuring the driver"))
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
