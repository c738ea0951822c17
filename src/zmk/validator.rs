//! Configuration checks run before a build.
//!
//! [`ZmkConfig::check_config`] never fails: it collects everything that would
//! make [`ZmkConfig::build_config`] fail, or produce firmware that does not
//! match the physical keyboard, into a [`ValidationReport`].

use super::{OptionTarget, SplitSide, ZmkConfig};
use crate::options::OptionKind;
use crate::properties::Value;
use serde::Serialize;
use std::fmt::{self, Write as _};

/// Part of the configuration a finding belongs to, in the order
/// [`ZmkConfig::check_config`] walks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckSection {
    /// Name and id
    Identity,
    /// MCU, driver and matrix
    Hardware,
    /// Transform, physical layout and keymap
    Keys,
    /// Kconfig options
    Options,
}

impl CheckSection {
    /// Every section, in report order.
    pub const ALL: [Self; 4] = [Self::Identity, Self::Hardware, Self::Keys, Self::Options];
}

impl fmt::Display for CheckSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Identity => "identity",
            Self::Hardware => "hardware",
            Self::Keys => "keys",
            Self::Options => "options",
        })
    }
}

/// Everything [`ZmkConfig::check_config`] found.
///
/// Errors block [`ZmkConfig::build_config`]; warnings do not.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// Problems that prevent a build
    pub errors: Vec<ValidationError>,
    /// Suspicious but buildable settings
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// An empty report.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// True when nothing blocks a build.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Records an error.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Records a warning.
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// True if any error has `kind`.
    #[must_use]
    pub fn has_error(&self, kind: ValidationErrorKind) -> bool {
        self.errors.iter().any(|error| error.kind == kind)
    }

    /// Renders the findings grouped by section, followed by a tally.
    ///
    /// ```text
    /// hardware:
    ///   error: no MCU selected
    ///     hint: Select a controller such as NiceNanoV2
    /// keys:
    ///   error: key 2: no behaviour bound
    ///
    /// 2 errors, 0 warnings
    /// ```
    #[must_use]
    pub fn format_message(&self) -> String {
        let mut out = String::new();

        for section in CheckSection::ALL {
            let errors = self.errors.iter().filter(|e| e.kind.section() == section);
            let warnings = self.warnings.iter().filter(|w| w.section == section);
            let mut lines = errors
                .map(|e| format!("  error: {e}"))
                .chain(warnings.map(|w| format!("  warning: {w}")))
                .peekable();
            if lines.peek().is_none() {
                continue;
            }
            let _ = writeln!(out, "{section}:");
            for line in lines {
                let _ = writeln!(out, "{line}");
            }
        }

        let _ = write!(
            out,
            "\n{} error{}, {} warning{}\n",
            self.errors.len(),
            plural(self.errors.len()),
            self.warnings.len(),
            plural(self.warnings.len())
        );
        out
    }
}

const fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// A problem that blocks a build.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationError {
    /// What went wrong
    pub kind: ValidationErrorKind,
    /// Key index the error refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<usize>,
    /// Human-readable description
    pub message: String,
    /// How to fix it, when there is an obvious fix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ValidationError {
    /// An error of `kind` not tied to a key.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            key: None,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Ties the error to key `key`.
    #[must_use]
    pub const fn with_key(mut self, key: usize) -> Self {
        self.key = Some(key);
        self
    }

    /// Attaches a fix hint.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(key) = self.key {
            write!(f, "key {key}: ")?;
        }
        f.write_str(&self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n    hint: {suggestion}")?;
        }
        Ok(())
    }
}

/// Kinds of build-blocking problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValidationErrorKind {
    /// Config name or id not set
    MissingIdentity,
    /// No MCU selected
    MissingMcu,
    /// MCU cannot host the configuration
    UnsupportedMcu,
    /// No scan driver installed
    MissingDriver,
    /// Driver properties unset or pins invalid for the MCU
    InvalidDriver,
    /// Transform position outside the driver's rows or columns
    MatrixOutOfBounds,
    /// Matrix transform has unset slots
    IncompleteTransform,
    /// Key-indexed tables disagree on the number of keys
    MismatchedKeyCount,
    /// Keymap slot without a behaviour
    UnsetKeyBinding,
    /// Behaviour with unset properties
    IncompleteBehaviour,
    /// Config option without a value or invalid for this configuration
    InvalidOption,
}

impl ValidationErrorKind {
    /// The section this kind of error is reported under.
    #[must_use]
    pub const fn section(self) -> CheckSection {
        match self {
            Self::MissingIdentity => CheckSection::Identity,
            Self::MissingMcu
            | Self::UnsupportedMcu
            | Self::MissingDriver
            | Self::InvalidDriver
            | Self::MatrixOutOfBounds => CheckSection::Hardware,
            Self::IncompleteTransform
            | Self::MismatchedKeyCount
            | Self::UnsetKeyBinding
            | Self::IncompleteBehaviour => CheckSection::Keys,
            Self::InvalidOption => CheckSection::Options,
        }
    }
}

/// A setting that builds but probably is not what was meant.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationWarning {
    /// Section the warning belongs to
    pub section: CheckSection,
    /// Human-readable description
    pub message: String,
}

impl ValidationWarning {
    /// A warning under `section`.
    pub fn new(section: CheckSection, message: impl Into<String>) -> Self {
        Self {
            section,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

const OPTION_TARGETS: [OptionTarget; 4] = [
    OptionTarget::Default,
    OptionTarget::Regular,
    OptionTarget::Split(SplitSide::Central),
    OptionTarget::Split(SplitSide::Peripheral),
];

impl ZmkConfig {
    /// Checks the whole configuration.
    ///
    /// Checks:
    /// - name and id are set
    /// - an MCU and a complete driver are present
    /// - the transform is complete and fits the driver's matrix
    /// - keymap, transform and physical layout agree on the key count
    /// - every keymap slot holds a fully configured behaviour
    /// - every option is valid for this configuration
    #[must_use]
    pub fn check_config(&self) -> ValidationReport {
        let mut report = ValidationReport::new();

        self.check_identity(&mut report);
        self.check_hardware(&mut report);
        self.check_keys(&mut report);
        self.check_options(&mut report);

        report
    }

    fn check_identity(&self, report: &mut ValidationReport) {
        if self.config_name.is_none() {
            report.add_error(
                ValidationError::new(ValidationErrorKind::MissingIdentity, "config name is not set")
                    .with_suggestion("Choose a name no upstream shield uses"),
            );
        }
        if self.config_id.is_none() {
            report.add_error(ValidationError::new(
                ValidationErrorKind::MissingIdentity,
                "config id is not set",
            ));
        }
    }

    fn check_hardware(&self, report: &mut ValidationReport) {
        match self.mcu {
            None => report.add_error(
                ValidationError::new(ValidationErrorKind::MissingMcu, "no MCU selected")
                    .with_suggestion("Select a controller such as NiceNanoV2"),
            ),
            Some(mcu) if !mcu.check_config(self) => report.add_error(ValidationError::new(
                ValidationErrorKind::UnsupportedMcu,
                format!("{mcu} cannot host this configuration"),
            )),
            Some(_) => {}
        }

        let Some(driver) = &self.driver else {
            report.add_error(ValidationError::new(
                ValidationErrorKind::MissingDriver,
                "no scan driver installed",
            ));
            return;
        };
        if let Err(e) = driver.build(self) {
            report.add_error(ValidationError::new(
                ValidationErrorKind::InvalidDriver,
                e.to_string(),
            ));
        }

        let (Some(matrix), Some(extent)) = (driver.as_matrix(), self.transform.extent()) else {
            return;
        };
        if let Some(rows) = matrix.row_gpios() {
            if extent.row as usize >= rows.len() {
                report.add_error(ValidationError::new(
                    ValidationErrorKind::MatrixOutOfBounds,
                    format!("transform uses row {} but the driver has {} rows", extent.row, rows.len()),
                ));
            }
        }
        if let Some(cols) = matrix.col_gpios() {
            if extent.col as usize >= cols.len() {
                report.add_error(ValidationError::new(
                    ValidationErrorKind::MatrixOutOfBounds,
                    format!(
                        "transform uses column {} but the driver has {} columns",
                        extent.col,
                        cols.len()
                    ),
                ));
            }
        }
    }

    fn check_keys(&self, report: &mut ValidationReport) {
        for (index, slot) in self.transform.export().iter().enumerate() {
            if slot.is_none() {
                report.add_error(
                    ValidationError::new(
                        ValidationErrorKind::IncompleteTransform,
                        "matrix position not set",
                    )
                    .with_key(index),
                );
            }
        }

        let key_count = if self.physical_layout.is_empty() {
            self.transform.len()
        } else {
            self.physical_layout.len()
        };
        if self.transform.len() != key_count {
            report.add_error(ValidationError::new(
                ValidationErrorKind::MismatchedKeyCount,
                format!(
                    "transform has {} keys, layout has {key_count}",
                    self.transform.len()
                ),
            ));
        }
        if self.keymap.len() != key_count {
            report.add_error(ValidationError::new(
                ValidationErrorKind::MismatchedKeyCount,
                format!("keymap has {} keys, expected {key_count}", self.keymap.len()),
            ));
        }

        for (index, slot) in self.keymap.iter().enumerate() {
            match slot {
                None => report.add_error(
                    ValidationError::new(ValidationErrorKind::UnsetKeyBinding, "no behaviour bound")
                        .with_key(index)
                        .with_suggestion("Bind Transparent or NoneBehaviour to unused keys"),
                ),
                Some(behaviour) => {
                    let unset = behaviour.unset_properties();
                    if !unset.is_empty() {
                        report.add_error(
                            ValidationError::new(
                                ValidationErrorKind::IncompleteBehaviour,
                                format!("{} is missing {}", behaviour.name(), unset.join(", ")),
                            )
                            .with_key(index),
                        );
                    }
                }
            }
        }

        for behaviour in &self.behaviours {
            let unset = behaviour.unset_properties();
            if !unset.is_empty() {
                report.add_error(ValidationError::new(
                    ValidationErrorKind::IncompleteBehaviour,
                    format!("behaviour {} is missing {}", behaviour.name(), unset.join(", ")),
                ));
            }
        }
    }

    fn check_options(&self, report: &mut ValidationReport) {
        for target in OPTION_TARGETS {
            for option in self.options(target) {
                if let Err(e) = self.check_option(target, option) {
                    report.add_error(ValidationError::new(
                        ValidationErrorKind::InvalidOption,
                        format!("{target}: {e}"),
                    ));
                }
            }

            let value_of = |kind: OptionKind| {
                self.options(target)
                    .iter()
                    .find(|option| option.kind() == kind)
                    .and_then(|option| option.value())
                    .and_then(Value::as_integer)
            };
            if let (Some(conn), Some(paired)) =
                (value_of(OptionKind::BtMaxConn), value_of(OptionKind::BtMaxPaired))
            {
                if conn != paired {
                    report.add_warning(ValidationWarning::new(
                        CheckSection::Options,
                        format!("{target}: BT_MAX_CONN ({conn}) and BT_MAX_PAIRED ({paired}) should match"),
                    ));
                }
            }
        }

        if !self.split && !self.split_config_options.is_empty() {
            report.add_warning(ValidationWarning::new(
                CheckSection::Options,
                "split options are set but the keyboard is not split; they will be ignored",
            ));
        }
    }
}
