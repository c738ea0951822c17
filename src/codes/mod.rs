//! Code entities: key codes, function modifiers, bluetooth and output codes.
//!
//! A code entity wraps one catalog entry. Construction validates the name
//! against its catalog and copies the description and context, after which
//! the entity is immutable. Function modifiers own a nested binding, which
//! makes a binding chain a strictly owned tree (`LC(LS(A))`).

use crate::build::{list_union, BuildFragment, KeymapFragment};
use crate::catalog::{Catalog, Catalogs};
use crate::constants::{
    BINDING_PLACEHOLDER, BT_HEADER, KEYS_HEADER, OUTPUTS_HEADER, PARAM_PLACEHOLDER,
};
use crate::error::{Result, ZmkError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name plus catalog metadata shared by every code entity.
///
/// Only the name is serialized. The metadata is restored from the catalog
/// by `relink` after loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeMeta {
    name: String,
    #[serde(skip)]
    description: String,
    #[serde(skip)]
    context: String,
}

impl CodeMeta {
    fn resolve(catalog: &Catalog, name: &str) -> Result<Self> {
        let info = catalog.get(name)?;
        Ok(Self {
            name: name.to_string(),
            description: info.description.clone(),
            context: info.context.clone(),
        })
    }

    fn relink(&mut self, catalog: &Catalog) -> Result<()> {
        *self = Self::resolve(catalog, &self.name)?;
        Ok(())
    }
}

/// A plain key code such as `A` or `C_VOL_UP`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyCode {
    #[serde(flatten)]
    meta: CodeMeta,
}

impl KeyCode {
    /// Creates a key code, failing with `UnknownKey` if `name` is not in the
    /// key code catalog.
    pub fn new(name: &str, catalogs: &Catalogs) -> Result<Self> {
        Ok(Self {
            meta: CodeMeta::resolve(&catalogs.key_codes, name)?,
        })
    }

    /// Catalog name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// Catalog description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.meta.description
    }

    /// Catalog context.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.meta.context
    }

    /// The `.keymap` section for this code.
    #[must_use]
    pub fn keymap_fragment(&self) -> KeymapFragment {
        KeymapFragment::new([KEYS_HEADER], self.meta.name.clone())
    }

    /// Builds `{.keymap: {include: [keys.h], return: name}}`.
    #[must_use]
    pub fn build(&self) -> BuildFragment {
        BuildFragment::from_keymap(self.keymap_fragment())
    }

    /// Re-validates the name and restores metadata after deserialization.
    pub fn relink(&mut self, catalogs: &Catalogs) -> Result<()> {
        self.meta.relink(&catalogs.key_codes)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyCode('{}')", self.meta.name)
    }
}

/// Binding accepted by key presses, layer taps and function modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyBinding {
    /// A plain key code
    KeyCode(KeyCode),
    /// A modifier wrapping another binding
    FunctionModifier(FunctionModifier),
}

impl KeyBinding {
    /// The `.keymap` section of the wrapped code.
    #[must_use]
    pub fn keymap_fragment(&self) -> KeymapFragment {
        match self {
            Self::KeyCode(code) => code.keymap_fragment(),
            Self::FunctionModifier(modifier) => modifier.keymap_fragment(),
        }
    }

    /// Re-validates the wrapped code after deserialization.
    pub fn relink(&mut self, catalogs: &Catalogs) -> Result<()> {
        match self {
            Self::KeyCode(code) => code.relink(catalogs),
            Self::FunctionModifier(modifier) => modifier.relink(catalogs),
        }
    }

    /// Converts a code entity, failing with `InvalidType` for bluetooth and
    /// output codes.
    pub fn from_entity(field: &str, entity: CodeEntity) -> Result<Self> {
        match entity {
            CodeEntity::KeyCode(code) => Ok(Self::KeyCode(code)),
            CodeEntity::FunctionModifier(modifier) => Ok(Self::FunctionModifier(modifier)),
            other => Err(ZmkError::invalid_type(
                field,
                "KeyCode | FunctionModifier",
                other.type_name(),
            )),
        }
    }
}

impl From<KeyBinding> for CodeEntity {
    fn from(binding: KeyBinding) -> Self {
        match binding {
            KeyBinding::KeyCode(code) => Self::KeyCode(code),
            KeyBinding::FunctionModifier(modifier) => Self::FunctionModifier(modifier),
        }
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyCode(code) => fmt::Display::fmt(code, f),
            Self::FunctionModifier(modifier) => fmt::Display::fmt(modifier, f),
        }
    }
}

/// A modifier function such as `LC(xx)` applied to a nested binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionModifier {
    #[serde(flatten)]
    meta: CodeMeta,
    binding: Box<KeyBinding>,
}

impl FunctionModifier {
    /// Creates a function modifier.
    ///
    /// Fails with `UnknownKey` when `name` is not a known modifier and with
    /// `InvalidType` when `binding` is neither a key code nor a modifier.
    pub fn new(name: &str, binding: impl Into<CodeEntity>, catalogs: &Catalogs) -> Result<Self> {
        let meta = CodeMeta::resolve(&catalogs.function_modifiers, name)?;
        let binding = KeyBinding::from_entity("binding", binding.into())?;
        Ok(Self {
            meta,
            binding: Box::new(binding),
        })
    }

    /// Catalog name, placeholder included (`LC(xx)`).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// Catalog description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.meta.description
    }

    /// Catalog context.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.meta.context
    }

    /// The wrapped binding.
    #[must_use]
    pub fn binding(&self) -> &KeyBinding {
        &self.binding
    }

    /// Substitutes the binding's text for `xx` and unions the includes.
    #[must_use]
    pub fn keymap_fragment(&self) -> KeymapFragment {
        let inner = self.binding.keymap_fragment();
        KeymapFragment {
            include: list_union(&inner.include, &[KEYS_HEADER.to_string()]),
            binding: self.meta.name.replace(BINDING_PLACEHOLDER, &inner.binding),
        }
    }

    /// Builds the `.keymap` fragment.
    #[must_use]
    pub fn build(&self) -> BuildFragment {
        BuildFragment::from_keymap(self.keymap_fragment())
    }

    /// Re-validates this modifier and its nested bindings.
    pub fn relink(&mut self, catalogs: &Catalogs) -> Result<()> {
        self.meta.relink(&catalogs.function_modifiers)?;
        self.binding.relink(catalogs)
    }
}

impl fmt::Display for FunctionModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionModifier('{}', {})", self.meta.name, self.binding)
    }
}

/// A bluetooth command, optionally carrying a profile index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BluetoothKeyCode {
    #[serde(flatten)]
    meta: CodeMeta,
    #[serde(default)]
    param: Option<u32>,
}

impl BluetoothKeyCode {
    /// Creates a bluetooth code.
    ///
    /// Parameterized names (`BT_SEL(xx)`) need a non-negative `param`; every
    /// other name must be given `None`. Violations are `InvalidValue`.
    pub fn new(name: &str, param: Option<i64>, catalogs: &Catalogs) -> Result<Self> {
        let meta = CodeMeta::resolve(&catalogs.bluetooth_key_codes, name)?;
        let param = Self::check_param(name, param)?;
        Ok(Self { meta, param })
    }

    fn check_param(name: &str, param: Option<i64>) -> Result<Option<u32>> {
        let parameterized = name.contains(PARAM_PLACEHOLDER);
        match (parameterized, param) {
            (true, Some(value)) => u32::try_from(value).map(Some).map_err(|_| {
                ZmkError::invalid_value("param", format!("{name} needs a profile index >= 0, got {value}"))
            }),
            (true, None) => Err(ZmkError::invalid_value(
                "param",
                format!("{name} needs a profile index"),
            )),
            (false, Some(value)) => Err(ZmkError::invalid_value(
                "param",
                format!("{name} takes no parameter, got {value}"),
            )),
            (false, None) => Ok(None),
        }
    }

    /// Catalog name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// Catalog description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.meta.description
    }

    /// Catalog context.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.meta.context
    }

    /// Profile index for parameterized codes.
    #[must_use]
    pub const fn param(&self) -> Option<u32> {
        self.param
    }

    /// `BT_SEL(xx)` with param 1 becomes `BT_SEL 1`.
    #[must_use]
    pub fn keymap_fragment(&self) -> KeymapFragment {
        let binding = match self.param {
            Some(param) => self.meta.name.replace(PARAM_PLACEHOLDER, &format!(" {param}")),
            None => self.meta.name.clone(),
        };
        KeymapFragment::new([BT_HEADER], binding)
    }

    /// Builds the `.keymap` fragment.
    #[must_use]
    pub fn build(&self) -> BuildFragment {
        BuildFragment::from_keymap(self.keymap_fragment())
    }

    /// Re-validates name and parameter after deserialization.
    pub fn relink(&mut self, catalogs: &Catalogs) -> Result<()> {
        self.meta.relink(&catalogs.bluetooth_key_codes)?;
        Self::check_param(&self.meta.name, self.param.map(i64::from))?;
        Ok(())
    }
}

impl fmt::Display for BluetoothKeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.param {
            Some(param) => write!(f, "BluetoothKeyCode('{}', {})", self.meta.name, param),
            None => write!(f, "BluetoothKeyCode('{}')", self.meta.name),
        }
    }
}

/// An output selection code such as `OUT_USB`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputKeyCode {
    #[serde(flatten)]
    meta: CodeMeta,
}

impl OutputKeyCode {
    /// Creates an output code, failing with `UnknownKey` for unknown names.
    pub fn new(name: &str, catalogs: &Catalogs) -> Result<Self> {
        Ok(Self {
            meta: CodeMeta::resolve(&catalogs.output_key_codes, name)?,
        })
    }

    /// Catalog name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.meta.name
    }

    /// Catalog description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.meta.description
    }

    /// Catalog context.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.meta.context
    }

    /// The `.keymap` section for this code.
    #[must_use]
    pub fn keymap_fragment(&self) -> KeymapFragment {
        KeymapFragment::new([OUTPUTS_HEADER], self.meta.name.clone())
    }

    /// Builds the `.keymap` fragment.
    #[must_use]
    pub fn build(&self) -> BuildFragment {
        BuildFragment::from_keymap(self.keymap_fragment())
    }

    /// Re-validates the name after deserialization.
    pub fn relink(&mut self, catalogs: &Catalogs) -> Result<()> {
        self.meta.relink(&catalogs.output_key_codes)
    }
}

impl fmt::Display for OutputKeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutputKeyCode('{}')", self.meta.name)
    }
}

/// Any code entity. Used where a property accepts several code types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodeEntity {
    /// Plain key code
    KeyCode(KeyCode),
    /// Function modifier
    FunctionModifier(FunctionModifier),
    /// Bluetooth command
    BluetoothKeyCode(BluetoothKeyCode),
    /// Output selection
    OutputKeyCode(OutputKeyCode),
}

impl CodeEntity {
    /// Name of the entity type, for error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::KeyCode(_) => "KeyCode",
            Self::FunctionModifier(_) => "FunctionModifier",
            Self::BluetoothKeyCode(_) => "BluetoothKeyCode",
            Self::OutputKeyCode(_) => "OutputKeyCode",
        }
    }

    /// Catalog name of the wrapped code.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::KeyCode(code) => code.name(),
            Self::FunctionModifier(code) => code.name(),
            Self::BluetoothKeyCode(code) => code.name(),
            Self::OutputKeyCode(code) => code.name(),
        }
    }

    /// The `.keymap` section of the wrapped code.
    #[must_use]
    pub fn keymap_fragment(&self) -> KeymapFragment {
        match self {
            Self::KeyCode(code) => code.keymap_fragment(),
            Self::FunctionModifier(code) => code.keymap_fragment(),
            Self::BluetoothKeyCode(code) => code.keymap_fragment(),
            Self::OutputKeyCode(code) => code.keymap_fragment(),
        }
    }

    /// Builds the wrapped code.
    #[must_use]
    pub fn build(&self) -> BuildFragment {
        BuildFragment::from_keymap(self.keymap_fragment())
    }
}

impl From<KeyCode> for CodeEntity {
    fn from(code: KeyCode) -> Self {
        Self::KeyCode(code)
    }
}

impl From<FunctionModifier> for CodeEntity {
    fn from(code: FunctionModifier) -> Self {
        Self::FunctionModifier(code)
    }
}

impl From<BluetoothKeyCode> for CodeEntity {
    fn from(code: BluetoothKeyCode) -> Self {
        Self::BluetoothKeyCode(code)
    }
}

impl From<OutputKeyCode> for CodeEntity {
    fn from(code: OutputKeyCode) -> Self {
        Self::OutputKeyCode(code)
    }
}

impl fmt::Display for CodeEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyCode(code) => fmt::Display::fmt(code, f),
            Self::FunctionModifier(code) => fmt::Display::fmt(code, f),
            Self::BluetoothKeyCode(code) => fmt::Display::fmt(code, f),
            Self::OutputKeyCode(code) => fmt::Display::fmt(code, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogs() -> Catalogs {
        Catalogs::load().expect("Failed to load catalogs")
    }

    #[test]
    fn test_key_code_build_returns_name_for_whole_catalog() {
        let catalogs = catalogs();
        for name in catalogs.key_codes.names() {
            let code = KeyCode::new(name, &catalogs).unwrap();
            let fragment = code.build();
            let keymap = fragment.keymap().unwrap();
            assert_eq!(keymap.binding, name);
            assert_eq!(keymap.include, vec![KEYS_HEADER]);
        }
    }

    #[test]
    fn test_key_code_copies_catalog_metadata() {
        let catalogs = catalogs();
        let code = KeyCode::new("RET", &catalogs).unwrap();
        assert_eq!(code.description(), "Return / Enter");
        assert_eq!(code.context(), "Keyboard Control");
    }

    #[test]
    fn test_key_code_unknown_name() {
        let catalogs = catalogs();
        let err = KeyCode::new("invalid key", &catalogs).unwrap_err();
        assert!(matches!(err, ZmkError::UnknownKey { .. }));
    }

    #[test]
    fn test_function_modifier_substitutes_binding() {
        let catalogs = catalogs();
        let a = KeyCode::new("A", &catalogs).unwrap();
        let modifier = FunctionModifier::new("LC(xx)", a, &catalogs).unwrap();

        let fragment = modifier.build();
        let keymap = fragment.keymap().unwrap();
        assert_eq!(keymap.binding, "LC(A)");
        assert_eq!(keymap.include, vec![KEYS_HEADER]);
    }

    #[test]
    fn test_function_modifier_nests() {
        let catalogs = catalogs();
        let a = KeyCode::new("A", &catalogs).unwrap();
        let shift = FunctionModifier::new("LS(xx)", a, &catalogs).unwrap();
        let ctrl_shift = FunctionModifier::new("LC(xx)", shift, &catalogs).unwrap();

        assert_eq!(ctrl_shift.keymap_fragment().binding, "LC(LS(A))");
        assert_eq!(
            ctrl_shift.to_string(),
            "FunctionModifier('LC(xx)', FunctionModifier('LS(xx)', KeyCode('A')))"
        );
    }

    #[test]
    fn test_function_modifier_rejects_bluetooth_binding() {
        let catalogs = catalogs();
        let bt = BluetoothKeyCode::new("BT_CLR", None, &catalogs).unwrap();
        let err = FunctionModifier::new("LC(xx)", bt, &catalogs).unwrap_err();
        assert!(matches!(err, ZmkError::InvalidType { .. }));
    }

    #[test]
    fn test_function_modifier_unknown_name() {
        let catalogs = catalogs();
        let a = KeyCode::new("A", &catalogs).unwrap();
        let err = FunctionModifier::new("XX(xx)", a, &catalogs).unwrap_err();
        assert!(matches!(err, ZmkError::UnknownKey { .. }));
    }

    #[test]
    fn test_bluetooth_select_with_param() {
        let catalogs = catalogs();
        let code = BluetoothKeyCode::new("BT_SEL(xx)", Some(1), &catalogs).unwrap();
        let keymap = code.keymap_fragment();
        assert_eq!(keymap.binding, "BT_SEL 1");
        assert_eq!(keymap.include, vec![BT_HEADER]);
    }

    #[test]
    fn test_bluetooth_param_rules() {
        let catalogs = catalogs();
        let negative = BluetoothKeyCode::new("BT_SEL(xx)", Some(-1), &catalogs).unwrap_err();
        assert!(matches!(negative, ZmkError::InvalidValue { .. }));

        let missing = BluetoothKeyCode::new("BT_SEL(xx)", None, &catalogs).unwrap_err();
        assert!(matches!(missing, ZmkError::InvalidValue { .. }));

        let unexpected = BluetoothKeyCode::new("BT_CLR", Some(1), &catalogs).unwrap_err();
        assert!(matches!(unexpected, ZmkError::InvalidValue { .. }));

        let plain = BluetoothKeyCode::new("BT_CLR", None, &catalogs).unwrap();
        assert_eq!(plain.keymap_fragment().binding, "BT_CLR");
    }

    #[test]
    fn test_output_key_code() {
        let catalogs = catalogs();
        let code = OutputKeyCode::new("OUT_BLE", &catalogs).unwrap();
        let keymap = code.keymap_fragment();
        assert_eq!(keymap.binding, "OUT_BLE");
        assert_eq!(keymap.include, vec![OUTPUTS_HEADER]);

        assert!(OutputKeyCode::new("A", &catalogs).is_err());
    }

    #[test]
    fn test_serialization_keeps_only_names() {
        let catalogs = catalogs();
        let a = KeyCode::new("A", &catalogs).unwrap();
        let modifier = FunctionModifier::new("LC(xx)", a, &catalogs).unwrap();
        let value = serde_json::to_value(CodeEntity::from(modifier)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "FunctionModifier": {"name": "LC(xx)", "binding": {"KeyCode": {"name": "A"}}}
            })
        );
    }

    #[test]
    fn test_relink_restores_metadata() {
        let catalogs = catalogs();
        let mut code: KeyCode = serde_json::from_str(r#"{"name": "A"}"#).unwrap();
        assert_eq!(code.description(), "");
        code.relink(&catalogs).unwrap();
        assert_eq!(code.description(), "Letter A");

        let mut bogus: KeyCode = serde_json::from_str(r#"{"name": "BOGUS"}"#).unwrap();
        assert!(bogus.relink(&catalogs).is_err());
    }

    #[test]
    fn test_relink_rechecks_bluetooth_param() {
        let catalogs = catalogs();
        let mut code: BluetoothKeyCode =
            serde_json::from_str(r#"{"name": "BT_CLR", "param": 3}"#).unwrap();
        assert!(matches!(
            code.relink(&catalogs),
            Err(ZmkError::InvalidValue { .. })
        ));
    }
}
