//! Application-wide constants.
//!
//! Names used in output, the devicetree headers emitted into `.keymap`
//! fragments and the placeholders substituted in catalog names.

/// The display name of the application.
pub const APP_NAME: &str = "ZMK Configurator";

/// The binary name of the application (used in command examples).
pub const APP_BINARY_NAME: &str = "zmk-config";

/// Directory name under the platform config dir holding `config.toml`.
pub const CONFIG_DIR_NAME: &str = "ZmkConfigurator";

/// Header every behaviour binding needs.
pub const BEHAVIORS_HEADER: &str = "behaviors.dtsi";

/// Header defining key code names.
pub const KEYS_HEADER: &str = "dt-bindings/zmk/keys.h";

/// Header defining bluetooth command names.
pub const BT_HEADER: &str = "dt-bindings/zmk/bt.h";

/// Header defining output selection names.
pub const OUTPUTS_HEADER: &str = "dt-bindings/zmk/outputs.h";

/// Placeholder in modifier names replaced by the wrapped binding (`LC(xx)`).
pub const BINDING_PLACEHOLDER: &str = "xx";

/// Placeholder in parameterized bluetooth names (`BT_SEL(xx)`).
pub const PARAM_PLACEHOLDER: &str = "(xx)";

/// Longest keyboard name ZMK advertises over bluetooth.
pub const KEYBOARD_NAME_MAX_LEN: usize = 16;

/// Devicetree `compatible` of the GPIO matrix kscan driver.
pub const KSCAN_MATRIX_COMPATIBLE: &str = "zmk,kscan-gpio-matrix";

/// Environment variable overriding the settings directory.
pub const CONFIG_DIR_ENV: &str = "ZMK_CONFIG_DIR";
