//! CLI command handlers.
//!
//! Headless, scriptable access to the configuration model for automation
//! and testing. Handlers print results on stdout and return a [`CliError`]
//! carrying the exit code on failure.

pub mod build;
pub mod common;
pub mod config;
pub mod keycodes;
pub mod new;
pub mod shields;
pub mod validate;

// Re-export types used by main.rs and tests
pub use build::BuildArgs;
pub use common::{CliError, CliResult, ExitCode};
pub use config::ConfigArgs;
pub use keycodes::KeycodesArgs;
pub use new::NewArgs;
pub use shields::ShieldsArgs;
pub use validate::ValidateArgs;
