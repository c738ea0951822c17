//! Shared CLI plumbing: error type, exit codes and output helpers.

use crate::config::Config;
use crate::error::ZmkError;
use serde::Serialize;
use std::fmt;

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Command succeeded
    Success = 0,
    /// Input was read but rejected (invalid config, taken name, ...)
    ValidationFailure = 1,
    /// Files could not be read or written, or arguments were unusable
    IoError = 2,
}

impl ExitCode {
    /// Numeric code passed to `std::process::exit`.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// Error reported by a command handler.
#[derive(Debug, Clone)]
pub struct CliError {
    /// Exit code to terminate with
    pub kind: ExitCode,
    /// Message printed to stderr
    pub message: String,
}

impl CliError {
    /// Validation failure (exit code 1).
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ExitCode::ValidationFailure,
            message: message.into(),
        }
    }

    /// I/O or usage failure (exit code 2).
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            kind: ExitCode::IoError,
            message: message.into(),
        }
    }

    /// Numeric exit code.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.kind.code()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<ZmkError> for CliError {
    fn from(error: ZmkError) -> Self {
        match error {
            ZmkError::Io(_) | ZmkError::Json(_) | ZmkError::Yaml(_) => Self::io(error.to_string()),
            other => Self::validation(other.to_string()),
        }
    }
}

/// Result type of command handlers.
pub type CliResult<T> = Result<T, CliError>;

/// Loads the application settings, mapping failures to exit code 2.
pub fn load_settings() -> CliResult<Config> {
    Config::load().map_err(|e| CliError::io(format!("Failed to load configuration: {e:#}")))
}

/// Prints `value` as indented JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?;
    println!("{json}");
    Ok(())
}
