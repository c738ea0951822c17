//! Error types for the configuration object model.
//!
//! Every fallible operation on an entity returns [`ZmkError`]. Setters
//! validate before they mutate, so an `Err` always leaves the previously
//! stored value in place.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by catalog lookups, entity construction, setters and builds.
#[derive(Debug, Error)]
pub enum ZmkError {
    /// A value's type is not among the allowed types of the operation.
    #[error("invalid type for '{field}': expected {expected}, found {found}")]
    InvalidType {
        /// Property or parameter that received the value
        field: String,
        /// Human-readable list of accepted types
        expected: String,
        /// Type of the rejected value
        found: String,
    },
    /// A catalog name, property name or key is not in its closed vocabulary.
    #[error("unknown {vocabulary} '{key}'")]
    UnknownKey {
        /// What was searched (e.g. "key code", "property of KeyPress")
        vocabulary: String,
        /// The key that was not found
        key: String,
    },
    /// A value has the right type but fails a semantic check.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Property or parameter that received the value
        field: String,
        /// Why the value was rejected
        reason: String,
    },
    /// A name, id or directory collides with a known shield.
    #[error("{field} '{value}' is already taken by an existing shield")]
    AlreadyTaken {
        /// Which shield attribute collided
        field: &'static str,
        /// The colliding value
        value: String,
    },
    /// A build was requested before every required slot was populated.
    #[error("incomplete state: {0}")]
    IncompleteState(String),
    /// Saving would overwrite an existing file without permission to do so.
    #[error("file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
    /// The operation is modelled but has no implementation.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),
    /// Filesystem error while saving or loading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed JSON while saving or loading.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// YAML rendering failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),
}

impl ZmkError {
    /// Creates an [`ZmkError::InvalidType`] error.
    pub fn invalid_type(
        field: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::InvalidType {
            field: field.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Creates an [`ZmkError::UnknownKey`] error.
    pub fn unknown_key(vocabulary: impl Into<String>, key: impl Into<String>) -> Self {
        Self::UnknownKey {
            vocabulary: vocabulary.into(),
            key: key.into(),
        }
    }

    /// Creates an [`ZmkError::InvalidValue`] error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates an [`ZmkError::IncompleteState`] error.
    pub fn incomplete(message: impl Into<String>) -> Self {
        Self::IncompleteState(message.into())
    }
}

/// Result alias used throughout the object model.
pub type Result<T> = std::result::Result<T, ZmkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_field() {
        let err = ZmkError::invalid_value("layer", "must be >= 0");
        assert_eq!(err.to_string(), "invalid value for 'layer': must be >= 0");

        let err = ZmkError::unknown_key("key code", "NOPE");
        assert_eq!(err.to_string(), "unknown key code 'NOPE'");

        let err = ZmkError::AlreadyTaken {
            field: "name",
            value: "Corne".to_string(),
        };
        assert!(err.to_string().contains("already taken"));
    }

    #[test]
    fn test_already_exists_shows_path() {
        let err = ZmkError::AlreadyExists(PathBuf::from("/tmp/board.json"));
        assert_eq!(err.to_string(), "file already exists: /tmp/board.json");
    }
}
