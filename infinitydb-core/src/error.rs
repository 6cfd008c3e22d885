//! Error types for infinitydb-core

use thiserror::Error;

/// Result type alias using our CoreError
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while building, parsing or ordering components
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// An EntityClass or Attribute name does not match the name grammar
    #[error("Illegal {kind} name '{name}': must match {pattern}")]
    IllegalComponentName {
        kind: &'static str,
        name: String,
        pattern: &'static str,
    },

    /// A token could not be read as any component type
    #[error("Malformed primitive: '{0}'")]
    MalformedPrimitive(String),

    /// A quoted string has no closing quote
    #[error("Unterminated string: '{0}'")]
    UnterminatedString(String),

    /// Two components of different types were compared
    #[error("Unorderable components: {left} and {right} are not the same component type")]
    Unorderable { left: String, right: String },
}

impl CoreError {
    /// Create a malformed primitive error
    pub fn malformed(text: impl Into<String>) -> Self {
        CoreError::MalformedPrimitive(text.into())
    }

    /// Create an unterminated string error
    pub fn unterminated(text: impl Into<String>) -> Self {
        CoreError::UnterminatedString(text.into())
    }
}
