//! Error types for remote access

use infinitydb_core::CoreError;
use infinitydb_json::TreeError;
use thiserror::Error;

/// Errors from accessor operations
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The server answered with a status other than 200/204, returned no
    /// body, or could not be reached at all
    #[error("Transport failure{}: {reason}", status_suffix(.status))]
    TransportFailure { status: Option<u16>, reason: String },

    /// Neither the call nor the configuration names a database
    #[error("Missing database: pass one per call or configure a default")]
    MissingDatabase,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A response line or path component did not parse
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A request or response tree could not be encoded or decoded
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// A text response was not UTF-8
    #[error("Response is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (status {s})")).unwrap_or_default()
}

impl RemoteError {
    pub fn transport(status: Option<u16>, reason: impl Into<String>) -> Self {
        RemoteError::TransportFailure {
            status,
            reason: reason.into(),
        }
    }

    /// The HTTP status, when the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::TransportFailure { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        RemoteError::TransportFailure {
            status: e.status().map(|s| s.as_u16()),
            reason: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RemoteError>;
