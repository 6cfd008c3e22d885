use infinitydb_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("Mapping mixes Index and non-Index keys: {keys}")]
    MixedIndexKeys { keys: String },

    #[error("Structural violation: {message}")]
    StructuralViolation { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TreeError {
    pub fn structural(message: impl Into<String>) -> Self {
        TreeError::StructuralViolation {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TreeError>;
