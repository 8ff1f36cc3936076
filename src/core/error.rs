use thiserror::Error;

use super::StateId;

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Collection state '{0}' not found")]
    NotFound(StateId),

    #[error("Invalid value for field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Transaction error: {0}")]
    TransactionError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, StateError>;

impl From<serde_json::Error> for StateError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
