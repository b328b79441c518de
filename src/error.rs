//! Error types for schema handling
//!
//! Validation itself never fails: it answers with a boolean or a
//! [`ValidationReport`]. These errors cover the fallible edges around it,
//! such as narrowing to a typed node, parsing tags and loading files.

use thiserror::Error;

use crate::validate::ValidationReport;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Schema errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Invalid schema: {0}")]
    InvalidSchema(ValidationReport),

    #[error("Unknown type tag: {0:?}")]
    UnknownTypeTag(String),

    #[error("Unknown key type: {0:?}")]
    UnknownKeyType(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl SchemaError {
    /// The violation report, if this error came from a failed validation
    pub fn report(&self) -> Option<&ValidationReport> {
        match self {
            SchemaError::InvalidSchema(report) => Some(report),
            _ => None,
        }
    }
}
