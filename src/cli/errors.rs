//! CLI-specific error types
//!
//! All CLI errors are fatal: `main` prints `CODE: message` to stderr and
//! exits non-zero.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::errors::StoreError;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No tenant named '{0}'")]
    UnknownTenant(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl CliError {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Store(err) => err.code(),
            Self::Config(err) => err.code(),
            Self::Io(_) => "DUO_CLI_IO",
            Self::Json(_) => "DUO_CLI_JSON",
            Self::UnknownTenant(_) => "DUO_CLI_UNKNOWN_TENANT",
            Self::BadRequest(_) => "DUO_CLI_BAD_REQUEST",
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_code_passes_through() {
        let err = CliError::from(StoreError::not_found("users", "x"));
        assert_eq!(err.code(), "DUO_NOT_FOUND");
        assert_eq!(err.to_string(), "Document not found: users/x");
    }

    #[test]
    fn test_unknown_tenant() {
        let err = CliError::UnknownTenant("nope".into());
        assert_eq!(err.code(), "DUO_CLI_UNKNOWN_TENANT");
        assert!(err.to_string().contains("nope"));
    }
}
