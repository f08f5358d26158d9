//! # Store Errors
//!
//! The single failure taxonomy surfaced by every facade operation.
//!
//! Error codes:
//! - DUO_QUERY_REJECTED (malformed or unsupported descriptor)
//! - DUO_NOT_FOUND (single-document get against an absent id)
//! - DUO_PERMISSION_DENIED (authorization failure reported by the store)
//! - DUO_UNAVAILABLE (store outage or subscription termination)
//!
//! Failures are passed through unchanged. Nothing in this crate retries.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Descriptor rejected by construction checks or by the store
    #[error("Query rejected: {0}")]
    QueryRejected(String),

    /// Document does not exist
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// Store refused the caller
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Store unreachable, or a live channel terminated
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Create a query rejected error
    pub fn query_rejected(reason: impl Into<String>) -> Self {
        Self::QueryRejected(reason.into())
    }

    /// Create a not found error
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(reason: impl Into<String>) -> Self {
        Self::PermissionDenied(reason.into())
    }

    /// Create an unavailable error
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }

    /// Returns the stable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::QueryRejected(_) => "DUO_QUERY_REJECTED",
            Self::NotFound { .. } => "DUO_NOT_FOUND",
            Self::PermissionDenied(_) => "DUO_PERMISSION_DENIED",
            Self::Unavailable(_) => "DUO_UNAVAILABLE",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
