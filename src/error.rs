//! Error taxonomy shared by the catalog engines and the HTTP boundary.

use thiserror::Error;

pub const CODE_VALIDATION: &str = "error_processing_request";
pub const CODE_NOT_FOUND: &str = "not_found";
pub const CODE_INTERNAL: &str = "internal_server_error";

/// Message returned for every internal failure. Store details stay in the logs.
pub const INTERNAL_MESSAGE: &str = "An unknown error has occurred";

/// Errors surfaced by the catalog service.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Bad, missing or malformed input.
    #[error("{0}")]
    Validation(String),

    /// The lookup or search matched nothing.
    #[error("{0}")]
    NotFound(String),

    /// Store failure or any other unexpected fault.
    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl CatalogError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CatalogError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        CatalogError::NotFound(msg.into())
    }

    /// Machine-readable code carried in the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            CatalogError::Validation(_) => CODE_VALIDATION,
            CatalogError::NotFound(_) => CODE_NOT_FOUND,
            CatalogError::Internal(_) => CODE_INTERNAL,
        }
    }

    /// Message safe to hand back to a caller.
    pub fn public_message(&self) -> String {
        match self {
            CatalogError::Validation(msg) | CatalogError::NotFound(msg) => msg.clone(),
            CatalogError::Internal(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
