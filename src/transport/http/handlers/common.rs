//! Error envelopes and the mapping from [`CatalogError`] to HTTP.

use crate::error::CatalogError;
use crate::transport::http::types::{ErrorInfo, ErrorResponse};
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub fn status_for(err: &CatalogError) -> StatusCode {
    match err {
        CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
        CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
        CatalogError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_body(err: &CatalogError) -> ErrorResponse {
    let message = err.public_message();
    ErrorResponse {
        info: ErrorInfo {
            display_message: message.clone(),
            message,
            code: err.code().to_string(),
            status: "error".to_string(),
        },
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        match &self {
            CatalogError::Internal(cause) => {
                tracing::error!(error = %format!("{:#}", cause), "request failed");
            }
            other => tracing::warn!(code = other.code(), "{}", other),
        }
        (status_for(&self), Json(error_body(&self))).into_response()
    }
}

/// Unparseable or mistyped bodies are client errors.
pub fn rejection_to_error(rejection: JsonRejection) -> CatalogError {
    CatalogError::validation(format!("Invalid request: {}", rejection.body_text()))
}
