//! API error kinds and their HTTP mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Errors surfaced by the prediction pipeline.
///
/// Validation and model-availability failures are expected and echoed to the
/// caller; anything else is converted to a generic internal error at the HTTP
/// boundary with full detail kept in server logs.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or out-of-range input
    #[error("{0}")]
    Validation(String),

    /// The model artifact failed to load at startup
    #[error("Model not loaded")]
    ModelUnavailable,

    /// Unexpected failure during inference
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// HTTP status code for this error kind.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ModelUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(err) = &self {
            error!(error = ?err, "Unexpected failure during prediction");
        }

        let body = json!({ "detail": self.to_string() });
        (self.status(), Json(body)).into_response()
    }
}
