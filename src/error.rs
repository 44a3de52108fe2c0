use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum AppError {
    /// Requested tool id is not in the catalog.
    #[error("Unknown tool id: {0}")]
    NotFound(String),

    /// The embedding provider could not produce a vector.
    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// Two compared vectors have different lengths. Signals mismatched
    /// providers or model versions and is never retried.
    #[error("Embedding dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    #[error("Invalid input: {0}")]
    ValidationError(String),

    #[error("Catalog error: {0}")]
    CatalogError(String),

    #[error("Model inference failed: {0}")]
    ModelError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(id) => {
                tracing::debug!(id = %id, "Unknown tool id requested");
                (StatusCode::NOT_FOUND, format!("unknown tool id: {}", id))
            }
            AppError::EmbeddingUnavailable(reason) => {
                tracing::warn!(error = %reason, "Embedding provider unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "matching temporarily unavailable".to_string(),
                )
            }
            AppError::DimensionMismatch { left, right } => {
                tracing::error!(left, right, "Embedding dimension mismatch");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::ValidationError(msg) => {
                tracing::warn!(error = %msg, "Validation error");
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            AppError::CatalogError(msg) => {
                tracing::error!(error = %msg, "Catalog error");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
            AppError::ModelError(e) => {
                tracing::error!(error = %e, "Model inference error");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(ErrorResponse {
            error: message,
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}

impl From<ort::Error> for AppError {
    fn from(err: ort::Error) -> Self {
        AppError::ModelError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
