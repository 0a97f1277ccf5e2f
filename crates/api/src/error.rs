use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use scanner::ScanError;
use serde_json::json;
use thiserror::Error;

/// API-level errors. Client responses carry a stable machine-readable code
/// and a sanitized message; full details only go to the server log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::Scan(ScanError::SourceNotFound(path)) => (
                StatusCode::NOT_FOUND,
                "SOURCE_NOT_FOUND",
                format!("Log source not found: {}", path),
            ),
            ApiError::Scan(ScanError::Config(detail)) => {
                tracing::error!("Scanner configuration error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIG_ERROR",
                    "A configuration error occurred".to_string(),
                )
            }
            ApiError::Scan(ScanError::Io(err)) => {
                tracing::error!("Scan failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SCAN_FAILED",
                    "Failed to read the log source".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_SERVER_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}
