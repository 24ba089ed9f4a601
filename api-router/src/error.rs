use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::{error::AppError, utils::upload_limits::UploadValidationError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Serialize, Clone)]
pub enum ApiError {
    #[error("Internal server error")]
    InternalError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A derived artifact is missing; `blob` names the object that was looked for.
    #[error("Not found: {message}")]
    MissingArtifact { message: String, blob: String },

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Configuration(msg) => {
                tracing::warn!("Configuration error: {msg}");
                Self::ServiceUnavailable(msg)
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                Self::InternalError(format!("Storage operation failed: {e}"))
            }
            AppError::NotFound(msg) => Self::NotFound(msg),
            AppError::Validation(msg) => Self::ValidationError(msg),
            AppError::PayloadTooLarge(msg) => Self::PayloadTooLarge(msg),
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {msg}");
                Self::InternalError("Internal server error".to_string())
            }
        }
    }
}

impl From<UploadValidationError> for ApiError {
    fn from(err: UploadValidationError) -> Self {
        match err {
            UploadValidationError::BadRequest(msg) => Self::ValidationError(msg),
            UploadValidationError::PayloadTooLarge(msg) => Self::PayloadTooLarge(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            Self::InternalError(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(message),
            ),
            Self::ValidationError(message) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::new(message))
            }
            Self::NotFound(message) => (StatusCode::NOT_FOUND, ErrorResponse::new(message)),
            Self::MissingArtifact { message, blob } => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    blob: Some(blob),
                    ..ErrorResponse::new(message)
                },
            ),
            Self::PayloadTooLarge(message) => {
                (StatusCode::PAYLOAD_TOO_LARGE, ErrorResponse::new(message))
            }
            Self::ServiceUnavailable(message) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::new(message),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

#[derive(Serialize, Debug)]
struct ErrorResponse {
    error: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    blob: Option<String>,
}

impl ErrorResponse {
    fn new(error: String) -> Self {
        Self {
            error,
            status: "error".to_string(),
            blob: None,
        }
    }
}
