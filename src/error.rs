//! Error types for the review pipeline and configuration loading.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, ReviewError>;

/// Errors that abort a product request. There is no partial success mode.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// Retail API unreachable or answered with a non-success status.
    #[error("review source unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Retail API answered 2xx but the body is not the expected review page.
    #[error("malformed review payload: {0}")]
    MalformedUpstreamPayload(String),

    /// Text analytics call failed or returned an unparsable payload.
    #[error("text analytics failed: {0}")]
    AnnotationFailed(String),

    /// Review count cannot be fitted into analytics batches of the configured cap.
    #[error("{count} documents exceed the analytics batch cap of {cap}")]
    BatchSizeExceeded { count: usize, cap: usize },
}

impl ReviewError {
    /// Machine-readable kind reported to callers.
    pub fn kind(&self) -> &'static str {
        match self {
            ReviewError::UpstreamUnavailable(_) => "upstream_unavailable",
            ReviewError::MalformedUpstreamPayload(_) => "malformed_upstream_payload",
            ReviewError::AnnotationFailed(_) => "annotation_failed",
            ReviewError::BatchSizeExceeded { .. } => "batch_size_exceeded",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ReviewError::UpstreamUnavailable(_) | ReviewError::MalformedUpstreamPayload(_) => {
                StatusCode::BAD_GATEWAY
            }
            ReviewError::AnnotationFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            ReviewError::BatchSizeExceeded { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error body returned for failed product requests.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: u16,
}

impl IntoResponse for ReviewError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
            code: status.as_u16(),
        });

        (status, body).into_response()
    }
}

/// Errors raised while reading configuration at start-up.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable holds a value that does not parse.
    #[error("invalid value '{value}' for {name}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// The attribute family list is not in `name=syn|syn;name=syn` form.
    #[error("invalid attribute family '{0}': expected name=synonym|synonym")]
    InvalidAttributeFamily(String),
}
