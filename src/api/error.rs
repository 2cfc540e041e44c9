//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::report::{ReportError, ShapeError};

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Request body is not a recognized history document
    #[error("Invalid history document: {0}")]
    Document(#[from] ShapeError),

    /// Upstream report retrieval failed
    #[error("{0}")]
    Report(#[from] ReportError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    /// HTTP status and machine-readable code
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Document(_) => (StatusCode::BAD_REQUEST, "INVALID_DOCUMENT"),
            ApiError::Report(e) => match e {
                ReportError::NotFound(_) | ReportError::InvalidId(_) => {
                    (StatusCode::NOT_FOUND, "REPORT_NOT_FOUND")
                }
                ReportError::Status { .. } => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
                ReportError::Malformed(_) => (StatusCode::BAD_GATEWAY, "MALFORMED_REPORT"),
                ReportError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT"),
                ReportError::Unavailable | ReportError::Request(_) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "UPSTREAM_UNAVAILABLE")
                }
            },
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::error!(
            request_id = %request_id,
            error_code = %code,
            error_message = %self,
            "API error occurred"
        );

        // Report failures carry the text the dashboard shows
        let message = match &self {
            ApiError::Report(e) => e.user_message().to_string(),
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_error_statuses() {
        let not_found: ApiError = ReportError::NotFound("x".to_string()).into();
        assert_eq!(not_found.status_and_code().0, StatusCode::NOT_FOUND);

        let upstream: ApiError = ReportError::Status { status: 500 }.into();
        assert_eq!(upstream.status_and_code(), (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"));

        let timeout: ApiError = ReportError::Timeout.into();
        assert_eq!(timeout.status_and_code().0, StatusCode::GATEWAY_TIMEOUT);

        let down: ApiError = ReportError::Unavailable.into();
        assert_eq!(down.status_and_code().0, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_document_error_is_bad_request() {
        let err: ApiError = ShapeError::Unrecognized.into();
        assert_eq!(err.status_and_code(), (StatusCode::BAD_REQUEST, "INVALID_DOCUMENT"));
        assert_eq!(
            err.to_string(),
            "Invalid history document: Unrecognized report document shape"
        );
    }
}
