//! HTTP error responses.
//!
//! Every failure is rendered as
//! `{ "error": <CODE>, "message": <text>, "details": <object|null> }` with the
//! status of its [`ErrorKind`]. Internal failures are logged and their
//! message is not exposed.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use stockledger_core::posting::{ErrorKind, PostingError};
use stockledger_db::StoreError;
use tracing::error;

/// Error body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable message.
    pub message: String,
    /// Structured details, when the error carries any.
    pub details: Option<Value>,
}

/// An error returned from a handler.
#[derive(Debug)]
pub struct ApiError(pub PostingError);

/// Result type of handlers.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self(PostingError::Validation(message.into()))
    }

    /// Renders the response body.
    #[must_use]
    pub fn body(&self) -> ErrorBody {
        let message = if self.0.kind() == ErrorKind::Internal {
            "An internal error occurred".to_string()
        } else {
            self.0.to_string()
        };
        ErrorBody {
            error: self.0.error_code(),
            message,
            details: self.0.details(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(err.into_posting())
    }
}

impl From<PostingError> for ApiError {
    fn from(err: PostingError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        (status, Json(self.body())).into_response()
    }
}
