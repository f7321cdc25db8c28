use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use musegen_core::{CodecError, ModelError, RequestError};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

/// Error returned by the HTTP handlers, rendered as `{"detail": ...}`.
///
/// Anything that goes wrong while generating or encoding is a 500 carrying the
/// underlying error text; only malformed input is reported as 422.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    pub fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }

    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        let mut detail = detail.into();
        if detail.trim().is_empty() {
            detail = status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string();
        }
        Self { status, detail }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<CodecError> for ApiError {
    fn from(err: CodecError) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        Self::unprocessable(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::unprocessable(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "generation failed: {}", self.detail);
        } else {
            tracing::warn!(status = %self.status, "rejected request: {}", self.detail);
        }
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}
