use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use folio_core::FolioError;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::error;

pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const CONFLICT: &str = "CONFLICT";
    pub const RATE_LIMIT_EXCEEDED: &str = "RATE_LIMIT_EXCEEDED";
    pub const UPLOAD_ERROR: &str = "UPLOAD_ERROR";
    pub const EMAIL_ERROR: &str = "EMAIL_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
    pub const MISSING_FILE: &str = "MISSING_FILE";
    pub const INVALID_FOLDER: &str = "INVALID_FOLDER";
    pub const FILE_TOO_LARGE: &str = "FILE_TOO_LARGE";
    pub const INVALID_FILE_TYPE: &str = "INVALID_FILE_TYPE";
    pub const MISSING_ENTITY_ID: &str = "MISSING_ENTITY_ID";
    pub const INVALID_KEY: &str = "INVALID_KEY";
}

/// An error rendered as `{"error":{"message","code","details"?}}`.
#[derive(Error, Debug)]
#[error("{code}: {message}")]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, codes::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, codes::RATE_LIMIT_EXCEEDED, message)
    }

    /// Log the cause and hide it from the client.
    pub fn internal(cause: impl std::fmt::Display) -> Self {
        error!("Unhandled API error: {}", cause);
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::INTERNAL_ERROR,
            "Internal server error",
        )
    }
}

impl From<FolioError> for ApiError {
    fn from(err: FolioError) -> Self {
        match err {
            FolioError::Validation(errors) => {
                ApiError::bad_request(codes::VALIDATION_ERROR, "Validation failed")
                    .with_details(json!(errors))
            }
            FolioError::NotFound { entity } => ApiError::not_found(format!("{entity} not found")),
            FolioError::Conflict(message) => {
                ApiError::new(StatusCode::CONFLICT, codes::CONFLICT, message)
            }
            other => ApiError::internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "message": self.message,
            "code": self.code,
        });
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (self.status, Json(json!({ "error": body }))).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
