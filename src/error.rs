//! HTTP-facing error type.
//!
//! Every handler returns `Result<_, ApiError>`. Lower layers keep their own
//! error enums and convert with `From`, so the status mapping lives in one
//! place. Bodies are always `{"error": "<message>"}`.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

use crate::db::BuildError;
use crate::language::LanguageError;
use crate::llm::types::LlmError;
use crate::services::records::RecordError;
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed client input.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// A required external integration is not configured.
    #[error("{0}")]
    Misconfigured(String),

    #[error("{0}")]
    Database(String),

    #[error("{0}")]
    Storage(String),

    /// An external analytics or text-generation service failed.
    #[error("{0}")]
    Oracle(String),

    /// An extractor rejection that already knows its status (e.g. 413 for
    /// an oversized multipart body).
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Misconfigured(_) | Self::Database(_) | Self::Storage(_) | Self::Oracle(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Rejected { status, .. } => *status,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::Rejected { status: err.status(), message: format!("Multipart error: {}", err.body_text()) }
    }
}

impl From<BuildError> for ApiError {
    fn from(err: BuildError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<RecordError> for ApiError {
    fn from(err: RecordError) -> Self {
        let message = err.to_string();
        match err {
            RecordError::Invalid(_) => Self::Validation(message),
            RecordError::NotFound(_) => Self::NotFound(message),
            RecordError::Pool(_) | RecordError::Database(_) | RecordError::Task(_) => Self::Database(message),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Misconfigured(_) => Self::Misconfigured(err.to_string()),
            StorageError::Request(_) | StorageError::Response { .. } => Self::Storage(err.to_string()),
        }
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::MissingApiKey { .. } | LlmError::HttpClientBuild(_) => Self::Misconfigured(err.to_string()),
            _ => Self::Oracle(err.to_string()),
        }
    }
}

impl From<LanguageError> for ApiError {
    fn from(err: LanguageError) -> Self {
        match err {
            LanguageError::HttpClientBuild(_) => Self::Misconfigured(err.to_string()),
            _ => Self::Oracle(err.to_string()),
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
