//! Mapping of library errors onto HTTP responses

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tempos_core::error::CoreError;

use crate::types::ErrorResponse;

/// Every handler failure ends up here and is rendered as `{"error": ...}`.
#[derive(Debug)]
pub enum ApiError {
    Core(CoreError),
    /// The request body or query string could not be read.
    Rejected { status: StatusCode, message: String },
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        Self::Core(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Rejected { status: rejection.status(), message: rejection.body_text() }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Rejected { status: rejection.status(), message: rejection.body_text() }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        let core = match self {
            Self::Core(core) => core,
            Self::Rejected { status, .. } => return *status,
        };
        match core {
            CoreError::ExtractionFailure { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            CoreError::UnsafeStatementRejected(_)
            | CoreError::InvalidInput(_)
            | CoreError::InvalidTimezone(_)
            | CoreError::QueryExecutionFailure { .. } => StatusCode::BAD_REQUEST,
            CoreError::LanguageModel(_) | CoreError::QueryTranslationFailure(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let core = match self {
            Self::Core(core) => core,
            Self::Rejected { message, .. } => {
                return (status, Json(ErrorResponse { error: message, sql: None })).into_response();
            }
        };
        let body = match &core {
            CoreError::QueryExecutionFailure { sql, source } => ErrorResponse {
                error: format!("Query failed to execute: {source}"),
                sql: Some(sql.clone()),
            },
            CoreError::ExtractionFailure { reason, .. } => ErrorResponse {
                error: format!("Could not extract a schedule from the model output: {reason}"),
                sql: None,
            },
            other if status.is_server_error() => {
                tracing::error!(error = ?other, "request failed");
                ErrorResponse { error: other.to_string(), sql: None }
            }
            other => ErrorResponse { error: other.to_string(), sql: None },
        };

        (status, Json(body)).into_response()
    }
}
