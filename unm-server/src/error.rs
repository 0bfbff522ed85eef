//! Error types for unm-server
//!
//! Executor failures map onto HTTP status codes:
//! - invalid engine list (empty, unknown, duplicated) → 422
//! - every engine reported no match → 404
//! - every engine failed, at least one for another reason → 502
//! - retrieve-time engine failure → by kind (404, 504, 422 or 502)
//!
//! The API limiter rejects requests over budget with 429.

use axum::{
    extract::rejection::JsonRejection,
    BoxError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tower::load_shed::error::Overloaded;
use unm_engine::{EngineError, ExecutorError, FailureSummary};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Search or retrieve failed
    #[error(transparent)]
    Executor(#[from] ExecutorError),

    /// Request body is missing or malformed
    #[error(transparent)]
    InvalidBody(#[from] JsonRejection),

    /// Request budget of the API exhausted (429)
    #[error("Too many requests, try again later")]
    RateLimited,

    /// The API stack failed before reaching a handler (503)
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl ApiError {
    /// Status code, error code, and per-engine failures (if any)
    fn parts(&self) -> (StatusCode, &'static str, Option<Vec<FailureSummary>>) {
        match self {
            ApiError::InvalidBody(rejection) => (rejection.status(), "INVALID_BODY", None),
            ApiError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", None),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", None),
            ApiError::Executor(error) => match error {
                ExecutorError::EmptyEngineList => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "EMPTY_ENGINE_LIST", None)
                }
                ExecutorError::UnknownEngine { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "UNKNOWN_ENGINE", None)
                }
                ExecutorError::AllEnginesFailed(report) if report.all_no_match() => {
                    (StatusCode::NOT_FOUND, "NO_MATCH", Some(report.summaries()))
                }
                ExecutorError::AllEnginesFailed(report) => {
                    (StatusCode::BAD_GATEWAY, "ALL_ENGINES_FAILED", Some(report.summaries()))
                }
                ExecutorError::Engine { error, .. } => match error {
                    EngineError::NoMatch => (StatusCode::NOT_FOUND, "NO_MATCH", None),
                    EngineError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "ENGINE_TIMEOUT", None),
                    EngineError::SourceMismatch { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "SOURCE_MISMATCH", None)
                    }
                    EngineError::Provider(_) => (StatusCode::BAD_GATEWAY, "ENGINE_FAILED", None),
                },
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, failures) = self.parts();
        let message = self.to_string();

        let mut error = json!({
            "code": error_code,
            "message": message,
        });
        if let Some(failures) = failures {
            error["failures"] = json!(failures);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Turn a failure of the limiter stack into a response.
///
/// Load shedding means the rate limit is exhausted.
pub async fn handle_limiter_error(err: BoxError) -> ApiError {
    if err.is::<Overloaded>() {
        ApiError::RateLimited
    } else {
        ApiError::Unavailable(err.to_string())
    }
}
