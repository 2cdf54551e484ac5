//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and the single place
//! where errors are turned into HTTP responses.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use study_assistant_core::ports::{PortError, UpstreamError};
use tracing::error;

pub const RATE_LIMITED_MESSAGE: &str = "Rate limit exceeded. Please try again in a moment.";
pub const QUOTA_EXHAUSTED_MESSAGE: &str = "AI credits exhausted. Please add credits to continue.";
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to get AI response";

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No bearer token, or the backend did not recognise it.
    #[error("Unauthorized")]
    Unauthorized,

    /// The request payload is missing required fields or is not valid JSON.
    #[error("{0}")]
    Validation(String),

    /// The AI gateway refused or failed the request.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("{0}")]
    Port(PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A catch-all for any other unexpected errors.
    #[error("{0}")]
    Internal(String),
}

/// Lifts port errors so that auth and gateway failures keep their own status codes.
impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::Unauthorized => ApiError::Unauthorized,
            PortError::Upstream(upstream) => ApiError::Upstream(upstream),
            other => ApiError::Port(other),
        }
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(UpstreamError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Upstream(UpstreamError::QuotaExhausted) => StatusCode::PAYMENT_REQUIRED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The text placed in the `error` field of the response body.
    pub fn client_message(&self) -> String {
        match self {
            ApiError::Upstream(UpstreamError::RateLimited) => RATE_LIMITED_MESSAGE.to_string(),
            ApiError::Upstream(UpstreamError::QuotaExhausted) => {
                QUOTA_EXHAUSTED_MESSAGE.to_string()
            }
            ApiError::Upstream(UpstreamError::Generic { .. }) => {
                UPSTREAM_FAILURE_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {:?}", self);
        }

        let body = Json(json!({
            "error": self.client_message(),
        }));

        (status, body).into_response()
    }
}
