//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how it is
//! rendered as an HTTP response.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bible_nav_core::ports::PortError;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error that propagated up from one of the core service ports.
    #[error("Service Port Error: {0}")]
    Port(#[from] PortError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents an error while running the embedded migrations.
    #[error("Migration Error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The outbound HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Transport(#[from] crate::adapters::scripture::transport::TransportError),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The request carried no live session.
    #[error("Unauthorized")]
    Unauthorized,

    /// Login failed; the message tells the client why.
    #[error("{0}")]
    InvalidCredentials(String),

    /// The request was malformed or missed a required field.
    #[error("{0}")]
    BadRequest(String),

    /// The record does not exist or belongs to another user.
    #[error("{0}")]
    NotFound(String),

    /// A catch-all for any other unexpected errors. The message is sent to the client.
    #[error("An unexpected internal error occurred: {0}")]
    Internal(String),
}

/// The JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::Unauthorized | ApiError::Port(PortError::Unauthorized) => {
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
            ApiError::InvalidCredentials(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::BadRequest(msg) | ApiError::Port(PortError::AlreadyExists(msg)) => {
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            ApiError::NotFound(msg) | ApiError::Port(PortError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, msg.clone())
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_errors_map_onto_http_statuses() {
        let cases = [
            (ApiError::Port(PortError::Unauthorized), StatusCode::UNAUTHORIZED),
            (
                ApiError::Port(PortError::NotFound("Note not found".into())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::Port(PortError::AlreadyExists("User already exists".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::Port(PortError::Unexpected("connection reset".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.status_and_message().0, expected);
        }
    }

    #[test]
    fn unexpected_errors_hide_their_detail() {
        let err = ApiError::Port(PortError::Unexpected("password column missing".into()));
        let (_, message) = err.status_and_message();
        assert_eq!(message, "Internal server error");
    }

    #[test]
    fn unauthorized_uses_the_fixed_message() {
        let (status, message) = ApiError::Unauthorized.status_and_message();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(message, "Unauthorized");
    }
}
