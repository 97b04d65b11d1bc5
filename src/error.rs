//! Error handling module
//!
//! Provides unified error types and handling for the entire application.
//! Backend error detail is logged for operators; responses carry only a
//! generic message and a machine-readable code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// A read (view or edit-load) failed at the backend
    #[error("Query failed: {0}")]
    Query(#[source] tokio_postgres::Error),

    /// An insert or update failed: constraint violation or malformed input
    #[error("Write failed: {0}")]
    Write(String),

    /// A cascade-delete transaction failed and has been rolled back
    #[error("Delete failed: {0}")]
    Delete(#[source] tokio_postgres::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Wrap any write-path failure (coercion or SQL) as a `Write` error
    pub fn write(err: impl std::fmt::Display) -> Self {
        AppError::Write(err.to_string())
    }

    /// Status code and machine-readable code for this error
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Pool(_) => (StatusCode::SERVICE_UNAVAILABLE, "POOL_EXHAUSTED"),
            AppError::Query(_) => (StatusCode::INTERNAL_SERVER_ERROR, "QUERY_ERROR"),
            AppError::Write(_) => (StatusCode::INTERNAL_SERVER_ERROR, "WRITE_ERROR"),
            AppError::Delete(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DELETE_ERROR"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::UnknownTable(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_TABLE"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
        }
    }

    /// The generic user-facing message; never contains SQL state or
    /// constraint names
    fn public_message(&self) -> String {
        match self {
            AppError::Pool(_) => "Database connection pool exhausted.".to_string(),
            AppError::Query(_) => "Error fetching data.".to_string(),
            AppError::Write(_) => "Error saving record.".to_string(),
            AppError::Delete(_) => "Failed to delete record.".to_string(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::UnknownTable(name) => format!("Unknown table '{}'.", name),
            AppError::Validation(msg) => msg.clone(),
            AppError::Config(_) => "A configuration error occurred.".to_string(),
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Full detail stays server-side
        match &self {
            AppError::Pool(e) => error!("Pool error: {:?}", e),
            AppError::Query(e) => error!("Query error: {:?}", e),
            AppError::Write(e) => error!("Write error: {}", e),
            AppError::Delete(e) => error!("Delete error (rolled back): {:?}", e),
            AppError::Config(e) => error!("Configuration error: {}", e),
            _ => {}
        }

        let body = Json(ErrorResponse {
            success: false,
            message: self.public_message(),
            code: Some(code.to_string()),
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::UnknownTable("Users".into()), StatusCode::BAD_REQUEST),
            (AppError::Validation("bad id".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (AppError::Write("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (AppError::Config("missing".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_and_code().0, status);
        }
    }

    #[test]
    fn test_public_message_hides_write_detail() {
        let err = AppError::Write("duplicate key value violates unique constraint".into());
        assert_eq!(err.public_message(), "Error saving record.");
    }

    #[test]
    fn test_unknown_table_message_names_the_table() {
        let err = AppError::UnknownTable("Snacks".into());
        assert_eq!(err.public_message(), "Unknown table 'Snacks'.");
    }
}
