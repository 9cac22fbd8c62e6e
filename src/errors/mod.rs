//! Error handling module for the feedback backend.
//!
//! Provides the error taxonomy with mapping to HTTP status codes and the
//! JSON error body shared by both transport bindings.

use axum::{
    extract::rejection::BytesRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Message returned for every rejected submission, whatever field failed.
pub const INVALID_INPUT: &str = "Invalid input";

/// Application error type.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Submission failed validation; the detail is logged, never returned
    #[error("validation failed: {0}")]
    Validation(String),
    /// Malformed request outside of submission validation
    #[error("{0}")]
    BadRequest(String),
    /// Admin key missing or wrong
    #[error("{0}")]
    Unauthorized(String),
    /// Resource not found
    #[error("{0}")]
    NotFound(String),
    /// Method not supported on this path; carries the `Allow` value
    #[error("Method Not Allowed")]
    MethodNotAllowed(&'static str),
    /// Database error
    #[error("{0}")]
    Database(String),
    /// Internal server error
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message safe to show to the caller.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation(_) => INVALID_INPUT.to_string(),
            other => other.to_string(),
        }
    }

    /// The `Allow` header value, for 405 responses.
    pub fn allow(&self) -> Option<&'static str> {
        match self {
            AppError::MethodNotAllowed(allow) => Some(*allow),
            _ => None,
        }
    }

    /// Log server-side failures before they are rendered.
    pub fn log(&self) {
        match self {
            AppError::Database(msg) | AppError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
            }
            AppError::Validation(detail) => {
                tracing::debug!(detail = %detail, "submission rejected");
            }
            _ => {}
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<BytesRejection> for AppError {
    fn from(err: BytesRejection) -> Self {
        // An unreadable or oversized body is just another invalid submission.
        AppError::Validation(err.body_text())
    }
}

/// JSON error body: a single human-readable message.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        Self {
            error: error.public_message(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let mut response = crate::api::json(self.status_code(), &ErrorResponse::new(&self));
        if let Some(allow) = self.allow() {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static(allow));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_generic() {
        let err = AppError::Validation("message: length".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), INVALID_INPUT);
    }

    #[test]
    fn test_database_message_is_surfaced() {
        let err = AppError::Database("Database error: pool timed out".to_string());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Database error: pool timed out");
    }

    #[test]
    fn test_method_not_allowed_sets_allow_header() {
        let response = AppError::MethodNotAllowed("GET, POST").into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET, POST");
    }
}
