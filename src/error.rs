// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::config::QUIZ_LIST_PATH;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request (malformed or missing input, rejected before any I/O)
    BadRequest(String),

    // 401 Unauthorized
    AuthError(String),

    // 404 Not Found (missing attempt/quiz, or attempt owned by someone else)
    NotFound(String),

    // 409 Conflict (e.g., submit while a submission is already running)
    Conflict(String),

    // 500, a store read/write failed
    Persistence(String),

    // 502 Bad Gateway, the completion service failed
    Upstream(String),

    /// The failure ends the quiz session; the client must go back to the quiz list.
    LeaveSession(Box<AppError>),
}

impl AppError {
    /// Marks this error as terminal for the quiz session.
    pub fn leave_session(self) -> Self {
        match self {
            AppError::LeaveSession(_) => self,
            other => AppError::LeaveSession(Box::new(other)),
        }
    }

    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::Persistence(msg) => {
                tracing::error!("Persistence error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to save your progress. Please try again later.".to_string(),
                )
            }
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "Failed to get a response from the tutor".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::LeaveSession(inner) => (*inner).status_and_message(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
/// Session-ending errors also carry the path the client should navigate to.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let leaves_session = matches!(self, AppError::LeaveSession(_));
        let (status, error_message) = self.status_and_message();

        let body = if leaves_session {
            Json(json!({
                "error": error_message,
                "redirect": QUIZ_LIST_PATH,
            }))
        } else {
            Json(json!({
                "error": error_message,
            }))
        };

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::Persistence`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

/// The request URL is stripped so credentials never reach the logs.
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Upstream(err.without_url().to_string())
    }
}

/// Malformed or non-JSON request bodies.
impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
