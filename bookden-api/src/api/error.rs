//! HTTP error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use bookden_common::Error;

/// Error type returned by all handlers
#[derive(Debug)]
pub enum ApiError {
    /// Missing or invalid credentials
    Unauthorized(String),
    /// Authenticated but not allowed
    Forbidden(String),
    /// Malformed request data caught at the HTTP layer
    BadRequest(String),
    /// Anything surfaced by the service layer
    Service(Error),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Service(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Service(err) => match &err {
                Error::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
                Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                Error::InvalidState(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                Error::Token(_) => (StatusCode::UNAUTHORIZED, "invalid token".to_string()),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                ),
            },
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
