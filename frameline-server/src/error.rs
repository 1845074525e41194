//! Error types for frameline-server
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation, plus the HTTP status mapping used by all API handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Main error type for frameline-server
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Resource or thread not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation not applicable to this resource kind
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Invalid request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Errors bubbled up from the common crate
    #[error(transparent)]
    Common(#[from] frameline_common::Error),
}

/// Convenience Result type using frameline-server Error
pub type Result<T> = std::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Common(frameline_common::Error::NotFound(_)) => StatusCode::NOT_FOUND,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Unsupported(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "status": format!("error: {}", self) }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let resp = Error::NotFound("resource 9".into()).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = Error::BadRequest("speed 3.0".into()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = Error::Unsupported("image has no timeline".into()).into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let resp = Error::Http("bind failed".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
