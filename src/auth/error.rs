//! Authentication errors.

use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Authentication errors.
///
/// Status mapping follows the API's error taxonomy: a missing token is 401,
/// an undecodable or expired token is 400, a role mismatch is 403.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No session token on the request.
    #[error("missing session token")]
    MissingToken,

    /// Invalid token (malformed or bad signature).
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Token expired.
    #[error("token expired")]
    TokenExpired,

    /// Insufficient permissions.
    #[error("insufficient permissions: {0}")]
    InsufficientRole(String),

    /// Invalid credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Internal error.
    #[error("internal auth error: {0}")]
    Internal(String),
}

/// Gate denials answer in the same `{error, code}` shape as every other API
/// error, whether the rejection came from the middleware or a handler.
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        crate::api::ApiError::from(self).into_response()
    }
}
