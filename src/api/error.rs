//! Unified API error handling with structured responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// API error type with structured responses.
///
/// Variants follow the service's error taxonomy: domain validation failures
/// (invalid status, duplicate email, unknown ids) are all client errors (400);
/// only genuinely unexpected failures are 500s.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Access denied")]
    Unauthenticated,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("User already exists: {0}")]
    DuplicateUser(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal(String),
}

impl ApiError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::InvalidToken
            | Self::InvalidStatus(_)
            | Self::DuplicateUser(_)
            | Self::NotFound(_)
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvalidStatus(_) => "INVALID_STATUS",
            Self::DuplicateUser(_) => "DUPLICATE_USER",
            Self::NotFound(_) => "NOT_FOUND",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Categorize an anyhow error from a service into the appropriate variant.
    ///
    /// Services report domain failures as messages; the patterns here match
    /// what the user and ticket services emit:
    /// - "not found" -> NotFound
    /// - "already registered" / "already exists" -> DuplicateUser
    /// - "invalid status" -> InvalidStatus
    /// - "invalid" / "must" (validation wording) -> BadRequest
    /// - anything else -> Internal
    pub fn from_anyhow(err: anyhow::Error) -> Self {
        let msg = err.to_string();
        let msg_lower = msg.to_lowercase();

        if msg_lower.contains("not found") {
            ApiError::NotFound(msg)
        } else if msg_lower.contains("already registered") || msg_lower.contains("already exists") {
            ApiError::DuplicateUser(msg)
        } else if msg_lower.contains("invalid status") {
            ApiError::InvalidStatus(msg)
        } else if msg_lower.contains("invalid") || msg_lower.contains("must") {
            ApiError::BadRequest(msg)
        } else {
            ApiError::Internal(msg)
        }
    }
}

/// Structured error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Internal details stay in the server log; the client only ever sees
        // the variant's Display text.
        match &self {
            ApiError::Internal(detail) => {
                error!(error_code = code, detail = %detail, "API error");
            }
            other => {
                tracing::debug!(error_code = code, message = %other, "Client error");
            }
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code,
        };

        (status, Json(body)).into_response()
    }
}

/// Convert anyhow errors to API errors using the centralized categorization.
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::from_anyhow(err)
    }
}

/// Convert auth errors to API errors.
impl From<crate::auth::AuthError> for ApiError {
    fn from(err: crate::auth::AuthError) -> Self {
        use crate::auth::AuthError;
        match err {
            AuthError::MissingToken => ApiError::Unauthenticated,
            AuthError::InvalidToken(_) | AuthError::TokenExpired => ApiError::InvalidToken,
            AuthError::InsufficientRole(msg) => ApiError::Forbidden(msg),
            AuthError::InvalidCredentials => ApiError::BadRequest("Invalid password".to_string()),
            AuthError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorization_not_found() {
        let err = anyhow::anyhow!("Ticket not found: tkt_abc");
        assert!(matches!(ApiError::from_anyhow(err), ApiError::NotFound(_)));
    }

    #[test]
    fn test_categorization_duplicate() {
        let err = anyhow::anyhow!("Email 'user@example.com' is already registered.");
        assert!(matches!(
            ApiError::from_anyhow(err),
            ApiError::DuplicateUser(_)
        ));
    }

    #[test]
    fn test_categorization_invalid_status() {
        let err = anyhow::anyhow!("Invalid status 'DONE'.");
        assert!(matches!(
            ApiError::from_anyhow(err),
            ApiError::InvalidStatus(_)
        ));
    }

    #[test]
    fn test_categorization_validation() {
        let err = anyhow::anyhow!("Title must not be empty.");
        assert!(matches!(
            ApiError::from_anyhow(err),
            ApiError::BadRequest(_)
        ));
    }

    #[test]
    fn test_categorization_internal_default() {
        let err = anyhow::anyhow!("Something went wrong");
        assert!(matches!(ApiError::from_anyhow(err), ApiError::Internal(_)));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Unauthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::InvalidToken.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Forbidden(String::new()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::InvalidStatus(String::new()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::DuplicateUser(String::new()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound(String::new()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Internal(String::new()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_error_hides_detail() {
        let err = ApiError::Internal("connection pool exhausted".to_string());
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[tokio::test]
    async fn test_internal_response_body_matches_display() {
        let response = ApiError::Internal("connection pool exhausted".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "Internal server error");
        assert_eq!(json["code"], "INTERNAL_ERROR");
    }
}
