//! Platform Error Types

use thiserror::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response, Json},
};
use utoipa::ToSchema;

use crate::usecase::UseCaseError;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("{message}")]
    NotFound { code: String, message: String },

    #[error("{message}")]
    Validation { code: String, message: String },

    #[error("{message}")]
    Unauthorized { code: String, message: String },

    #[error("{message}")]
    Conflict { code: String, message: String },

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PlatformError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// HTTP status and error code reported to clients.
    pub fn status_and_code(&self) -> (StatusCode, &str) {
        match self {
            PlatformError::NotFound { code, .. } => (StatusCode::NOT_FOUND, code.as_str()),
            PlatformError::Validation { code, .. } => (StatusCode::BAD_REQUEST, code.as_str()),
            PlatformError::Unauthorized { code, .. } => (StatusCode::UNAUTHORIZED, code.as_str()),
            // Precondition failures on the target are client errors, not 409s
            PlatformError::Conflict { code, .. } => (StatusCode::BAD_REQUEST, code.as_str()),
            PlatformError::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
            PlatformError::InvalidToken { .. } => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;

/// Error response body
#[derive(Debug, serde::Serialize, serde::Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorResponse {
            error: error_code.to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<UseCaseError> for PlatformError {
    fn from(err: UseCaseError) -> Self {
        match err {
            UseCaseError::Unauthorized { code, message, .. } => {
                PlatformError::Unauthorized { code, message }
            }
            UseCaseError::InvalidArgument { code, message, .. } => {
                PlatformError::Validation { code, message }
            }
            UseCaseError::NotFound { code, message, .. } => {
                PlatformError::NotFound { code, message }
            }
            UseCaseError::Conflict { code, message, .. } => {
                PlatformError::Conflict { code, message }
            }
            UseCaseError::StoreFailure { message, .. } => {
                PlatformError::Internal { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_use_case_error_status_mapping() {
        let cases = [
            (UseCaseError::unauthorized("UNAUTHORIZED", "Unauthorized"), StatusCode::UNAUTHORIZED),
            (UseCaseError::invalid_argument("INVALID_USER_ID", "bad id"), StatusCode::BAD_REQUEST),
            (UseCaseError::not_found("USER_NOT_FOUND", "User not found"), StatusCode::NOT_FOUND),
            (UseCaseError::conflict("ALREADY_ADMIN", "User is already an admin"), StatusCode::BAD_REQUEST),
            (UseCaseError::store("connection refused"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let expected_code = err.http_status_code();
            let platform: PlatformError = err.into();
            let (status, _) = platform.status_and_code();
            assert_eq!(status, expected);
            assert_eq!(status.as_u16(), expected_code);
        }
    }

    #[test]
    fn test_conflict_keeps_code_and_message() {
        let platform: PlatformError =
            UseCaseError::conflict("NOT_ADMIN", "User is not an admin").into();
        assert_eq!(platform.to_string(), "User is not an admin");
        assert_eq!(platform.status_and_code().1, "NOT_ADMIN");
    }

    #[test]
    fn test_token_errors_are_unauthorized() {
        assert_eq!(PlatformError::TokenExpired.status_and_code().0, StatusCode::UNAUTHORIZED);
        let invalid = PlatformError::InvalidToken { message: "bad signature".to_string() };
        assert_eq!(invalid.status_and_code().0, StatusCode::UNAUTHORIZED);
    }
}
