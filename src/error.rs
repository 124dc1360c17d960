use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

/// Authentication and verification errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("User already exists with this email")]
    UserAlreadyExists,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    #[error("OTP must be 8 digits")]
    OtpMalformed,

    #[error("No valid OTP found for this email")]
    OtpNotFound,

    #[error("Invalid OTP")]
    OtpInvalid,

    #[error("OTP has expired. Please request a new one.")]
    OtpExpired,

    #[error("Email already verified")]
    AlreadyVerified,

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Internal server error")]
    Internal(String),

    #[error("backend error: {0}")]
    Backend(String),
}

impl AuthError {
    /// Wrap a backend storage error as an opaque `Backend` failure.
    pub fn from_backend<E: std::fmt::Display>(err: E) -> Self {
        AuthError::Backend(err.to_string())
    }
}

/// Error response body schema for API documentation.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthErrorResponse {
    /// Short human-readable error message.
    pub error: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, self.to_string()),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, self.to_string()),
            AuthError::UserAlreadyExists => (StatusCode::CONFLICT, self.to_string()),
            AuthError::UserNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AuthError::InvalidEmail => (StatusCode::BAD_REQUEST, self.to_string()),
            AuthError::MissingField(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AuthError::WeakPassword(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AuthError::OtpMalformed => (StatusCode::BAD_REQUEST, self.to_string()),
            AuthError::OtpNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AuthError::OtpInvalid => (StatusCode::BAD_REQUEST, self.to_string()),
            AuthError::OtpExpired => (StatusCode::BAD_REQUEST, self.to_string()),
            AuthError::AlreadyVerified => (StatusCode::BAD_REQUEST, self.to_string()),
            AuthError::PasswordHash(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            AuthError::Jwt(_) => (StatusCode::UNAUTHORIZED, "Invalid token".to_string()),
            AuthError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AuthError::Backend(ref msg) => {
                tracing::error!("Backend error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
