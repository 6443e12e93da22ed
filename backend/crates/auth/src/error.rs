//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{
    app_error::AppError, conversions::unique_violation, kind::ErrorKind, validation::Violations,
};
use platform::mail::MailError;
use thiserror::Error;

use crate::domain::permission::Denied;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// One or more request fields failed validation
    #[error("Invalid request: {0}")]
    Validation(Violations),

    /// Token exchange without a username
    #[error("Username required")]
    UserNameRequired,

    /// Email already belongs to another user name
    #[error("A user with this email already exists")]
    EmailTaken,

    /// User name already belongs to another email
    #[error("A user with this username already exists")]
    UserNameTaken,

    #[error("User not found")]
    UserNotFound,

    /// Confirmation code does not match the live one (or none was issued)
    #[error("Invalid confirmation code")]
    InvalidConfirmationCode,

    /// A write was attempted without credentials
    #[error("Authentication credentials were not provided")]
    NotAuthenticated,

    /// Bearer token is malformed, forged, expired, or its user is gone
    #[error("Token is invalid or expired")]
    InvalidToken,

    #[error("You do not have permission to perform this action")]
    PermissionDenied,

    /// Confirmation mail could not be handed to the transport
    #[error("Failed to send confirmation code: {0}")]
    MailDelivery(#[from] MailError),

    /// Token could not be signed
    #[error("Token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_)
            | AuthError::UserNameRequired
            | AuthError::InvalidConfirmationCode => ErrorKind::BadRequest,
            AuthError::EmailTaken | AuthError::UserNameTaken => ErrorKind::Conflict,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::NotAuthenticated | AuthError::InvalidToken => ErrorKind::Unauthorized,
            AuthError::PermissionDenied => ErrorKind::Forbidden,
            AuthError::MailDelivery(_) => ErrorKind::BadGateway,
            AuthError::Database(e) => kernel::error::conversions::sqlx_error_kind(e),
            AuthError::Signing(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Validation(violations) => {
                AppError::bad_request("Invalid request").with_violations(violations)
            }
            AuthError::EmailTaken => {
                AppError::conflict(self.to_string()).with_field("email", self.to_string())
            }
            AuthError::UserNameTaken => {
                AppError::conflict(self.to_string()).with_field("username", self.to_string())
            }
            AuthError::InvalidConfirmationCode => AppError::bad_request(self.to_string())
                .with_field("confirmation_code", self.to_string()),
            AuthError::NotAuthenticated => AppError::unauthorized(self.to_string())
                .with_action("Send an access token from /auth/token"),
            AuthError::InvalidToken => AppError::unauthorized(self.to_string())
                .with_action("Request a new token at /auth/token"),
            AuthError::MailDelivery(_) => {
                AppError::bad_gateway("Failed to send confirmation code")
                    .with_action("Try again later")
            }
            // Never echo driver or signing details to clients
            AuthError::Database(_) | AuthError::Signing(_) | AuthError::Internal(_) => {
                AppError::new(self.kind(), self.kind().as_str())
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::Signing(e) => {
                tracing::error!(error = %e, "Token signing failed");
            }
            AuthError::MailDelivery(e) => {
                tracing::error!(error = %e, "Confirmation mail delivery failed");
            }
            AuthError::InvalidConfirmationCode => {
                tracing::warn!("Confirmation code mismatch");
            }
            AuthError::InvalidToken => {
                tracing::warn!("Rejected bearer token");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<Violations> for AuthError {
    fn from(v: Violations) -> Self {
        AuthError::Validation(v)
    }
}

impl From<Denied> for AuthError {
    fn from(d: Denied) -> Self {
        match d {
            Denied::Unauthenticated => AuthError::NotAuthenticated,
            Denied::Forbidden => AuthError::PermissionDenied,
        }
    }
}

/// Unique-constraint races surface exactly like the up-front checks.
impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        match unique_violation(&err) {
            Some(c) if c.contains("email") => AuthError::EmailTaken,
            Some(c) if c.contains("user_name") => AuthError::UserNameTaken,
            _ => AuthError::Database(err),
        }
    }
}
