//! Content Error Types
//!
//! This module provides content-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use auth::Denied;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{
    app_error::AppError, conversions::unique_violation, kind::ErrorKind, validation::Violations,
};
use thiserror::Error;

use crate::domain::entities::Taxonomy;

/// Content-specific result type alias
pub type ContentResult<T> = Result<T, ContentError>;

#[derive(Debug, Error)]
pub enum ContentError {
    /// One or more request fields failed validation
    #[error("Invalid request: {0}")]
    Validation(Violations),

    /// Slug already used within the same taxonomy
    #[error("A {} with this slug already exists", .0.as_str())]
    SlugTaken(Taxonomy),

    /// Second review of the same title by the same author
    #[error("You have already reviewed this title")]
    DuplicateReview,

    #[error("{} not found", capitalized(.0.as_str()))]
    TermNotFound(Taxonomy),

    #[error("Title not found")]
    TitleNotFound,

    #[error("Review not found")]
    ReviewNotFound,

    #[error("Comment not found")]
    CommentNotFound,

    /// A write was attempted without credentials
    #[error("Authentication credentials were not provided")]
    NotAuthenticated,

    #[error("You do not have permission to perform this action")]
    PermissionDenied,

    /// Database error
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

fn capitalized(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl ContentError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ContentError::Validation(_) | ContentError::DuplicateReview => ErrorKind::BadRequest,
            ContentError::SlugTaken(_) => ErrorKind::Conflict,
            ContentError::TermNotFound(_)
            | ContentError::TitleNotFound
            | ContentError::ReviewNotFound
            | ContentError::CommentNotFound => ErrorKind::NotFound,
            ContentError::NotAuthenticated => ErrorKind::Unauthorized,
            ContentError::PermissionDenied => ErrorKind::Forbidden,
            ContentError::Database(e) => kernel::error::conversions::sqlx_error_kind(e),
            ContentError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            ContentError::Validation(violations) => {
                AppError::bad_request("Invalid request").with_violations(violations)
            }
            ContentError::SlugTaken(_) => {
                AppError::conflict(self.to_string()).with_field("slug", self.to_string())
            }
            ContentError::NotAuthenticated => AppError::unauthorized(self.to_string())
                .with_action("Send an access token from /auth/token"),
            ContentError::Database(_) | ContentError::Internal(_) => {
                AppError::new(self.kind(), self.kind().as_str())
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            ContentError::Database(e) => {
                tracing::error!(error = %e, "Content database error");
            }
            ContentError::Internal(msg) => {
                tracing::error!(message = %msg, "Content internal error");
            }
            ContentError::PermissionDenied => {
                tracing::warn!("Content write denied");
            }
            _ => {
                tracing::debug!(error = %self, "Content error");
            }
        }
    }
}

impl IntoResponse for ContentError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<Violations> for ContentError {
    fn from(v: Violations) -> Self {
        ContentError::Validation(v)
    }
}

impl From<Denied> for ContentError {
    fn from(d: Denied) -> Self {
        match d {
            Denied::Unauthenticated => ContentError::NotAuthenticated,
            Denied::Forbidden => ContentError::PermissionDenied,
        }
    }
}

/// Unique-constraint races surface exactly like the up-front checks.
impl From<sqlx::Error> for ContentError {
    fn from(err: sqlx::Error) -> Self {
        match unique_violation(&err) {
            Some(c) if c.starts_with("categories") => ContentError::SlugTaken(Taxonomy::Category),
            Some(c) if c.starts_with("genres") => ContentError::SlugTaken(Taxonomy::Genre),
            Some(c) if c.starts_with("reviews") => ContentError::DuplicateReview,
            _ => ContentError::Database(err),
        }
    }
}
