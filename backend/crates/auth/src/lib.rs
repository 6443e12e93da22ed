//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits, permission gates
//! - `application/` - Use cases and application services
//! - `infra/` - PostgreSQL and in-memory implementations
//! - `presentation/` - HTTP handlers, DTOs, extractors, middleware, router
//!
//! ## Features
//! - Passwordless signup: a confirmation code is mailed to the address
//! - Code exchange for a signed bearer token (HS256)
//! - Role-based access (User, Moderator, Admin; superusers are admins)
//! - Admin user management and self-service profile (`/users/me`)
//!
//! ## Security Model
//! - Codes are compared in constant time and never logged
//! - The caller is reloaded on every request, so role changes and deletions
//!   apply to already issued tokens
//! - Usernames are immutable once created

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use domain::permission::{Denied, PermissionLevel, Principal};
pub use error::{AuthError, AuthResult};
pub use infra::{InMemoryUserRepository, PgAuthRepository};
pub use presentation::extractor::{CurrentUser, MaybeUser};
pub use presentation::guarded;
pub use presentation::router::{auth_router, with_bearer_auth};
pub use presentation::AuthAppState;

// Re-export kernel error types for unified error handling
pub use kernel::error::{app_error::AppError, kind::ErrorKind};

pub mod permission {
    pub use crate::domain::permission::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

#[cfg(test)]
mod tests;
