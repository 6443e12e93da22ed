//! Content Backend Module
//!
//! Categories, genres, titles, reviews and comments.
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases
//! - `infra/` - PostgreSQL and in-memory implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Access
//! - Reads are public
//! - Categories, genres and titles are written by admins
//! - Any signed-in user may review a title (once) and comment on a review
//! - Authors, moderators and admins may change or delete reviews and comments
//!
//! The caller comes from `auth`'s bearer middleware, which must wrap
//! [`content_router`].

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use domain::repository::ContentRepository;
pub use error::{ContentError, ContentResult};
pub use infra::{InMemoryContentRepository, PgContentRepository};
pub use presentation::{ContentAppState, content_router};

pub mod models {
    pub use crate::domain::entities::*;
    pub use crate::domain::value_objects::*;
    pub use crate::presentation::dto::*;
}
