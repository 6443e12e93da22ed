//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, extractors and middleware.

pub mod dto;
pub mod extractor;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use extractor::{CurrentUser, MaybeUser};
pub use handlers::AuthAppState;
pub use middleware::{AuthMiddlewareState, authenticate_bearer, guarded};
pub use router::{auth_router, with_bearer_auth};
