//! Domain Layer
//!
//! Contains entities, value objects, repository traits and the permission
//! evaluator.

pub mod entity;
pub mod permission;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::user::User;
pub use permission::{PermissionLevel, Principal, permission_level};
pub use repository::{UserFilter, UserRepository};
