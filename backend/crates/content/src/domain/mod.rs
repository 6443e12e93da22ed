//! Domain Layer
//!
//! Contains entities, value objects and repository traits.

pub mod entities;
pub mod repository;
pub mod value_objects;

// Re-exports
pub use entities::{Author, Comment, Review, Taxonomy, Term, Title, TitleRecord};
pub use repository::{
    CommentRepository, ContentRepository, ReviewRepository, TermRepository, TitleFilter,
    TitleRepository,
};
