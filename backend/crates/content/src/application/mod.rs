//! Application Layer
//!
//! Use cases for categories, genres, titles, reviews and comments.

pub mod comments;
pub mod reviews;
pub mod terms;
pub mod titles;

// Re-exports
pub use comments::{CommentInput, CommentsUseCase};
pub use reviews::{ReviewInput, ReviewsUseCase};
pub use terms::{TermInput, TermsUseCase};
pub use titles::{TitleInput, TitlesUseCase};
