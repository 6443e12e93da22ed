//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infra layer.
//!
//! Method names carry their entity so one store type can implement every
//! trait without ambiguity at call sites.

use auth::models::user_id::UserId;
use kernel::pagination::{Page, PageQuery};

use crate::domain::entities::{
    Comment, CommentId, NewComment, NewReview, Review, ReviewId, Taxonomy, Term, Title, TitleId,
    TitleRecord,
};
use crate::domain::value_objects::{Name, Slug};
use crate::error::ContentResult;

/// Title listing filter. Every field is optional; set fields are ANDed.
#[derive(Debug, Clone, Default)]
pub struct TitleFilter {
    /// Exact genre slug
    pub genre: Option<String>,
    /// Exact category slug
    pub category: Option<String>,
    pub year: Option<i32>,
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    /// Case-insensitive substring of the name or description
    pub search: Option<String>,
}

/// Categories and genres
#[trait_variant::make(TermRepository: Send)]
pub trait LocalTermRepository {
    /// Fails with `SlugTaken` when the slug exists in the same taxonomy
    async fn create_term(&self, kind: Taxonomy, name: &Name, slug: &Slug) -> ContentResult<Term>;

    async fn find_term(&self, kind: Taxonomy, slug: &Slug) -> ContentResult<Option<Term>>;

    /// Titles lose the category, or the genre association
    async fn delete_term(&self, kind: Taxonomy, slug: &Slug) -> ContentResult<bool>;

    /// Ordered by name; `search` is a case-insensitive substring of the name
    async fn list_terms(
        &self,
        kind: Taxonomy,
        search: Option<&str>,
        page: &PageQuery,
    ) -> ContentResult<Page<Term>>;
}

#[trait_variant::make(TitleRepository: Send)]
pub trait LocalTitleRepository {
    async fn create_title(&self, record: &TitleRecord) -> ContentResult<TitleId>;

    async fn find_title(&self, id: TitleId) -> ContentResult<Option<Title>>;

    /// Replace every stored column; `false` when the title is gone
    async fn update_title(&self, id: TitleId, record: &TitleRecord) -> ContentResult<bool>;

    /// Cascades to reviews and their comments
    async fn delete_title(&self, id: TitleId) -> ContentResult<bool>;

    /// Ordered by name
    async fn list_titles(&self, filter: &TitleFilter, page: &PageQuery)
    -> ContentResult<Page<Title>>;
}

#[trait_variant::make(ReviewRepository: Send)]
pub trait LocalReviewRepository {
    /// Fails with `DuplicateReview` when the author already reviewed the title
    async fn create_review(&self, review: &NewReview) -> ContentResult<Review>;

    /// Only a review belonging to `title_id` is found
    async fn find_review(&self, title_id: TitleId, id: ReviewId) -> ContentResult<Option<Review>>;

    /// Persist text and score
    async fn update_review(&self, review: &Review) -> ContentResult<()>;

    /// Cascades to comments
    async fn delete_review(&self, id: ReviewId) -> ContentResult<bool>;

    async fn has_review(&self, title_id: TitleId, author: &UserId) -> ContentResult<bool>;

    /// Drop every review and comment the author wrote, and the comments
    /// under those reviews
    async fn purge_author(&self, author: &UserId) -> ContentResult<()>;

    /// Newest first
    async fn list_reviews(&self, title_id: TitleId, page: &PageQuery)
    -> ContentResult<Page<Review>>;
}

#[trait_variant::make(CommentRepository: Send)]
pub trait LocalCommentRepository {
    async fn create_comment(&self, comment: &NewComment) -> ContentResult<Comment>;

    /// Only a comment belonging to `review_id` is found
    async fn find_comment(
        &self,
        review_id: ReviewId,
        id: CommentId,
    ) -> ContentResult<Option<Comment>>;

    /// Persist text
    async fn update_comment(&self, comment: &Comment) -> ContentResult<()>;

    async fn delete_comment(&self, id: CommentId) -> ContentResult<bool>;

    /// Newest first
    async fn list_comments(
        &self,
        review_id: ReviewId,
        page: &PageQuery,
    ) -> ContentResult<Page<Comment>>;
}

/// Everything the content endpoints need from one store
pub trait ContentRepository:
    TermRepository + TitleRepository + ReviewRepository + CommentRepository + Sync + 'static
{
}

impl<T> ContentRepository for T where
    T: TermRepository + TitleRepository + ReviewRepository + CommentRepository + Sync + 'static
{
}
