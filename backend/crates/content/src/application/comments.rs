//! Comments Use Case
//!
//! Comments live under a review, which lives under a title; both parents must
//! exist and match the path.

use std::sync::Arc;

use auth::Principal;
use auth::permission::author_or_moderation;
use http::Method;
use kernel::error::validation::Violations;
use kernel::pagination::{Page, PageQuery};

use crate::application::reviews::author_of;
use crate::domain::entities::{Comment, CommentId, NewComment, ReviewId, TitleId};
use crate::domain::repository::{CommentRepository, ReviewRepository, TitleRepository};
use crate::domain::value_objects::Text;
use crate::error::{ContentError, ContentResult};

/// Raw request fields
#[derive(Debug, Clone, Default)]
pub struct CommentInput {
    pub text: Option<String>,
}

pub struct CommentsUseCase<R>
where
    R: TitleRepository + ReviewRepository + CommentRepository,
{
    repo: Arc<R>,
}

impl<R> CommentsUseCase<R>
where
    R: TitleRepository + ReviewRepository + CommentRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    async fn ensure_review(&self, title_id: TitleId, review_id: ReviewId) -> ContentResult<()> {
        if self.repo.find_title(title_id).await?.is_none() {
            return Err(ContentError::TitleNotFound);
        }
        if self.repo.find_review(title_id, review_id).await?.is_none() {
            return Err(ContentError::ReviewNotFound);
        }
        Ok(())
    }

    pub async fn list(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
        page: PageQuery,
    ) -> ContentResult<Page<Comment>> {
        self.ensure_review(title_id, review_id).await?;
        self.repo.list_comments(review_id, &page).await
    }

    pub async fn get(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
        id: CommentId,
    ) -> ContentResult<Comment> {
        self.ensure_review(title_id, review_id).await?;
        self.repo
            .find_comment(review_id, id)
            .await?
            .ok_or(ContentError::CommentNotFound)
    }

    pub async fn create(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
        caller: &Principal,
        input: CommentInput,
    ) -> ContentResult<Comment> {
        self.ensure_review(title_id, review_id).await?;

        let mut violations = Violations::new();
        let text = violations
            .require("text", input.text)
            .and_then(|raw| violations.check("text", Text::new(raw)));
        let Some(text) = text else {
            return Err(violations.into());
        };

        let comment = self
            .repo
            .create_comment(&NewComment {
                review_id,
                author: author_of(caller),
                text,
            })
            .await?;

        tracing::info!(
            review_id = %review_id,
            comment_id = %comment.id,
            user_id = %caller.user_id,
            "Comment created"
        );

        Ok(comment)
    }

    pub async fn update(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
        id: CommentId,
        caller: &Principal,
        input: CommentInput,
    ) -> ContentResult<Comment> {
        let mut comment = self.get(title_id, review_id, id).await?;
        author_or_moderation(&Method::PATCH, Some(caller), &comment.author.user_id)?;

        if let Some(raw) = input.text {
            comment.text = Text::new(raw)
                .map_err(|e| Violations::single("text", e.to_string()))?;
        }

        self.repo.update_comment(&comment).await?;

        tracing::info!(comment_id = %id, user_id = %caller.user_id, "Comment updated");

        Ok(comment)
    }

    pub async fn delete(
        &self,
        title_id: TitleId,
        review_id: ReviewId,
        id: CommentId,
        caller: &Principal,
    ) -> ContentResult<()> {
        let comment = self.get(title_id, review_id, id).await?;
        author_or_moderation(&Method::DELETE, Some(caller), &comment.author.user_id)?;

        if !self.repo.delete_comment(id).await? {
            return Err(ContentError::CommentNotFound);
        }

        tracing::info!(comment_id = %id, user_id = %caller.user_id, "Comment deleted");

        Ok(())
    }
}
