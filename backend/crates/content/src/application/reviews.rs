//! Reviews Use Case
//!
//! Reviews live under a title. The author is always the caller, and each
//! author reviews a title at most once. Changing or deleting a review is open
//! to its author and to moderators.

use std::sync::Arc;

use auth::Principal;
use auth::permission::author_or_moderation;
use http::Method;
use kernel::error::validation::Violations;
use kernel::pagination::{Page, PageQuery};

use crate::domain::entities::{Author, NewReview, Review, ReviewId, TitleId};
use crate::domain::repository::{ReviewRepository, TitleRepository};
use crate::domain::value_objects::{Score, Text};
use crate::error::{ContentError, ContentResult};

/// Raw request fields, shared by create and partial update
#[derive(Debug, Clone, Default)]
pub struct ReviewInput {
    pub text: Option<String>,
    pub score: Option<i64>,
}

pub(crate) fn author_of(caller: &Principal) -> Author {
    Author {
        user_id: caller.user_id,
        username: caller.user_name.to_string(),
    }
}

pub struct ReviewsUseCase<R>
where
    R: TitleRepository + ReviewRepository,
{
    repo: Arc<R>,
}

impl<R> ReviewsUseCase<R>
where
    R: TitleRepository + ReviewRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    async fn ensure_title(&self, title_id: TitleId) -> ContentResult<()> {
        match self.repo.find_title(title_id).await? {
            Some(_) => Ok(()),
            None => Err(ContentError::TitleNotFound),
        }
    }

    pub async fn list(&self, title_id: TitleId, page: PageQuery) -> ContentResult<Page<Review>> {
        self.ensure_title(title_id).await?;
        self.repo.list_reviews(title_id, &page).await
    }

    pub async fn get(&self, title_id: TitleId, id: ReviewId) -> ContentResult<Review> {
        self.ensure_title(title_id).await?;
        self.repo
            .find_review(title_id, id)
            .await?
            .ok_or(ContentError::ReviewNotFound)
    }

    pub async fn create(
        &self,
        title_id: TitleId,
        caller: &Principal,
        input: ReviewInput,
    ) -> ContentResult<Review> {
        self.ensure_title(title_id).await?;

        let mut violations = Violations::new();
        let text = violations
            .require("text", input.text)
            .and_then(|raw| violations.check("text", Text::new(raw)));
        let score = violations
            .require("score", input.score)
            .and_then(|raw| violations.check("score", Score::new(raw)));
        let (Some(text), Some(score)) = (text, score) else {
            return Err(violations.into());
        };

        if self.repo.has_review(title_id, &caller.user_id).await? {
            return Err(ContentError::DuplicateReview);
        }

        let review = self
            .repo
            .create_review(&NewReview {
                title_id,
                author: author_of(caller),
                text,
                score,
            })
            .await?;

        tracing::info!(
            title_id = %title_id,
            review_id = %review.id,
            user_id = %caller.user_id,
            "Review created"
        );

        Ok(review)
    }

    pub async fn update(
        &self,
        title_id: TitleId,
        id: ReviewId,
        caller: &Principal,
        input: ReviewInput,
    ) -> ContentResult<Review> {
        let mut review = self.get(title_id, id).await?;
        author_or_moderation(&Method::PATCH, Some(caller), &review.author.user_id)?;

        let mut violations = Violations::new();
        if let Some(raw) = input.text {
            if let Some(text) = violations.check("text", Text::new(raw)) {
                review.text = text;
            }
        }
        if let Some(raw) = input.score {
            if let Some(score) = violations.check("score", Score::new(raw)) {
                review.score = score;
            }
        }
        violations.into_result()?;

        self.repo.update_review(&review).await?;

        tracing::info!(review_id = %id, user_id = %caller.user_id, "Review updated");

        Ok(review)
    }

    pub async fn delete(
        &self,
        title_id: TitleId,
        id: ReviewId,
        caller: &Principal,
    ) -> ContentResult<()> {
        let review = self.get(title_id, id).await?;
        author_or_moderation(&Method::DELETE, Some(caller), &review.author.user_id)?;

        if !self.repo.delete_review(id).await? {
            return Err(ContentError::ReviewNotFound);
        }

        tracing::info!(review_id = %id, user_id = %caller.user_id, "Review deleted");

        Ok(())
    }
}
