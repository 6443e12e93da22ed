//! HTTP Handlers
//!
//! Collection-level permission gates are route layers (see the router), so
//! every write handler here already has an admitted caller. Object-level
//! checks (author or moderator) run in the use cases once the object is
//! loaded.

use std::sync::Arc;

use auth::CurrentUser;
use auth::application::{UserDeletedHook, user_deleted_hook};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use kernel::pagination::{Page, PageQuery};

use crate::application::{CommentsUseCase, ReviewsUseCase, TermsUseCase, TitlesUseCase};
use crate::domain::entities::{CommentId, ReviewId, Taxonomy, TitleId};
use crate::domain::repository::ContentRepository;
use crate::error::ContentResult;
use crate::presentation::dto::{
    CommentRequest, CommentResponse, ReviewRequest, ReviewResponse, SearchQuery, TermRequest,
    TermResponse, TitleListQuery, TitleRequest, TitleResponse,
};

/// Shared state for title, review and comment handlers
pub struct ContentAppState<R: ContentRepository> {
    pub repo: Arc<R>,
}

impl<R: ContentRepository> ContentAppState<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo: Arc::new(repo),
        }
    }

    pub fn terms(&self, kind: Taxonomy) -> TermState<R> {
        TermState {
            repo: self.repo.clone(),
            kind,
        }
    }

    /// Drops a deleted account's reviews and comments. Registered with
    /// [`auth::AuthAppState::with_user_deleted_hook`].
    pub fn author_cleanup(&self) -> UserDeletedHook {
        let repo = self.repo.clone();
        user_deleted_hook(move |user_id| {
            let repo = repo.clone();
            async move {
                if let Err(e) = repo.purge_author(&user_id).await {
                    tracing::error!(error = %e, %user_id, "Failed to drop a deleted user's reviews");
                }
            }
        })
    }
}

impl<R: ContentRepository> Clone for ContentAppState<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}

/// State for one taxonomy's routes
pub struct TermState<R: ContentRepository> {
    pub repo: Arc<R>,
    pub kind: Taxonomy,
}

impl<R: ContentRepository> TermState<R> {
    fn use_case(&self) -> TermsUseCase<R> {
        TermsUseCase::new(self.repo.clone(), self.kind)
    }
}

impl<R: ContentRepository> Clone for TermState<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            kind: self.kind,
        }
    }
}

// ============================================================================
// Categories / Genres
// ============================================================================

/// GET /categories, GET /genres
pub async fn list_terms<R: ContentRepository>(
    State(state): State<TermState<R>>,
    Query(search): Query<SearchQuery>,
    Query(page): Query<PageQuery>,
) -> ContentResult<Json<Page<TermResponse>>> {
    let terms = state.use_case().list(search.search, page).await?;

    Ok(Json(terms.map(TermResponse::from)))
}

/// POST /categories, POST /genres
pub async fn create_term<R: ContentRepository>(
    State(state): State<TermState<R>>,
    Json(req): Json<TermRequest>,
) -> ContentResult<(StatusCode, Json<TermResponse>)> {
    let term = state.use_case().create(req.into()).await?;

    Ok((StatusCode::CREATED, Json(term.into())))
}

/// DELETE /categories/{slug}, DELETE /genres/{slug}
pub async fn delete_term<R: ContentRepository>(
    State(state): State<TermState<R>>,
    Path(slug): Path<String>,
) -> ContentResult<StatusCode> {
    state.use_case().delete(&slug).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Titles
// ============================================================================

/// GET /titles
pub async fn list_titles<R: ContentRepository>(
    State(state): State<ContentAppState<R>>,
    Query(filter): Query<TitleListQuery>,
    Query(page): Query<PageQuery>,
) -> ContentResult<Json<Page<TitleResponse>>> {
    let titles = TitlesUseCase::new(state.repo.clone())
        .list(filter.into(), page)
        .await?;

    Ok(Json(titles.map(TitleResponse::from)))
}

/// POST /titles
pub async fn create_title<R: ContentRepository>(
    State(state): State<ContentAppState<R>>,
    Json(req): Json<TitleRequest>,
) -> ContentResult<(StatusCode, Json<TitleResponse>)> {
    let title = TitlesUseCase::new(state.repo.clone())
        .create(req.into())
        .await?;

    Ok((StatusCode::CREATED, Json(title.into())))
}

/// GET /titles/{title_id}
pub async fn get_title<R: ContentRepository>(
    State(state): State<ContentAppState<R>>,
    Path(title_id): Path<i64>,
) -> ContentResult<Json<TitleResponse>> {
    let title = TitlesUseCase::new(state.repo.clone())
        .get(TitleId::new(title_id))
        .await?;

    Ok(Json(title.into()))
}

/// PATCH /titles/{title_id}
pub async fn update_title<R: ContentRepository>(
    State(state): State<ContentAppState<R>>,
    Path(title_id): Path<i64>,
    Json(req): Json<TitleRequest>,
) -> ContentResult<Json<TitleResponse>> {
    let title = TitlesUseCase::new(state.repo.clone())
        .update(TitleId::new(title_id), req.into())
        .await?;

    Ok(Json(title.into()))
}

/// DELETE /titles/{title_id}
pub async fn delete_title<R: ContentRepository>(
    State(state): State<ContentAppState<R>>,
    Path(title_id): Path<i64>,
) -> ContentResult<StatusCode> {
    TitlesUseCase::new(state.repo.clone())
        .delete(TitleId::new(title_id))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Reviews
// ============================================================================

/// GET /titles/{title_id}/reviews
pub async fn list_reviews<R: ContentRepository>(
    State(state): State<ContentAppState<R>>,
    Path(title_id): Path<i64>,
    Query(page): Query<PageQuery>,
) -> ContentResult<Json<Page<ReviewResponse>>> {
    let reviews = ReviewsUseCase::new(state.repo.clone())
        .list(TitleId::new(title_id), page)
        .await?;

    Ok(Json(reviews.map(ReviewResponse::from)))
}

/// POST /titles/{title_id}/reviews
pub async fn create_review<R: ContentRepository>(
    State(state): State<ContentAppState<R>>,
    CurrentUser(caller): CurrentUser,
    Path(title_id): Path<i64>,
    Json(req): Json<ReviewRequest>,
) -> ContentResult<(StatusCode, Json<ReviewResponse>)> {
    let review = ReviewsUseCase::new(state.repo.clone())
        .create(TitleId::new(title_id), &caller, req.into())
        .await?;

    Ok((StatusCode::CREATED, Json(review.into())))
}

/// GET /titles/{title_id}/reviews/{review_id}
pub async fn get_review<R: ContentRepository>(
    State(state): State<ContentAppState<R>>,
    Path((title_id, review_id)): Path<(i64, i64)>,
) -> ContentResult<Json<ReviewResponse>> {
    let review = ReviewsUseCase::new(state.repo.clone())
        .get(TitleId::new(title_id), ReviewId::new(review_id))
        .await?;

    Ok(Json(review.into()))
}

/// PATCH /titles/{title_id}/reviews/{review_id}
pub async fn update_review<R: ContentRepository>(
    State(state): State<ContentAppState<R>>,
    CurrentUser(caller): CurrentUser,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Json(req): Json<ReviewRequest>,
) -> ContentResult<Json<ReviewResponse>> {
    let review = ReviewsUseCase::new(state.repo.clone())
        .update(
            TitleId::new(title_id),
            ReviewId::new(review_id),
            &caller,
            req.into(),
        )
        .await?;

    Ok(Json(review.into()))
}

/// DELETE /titles/{title_id}/reviews/{review_id}
pub async fn delete_review<R: ContentRepository>(
    State(state): State<ContentAppState<R>>,
    CurrentUser(caller): CurrentUser,
    Path((title_id, review_id)): Path<(i64, i64)>,
) -> ContentResult<StatusCode> {
    ReviewsUseCase::new(state.repo.clone())
        .delete(TitleId::new(title_id), ReviewId::new(review_id), &caller)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Comments
// ============================================================================

/// GET /titles/{title_id}/reviews/{review_id}/comments
pub async fn list_comments<R: ContentRepository>(
    State(state): State<ContentAppState<R>>,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Query(page): Query<PageQuery>,
) -> ContentResult<Json<Page<CommentResponse>>> {
    let comments = CommentsUseCase::new(state.repo.clone())
        .list(TitleId::new(title_id), ReviewId::new(review_id), page)
        .await?;

    Ok(Json(comments.map(CommentResponse::from)))
}

/// POST /titles/{title_id}/reviews/{review_id}/comments
pub async fn create_comment<R: ContentRepository>(
    State(state): State<ContentAppState<R>>,
    CurrentUser(caller): CurrentUser,
    Path((title_id, review_id)): Path<(i64, i64)>,
    Json(req): Json<CommentRequest>,
) -> ContentResult<(StatusCode, Json<CommentResponse>)> {
    let comment = CommentsUseCase::new(state.repo.clone())
        .create(
            TitleId::new(title_id),
            ReviewId::new(review_id),
            &caller,
            req.into(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(comment.into())))
}

/// GET /titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn get_comment<R: ContentRepository>(
    State(state): State<ContentAppState<R>>,
    Path((title_id, review_id, comment_id)): Path<(i64, i64, i64)>,
) -> ContentResult<Json<CommentResponse>> {
    let comment = CommentsUseCase::new(state.repo.clone())
        .get(
            TitleId::new(title_id),
            ReviewId::new(review_id),
            CommentId::new(comment_id),
        )
        .await?;

    Ok(Json(comment.into()))
}

/// PATCH /titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn update_comment<R: ContentRepository>(
    State(state): State<ContentAppState<R>>,
    CurrentUser(caller): CurrentUser,
    Path((title_id, review_id, comment_id)): Path<(i64, i64, i64)>,
    Json(req): Json<CommentRequest>,
) -> ContentResult<Json<CommentResponse>> {
    let comment = CommentsUseCase::new(state.repo.clone())
        .update(
            TitleId::new(title_id),
            ReviewId::new(review_id),
            CommentId::new(comment_id),
            &caller,
            req.into(),
        )
        .await?;

    Ok(Json(comment.into()))
}

/// DELETE /titles/{title_id}/reviews/{review_id}/comments/{comment_id}
pub async fn delete_comment<R: ContentRepository>(
    State(state): State<ContentAppState<R>>,
    CurrentUser(caller): CurrentUser,
    Path((title_id, review_id, comment_id)): Path<(i64, i64, i64)>,
) -> ContentResult<StatusCode> {
    CommentsUseCase::new(state.repo.clone())
        .delete(
            TitleId::new(title_id),
            ReviewId::new(review_id),
            CommentId::new(comment_id),
            &caller,
        )
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
