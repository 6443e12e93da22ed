//! Content Router

use auth::guarded;
use auth::permission::{admin_or_read_only, authenticated_or_read_only};
use axum::{
    Router,
    routing::{delete, get},
};

use crate::domain::entities::Taxonomy;
use crate::domain::repository::ContentRepository;
use crate::presentation::handlers::{self, ContentAppState, TermState};

/// `/categories`, `/genres` and `/titles/*` routes
///
/// Collection-level gates run as route layers, so an anonymous write is
/// rejected before its path or body is parsed. Author checks on reviews and
/// comments run in the use cases once the object is loaded.
pub fn content_router<R: ContentRepository>(state: ContentAppState<R>) -> Router {
    Router::new()
        .merge(term_routes("/categories", state.terms(Taxonomy::Category)))
        .merge(term_routes("/genres", state.terms(Taxonomy::Genre)))
        .merge(title_routes(state))
}

fn term_routes<R: ContentRepository>(base: &str, state: TermState<R>) -> Router {
    Router::new()
        .route(
            base,
            guarded(
                admin_or_read_only,
                get(handlers::list_terms::<R>).post(handlers::create_term::<R>),
            ),
        )
        .route(
            &format!("{base}/{{slug}}"),
            guarded(admin_or_read_only, delete(handlers::delete_term::<R>)),
        )
        .with_state(state)
}

fn title_routes<R: ContentRepository>(state: ContentAppState<R>) -> Router {
    Router::new()
        .route(
            "/titles",
            guarded(
                admin_or_read_only,
                get(handlers::list_titles::<R>).post(handlers::create_title::<R>),
            ),
        )
        .route(
            "/titles/{title_id}",
            guarded(
                admin_or_read_only,
                get(handlers::get_title::<R>)
                    .patch(handlers::update_title::<R>)
                    .delete(handlers::delete_title::<R>),
            ),
        )
        .route(
            "/titles/{title_id}/reviews",
            guarded(
                authenticated_or_read_only,
                get(handlers::list_reviews::<R>).post(handlers::create_review::<R>),
            ),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}",
            guarded(
                authenticated_or_read_only,
                get(handlers::get_review::<R>)
                    .patch(handlers::update_review::<R>)
                    .delete(handlers::delete_review::<R>),
            ),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}/comments",
            guarded(
                authenticated_or_read_only,
                get(handlers::list_comments::<R>).post(handlers::create_comment::<R>),
            ),
        )
        .route(
            "/titles/{title_id}/reviews/{review_id}/comments/{comment_id}",
            guarded(
                authenticated_or_read_only,
                get(handlers::get_comment::<R>)
                    .patch(handlers::update_comment::<R>)
                    .delete(handlers::delete_comment::<R>),
            ),
        )
        .with_state(state)
}
