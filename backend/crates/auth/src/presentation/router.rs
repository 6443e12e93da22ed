//! Auth Router

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use platform::mail::Mailer;

use crate::domain::permission::admin_only;
use crate::domain::repository::UserRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{authenticate_bearer, guarded};

/// `/auth/*` and `/users/*` routes
///
/// `/users` and `/users/{username}` are admin-only for every method;
/// `/users/me` only needs a signed-in caller.
pub fn auth_router<R, M>(state: AuthAppState<R, M>) -> Router
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Sync + 'static,
{
    Router::new()
        .route("/auth/signup", post(handlers::signup::<R, M>))
        .route("/auth/token", post(handlers::token::<R, M>))
        .route("/auth/refresh", post(handlers::refresh::<R, M>))
        .route(
            "/users",
            guarded(
                admin_only,
                get(handlers::list_users::<R, M>).post(handlers::create_user::<R, M>),
            ),
        )
        .route(
            "/users/me",
            get(handlers::me::<R, M>).patch(handlers::update_me::<R, M>),
        )
        .route(
            "/users/{username}",
            guarded(
                admin_only,
                get(handlers::get_user::<R, M>)
                    .patch(handlers::update_user::<R, M>)
                    .delete(handlers::delete_user::<R, M>),
            ),
        )
        .with_state(state)
}

/// Wrap every route of `router` with bearer-token authentication
pub fn with_bearer_auth<R, M>(router: Router, state: &AuthAppState<R, M>) -> Router
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Sync + 'static,
{
    router.layer(from_fn_with_state(
        state.middleware_state(),
        authenticate_bearer::<R>,
    ))
}
