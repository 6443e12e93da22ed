//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use kernel::pagination::{Page, PageQuery};
use platform::mail::Mailer;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::token::TokenService;
use crate::application::{
    ManageUsersUseCase, ObtainTokenUseCase, ProfileUseCase, RequestCodeUseCase, TokenGrant,
    UserDeletedHook,
};
use crate::domain::repository::{UserFilter, UserRepository};
use crate::error::AuthResult;
use crate::presentation::dto::{
    NewUserRequest, SignupRequest, SignupResponse, TokenRequest, TokenResponse, UserPatchRequest,
    UserResponse, UserSearchQuery,
};
use crate::presentation::extractor::CurrentUser;
use crate::presentation::middleware::AuthMiddlewareState;

/// Shared state for auth handlers
pub struct AuthAppState<R, M>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Sync + 'static,
{
    pub repo: Arc<R>,
    pub mailer: Arc<M>,
    pub config: Arc<AuthConfig>,
    pub tokens: Arc<TokenService>,
    pub on_user_deleted: Option<UserDeletedHook>,
}

impl<R, M> AuthAppState<R, M>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Sync + 'static,
{
    pub fn new(repo: R, mailer: M, config: AuthConfig) -> Self {
        let tokens = TokenService::new(&config);
        Self {
            repo: Arc::new(repo),
            mailer: Arc::new(mailer),
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            on_user_deleted: None,
        }
    }

    /// Run `hook` after an admin deletes an account
    pub fn with_user_deleted_hook(mut self, hook: UserDeletedHook) -> Self {
        self.on_user_deleted = Some(hook);
        self
    }

    /// State for [`authenticate_bearer`](crate::presentation::middleware::authenticate_bearer)
    pub fn middleware_state(&self) -> AuthMiddlewareState<R> {
        AuthMiddlewareState {
            repo: self.repo.clone(),
            tokens: self.tokens.clone(),
        }
    }
}

impl<R, M> Clone for AuthAppState<R, M>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            mailer: self.mailer.clone(),
            config: self.config.clone(),
            tokens: self.tokens.clone(),
            on_user_deleted: self.on_user_deleted.clone(),
        }
    }
}

// ============================================================================
// Signup / Token
// ============================================================================

/// POST /auth/signup
pub async fn signup<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<SignupRequest>,
) -> AuthResult<Json<SignupResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Sync + 'static,
{
    let use_case = RequestCodeUseCase::new(
        state.repo.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );

    let sent = req.clone();
    let output = use_case.execute(req.into()).await?;

    // Echo what was sent; the account stores the normalised email
    Ok(Json(SignupResponse {
        username: sent
            .username
            .unwrap_or_else(|| output.user_name.into_inner()),
        email: sent.email.unwrap_or_else(|| output.email.into()),
    }))
}

/// POST /auth/token
pub async fn token<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<TokenRequest>,
) -> AuthResult<Json<TokenResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Sync + 'static,
{
    issue_token(&state, req, TokenGrant::Exchange).await
}

/// POST /auth/refresh
pub async fn refresh<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<TokenRequest>,
) -> AuthResult<Json<TokenResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Sync + 'static,
{
    issue_token(&state, req, TokenGrant::Refresh).await
}

async fn issue_token<R, M>(
    state: &AuthAppState<R, M>,
    req: TokenRequest,
    grant: TokenGrant,
) -> AuthResult<Json<TokenResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Sync + 'static,
{
    let use_case = ObtainTokenUseCase::new(state.repo.clone(), state.tokens.clone());
    let issued = use_case.execute(req.into(), grant).await?;

    Ok(Json(TokenResponse {
        token: issued.token,
    }))
}

// ============================================================================
// Users (admin only; the gate is applied by the router)
// ============================================================================

/// GET /users
pub async fn list_users<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Query(search): Query<UserSearchQuery>,
    Query(page): Query<PageQuery>,
) -> AuthResult<Json<Page<UserResponse>>>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Sync + 'static,
{
    let filter = UserFilter {
        search: search.search,
    };
    let users = ManageUsersUseCase::new(state.repo.clone())
        .list(filter, page)
        .await?;

    Ok(Json(users.map(UserResponse::from)))
}

/// POST /users
pub async fn create_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Json(req): Json<NewUserRequest>,
) -> AuthResult<(StatusCode, Json<UserResponse>)>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Sync + 'static,
{
    let user = ManageUsersUseCase::new(state.repo.clone())
        .create(req.into())
        .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /users/{username}
pub async fn get_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Path(username): Path<String>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Sync + 'static,
{
    let user = ManageUsersUseCase::new(state.repo.clone())
        .get(&username)
        .await?;

    Ok(Json(user.into()))
}

/// PATCH /users/{username}
pub async fn update_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Path(username): Path<String>,
    Json(req): Json<UserPatchRequest>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Sync + 'static,
{
    let user = ManageUsersUseCase::new(state.repo.clone())
        .update(&username, req.into())
        .await?;

    Ok(Json(user.into()))
}

/// DELETE /users/{username}
pub async fn delete_user<R, M>(
    State(state): State<AuthAppState<R, M>>,
    Path(username): Path<String>,
) -> AuthResult<StatusCode>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Sync + 'static,
{
    ManageUsersUseCase::new(state.repo.clone())
        .on_deleted(state.on_user_deleted.clone())
        .delete(&username)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Own profile
// ============================================================================

/// GET /users/me
pub async fn me<R, M>(
    State(state): State<AuthAppState<R, M>>,
    CurrentUser(caller): CurrentUser,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Sync + 'static,
{
    let user = ProfileUseCase::new(state.repo.clone()).get(&caller).await?;

    Ok(Json(user.into()))
}

/// PATCH /users/me
pub async fn update_me<R, M>(
    State(state): State<AuthAppState<R, M>>,
    CurrentUser(caller): CurrentUser,
    Json(req): Json<UserPatchRequest>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Sync + 'static,
{
    let user = ProfileUseCase::new(state.repo.clone())
        .update(&caller, req.into())
        .await?;

    Ok(Json(user.into()))
}
