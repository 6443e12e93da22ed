//! Auth Middleware
//!
//! Resolves `Authorization: Bearer <token>` to a
//! [`Principal`](crate::domain::permission::Principal) stored in the
//! request extensions.
//!
//! | Header | Result |
//! |---|---|
//! | absent, or another scheme | anonymous, request continues |
//! | `Bearer` with a valid token of a live user | principal attached |
//! | `Bearer` with anything else | 401 |
//!
//! [`guarded`] then runs a permission gate on individual routes, before the
//! handler extracts its path or body.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::{Next, from_fn_with_state};
use axum::response::Response;
use axum::routing::MethodRouter;

use crate::application::AuthenticateUseCase;
use crate::application::token::TokenService;
use crate::domain::permission::Gate;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};
use crate::presentation::extractor::MaybeUser;

/// Middleware state
pub struct AuthMiddlewareState<R>
where
    R: UserRepository + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub tokens: Arc<TokenService>,
}

impl<R> Clone for AuthMiddlewareState<R>
where
    R: UserRepository + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            tokens: self.tokens.clone(),
        }
    }
}

/// Bearer token from the header value; `None` for other schemes.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ').unwrap_or((value, ""));
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
}

/// Attach the caller to the request, if one is presented
pub async fn authenticate_bearer<R>(
    State(state): State<AuthMiddlewareState<R>>,
    mut req: Request,
    next: Next,
) -> AuthResult<Response>
where
    R: UserRepository + Send + Sync + 'static,
{
    let token = match req.headers().get(AUTHORIZATION) {
        None => None,
        Some(value) => {
            let value = value.to_str().map_err(|_| AuthError::InvalidToken)?;
            bearer_token(value).map(str::to_owned)
        }
    };

    if let Some(token) = token {
        if token.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        let use_case = AuthenticateUseCase::new(state.repo.clone(), state.tokens.clone());
        let principal = use_case.execute(&token).await?;
        req.extensions_mut().insert(principal);
    }

    Ok(next.run(req).await)
}

/// Check `gate` ahead of every handler of `route`.
///
/// Only the methods `route` defines are wrapped, so an unsupported method
/// still reaches the 405 fallback instead of a 401.
pub fn guarded<S>(gate: Gate, route: MethodRouter<S>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(from_fn_with_state(gate, enforce_gate))
}

async fn enforce_gate(
    State(gate): State<Gate>,
    caller: MaybeUser,
    req: Request,
    next: Next,
) -> AuthResult<Response> {
    gate(req.method(), caller.principal())?;
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Bearer"), Some(""));
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
    }
}
