//! Caller Extractors
//!
//! Read the [`Principal`] that [`authenticate_bearer`] attached to the request.
//! Neither extractor touches storage, so they work under any router state.
//!
//! [`authenticate_bearer`]: crate::presentation::middleware::authenticate_bearer

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::permission::Principal;
use crate::error::AuthError;

/// Signed-in caller; anonymous requests are rejected with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AuthError::NotAuthenticated)
    }
}

/// Caller if any; permission gates decide what anonymous callers may do.
#[derive(Debug, Clone, Default)]
pub struct MaybeUser(pub Option<Principal>);

impl MaybeUser {
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<Principal>().cloned()))
    }
}
