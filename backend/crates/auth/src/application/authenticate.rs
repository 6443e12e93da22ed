//! Authenticate Use Case
//!
//! Resolves a bearer token to the calling principal. The user is reloaded on
//! every request so role changes and deletions take effect immediately.

use std::sync::Arc;

use crate::application::token::TokenService;
use crate::domain::permission::Principal;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};

pub struct AuthenticateUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    tokens: Arc<TokenService>,
}

impl<U> AuthenticateUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, tokens: Arc<TokenService>) -> Self {
        Self { user_repo, tokens }
    }

    pub async fn execute(&self, token: &str) -> AuthResult<Principal> {
        let claims = self.tokens.verify(token)?;
        let user_id = claims.user_id()?;

        let user = self
            .user_repo
            .find_by_id(&user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if user.user_name.as_str() != claims.username {
            return Err(AuthError::InvalidToken);
        }

        Ok(Principal {
            user_id: user.user_id,
            user_name: user.user_name,
            role: user.role,
            is_superuser: user.is_superuser,
        })
    }
}
