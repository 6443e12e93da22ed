//! Obtain Token Use Case
//!
//! Exchanges (username, confirmation code) for a signed access token.
//! `refresh` runs the same verification and mints an independent token; it
//! neither rotates the code nor touches previously issued tokens. Codes are
//! reusable until the next signup/resend overwrites them.

use std::sync::Arc;

use kernel::error::validation::Violations;

use crate::application::token::{IssuedToken, TokenService};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::user_name::UserName;
use crate::error::{AuthError, AuthResult};

/// Obtain token input (raw request fields)
#[derive(Debug, Clone, Default)]
pub struct ObtainTokenInput {
    pub username: Option<String>,
    pub confirmation_code: Option<String>,
}

/// Which endpoint asked, for the audit log only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenGrant {
    Exchange,
    Refresh,
}

pub struct ObtainTokenUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    tokens: Arc<TokenService>,
}

impl<U> ObtainTokenUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, tokens: Arc<TokenService>) -> Self {
        Self { user_repo, tokens }
    }

    pub async fn execute(&self, input: ObtainTokenInput, grant: TokenGrant) -> AuthResult<IssuedToken> {
        // Checked before anything else so a missing username has its own message
        let username = input
            .username
            .filter(|u| !u.is_empty())
            .ok_or(AuthError::UserNameRequired)?;

        let code = input.confirmation_code.filter(|c| !c.is_empty()).ok_or_else(|| {
            AuthError::Validation(Violations::single(
                "confirmation_code",
                "This field is required",
            ))
        })?;

        // A name that fails validation cannot exist in the store
        let user_name = UserName::new(&username).map_err(|_| AuthError::UserNotFound)?;

        let user = self
            .user_repo
            .find_by_user_name(&user_name)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.confirmation_code_matches(&code) {
            return Err(AuthError::InvalidConfirmationCode);
        }

        let issued = self.tokens.issue(&user)?;

        tracing::info!(
            user_id = %user.user_id,
            jti = %issued.claims.jti,
            grant = ?grant,
            "Access token issued"
        );

        Ok(issued)
    }
}
