//! Request Confirmation Code Use Case
//!
//! Signup and resend share one entry point:
//! - known (username, email) pair: reissue the code
//! - email owned by another user name: `EmailTaken`
//! - user name owned by another email: `UserNameTaken`
//! - otherwise: create a passwordless account and issue its first code
//!
//! Every success mails the new code exactly once. Delivery failures are
//! returned to the caller.

use std::sync::Arc;

use kernel::error::validation::Violations;
use platform::mail::{MailMessage, Mailer};

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    confirmation_code::ConfirmationCode, email::Email, user_name::UserName,
};
use crate::error::{AuthError, AuthResult};

/// Request code input (raw request fields)
#[derive(Debug, Clone, Default)]
pub struct RequestCodeInput {
    pub username: Option<String>,
    pub email: Option<String>,
}

/// Request code output
#[derive(Debug, Clone)]
pub struct RequestCodeOutput {
    pub user_name: UserName,
    pub email: Email,
    /// `true` when the account was created by this call
    pub created: bool,
}

/// Confirmation code issuer
pub struct RequestCodeUseCase<U, M>
where
    U: UserRepository,
    M: Mailer,
{
    user_repo: Arc<U>,
    mailer: Arc<M>,
    config: Arc<AuthConfig>,
}

impl<U, M> RequestCodeUseCase<U, M>
where
    U: UserRepository,
    M: Mailer + Sync,
{
    pub fn new(user_repo: Arc<U>, mailer: Arc<M>, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            mailer,
            config,
        }
    }

    pub async fn execute(&self, input: RequestCodeInput) -> AuthResult<RequestCodeOutput> {
        let (user_name, email) = validate(input)?;

        let by_name = self.user_repo.find_by_user_name(&user_name).await?;

        if let Some(mut user) = by_name.clone().filter(|u| u.email == email) {
            let code = user.issue_confirmation_code();
            self.user_repo.update(&user).await?;
            self.send(&user, &code, &self.config.resend_subject).await?;

            tracing::info!(user_name = %user.user_name, "Confirmation code reissued");

            return Ok(RequestCodeOutput {
                user_name,
                email,
                created: false,
            });
        }

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        if by_name.is_some() {
            return Err(AuthError::UserNameTaken);
        }

        let mut user = User::new(user_name.clone(), email.clone());
        let code = user.issue_confirmation_code();
        // A concurrent signup for the same identity loses here with a
        // uniqueness error.
        self.user_repo.create(&user).await?;
        self.send(&user, &code, &self.config.signup_subject).await?;

        tracing::info!(
            user_id = %user.user_id,
            user_name = %user.user_name,
            "User signed up"
        );

        Ok(RequestCodeOutput {
            user_name,
            email,
            created: true,
        })
    }

    async fn send(&self, user: &User, code: &ConfirmationCode, subject: &str) -> AuthResult<()> {
        let message = MailMessage {
            from: self.config.mail_from.clone(),
            to: vec![user.email.to_string()],
            subject: subject.to_string(),
            body: format!("Your confirmation code: {}", code.as_str()),
        };
        self.mailer.send(&message).await?;
        Ok(())
    }
}

fn validate(input: RequestCodeInput) -> AuthResult<(UserName, Email)> {
    let mut violations = Violations::new();

    let user_name = violations
        .require("username", input.username)
        .and_then(|raw| violations.check("username", UserName::new(raw)));
    let email = violations
        .require("email", input.email)
        .and_then(|raw| violations.check("email", Email::new(raw)));

    match (user_name, email) {
        (Some(user_name), Some(email)) => Ok((user_name, email)),
        _ => Err(violations.into()),
    }
}
