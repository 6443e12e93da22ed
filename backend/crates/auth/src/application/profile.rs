//! Own Profile Use Case (`/users/me`)
//!
//! Any signed-in caller may read and partially update their own record. A
//! non-admin's `role` change is dropped without error.

use std::sync::Arc;

use crate::application::manage_users::{UserPatch, apply_patch, save_patched};
use crate::domain::entity::user::User;
use crate::domain::permission::Principal;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};

pub struct ProfileUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> ProfileUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn get(&self, caller: &Principal) -> AuthResult<User> {
        self.user_repo
            .find_by_id(&caller.user_id)
            .await?
            .ok_or(AuthError::InvalidToken)
    }

    pub async fn update(&self, caller: &Principal, mut patch: UserPatch) -> AuthResult<User> {
        if !caller.is_admin() && patch.role.take().is_some() {
            tracing::debug!(user_id = %caller.user_id, "Ignoring self-service role change");
        }

        let mut user = self.get(caller).await?;
        let new_email = apply_patch(&mut user, patch)?;
        save_patched(self.user_repo.as_ref(), &user, new_email).await?;

        Ok(user)
    }
}
