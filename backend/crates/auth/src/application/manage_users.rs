//! User Management Use Cases (admin)
//!
//! List, create, read, partially update and delete accounts by user name.
//! The admin gate is evaluated by the caller before any of these run.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use kernel::error::validation::Violations;
use kernel::pagination::{Page, PageQuery};

use crate::domain::entity::user::User;
use crate::domain::repository::{UserFilter, UserRepository};
use crate::domain::value_object::{
    email::Email,
    user_id::UserId,
    profile::{Profile, person_name},
    user_name::UserName,
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// Admin-created account
#[derive(Debug, Clone, Default)]
pub struct NewUserInput {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
}

/// Partial update. Absent fields are left untouched; the user name is immutable.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
}

fn parse_role(violations: &mut Violations, raw: Option<String>) -> Option<UserRole> {
    let raw = raw?;
    let role = UserRole::from_code(&raw);
    if role.is_none() {
        violations.add("role", format!("\"{raw}\" is not a valid choice"));
    }
    role
}

/// Validate `patch` and apply it to `user` in memory.
///
/// Returns the validated new email (if any) so the caller can check
/// uniqueness before persisting.
pub(crate) fn apply_patch(user: &mut User, patch: UserPatch) -> AuthResult<Option<Email>> {
    let mut violations = Violations::new();

    let email = patch
        .email
        .and_then(|raw| violations.check("email", Email::new(raw)));
    let first_name = patch
        .first_name
        .and_then(|raw| violations.check("first_name", person_name(&raw)));
    let last_name = patch
        .last_name
        .and_then(|raw| violations.check("last_name", person_name(&raw)));
    let role = parse_role(&mut violations, patch.role);

    violations.into_result()?;

    let profile = Profile {
        first_name: first_name.unwrap_or_else(|| user.profile.first_name.clone()),
        last_name: last_name.unwrap_or_else(|| user.profile.last_name.clone()),
        bio: patch.bio.unwrap_or_else(|| user.profile.bio.clone()),
    };
    if profile != user.profile {
        user.set_profile(profile);
    }
    if let Some(role) = role {
        user.set_role(role);
    }
    let changed_email = email.filter(|e| *e != user.email);
    if let Some(email) = &changed_email {
        user.set_email(email.clone());
    }

    Ok(changed_email)
}

/// Persist a patched user, enforcing email uniqueness first.
pub(crate) async fn save_patched<U: UserRepository>(
    repo: &U,
    user: &User,
    new_email: Option<Email>,
) -> AuthResult<()> {
    if let Some(email) = new_email {
        if let Some(other) = repo.find_by_email(&email).await? {
            if other.user_id != user.user_id {
                return Err(AuthError::EmailTaken);
            }
        }
    }
    repo.update(user).await
}

/// Runs after an account is deleted, so other modules can drop what it
/// wrote. The hook logs its own failures.
pub type UserDeletedHook =
    Arc<dyn Fn(UserId) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

pub fn user_deleted_hook<F, Fut>(f: F) -> UserDeletedHook
where
    F: Fn(UserId) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |user_id: UserId| -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(f(user_id))
    })
}

pub struct ManageUsersUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    on_deleted: Option<UserDeletedHook>,
}

impl<U> ManageUsersUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self {
            user_repo,
            on_deleted: None,
        }
    }

    pub fn on_deleted(mut self, hook: Option<UserDeletedHook>) -> Self {
        self.on_deleted = hook;
        self
    }

    pub async fn list(&self, filter: UserFilter, page: PageQuery) -> AuthResult<Page<User>> {
        self.user_repo.list(&filter, &page).await
    }

    pub async fn create(&self, input: NewUserInput) -> AuthResult<User> {
        let mut violations = Violations::new();

        let user_name = violations
            .require("username", input.username)
            .and_then(|raw| violations.check("username", UserName::new(raw)));
        let email = violations
            .require("email", input.email)
            .and_then(|raw| violations.check("email", Email::new(raw)));
        let first_name = input
            .first_name
            .and_then(|raw| violations.check("first_name", person_name(&raw)));
        let last_name = input
            .last_name
            .and_then(|raw| violations.check("last_name", person_name(&raw)));
        let role = parse_role(&mut violations, input.role);

        let (Some(user_name), Some(email)) = (user_name, email) else {
            return Err(violations.into());
        };
        violations.into_result()?;

        if self.user_repo.find_by_user_name(&user_name).await?.is_some() {
            return Err(AuthError::UserNameTaken);
        }
        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let mut user = User::new(user_name, email);
        user.role = role.unwrap_or_default();
        user.profile = Profile {
            first_name: first_name.unwrap_or_default(),
            last_name: last_name.unwrap_or_default(),
            bio: input.bio.unwrap_or_default(),
        };

        self.user_repo.create(&user).await?;

        tracing::info!(
            user_id = %user.user_id,
            user_name = %user.user_name,
            role = %user.role,
            "User created by admin"
        );

        Ok(user)
    }

    pub async fn get(&self, user_name: &str) -> AuthResult<User> {
        let user_name = UserName::new(user_name).map_err(|_| AuthError::UserNotFound)?;
        self.user_repo
            .find_by_user_name(&user_name)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    pub async fn update(&self, user_name: &str, patch: UserPatch) -> AuthResult<User> {
        let mut user = self.get(user_name).await?;
        let new_email = apply_patch(&mut user, patch)?;
        save_patched(self.user_repo.as_ref(), &user, new_email).await?;

        tracing::info!(user_id = %user.user_id, role = %user.role, "User updated by admin");

        Ok(user)
    }

    pub async fn delete(&self, user_name: &str) -> AuthResult<()> {
        let user = self.get(user_name).await?;
        if !self.user_repo.delete(&user.user_id).await? {
            return Err(AuthError::UserNotFound);
        }
        if let Some(hook) = &self.on_deleted {
            hook(user.user_id).await;
        }

        tracing::info!(user_id = %user.user_id, user_name = %user.user_name, "User deleted");

        Ok(())
    }
}
