//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the infra layer.

use kernel::pagination::{Page, PageQuery};

use crate::domain::entity::user::User;
use crate::domain::value_object::{email::Email, user_id::UserId, user_name::UserName};
use crate::error::AuthResult;

/// Filter for the admin user listing
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Case-insensitive substring of the user name
    pub search: Option<String>,
}

/// Credential store
///
/// Uniqueness of user name and email is enforced by the store itself; a
/// violating `create`/`update` fails with `UserNameTaken`/`EmailTaken`.
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find user by user name (exact, case-sensitive)
    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Update user (everything except id and user name)
    async fn update(&self, user: &User) -> AuthResult<()>;

    /// Delete user; `false` when nothing was deleted
    async fn delete(&self, user_id: &UserId) -> AuthResult<bool>;

    /// Users ordered by user name
    async fn list(&self, filter: &UserFilter, page: &PageQuery) -> AuthResult<Page<User>>;
}
