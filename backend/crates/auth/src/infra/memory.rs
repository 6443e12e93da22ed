//! In-Memory Repository
//!
//! Backs the server when no database is configured, and the test suites.

use std::collections::HashMap;
use std::sync::Arc;

use kernel::pagination::{Page, PageQuery};
use tokio::sync::RwLock;

use crate::domain::entity::user::User;
use crate::domain::repository::{UserFilter, UserRepository};
use crate::domain::value_object::{email::Email, user_id::UserId, user_name::UserName};
use crate::error::{AuthError, AuthResult};

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

/// Same precedence as the unique constraints: email first.
fn check_unique(users: &HashMap<UserId, User>, candidate: &User) -> AuthResult<()> {
    let others = users.values().filter(|u| u.user_id != candidate.user_id);
    for other in others {
        if other.email == candidate.email {
            return Err(AuthError::EmailTaken);
        }
        if other.user_name == candidate.user_name {
            return Err(AuthError::UserNameTaken);
        }
    }
    Ok(())
}

impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.write().await;
        check_unique(&users, user)?;
        users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn find_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| &u.user_name == user_name).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| &u.email == email).cloned())
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.write().await;
        check_unique(&users, user)?;
        if let Some(stored) = users.get_mut(&user.user_id) {
            // user name is immutable
            let user_name = stored.user_name.clone();
            *stored = user.clone();
            stored.user_name = user_name;
        }
        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<bool> {
        Ok(self.users.write().await.remove(user_id).is_some())
    }

    async fn list(&self, filter: &UserFilter, page: &PageQuery) -> AuthResult<Page<User>> {
        let needle = filter
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let users = self.users.read().await;
        let mut matched: Vec<User> = users
            .values()
            .filter(|u| {
                needle
                    .as_deref()
                    .is_none_or(|n| u.user_name.as_str().to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.user_name.as_str().cmp(b.user_name.as_str()));

        let count = matched.len() as u64;
        Ok(Page::new(page.slice(matched), count, page))
    }
}
