//! User Entity
//!
//! A single account record: identity, contact address, role, profile and the
//! currently live confirmation code.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    confirmation_code::ConfirmationCode, email::Email, profile::Profile, user_id::UserId,
    user_name::UserName, user_role::UserRole,
};

/// User entity
///
/// Accounts are passwordless: the only credential is the confirmation code.
#[derive(Debug, Clone)]
pub struct User {
    /// Internal UUID identifier (the token subject)
    pub user_id: UserId,
    /// User name (unique, immutable)
    pub user_name: UserName,
    /// Email (unique)
    pub email: Email,
    pub role: UserRole,
    /// Grants admin rights regardless of role
    pub is_superuser: bool,
    pub profile: Profile,
    /// Live confirmation code; `None` until the first signup request
    pub confirmation_code: Option<ConfirmationCode>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with the default role and no code
    pub fn new(user_name: UserName, email: Email) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            user_name,
            email,
            role: UserRole::default(),
            is_superuser: false,
            profile: Profile::default(),
            confirmation_code: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the live confirmation code with a fresh one. The new code
    /// always differs from the one it replaces.
    pub fn issue_confirmation_code(&mut self) -> ConfirmationCode {
        let mut code = ConfirmationCode::generate();
        while self.confirmation_code.as_ref() == Some(&code) {
            code = ConfirmationCode::generate();
        }
        self.confirmation_code = Some(code.clone());
        self.updated_at = Utc::now();
        code
    }

    /// Check a candidate code against the live one. No live code never matches.
    pub fn confirmation_code_matches(&self, candidate: &str) -> bool {
        self.confirmation_code
            .as_ref()
            .is_some_and(|code| code.matches(candidate))
    }

    pub fn set_role(&mut self, role: UserRole) {
        self.role = role;
        self.updated_at = Utc::now();
    }

    pub fn set_email(&mut self, email: Email) {
        self.email = email;
        self.updated_at = Utc::now();
    }

    pub fn set_profile(&mut self, profile: Profile) {
        self.profile = profile;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new(
            UserName::new("reader").unwrap(),
            Email::new("reader@example.com").unwrap(),
        )
    }

    #[test]
    fn test_new_user_defaults() {
        let user = user();
        assert_eq!(user.role, UserRole::User);
        assert!(!user.is_superuser);
        assert!(user.confirmation_code.is_none());
    }

    #[test]
    fn test_code_never_matches_before_issue() {
        let user = user();
        assert!(!user.confirmation_code_matches(""));
        assert!(!user.confirmation_code_matches("000000"));
    }

    #[test]
    fn test_reissue_overwrites() {
        let mut user = user();
        let first = user.issue_confirmation_code();
        assert!(user.confirmation_code_matches(first.as_str()));

        let second = user.issue_confirmation_code();
        assert_ne!(second, first);
        assert!(!user.confirmation_code_matches(first.as_str()));
        assert!(user.confirmation_code_matches(second.as_str()));
    }

    #[test]
    fn test_reissue_never_repeats_the_live_code() {
        let mut user = user();
        let mut previous = user.issue_confirmation_code();
        for _ in 0..2_000 {
            let next = user.issue_confirmation_code();
            assert_ne!(next, previous);
            assert!(!user.confirmation_code_matches(previous.as_str()));
            previous = next;
        }
    }
}
