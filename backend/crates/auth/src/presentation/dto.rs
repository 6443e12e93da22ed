//! API DTOs (Data Transfer Objects)
//!
//! Request fields are `Option` so that a missing field becomes a field-level
//! validation message instead of an opaque deserialization failure.

use serde::{Deserialize, Serialize};

use crate::application::{NewUserInput, ObtainTokenInput, RequestCodeInput, UserPatch};
use crate::domain::entity::user::User;

// ============================================================================
// Signup
// ============================================================================

/// Signup / resend request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl From<SignupRequest> for RequestCodeInput {
    fn from(req: SignupRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
        }
    }
}

/// Signup response: the pair as the client sent it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupResponse {
    pub username: String,
    pub email: String,
}

// ============================================================================
// Token
// ============================================================================

/// Token exchange / refresh request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRequest {
    pub username: Option<String>,
    pub confirmation_code: Option<String>,
}

impl From<TokenRequest> for ObtainTokenInput {
    fn from(req: TokenRequest) -> Self {
        Self {
            username: req.username,
            confirmation_code: req.confirmation_code,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

// ============================================================================
// Users
// ============================================================================

/// Allow-listed user representation. Codes and flags never leave the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub role: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.user_name.into_inner(),
            email: user.email.into(),
            first_name: user.profile.first_name,
            last_name: user.profile.last_name,
            bio: user.profile.bio,
            role: user.role.code().to_string(),
        }
    }
}

/// `POST /users`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
}

impl From<NewUserRequest> for NewUserInput {
    fn from(req: NewUserRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            bio: req.bio,
            role: req.role,
        }
    }
}

/// `PATCH /users/{username}` and `PATCH /users/me`
///
/// `username` is not accepted here: user names are immutable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatchRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub role: Option<String>,
}

impl From<UserPatchRequest> for UserPatch {
    fn from(req: UserPatchRequest) -> Self {
        Self {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            bio: req.bio,
            role: req.role,
        }
    }
}

/// `?search=` on the user listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserSearchQuery {
    pub search: Option<String>,
}
