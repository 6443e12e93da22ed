//! Token Service
//!
//! Mints and verifies HS256 JSON Web Tokens. A token asserts the user id and
//! user name and is valid for `AuthConfig::token_ttl` after issue. There is no
//! revocation list: a token stays valid until it expires.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

const ACCESS_TOKEN_TYPE: &str = "access";

/// Claims carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id
    pub sub: String,
    pub username: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expires at (unix seconds)
    pub exp: i64,
    /// Unique token id
    pub jti: String,
    pub iss: String,
    pub token_type: String,
}

impl Claims {
    pub fn user_id(&self) -> AuthResult<UserId> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }
}

/// A freshly signed token with its claims
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
    issuer: String,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(&config.jwt_secret),
            decoding: DecodingKey::from_secret(&config.jwt_secret),
            ttl_secs: config.token_ttl_secs(),
            issuer: config.issuer.clone(),
        }
    }

    /// Mint a token for `user`, issued now
    pub fn issue(&self, user: &User) -> AuthResult<IssuedToken> {
        self.issue_at(user, Utc::now())
    }

    /// Mint a token for `user` with an explicit issue time
    pub fn issue_at(&self, user: &User, issued_at: DateTime<Utc>) -> AuthResult<IssuedToken> {
        let iat = issued_at.timestamp();
        let claims = Claims {
            sub: user.user_id.to_string(),
            username: user.user_name.to_string(),
            iat,
            exp: iat + self.ttl_secs,
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            token_type: ACCESS_TOKEN_TYPE.to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;

        Ok(IssuedToken { token, claims })
    }

    /// Check signature, algorithm, issuer and expiry
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            tracing::debug!(error = %e, "Token verification failed");
            AuthError::InvalidToken
        })?;

        if data.claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(AuthError::InvalidToken);
        }

        Ok(data.claims)
    }
}
