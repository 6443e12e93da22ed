//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

/// Default lifetime of an access token (1 day)
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 3600);

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC-SHA256 signing key shared by every token
    pub jwt_secret: Vec<u8>,
    /// Token lifetime (`exp - iat`)
    pub token_ttl: Duration,
    /// `iss` claim written and required on every token
    pub issuer: String,
    /// Sender address of confirmation mails
    pub mail_from: String,
    /// Subject of the first confirmation mail
    pub signup_subject: String,
    /// Subject when a code is reissued for an existing account
    pub resend_subject: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: Vec::new(),
            token_ttl: DEFAULT_TOKEN_TTL,
            issuer: "yamdb".to_string(),
            mail_from: "yamdb@example.com".to_string(),
            signup_subject: "YaMDb confirmation code".to_string(),
            resend_subject: "New YaMDb confirmation code".to_string(),
        }
    }
}

impl AuthConfig {
    /// Create config with the given signing secret
    pub fn with_secret(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: secret.into(),
            ..Default::default()
        }
    }

    /// Create config with a random signing secret (for development).
    ///
    /// Tokens do not survive a restart.
    pub fn with_random_secret() -> Self {
        Self::with_secret(platform::crypto::random_bytes(32))
    }

    /// Get token TTL in seconds
    pub fn token_ttl_secs(&self) -> i64 {
        self.token_ttl.as_secs() as i64
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("issuer", &self.issuer)
            .field("mail_from", &self.mail_from)
            .finish()
    }
}
