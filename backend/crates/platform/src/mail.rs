//! Outbound Mail Transport
//!
//! [`Mailer`] is the narrow interface the rest of the backend sends mail
//! through: `send(subject, body, from, to[]) -> success | failure`.
//!
//! Implementations:
//! - [`SmtpMailer`] - `lettre` async SMTP (STARTTLS) transport
//! - [`LogMailer`] - writes the message to the log, for local development
//! - [`MemoryMailer`] - records messages in memory, for tests

use std::sync::{Arc, Mutex};

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};

/// Default SMTP port (STARTTLS)
const DEFAULT_SMTP_PORT: u16 = 587;

// ============================================================================
// Message & Error
// ============================================================================

/// A plain-text message ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

/// Mail delivery failures
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// SMTP transport-level failure (authentication, connection, etc.)
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled
    #[error("Email build error: {0}")]
    Build(String),

    /// The transport refused the message
    #[error("Mail rejected: {0}")]
    Rejected(String),
}

/// Mail transport trait
#[trait_variant::make(Mailer: Send)]
pub trait LocalMailer {
    /// Deliver a message. Errors are returned, never swallowed.
    async fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}

// ============================================================================
// SMTP
// ============================================================================

/// SMTP connection settings
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
}

impl MailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set.
    ///
    /// | Variable        | Required | Default |
    /// |-----------------|----------|---------|
    /// | `SMTP_HOST`     | yes      |         |
    /// | `SMTP_PORT`     | no       | `587`   |
    /// | `SMTP_USER`     | no       |         |
    /// | `SMTP_PASSWORD` | no       |         |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

/// `lettre` backed SMTP mailer
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

/// Assemble a MIME message from a [`MailMessage`]
pub fn build_message(message: &MailMessage) -> Result<Message, MailError> {
    let from: Mailbox = message.from.parse()?;
    let mut builder = Message::builder()
        .from(from)
        .subject(message.subject.clone())
        .header(ContentType::TEXT_PLAIN);

    for to in &message.to {
        builder = builder.to(to.parse::<Mailbox>()?);
    }

    builder
        .body(message.body.clone())
        .map_err(|e| MailError::Build(e.to_string()))
}

impl Mailer for SmtpMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        let email = build_message(message)?;
        self.transport.send(email).await?;

        tracing::info!(to = ?message.to, subject = %message.subject, "Mail sent");
        Ok(())
    }
}

// ============================================================================
// Development / test transports
// ============================================================================

/// Mailer that only logs. The body is not logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        build_message(message)?;
        tracing::info!(
            to = ?message.to,
            subject = %message.subject,
            "Mail delivery skipped (no SMTP configured)"
        );
        Ok(())
    }
}

/// Mailer that keeps every message in memory
///
/// Clones share the same outbox. A failing instance rejects every message,
/// which lets callers exercise delivery failures.
#[derive(Debug, Clone, Default)]
pub struct MemoryMailer {
    outbox: Arc<Mutex<Vec<MailMessage>>>,
    failing: bool,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Messages delivered so far, oldest first
    pub fn sent(&self) -> Vec<MailMessage> {
        self.outbox.lock().map(|o| o.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<MailMessage> {
        self.sent().pop()
    }
}

impl Mailer for MemoryMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        if self.failing {
            return Err(MailError::Rejected("transport unavailable".to_string()));
        }
        let mut outbox = self
            .outbox
            .lock()
            .map_err(|_| MailError::Rejected("outbox poisoned".to_string()))?;
        outbox.push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(to: &str) -> MailMessage {
        MailMessage {
            from: "yamdb@example.com".to_string(),
            to: vec![to.to_string()],
            subject: "Confirmation code".to_string(),
            body: "Your confirmation code: 012345".to_string(),
        }
    }

    #[test]
    fn test_build_message_valid() {
        assert!(build_message(&message("reader@example.com")).is_ok());
    }

    #[test]
    fn test_build_message_bad_address() {
        let err = build_message(&message("not-an-email")).unwrap_err();
        assert!(matches!(err, MailError::Address(_)));
        assert!(err.to_string().contains("Email address parse error"));
    }

    #[tokio::test]
    async fn test_memory_mailer_records() {
        let mailer = MemoryMailer::new();
        let shared = mailer.clone();
        Mailer::send(&mailer, &message("a@example.com")).await.unwrap();
        Mailer::send(&mailer, &message("b@example.com")).await.unwrap();

        assert_eq!(shared.sent().len(), 2);
        assert_eq!(shared.last().unwrap().to, vec!["b@example.com".to_string()]);
    }

    #[tokio::test]
    async fn test_failing_mailer() {
        let mailer = MemoryMailer::failing();
        let result = Mailer::send(&mailer, &message("a@example.com")).await;
        assert!(matches!(result, Err(MailError::Rejected(_))));
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_log_mailer_validates_addresses() {
        assert!(Mailer::send(&LogMailer, &message("a@example.com")).await.is_ok());
        assert!(Mailer::send(&LogMailer, &message("broken")).await.is_err());
    }

    #[test]
    fn test_from_env_none_without_host() {
        if std::env::var("SMTP_HOST").is_err() {
            assert!(MailConfig::from_env().is_none());
        }
    }
}
