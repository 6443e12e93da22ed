//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod app;

use anyhow::Context;
use auth::{AuthAppState, AuthConfig, InMemoryUserRepository, PgAuthRepository};
use axum::{
    ServiceExt,
    extract::Request,
    http::{self, Method, header},
};
use content::{ContentAppState, InMemoryContentRepository, PgContentRepository};
use platform::mail::{LogMailer, MailConfig, Mailer, SmtpMailer};
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::normalize_path::NormalizePath;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,auth=info,content=info,platform=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let auth_config = auth_config()?;
    let cors = cors_layer();
    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()
        .context("BIND_ADDR must be a socket address such as 0.0.0.0:8000")?;

    match MailConfig::from_env() {
        Some(mail) => {
            tracing::info!(host = %mail.smtp_host, port = mail.smtp_port, "Using SMTP mailer");
            let mailer = SmtpMailer::new(&mail).context("Invalid SMTP configuration")?;
            run(mailer, auth_config, cors, addr).await
        }
        None => {
            tracing::warn!("SMTP_HOST not set, confirmation mails are only logged");
            run(LogMailer, auth_config, cors, addr).await
        }
    }
}

/// Pick the storage backend and serve
async fn run<M>(
    mailer: M,
    config: AuthConfig,
    cors: CorsLayer,
    addr: SocketAddr,
) -> anyhow::Result<()>
where
    M: Mailer + Sync + 'static,
{
    match env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await?;

            tracing::info!("Connected to database");

            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            let auth = AuthAppState::new(PgAuthRepository::new(pool.clone()), mailer, config);
            let content = ContentAppState::new(PgContentRepository::new(pool));
            serve(app::build_app(auth, content, cors), addr).await
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage");

            let auth = AuthAppState::new(InMemoryUserRepository::new(), mailer, config);
            let content = ContentAppState::new(InMemoryContentRepository::new());
            serve(app::build_app(auth, content, cors), addr).await
        }
    }
}

async fn serve(app: NormalizePath<axum::Router>, addr: SocketAddr) -> anyhow::Result<()> {
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;

    Ok(())
}

/// Signing key from `JWT_SECRET`; debug builds fall back to a random key
fn auth_config() -> anyhow::Result<AuthConfig> {
    let mut config = match env::var("JWT_SECRET") {
        Ok(secret) if !secret.is_empty() => AuthConfig::with_secret(secret.into_bytes()),
        _ if cfg!(debug_assertions) => {
            tracing::warn!("JWT_SECRET not set, tokens will not survive a restart");
            AuthConfig::with_random_secret()
        }
        _ => anyhow::bail!("JWT_SECRET must be set in production"),
    };

    if let Ok(from) = env::var("MAIL_FROM") {
        config.mail_from = from;
    }

    Ok(config)
}

fn cors_layer() -> CorsLayer {
    let origins = env::var("CORS_ORIGINS").unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string());

    let allowed_origins: Vec<http::HeaderValue> = origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
}
