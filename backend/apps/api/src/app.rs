//! HTTP application assembly

use auth::domain::repository::UserRepository;
use auth::{AuthAppState, auth_router, with_bearer_auth};
use axum::Router;
use axum::extract::Request;
use axum::http::{Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use content::{ContentAppState, ContentRepository, content_router};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::mail::Mailer;
use tower::Layer;
use tower_http::cors::CorsLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

/// Every route under `/v1`, behind bearer authentication, with trailing
/// slashes trimmed before routing. Deleting a user drops their reviews and
/// comments.
pub fn build_app<R, M, C>(
    auth: AuthAppState<R, M>,
    content: ContentAppState<C>,
    cors: CorsLayer,
) -> NormalizePath<Router>
where
    R: UserRepository + Send + Sync + 'static,
    M: Mailer + Sync + 'static,
    C: ContentRepository,
{
    let auth = auth.with_user_deleted_hook(content.author_cleanup());
    let v1 = Router::new()
        .merge(auth_router(auth.clone()))
        .merge(content_router(content));

    let router = Router::new()
        .nest("/v1", v1)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed);

    let router = with_bearer_auth(router, &auth)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Wraps the finished router: `Allow` is only set on its 405 responses.
    let router = Router::new()
        .fallback_service(router)
        .layer(middleware::from_fn(answer_options));

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

/// `OPTIONS` on a known path answers 204 with the methods that path accepts.
/// CORS preflights are answered earlier by the CORS layer.
async fn answer_options(request: Request, next: Next) -> Response {
    let is_options = request.method() == Method::OPTIONS;
    let response = next.run(request).await;
    if !is_options || response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let allow = match response.headers().get(header::ALLOW) {
        Some(methods) if !methods.is_empty() => {
            format!("{},OPTIONS", methods.to_str().unwrap_or_default())
        }
        _ => "OPTIONS".to_string(),
    };
    (StatusCode::NO_CONTENT, [(header::ALLOW, allow)]).into_response()
}

async fn not_found() -> AppError {
    AppError::not_found("Resource not found")
}

async fn method_not_allowed() -> AppError {
    AppError::new(ErrorKind::MethodNotAllowed, "Method not allowed")
}

#[cfg(test)]
mod tests {
    use auth::{AuthConfig, InMemoryUserRepository};
    use axum::body::Body;
    use axum::http::Request;
    use content::InMemoryContentRepository;
    use http_body_util::BodyExt;
    use platform::mail::MemoryMailer;
    use tower::ServiceExt;

    use super::*;

    fn app() -> NormalizePath<Router> {
        let auth = AuthAppState::new(
            InMemoryUserRepository::new(),
            MemoryMailer::new(),
            AuthConfig::with_secret(b"test-secret-with-enough-entropy!".to_vec()),
        );
        build_app(
            auth,
            ContentAppState::new(InMemoryContentRepository::new()),
            CorsLayer::new(),
        )
    }

    async fn call(method: Method, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_trailing_slash_is_optional() {
        let (status, body) = call(Method::GET, "/v1/titles/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 0);

        let (status, _) = call(Method::GET, "/v1/genres").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_path_is_problem_json() {
        let (status, body) = call(Method::GET, "/v1/nowhere/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], 404);

        let (status, _) = call(Method::GET, "/titles").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_put_is_rejected() {
        let (status, _) = call(Method::PUT, "/v1/titles/1/").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_options_lists_allowed_methods() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/v1/titles/")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let allow = response.headers()[header::ALLOW].to_str().unwrap().to_string();
        let methods: Vec<&str> = allow.split(',').map(str::trim).collect();
        for method in ["GET", "POST", "OPTIONS"] {
            assert!(methods.contains(&method), "{method} missing from {allow}");
        }
        assert!(!methods.contains(&"PUT"));

        // Admin-only paths still describe themselves to anonymous callers
        let (status, _) = call(Method::OPTIONS, "/v1/users/").await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = call(Method::OPTIONS, "/v1/nowhere/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_users_need_credentials() {
        let (status, _) = call(Method::GET, "/v1/users/").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
