//! Unit tests for Auth crate

#[cfg(test)]
mod support {
    use platform::mail::MemoryMailer;

    use crate::application::config::AuthConfig;
    use crate::domain::entity::user::User;
    use crate::domain::repository::UserRepository;
    use crate::domain::value_object::{email::Email, user_name::UserName, user_role::UserRole};
    use crate::infra::InMemoryUserRepository;
    use crate::presentation::AuthAppState;

    pub type TestState = AuthAppState<InMemoryUserRepository, MemoryMailer>;

    pub fn config() -> AuthConfig {
        AuthConfig::with_secret(b"test-secret-with-enough-entropy!".to_vec())
    }

    pub fn state() -> TestState {
        AuthAppState::new(InMemoryUserRepository::new(), MemoryMailer::new(), config())
    }

    /// Store a user with a live code and return it
    pub async fn seed(state: &TestState, name: &str, role: UserRole) -> User {
        let mut user = User::new(
            UserName::new(name).unwrap(),
            Email::new(format!("{name}@example.com")).unwrap(),
        );
        user.role = role;
        user.issue_confirmation_code();
        state.repo.create(&user).await.unwrap();
        user
    }

    pub async fn seed_with_token(state: &TestState, name: &str, role: UserRole) -> (User, String) {
        let user = seed(state, name, role).await;
        let token = state.tokens.issue(&user).unwrap().token;
        (user, token)
    }

    /// The code from the most recent confirmation mail
    pub fn mailed_code(mailer: &MemoryMailer) -> String {
        let body = mailer.last().unwrap().body;
        body.rsplit(' ').next().unwrap().to_string()
    }
}

#[cfg(test)]
mod request_code_tests {
    use std::sync::Arc;

    use platform::mail::MemoryMailer;

    use super::support::*;
    use crate::application::{RequestCodeInput, RequestCodeUseCase};
    use crate::domain::repository::UserRepository;
    use crate::domain::value_object::user_name::UserName;
    use crate::error::AuthError;
    use crate::infra::InMemoryUserRepository;

    fn input(username: &str, email: &str) -> RequestCodeInput {
        RequestCodeInput {
            username: Some(username.to_string()),
            email: Some(email.to_string()),
        }
    }

    fn use_case(
        repo: &InMemoryUserRepository,
        mailer: &MemoryMailer,
    ) -> RequestCodeUseCase<InMemoryUserRepository, MemoryMailer> {
        RequestCodeUseCase::new(
            Arc::new(repo.clone()),
            Arc::new(mailer.clone()),
            Arc::new(config()),
        )
    }

    #[tokio::test]
    async fn test_fresh_pair_creates_user_and_mails_once() {
        let repo = InMemoryUserRepository::new();
        let mailer = MemoryMailer::new();

        let output = use_case(&repo, &mailer)
            .execute(input("reader", "Reader@Example.com"))
            .await
            .unwrap();

        assert!(output.created);
        assert_eq!(output.email.as_str(), "reader@example.com");
        assert_eq!(repo.len().await, 1);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["reader@example.com".to_string()]);
        assert_eq!(sent[0].from, "yamdb@example.com");

        let stored = repo
            .find_by_user_name(&UserName::new("reader").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(stored.confirmation_code_matches(&mailed_code(&mailer)));
    }

    #[tokio::test]
    async fn test_resend_keeps_one_row_and_replaces_code() {
        let repo = InMemoryUserRepository::new();
        let mailer = MemoryMailer::new();
        let uc = use_case(&repo, &mailer);

        uc.execute(input("reader", "reader@example.com"))
            .await
            .unwrap();
        let first = mailed_code(&mailer);

        let mut latest = first.clone();
        for _ in 0..3 {
            let output = uc
                .execute(input("reader", "reader@example.com"))
                .await
                .unwrap();
            assert!(!output.created);
            let mailed = mailed_code(&mailer);
            assert_ne!(mailed, latest);
            latest = mailed;
        }

        assert_eq!(repo.len().await, 1);
        assert_eq!(mailer.sent().len(), 4);

        let stored = repo
            .find_by_user_name(&UserName::new("reader").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(stored.confirmation_code_matches(&latest));
        assert!(!stored.confirmation_code_matches(&first));
    }

    #[tokio::test]
    async fn test_conflicts() {
        let repo = InMemoryUserRepository::new();
        let mailer = MemoryMailer::new();
        let uc = use_case(&repo, &mailer);

        uc.execute(input("reader", "reader@example.com"))
            .await
            .unwrap();

        let err = uc
            .execute(input("other", "reader@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));

        let err = uc
            .execute(input("reader", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserNameTaken));

        assert_eq!(repo.len().await, 1);
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected_before_storage() {
        let repo = InMemoryUserRepository::new();
        let mailer = MemoryMailer::new();
        let uc = use_case(&repo, &mailer);

        for name in ["me", "ME", "bad name!"] {
            let err = uc
                .execute(input(name, "reader@example.com"))
                .await
                .unwrap_err();
            match err {
                AuthError::Validation(v) => assert!(v.contains("username")),
                other => panic!("unexpected error: {other:?}"),
            }
        }

        let err = uc
            .execute(RequestCodeInput::default())
            .await
            .unwrap_err();
        match err {
            AuthError::Validation(v) => {
                assert!(v.contains("username"));
                assert!(v.contains("email"));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert!(repo.is_empty().await);
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_delivery_failure_is_reported() {
        let repo = InMemoryUserRepository::new();
        let mailer = MemoryMailer::failing();

        let err = use_case(&repo, &mailer)
            .execute(input("reader", "reader@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MailDelivery(_)));
    }
}

#[cfg(test)]
mod token_tests {
    use chrono::{Duration, Utc};

    use super::support::*;
    use crate::application::token::TokenService;
    use crate::application::{AuthenticateUseCase, ObtainTokenInput, ObtainTokenUseCase, TokenGrant};
    use crate::application::config::AuthConfig;
    use crate::domain::repository::UserRepository;
    use crate::domain::value_object::user_role::UserRole;
    use crate::error::AuthError;

    #[tokio::test]
    async fn test_claims_carry_identity_and_one_day_lifetime() {
        let state = state();
        let user = seed(&state, "reader", UserRole::User).await;

        let issued = state.tokens.issue(&user).unwrap();
        let claims = state.tokens.verify(&issued.token).unwrap();

        assert_eq!(claims.username, "reader");
        assert_eq!(claims.user_id().unwrap(), user.user_id);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert_eq!(claims.iss, "yamdb");
    }

    #[tokio::test]
    async fn test_expired_and_foreign_tokens_are_rejected() {
        let state = state();
        let user = seed(&state, "reader", UserRole::User).await;

        let stale = state
            .tokens
            .issue_at(&user, Utc::now() - Duration::days(2))
            .unwrap();
        assert!(matches!(
            state.tokens.verify(&stale.token),
            Err(AuthError::InvalidToken)
        ));

        let other = TokenService::new(&AuthConfig::with_secret(b"another-secret".to_vec()));
        let forged = other.issue(&user).unwrap();
        assert!(matches!(
            state.tokens.verify(&forged.token),
            Err(AuthError::InvalidToken)
        ));

        assert!(matches!(
            state.tokens.verify("not-a-token"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_exchange_rules() {
        let state = state();
        let user = seed(&state, "reader", UserRole::User).await;
        let code = user.confirmation_code.clone().unwrap();
        let uc = ObtainTokenUseCase::new(state.repo.clone(), state.tokens.clone());

        let err = uc
            .execute(
                ObtainTokenInput {
                    username: None,
                    confirmation_code: Some(code.as_str().to_string()),
                },
                TokenGrant::Exchange,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserNameRequired));

        let err = uc
            .execute(
                ObtainTokenInput {
                    username: Some("nobody".to_string()),
                    confirmation_code: Some("123456".to_string()),
                },
                TokenGrant::Exchange,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));

        let wrong = if code.as_str() == "000000" { "111111" } else { "000000" };
        let err = uc
            .execute(
                ObtainTokenInput {
                    username: Some("reader".to_string()),
                    confirmation_code: Some(wrong.to_string()),
                },
                TokenGrant::Exchange,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidConfirmationCode));

        // Codes are reusable until replaced
        for grant in [TokenGrant::Exchange, TokenGrant::Exchange, TokenGrant::Refresh] {
            let issued = uc
                .execute(
                    ObtainTokenInput {
                        username: Some("reader".to_string()),
                        confirmation_code: Some(code.as_str().to_string()),
                    },
                    grant,
                )
                .await
                .unwrap();
            assert_eq!(issued.claims.username, "reader");
        }
    }

    #[tokio::test]
    async fn test_authenticate_reloads_user() {
        let state = state();
        let (mut user, token) = seed_with_token(&state, "reader", UserRole::User).await;
        let uc = AuthenticateUseCase::new(state.repo.clone(), state.tokens.clone());

        assert_eq!(uc.execute(&token).await.unwrap().role, UserRole::User);

        // Promotion applies to the token already in hand
        user.set_role(UserRole::Moderator);
        state.repo.update(&user).await.unwrap();
        assert_eq!(uc.execute(&token).await.unwrap().role, UserRole::Moderator);

        state.repo.delete(&user.user_id).await.unwrap();
        assert!(matches!(
            uc.execute(&token).await,
            Err(AuthError::InvalidToken)
        ));
    }
}

#[cfg(test)]
mod manage_users_tests {
    use super::support::*;
    use crate::application::{ManageUsersUseCase, NewUserInput, ProfileUseCase, UserPatch};
    use crate::domain::permission::Principal;
    use crate::domain::value_object::user_role::UserRole;
    use crate::error::AuthError;

    fn principal(user: &crate::domain::entity::user::User) -> Principal {
        Principal {
            user_id: user.user_id,
            user_name: user.user_name.clone(),
            role: user.role,
            is_superuser: user.is_superuser,
        }
    }

    #[tokio::test]
    async fn test_create_validates_and_rejects_duplicates() {
        let state = state();
        let uc = ManageUsersUseCase::new(state.repo.clone());

        let user = uc
            .create(NewUserInput {
                username: Some("critic".to_string()),
                email: Some("critic@example.com".to_string()),
                bio: Some("Watches everything".to_string()),
                role: Some("moderator".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(user.role, UserRole::Moderator);
        assert_eq!(user.profile.bio, "Watches everything");
        assert!(user.confirmation_code.is_none());

        let err = uc
            .create(NewUserInput {
                username: Some("critic".to_string()),
                email: Some("new@example.com".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserNameTaken));

        let err = uc
            .create(NewUserInput {
                username: Some("critic2".to_string()),
                email: Some("critic@example.com".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));

        let err = uc
            .create(NewUserInput {
                username: Some("critic3".to_string()),
                email: Some("critic3@example.com".to_string()),
                role: Some("owner".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        match err {
            AuthError::Validation(v) => assert!(v.contains("role")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_and_delete_by_username() {
        let state = state();
        seed(&state, "reader", UserRole::User).await;
        seed(&state, "writer", UserRole::User).await;
        let uc = ManageUsersUseCase::new(state.repo.clone());

        let updated = uc
            .update(
                "reader",
                UserPatch {
                    role: Some("admin".to_string()),
                    first_name: Some("Ann".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.role, UserRole::Admin);
        assert_eq!(updated.profile.first_name, "Ann");

        let err = uc
            .update(
                "reader",
                UserPatch {
                    email: Some("writer@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));

        uc.delete("reader").await.unwrap();
        assert!(matches!(uc.get("reader").await, Err(AuthError::UserNotFound)));
        assert!(matches!(uc.delete("reader").await, Err(AuthError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_self_service_cannot_change_own_role() {
        let state = state();
        let user = seed(&state, "reader", UserRole::User).await;
        let uc = ProfileUseCase::new(state.repo.clone());

        let updated = uc
            .update(
                &principal(&user),
                UserPatch {
                    role: Some("admin".to_string()),
                    bio: Some("hi".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.role, UserRole::User);
        assert_eq!(updated.profile.bio, "hi");
        assert_eq!(uc.get(&principal(&user)).await.unwrap().role, UserRole::User);
    }

    #[tokio::test]
    async fn test_admin_may_change_own_role() {
        let state = state();
        let admin = seed(&state, "boss", UserRole::Admin).await;
        let uc = ProfileUseCase::new(state.repo.clone());

        let updated = uc
            .update(
                &principal(&admin),
                UserPatch {
                    role: Some("moderator".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.role, UserRole::Moderator);
    }
}

#[cfg(test)]
mod error_tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use http_body_util::BodyExt;
    use kernel::error::kind::ErrorKind;
    use kernel::error::validation::Violations;
    use platform::mail::MailError;

    use crate::domain::permission::Denied;
    use crate::error::AuthError;

    async fn render(err: AuthError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_kinds() {
        assert_eq!(AuthError::UserNameRequired.kind(), ErrorKind::BadRequest);
        assert_eq!(AuthError::EmailTaken.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::UserNameTaken.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::UserNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AuthError::InvalidConfirmationCode.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::NotAuthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::PermissionDenied.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            AuthError::MailDelivery(MailError::Rejected("x".into())).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_denied_conversion() {
        assert!(matches!(
            AuthError::from(Denied::Unauthenticated),
            AuthError::NotAuthenticated
        ));
        assert!(matches!(
            AuthError::from(Denied::Forbidden),
            AuthError::PermissionDenied
        ));
    }

    #[test]
    fn test_unknown_database_error_stays_database() {
        let err = AuthError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AuthError::Database(_)));
    }

    #[tokio::test]
    async fn test_validation_renders_field_errors() {
        let mut v = Violations::new();
        v.add("username", "Enter a valid username");
        let (status, body) = render(AuthError::Validation(v)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"]["username"][0], "Enter a valid username");
    }

    #[tokio::test]
    async fn test_conflict_names_the_field() {
        let (status, body) = render(AuthError::EmailTaken).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"]["email"].is_array());
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let (status, body) = render(AuthError::Internal("pool secret".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.to_string().contains("pool secret"));
    }
}

#[cfg(test)]
mod router_tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::support::*;
    use crate::domain::repository::UserRepository;
    use crate::domain::value_object::{user_name::UserName, user_role::UserRole};
    use crate::presentation::router::{auth_router, with_bearer_auth};

    fn app(state: &TestState) -> Router {
        with_bearer_auth(auth_router(state.clone()), state)
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_signup_validation_and_dispatch() {
        let state = state();
        let app = app(&state);

        let (status, body) = call(
            &app,
            Method::POST,
            "/auth/signup",
            None,
            Some(json!({"username": "me", "email": "me@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"]["username"].is_array());

        let (status, _) = call(
            &app,
            Method::POST,
            "/auth/signup",
            None,
            Some(json!({"username": "bad name!", "email": "bad@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(state.mailer.sent().is_empty());

        let (status, body) = call(
            &app,
            Method::POST,
            "/auth/signup",
            None,
            Some(json!({"username": "reader", "email": "reader@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"username": "reader", "email": "reader@example.com"}));
        assert_eq!(state.mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_signup_conflict_is_400() {
        let state = state();
        let app = app(&state);
        seed(&state, "reader", UserRole::User).await;

        let (status, body) = call(
            &app,
            Method::POST,
            "/auth/signup",
            None,
            Some(json!({"username": "someone", "email": "reader@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"]["email"].is_array());
    }

    #[tokio::test]
    async fn test_signup_mail_failure_is_502() {
        let state = crate::presentation::AuthAppState::new(
            crate::infra::InMemoryUserRepository::new(),
            platform::mail::MemoryMailer::failing(),
            config(),
        );
        let app = with_bearer_auth(auth_router(state.clone()), &state);

        let (status, _) = call(
            &app,
            Method::POST,
            "/auth/signup",
            None,
            Some(json!({"username": "reader", "email": "reader@example.com"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_signup_token_me_flow() {
        let state = state();
        let app = app(&state);

        call(
            &app,
            Method::POST,
            "/auth/signup",
            None,
            Some(json!({"username": "reader", "email": "reader@example.com"})),
        )
        .await;
        let code = mailed_code(&state.mailer);

        let (status, body) = call(
            &app,
            Method::POST,
            "/auth/token",
            None,
            Some(json!({"username": "reader", "confirmation_code": code})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["token"].as_str().unwrap().to_string();

        let (status, body) = call(&app, Method::GET, "/users/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "reader");
        assert_eq!(body["role"], "user");
        assert!(body.get("confirmation_code").is_none());

        let (status, body) = call(
            &app,
            Method::POST,
            "/auth/refresh",
            None,
            Some(json!({"username": "reader", "confirmation_code": code})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["token"].is_string());
    }

    #[tokio::test]
    async fn test_token_errors() {
        let state = state();
        let app = app(&state);
        seed(&state, "reader", UserRole::User).await;

        let (status, body) = call(
            &app,
            Method::POST,
            "/auth/token",
            None,
            Some(json!({"confirmation_code": "123456"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Username required");

        let (status, _) = call(
            &app,
            Method::POST,
            "/auth/token",
            None,
            Some(json!({"username": "ghost", "confirmation_code": "123456"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = call(
            &app,
            Method::POST,
            "/auth/token",
            None,
            Some(json!({"username": "reader", "confirmation_code": "not-a-code"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"]["confirmation_code"].is_array());
    }

    #[tokio::test]
    async fn test_signup_echoes_the_request() {
        let state = state();
        let app = app(&state);
        let signup = json!({"username": "reader", "email": "Reader@Example.COM"});

        let (status, body) =
            call(&app, Method::POST, "/auth/signup", None, Some(signup.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, signup);

        let stored = state
            .repo
            .find_by_user_name(&UserName::new("reader").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.email.as_str(), "reader@example.com");

        // The resend matches the stored account and echoes again
        let (status, body) = call(&app, Method::POST, "/auth/signup", None, Some(signup)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "Reader@Example.COM");
        assert_eq!(state.mailer.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_stale_code_fails_after_resend() {
        let state = state();
        let app = app(&state);
        let signup = json!({"username": "reader", "email": "reader@example.com"});

        call(&app, Method::POST, "/auth/signup", None, Some(signup.clone())).await;
        let stale = mailed_code(&state.mailer);
        call(&app, Method::POST, "/auth/signup", None, Some(signup.clone())).await;
        assert_ne!(mailed_code(&state.mailer), stale);

        let (status, _) = call(
            &app,
            Method::POST,
            "/auth/token",
            None,
            Some(json!({"username": "reader", "confirmation_code": stale})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_users_endpoints_are_admin_only() {
        let state = state();
        let app = app(&state);
        let (_, user_token) = seed_with_token(&state, "reader", UserRole::User).await;
        let (_, moderator_token) = seed_with_token(&state, "mod", UserRole::Moderator).await;
        let (_, admin_token) = seed_with_token(&state, "boss", UserRole::Admin).await;

        let (status, _) = call(&app, Method::GET, "/users", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(&app, Method::GET, "/users", Some(&user_token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(&app, Method::GET, "/users/reader", Some(&moderator_token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // The gate answers before the body is parsed
        let (status, _) = call(&app, Method::POST, "/users", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(&app, Method::PATCH, "/users/reader", Some(&user_token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(&app, Method::DELETE, "/users/reader", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = call(&app, Method::GET, "/users?search=o&limit=1", Some(&admin_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["limit"], 1);
        assert_eq!(body["results"][0]["username"], "boss");
    }

    #[tokio::test]
    async fn test_admin_user_crud() {
        let state = state();
        let app = app(&state);
        let (_, admin_token) = seed_with_token(&state, "boss", UserRole::Admin).await;

        let new_user = json!({"username": "critic", "email": "critic@example.com", "role": "moderator"});
        let (status, body) = call(&app, Method::POST, "/users", Some(&admin_token), Some(new_user.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["role"], "moderator");

        let (status, body) = call(&app, Method::POST, "/users", Some(&admin_token), Some(new_user)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["errors"]["username"].is_array());

        let (status, body) = call(
            &app,
            Method::PATCH,
            "/users/critic",
            Some(&admin_token),
            Some(json!({"last_name": "Ebert", "username": "renamed"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["last_name"], "Ebert");
        assert_eq!(body["username"], "critic");

        let (status, _) = call(&app, Method::DELETE, "/users/critic", Some(&admin_token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = call(&app, Method::GET, "/users/critic", Some(&admin_token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_me_role_change_is_silently_dropped() {
        let state = state();
        let app = app(&state);
        let (_, token) = seed_with_token(&state, "reader", UserRole::User).await;

        let (status, body) = call(
            &app,
            Method::PATCH,
            "/users/me",
            Some(&token),
            Some(json!({"role": "admin", "first_name": "Rea"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "user");
        assert_eq!(body["first_name"], "Rea");

        let stored = state
            .repo
            .find_by_user_name(&UserName::new("reader").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.role, UserRole::User);
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let state = state();
        let app = app(&state);
        let (user, token) = seed_with_token(&state, "reader", UserRole::User).await;

        let (status, _) = call(&app, Method::GET, "/users/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(&app, Method::GET, "/users/me", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        state.repo.delete(&user.user_id).await.unwrap();
        let (status, _) = call(&app, Method::GET, "/users/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_put_is_not_allowed() {
        let state = state();
        let app = app(&state);
        let (_, token) = seed_with_token(&state, "reader", UserRole::User).await;

        let (status, _) = call(&app, Method::PUT, "/users/me", Some(&token), Some(json!({}))).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
