mod common;

use std::sync::Arc;

use auth::JwtHandler;
use auth::TokenBackend;
use auth::TokenLifetimes;
use auth::TokenType;
use chrono::Utc;
use common::TestApp;
use common::TestSettings;
use common::PASSWORD;
use common::SIGNING_KEY;
use reqwest::StatusCode;
use serde_json::json;
use token_service::domain::token::errors::ConfigurationError;
use token_service::domain::token::service::TokenService;
use token_service::domain::token::service::TokenServiceSettings;
use token_service::inbound::http::router::create_router;
use token_service::inbound::http::router::HttpSettings;
use token_service::outbound::identity::StaticUserDirectory;

async fn obtain(app: &TestApp, username: &str, password: &str) -> reqwest::Response {
    app.post("/api/token")
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Failed to execute request")
}

async fn obtain_body(app: &TestApp) -> serde_json::Value {
    let response = obtain(app, "alice", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.expect("Failed to parse response")
}

async fn post_json(app: &TestApp, path: &str, body: serde_json::Value) -> reqwest::Response {
    app.post(path)
        .json(&body)
        .send()
        .await
        .expect("Failed to execute request")
}

#[tokio::test]
async fn test_obtain_pair_success() {
    let app = TestApp::spawn().await;

    let response = obtain(&app, "alice", PASSWORD).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("set-cookie").is_none());

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    let access = app.parse(body["access"].as_str().unwrap(), TokenType::Access);
    let refresh = app.parse(body["refresh"].as_str().unwrap(), TokenType::Refresh);
    assert!(body.get("token").is_none());

    let now = Utc::now().timestamp();
    assert!((access.claims().exp.unwrap() - (now + 300)).abs() <= 5);
    assert!((refresh.claims().exp.unwrap() - (now + 86400)).abs() <= 5);
    assert_eq!(access.subject(), Some("user-alice"));
    assert_eq!(refresh.subject(), Some("user-alice"));
    assert_ne!(access.jti(), refresh.jti());
}

#[tokio::test]
async fn test_obtain_wrong_password() {
    let app = TestApp::spawn().await;

    let response = obtain(&app, "alice", "not-the-password").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get("www-authenticate").unwrap(),
        "Bearer realm=\"api\""
    );
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "no_active_account");
    assert_eq!(
        body["detail"],
        "No active account found with the given credentials"
    );
}

#[tokio::test]
async fn test_obtain_inactive_account_and_unknown_user_look_alike() {
    let app = TestApp::spawn().await;

    let inactive = obtain(&app, "carol", PASSWORD).await;
    let unknown = obtain(&app, "mallory", PASSWORD).await;

    assert_eq!(inactive.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let inactive: serde_json::Value = inactive.json().await.unwrap();
    let unknown: serde_json::Value = unknown.json().await.unwrap();
    assert_eq!(inactive, unknown);
}

#[tokio::test]
async fn test_obtain_missing_password() {
    let app = TestApp::spawn().await;

    let response = post_json(&app, "/api/token", json!({ "username": "alice" })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "invalid_request");
    assert_eq!(body["detail"], "password: This field is required.");
}

#[tokio::test]
async fn test_refresh_without_rotation_reuses_refresh_token() {
    let app = TestApp::spawn().await;
    let tokens = obtain_body(&app).await;

    let response = post_json(
        &app,
        "/api/token/refresh",
        json!({ "refresh": tokens["refresh"] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["refresh"], tokens["refresh"]);
    let access = app.parse(body["access"].as_str().unwrap(), TokenType::Access);
    assert_eq!(access.subject(), Some("user-alice"));
}

#[tokio::test]
async fn test_refresh_with_rotation_issues_new_refresh_token() {
    let app = TestApp::spawn_with(TestSettings::default().rotating(false)).await;
    let tokens = obtain_body(&app).await;

    let response = post_json(
        &app,
        "/api/token/refresh",
        json!({ "refresh": tokens["refresh"] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_ne!(body["refresh"], tokens["refresh"]);

    let original = app.parse(tokens["refresh"].as_str().unwrap(), TokenType::Refresh);
    let rotated = app.parse(body["refresh"].as_str().unwrap(), TokenType::Refresh);
    assert_ne!(original.jti(), rotated.jti());
    assert!(rotated.claims().exp.unwrap() >= original.claims().exp.unwrap());

    // Without blacklist_after_rotation the superseded token stays usable
    let again = post_json(
        &app,
        "/api/token/refresh",
        json!({ "refresh": tokens["refresh"] }),
    )
    .await;
    assert_eq!(again.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_rotation_blacklists_superseded_refresh_token() {
    let app = TestApp::spawn_with(TestSettings::default().rotating(true)).await;
    let tokens = obtain_body(&app).await;

    let first = post_json(
        &app,
        "/api/token/refresh",
        json!({ "refresh": tokens["refresh"] }),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(app.store.len().await, 1);

    let replay = post_json(
        &app,
        "/api/token/refresh",
        json!({ "refresh": tokens["refresh"] }),
    )
    .await;

    assert_eq!(replay.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = replay.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "token_not_valid");
    assert_eq!(body["detail"], "Token is invalid or expired");
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let app = TestApp::spawn().await;
    let tokens = obtain_body(&app).await;

    let response = post_json(
        &app,
        "/api/token/refresh",
        json!({ "refresh": tokens["access"] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["code"], "token_not_valid");
}

#[tokio::test]
async fn test_refresh_missing_field() {
    let app = TestApp::spawn().await;

    let response = post_json(&app, "/api/token/refresh", json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["detail"], "refresh: This field is required.");
}

#[tokio::test]
async fn test_verify_accepts_any_token_type() {
    let app = TestApp::spawn().await;
    let tokens = obtain_body(&app).await;

    for token in [&tokens["access"], &tokens["refresh"]] {
        let response = post_json(&app, "/api/token/verify", json!({ "token": token })).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body, json!({}));
    }
}

#[tokio::test]
async fn test_verify_rejects_garbage_and_foreign_signature() {
    let app = TestApp::spawn().await;
    let foreign = TokenBackend::new(
        JwtHandler::new(b"some-other-signing-key-of-at-least-32-bytes"),
        TokenLifetimes::default(),
    )
    .refresh_for_user("user-alice", "alice", Utc::now())
    .unwrap();

    for token in ["not-a-jwt", foreign.as_str()] {
        let response = post_json(&app, "/api/token/verify", json!({ "token": token })).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["code"], "token_not_valid");
    }
}

#[tokio::test]
async fn test_blacklist_then_verify_and_refresh_fail() {
    let app = TestApp::spawn().await;
    let tokens = obtain_body(&app).await;

    let before = post_json(
        &app,
        "/api/token/verify",
        json!({ "token": tokens["refresh"] }),
    )
    .await;
    assert_eq!(before.status(), StatusCode::OK);

    let response = post_json(
        &app,
        "/api/token/blacklist",
        json!({ "refresh": tokens["refresh"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({}));

    let verify = post_json(
        &app,
        "/api/token/verify",
        json!({ "token": tokens["refresh"] }),
    )
    .await;
    assert_eq!(verify.status(), StatusCode::UNAUTHORIZED);

    let refresh = post_json(
        &app,
        "/api/token/refresh",
        json!({ "refresh": tokens["refresh"] }),
    )
    .await;
    assert_eq!(refresh.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = refresh.json().await.expect("Failed to parse response");
    assert_eq!(body["detail"], "Token is invalid or expired");

    // The access token has its own jti and is not revoked
    let access = post_json(
        &app,
        "/api/token/verify",
        json!({ "token": tokens["access"] }),
    )
    .await;
    assert_eq!(access.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_blacklisted_token_cannot_be_blacklisted_again() {
    let app = TestApp::spawn().await;
    let tokens = obtain_body(&app).await;

    let first = post_json(
        &app,
        "/api/token/blacklist",
        json!({ "refresh": tokens["refresh"] }),
    )
    .await;
    let second = post_json(
        &app,
        "/api/token/blacklist",
        json!({ "refresh": tokens["refresh"] }),
    )
    .await;

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.len().await, 1);
}

#[tokio::test]
async fn test_sliding_lifecycle() {
    let app = TestApp::spawn_with(TestSettings::default().sliding()).await;

    let tokens = obtain_body(&app).await;
    assert!(tokens.get("access").is_none());
    assert!(tokens.get("refresh").is_none());
    let original = app.parse(tokens["token"].as_str().unwrap(), TokenType::Sliding);

    let response = post_json(
        &app,
        "/api/token/refresh",
        json!({ "token": tokens["token"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    let slid = app.parse(body["token"].as_str().unwrap(), TokenType::Sliding);
    assert_eq!(slid.jti(), original.jti());
    assert_eq!(
        slid.claims().refresh_exp,
        original.claims().refresh_exp
    );

    let blacklist = post_json(
        &app,
        "/api/token/blacklist",
        json!({ "token": body["token"] }),
    )
    .await;
    assert_eq!(blacklist.status(), StatusCode::OK);

    // Same jti, so the original sliding token is revoked too
    let verify = post_json(
        &app,
        "/api/token/verify",
        json!({ "token": tokens["token"] }),
    )
    .await;
    assert_eq!(verify.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_blacklist_route_can_be_left_unmounted() {
    let mut settings = TestSettings::default();
    settings.http.blacklist_endpoint = false;
    let app = TestApp::spawn_with(settings).await;
    let tokens = obtain_body(&app).await;

    let response = post_json(
        &app,
        "/api/token/blacklist",
        json!({ "refresh": tokens["refresh"] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[test]
fn test_blacklist_route_without_store_fails_at_wiring() {
    let backend = Arc::new(TokenBackend::new(
        JwtHandler::new(SIGNING_KEY),
        TokenLifetimes::default(),
    ));
    let directory = Arc::new(StaticUserDirectory::new(Vec::new()).unwrap());
    let token_service = Arc::new(
        TokenService::new(backend, directory, None, TokenServiceSettings::default()).unwrap(),
    );

    let result = create_router(
        token_service,
        HttpSettings {
            cookie: None,
            blacklist_endpoint: true,
        },
    );

    assert!(matches!(
        result,
        Err(ConfigurationError::MissingRevocationStore)
    ));
}

#[tokio::test]
async fn test_logout_without_cookie_transport() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/api/token/logout")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("set-cookie").is_none());
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({}));
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/health")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ok");
}
