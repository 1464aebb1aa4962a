#![allow(dead_code)]

use std::sync::Arc;

use auth::JwtHandler;
use auth::PasswordHasher;
use auth::Token;
use auth::TokenBackend;
use auth::TokenLifetimes;
use auth::TokenType;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use token_service::domain::token::models::TokenModel;
use token_service::domain::token::ports::RevocationStore;
use token_service::domain::token::rotation::RotationPolicy;
use token_service::domain::token::service::TokenService;
use token_service::domain::token::service::TokenServiceSettings;
use token_service::inbound::http::cookies::CookieSettings;
use token_service::inbound::http::router::create_router;
use token_service::inbound::http::router::HttpSettings;
use token_service::outbound::identity::StaticUserDirectory;
use token_service::outbound::identity::UserRecord;
use token_service::outbound::revocation::InMemoryRevocationStore;
use tower::ServiceExt;

pub const SIGNING_KEY: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const PASSWORD: &str = "pass_word!";

/// Deployment knobs for a test application
#[derive(Debug, Clone)]
pub struct TestSettings {
    pub service: TokenServiceSettings,
    pub http: HttpSettings,
    pub lifetimes: TokenLifetimes,
}

impl Default for TestSettings {
    fn default() -> Self {
        Self {
            service: TokenServiceSettings::default(),
            http: HttpSettings {
                cookie: None,
                blacklist_endpoint: true,
            },
            lifetimes: TokenLifetimes::default(),
        }
    }
}

impl TestSettings {
    pub fn with_cookies(mut self, cookie: CookieSettings) -> Self {
        self.http.cookie = Some(cookie);
        self
    }

    pub fn rotating(mut self, blacklist_after_rotation: bool) -> Self {
        self.service.rotation = RotationPolicy {
            rotate_refresh_tokens: true,
            blacklist_after_rotation,
        };
        self
    }

    pub fn sliding(mut self) -> Self {
        self.service.model = TokenModel::Sliding;
        self
    }
}

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub router: Router,
    pub backend: Arc<TokenBackend>,
    pub store: InMemoryRevocationStore,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(TestSettings::default()).await
    }

    /// Spawn the application in a background task and return TestApp
    pub async fn spawn_with(settings: TestSettings) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let backend = Arc::new(TokenBackend::new(
            JwtHandler::new(SIGNING_KEY),
            settings.lifetimes,
        ));
        let store = InMemoryRevocationStore::new();
        let router = build_router(&settings, Arc::clone(&backend), store.clone());

        let server_router = router.clone();
        tokio::spawn(async move {
            axum::serve(listener, server_router)
                .await
                .expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .expect("Failed to create reqwest client"),
            router,
            backend,
            store,
        }
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Send a request straight through the router, bypassing the network
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible")
    }

    /// Parse a token the way the service would
    pub fn parse(&self, raw: &str, expected: TokenType) -> Token {
        self.backend
            .parse(raw, Some(expected), Utc::now())
            .expect("Token should be valid")
    }
}

pub fn build_router(
    settings: &TestSettings,
    backend: Arc<TokenBackend>,
    store: InMemoryRevocationStore,
) -> Router {
    let directory = StaticUserDirectory::new(vec![
        user("user-alice", "alice", true),
        user("user-carol", "carol", false),
    ])
    .expect("Usernames are unique");

    let store: Arc<dyn RevocationStore> = Arc::new(store);
    let token_service = Arc::new(
        TokenService::new(
            backend,
            Arc::new(directory),
            Some(store),
            settings.service,
        )
        .expect("Service wiring is valid"),
    );

    create_router(token_service, settings.http.clone()).expect("Router wiring is valid")
}

fn user(user_id: &str, username: &str, is_active: bool) -> UserRecord {
    UserRecord {
        user_id: user_id.to_string(),
        username: username.to_string(),
        password_hash: PasswordHasher::new()
            .hash(PASSWORD)
            .expect("Failed to hash password"),
        is_active,
    }
}

/// JSON POST request for oneshot calls
pub fn json_post(path: &str, body: serde_json::Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("Failed to parse response")
}

/// All `Set-Cookie` header values of a response
pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|value| value.to_str().expect("Set-Cookie is ASCII").to_string())
        .collect()
}

/// The `Set-Cookie` value for the cookie called `name`
pub fn set_cookie<'a>(cookies: &'a [String], name: &str) -> Option<&'a String> {
    let prefix = format!("{}=", name);
    cookies.iter().find(|cookie| cookie.starts_with(&prefix))
}
