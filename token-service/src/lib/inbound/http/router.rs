use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::cookies::CookieDeliveryPlanner;
use super::cookies::CookieSettings;
use super::handlers::blacklist_token::blacklist_token;
use super::handlers::delete_cookies::delete_cookies;
use super::handlers::health::health;
use super::handlers::obtain_token::obtain_token;
use super::handlers::refresh_token::refresh_token;
use super::handlers::verify_token::verify_token;
use super::transport::TransportStrategy;
use crate::domain::token::errors::ConfigurationError;
use crate::domain::token::ports::TokenServicePort;

pub const TOKEN_OBTAIN_PATH: &str = "/api/token";
pub const TOKEN_REFRESH_PATH: &str = "/api/token/refresh";
pub const TOKEN_VERIFY_PATH: &str = "/api/token/verify";
pub const TOKEN_BLACKLIST_PATH: &str = "/api/token/blacklist";
pub const TOKEN_LOGOUT_PATH: &str = "/api/token/logout";
pub const HEALTH_PATH: &str = "/health";

#[derive(Clone)]
pub struct AppState {
    pub token_service: Arc<dyn TokenServicePort>,
    pub transport: TransportStrategy,
    /// Present exactly when cookie transport is active
    pub cookie_delivery: Option<Arc<CookieDeliveryPlanner>>,
}

/// HTTP surface options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpSettings {
    /// Cookie transport; `None` keeps tokens in response bodies
    pub cookie: Option<CookieSettings>,
    /// Mount the blacklist endpoint
    pub blacklist_endpoint: bool,
}

pub fn create_router(
    token_service: Arc<dyn TokenServicePort>,
    settings: HttpSettings,
) -> Result<Router, ConfigurationError> {
    if settings.blacklist_endpoint && !token_service.supports_blacklist() {
        return Err(ConfigurationError::MissingRevocationStore);
    }

    let model = token_service.model();
    let (transport, cookie_delivery) = match settings.cookie {
        Some(cookie) => (
            TransportStrategy::cookie(cookie.name.clone(), model),
            Some(Arc::new(CookieDeliveryPlanner::new(
                cookie,
                TOKEN_REFRESH_PATH,
            ))),
        ),
        None => (TransportStrategy::Body, None),
    };

    tracing::info!(
        model = ?model,
        cookie_transport = cookie_delivery.is_some(),
        blacklist_endpoint = settings.blacklist_endpoint,
        "Token routes configured"
    );

    let state = AppState {
        token_service,
        transport,
        cookie_delivery,
    };

    let mut token_routes = Router::new()
        .route(TOKEN_OBTAIN_PATH, post(obtain_token))
        .route(TOKEN_REFRESH_PATH, post(refresh_token))
        .route(TOKEN_VERIFY_PATH, post(verify_token))
        .route(TOKEN_LOGOUT_PATH, post(delete_cookies));

    if settings.blacklist_endpoint {
        token_routes = token_routes.route(TOKEN_BLACKLIST_PATH, post(blacklist_token));
    }

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Ok(Router::new()
        .merge(token_routes)
        .route(HEALTH_PATH, get(health))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state))
}
