use axum::body::Bytes;
use axum::http::header;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use super::csrf::ensure_csrf_cookie;
use super::router::AppState;
use crate::domain::token::errors::TokenServiceError;
use crate::domain::token::models::TokenGrant;
use crate::domain::token::models::TokenPayload;

pub mod blacklist_token;
pub mod delete_cookies;
pub mod health;
pub mod obtain_token;
pub mod refresh_token;
pub mod verify_token;

const WWW_AUTHENTICATE: &str = "Bearer realm=\"api\"";

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<T>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }

    pub fn data(&self) -> &T {
        &self.1 .0
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    /// Presented token is not honored
    InvalidToken(String),
    /// Credentials did not resolve to an active account
    AuthenticationFailed(String),
    /// No credential was presented at all
    NotAuthenticated(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::InternalServerError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            ApiError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "token_not_valid"),
            ApiError::AuthenticationFailed(_) => (StatusCode::UNAUTHORIZED, "no_active_account"),
            ApiError::NotAuthenticated(_) => (StatusCode::UNAUTHORIZED, "not_authenticated"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let detail = match self {
            ApiError::InternalServerError(msg)
            | ApiError::BadRequest(msg)
            | ApiError::InvalidToken(msg)
            | ApiError::AuthenticationFailed(msg)
            | ApiError::NotAuthenticated(msg) => msg,
        };

        let mut response = (status, Json(ApiErrorData { detail, code })).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(WWW_AUTHENTICATE),
            );
        }
        response
    }
}

impl From<TokenServiceError> for ApiError {
    fn from(err: TokenServiceError) -> Self {
        match err {
            TokenServiceError::InvalidToken => ApiError::InvalidToken(err.to_string()),
            TokenServiceError::AuthenticationFailed => {
                ApiError::AuthenticationFailed(err.to_string())
            }
            TokenServiceError::RevocationStore(_)
            | TokenServiceError::Identity(_)
            | TokenServiceError::Signing(_)
            | TokenServiceError::Configuration(_) => {
                tracing::error!(error = %err, "Token operation failed");
                ApiError::InternalServerError("Internal server error".to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorData {
    pub detail: String,
    pub code: &'static str,
}

/// Decode a request body into a JSON object. An empty body is an empty object.
pub(crate) fn parse_body(bytes: &Bytes) -> Result<Map<String, Value>, ApiError> {
    if bytes.is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::BadRequest(
            "Request body must be a JSON object.".to_string(),
        )),
        Err(e) => Err(ApiError::BadRequest(format!("JSON parse error - {}", e))),
    }
}

/// Non-empty string value of a request field.
pub(crate) fn required_field(body: &Map<String, Value>, field: &str) -> Result<String, ApiError> {
    match body.get(field) {
        Some(Value::String(value)) if !value.is_empty() => Ok(value.clone()),
        Some(Value::String(_)) => Err(ApiError::BadRequest(format!(
            "{}: This field may not be blank.",
            field
        ))),
        _ => Err(ApiError::BadRequest(format!(
            "{}: This field is required.",
            field
        ))),
    }
}

/// Turn a successful grant into the response: JSON payload, plus auth and
/// CSRF cookies when cookie transport is active.
pub(crate) fn deliver(
    state: &AppState,
    request_cookies: &CookieJar,
    grant: TokenGrant,
) -> (CookieJar, ApiSuccess<TokenPayload>) {
    let mut jar = CookieJar::new();

    if let (Some(planner), Some(expires_at)) = (&state.cookie_delivery, grant.renewal_expires_at) {
        let specs = planner.plan(&grant.payload, expires_at);
        if !specs.is_empty() {
            jar = planner.apply(jar, specs);
            jar = ensure_csrf_cookie(request_cookies, jar, planner.settings());
        }
    }

    (jar, ApiSuccess::new(StatusCode::OK, grant.payload))
}
