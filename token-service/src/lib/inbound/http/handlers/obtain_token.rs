use axum::body::Bytes;
use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;

use super::deliver;
use super::parse_body;
use super::required_field;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::token::models::Credentials;
use crate::domain::token::models::TokenPayload;
use crate::inbound::http::router::AppState;

/// Exchange `{username, password}` for a token pair or a sliding token.
pub async fn obtain_token(
    State(state): State<AppState>,
    cookies: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, ApiSuccess<TokenPayload>), ApiError> {
    let body = parse_body(&body)?;
    let credentials = Credentials::new(
        required_field(&body, "username")?,
        required_field(&body, "password")?,
    );

    let grant = state
        .token_service
        .obtain(credentials)
        .await
        .map_err(ApiError::from)?;

    Ok(deliver(&state, &cookies, grant))
}
