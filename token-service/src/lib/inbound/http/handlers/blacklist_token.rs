use axum::body::Bytes;
use axum::extract::State;
use axum_extra::extract::cookie::CookieJar;

use super::deliver;
use super::parse_body;
use super::required_field;
use super::ApiError;
use super::ApiSuccess;
use crate::domain::token::models::TokenPayload;
use crate::inbound::http::router::AppState;

/// Revoke the renewal token: `{refresh}` for pairs, `{token}` for sliding.
pub async fn blacklist_token(
    State(state): State<AppState>,
    cookies: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, ApiSuccess<TokenPayload>), ApiError> {
    let body = parse_body(&body)?;
    let field = state.token_service.model().renewal_field();
    let token = required_field(&body, field)?;

    let grant = state
        .token_service
        .blacklist(&token)
        .await
        .map_err(ApiError::from)?;

    Ok(deliver(&state, &cookies, grant))
}
