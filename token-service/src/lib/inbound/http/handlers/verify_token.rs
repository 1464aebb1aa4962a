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

/// Check `{token}`; answers `{}` when it is honored.
pub async fn verify_token(
    State(state): State<AppState>,
    cookies: CookieJar,
    body: Bytes,
) -> Result<(CookieJar, ApiSuccess<TokenPayload>), ApiError> {
    let body = parse_body(&body)?;
    let token = required_field(&body, "token")?;

    let grant = state
        .token_service
        .verify(&token)
        .await
        .map_err(ApiError::from)?;

    Ok(deliver(&state, &cookies, grant))
}
