use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::CookieJar;

use super::ApiSuccess;
use crate::domain::token::models::TokenPayload;
use crate::inbound::http::router::AppState;

/// Logout for cookie transport: expire both auth cookies. Answers `{}`.
pub async fn delete_cookies(State(state): State<AppState>) -> (CookieJar, ApiSuccess<TokenPayload>) {
    let jar = match &state.cookie_delivery {
        Some(planner) => {
            tracing::debug!(cookie = %planner.settings().name, "Deleting auth cookies");
            planner.apply(CookieJar::new(), planner.plan_deletion())
        }
        None => CookieJar::new(),
    };

    (jar, ApiSuccess::new(StatusCode::OK, TokenPayload::empty()))
}
