use axum_extra::extract::cookie::CookieJar;
use serde_json::Map;
use serde_json::Value;

use super::handlers::ApiError;
use crate::domain::token::models::TokenModel;

/// Where Refresh reads the renewal token from. Chosen once at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportStrategy {
    /// Tokens travel in JSON bodies only
    Body,
    /// Tokens travel in cookies; a body value still takes precedence
    Cookie { name: String, model: TokenModel },
}

impl TransportStrategy {
    pub fn cookie(name: impl Into<String>, model: TokenModel) -> Self {
        TransportStrategy::Cookie {
            name: name.into(),
            model,
        }
    }

    /// Name of the cookie carrying the renewal token, if any.
    pub fn renewal_cookie_name(&self) -> Option<String> {
        match self {
            TransportStrategy::Body => None,
            TransportStrategy::Cookie { name, model } => Some(match model {
                TokenModel::Pair => refresh_cookie_name(name),
                TokenModel::Sliding => name.clone(),
            }),
        }
    }

    /// Fill the renewal field of a Refresh request body from the cookie jar.
    ///
    /// # Errors
    /// * `NotAuthenticated` - Cookie transport, no body value and no cookie
    pub fn resolve(
        &self,
        mut body: Map<String, Value>,
        cookies: &CookieJar,
    ) -> Result<Map<String, Value>, ApiError> {
        let TransportStrategy::Cookie { model, .. } = self else {
            return Ok(body);
        };

        let field = model.renewal_field();
        if body.get(field).is_some_and(|value| !value.is_null()) {
            return Ok(body);
        }

        let cookie_name = self.renewal_cookie_name().unwrap_or_default();
        let Some(cookie) = cookies.get(&cookie_name) else {
            return Err(ApiError::NotAuthenticated(
                "Refresh cookie not set. Try to authenticate first.".to_string(),
            ));
        };

        body.insert(field.to_string(), Value::String(cookie.value().to_string()));
        Ok(body)
    }
}

pub fn refresh_cookie_name(name: &str) -> String {
    format!("{}_refresh", name)
}
