use chrono::DateTime;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::TokenType;

/// A signed token together with its decoded claims.
///
/// Handles are read-only: rotation and sliding produce new handles.
/// `Debug` prints claims only, never the encoded token.
#[derive(Clone, PartialEq)]
pub struct Token {
    raw: String,
    claims: Claims,
}

impl Token {
    pub(crate) fn new(raw: String, claims: Claims) -> Self {
        Self { raw, claims }
    }

    /// Encoded token string as sent over the wire.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn into_string(self) -> String {
        self.raw
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    pub fn token_type(&self) -> Option<TokenType> {
        self.claims.token_type
    }

    pub fn jti(&self) -> Option<&str> {
        self.claims.jti.as_deref()
    }

    pub fn subject(&self) -> Option<&str> {
        self.claims.sub.as_deref()
    }

    /// The `exp` claim as an instant.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.claims.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// The sliding `refresh_exp` claim as an instant.
    pub fn refresh_expires_at(&self) -> Option<DateTime<Utc>> {
        self.claims
            .refresh_exp
            .and_then(|refresh_exp| DateTime::from_timestamp(refresh_exp, 0))
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("claims", &self.claims)
            .finish_non_exhaustive()
    }
}
