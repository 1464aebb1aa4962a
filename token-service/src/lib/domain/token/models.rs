use std::fmt;

use auth::Token;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Which token model a deployment issues.
///
/// Exactly one model is active per deployment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenModel {
    /// Short-lived access token plus longer-lived refresh token
    #[default]
    Pair,
    /// A single token with an absolute and a refresh-period expiration
    Sliding,
}

impl TokenModel {
    /// Request field carrying the renewable token (refresh and blacklist).
    pub fn renewal_field(&self) -> &'static str {
        match self {
            TokenModel::Pair => "refresh",
            TokenModel::Sliding => "token",
        }
    }
}

/// Username and password presented to Obtain.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: String, password: String) -> Self {
        Self { username, password }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Identity established by the credential verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
}

/// Response payload of a lifecycle operation.
///
/// Serializes to `{refresh?, access?, token?}`; Verify and Blacklist
/// produce `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl TokenPayload {
    pub fn pair(access: Token, refresh: String) -> Self {
        Self {
            refresh: Some(refresh),
            access: Some(access.into_string()),
            token: None,
        }
    }

    pub fn sliding(token: Token) -> Self {
        Self {
            token: Some(token.into_string()),
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.refresh.is_none() && self.access.is_none() && self.token.is_none()
    }
}

/// Outcome of a successful lifecycle operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub payload: TokenPayload,

    /// Instant the renewal credential stops being honored by the client.
    /// Auth cookies are written with this expiration. `None` for operations
    /// that issue nothing.
    pub renewal_expires_at: Option<DateTime<Utc>>,
}

impl TokenGrant {
    pub fn issued(payload: TokenPayload, renewal_expires_at: DateTime<Utc>) -> Self {
        Self {
            payload,
            renewal_expires_at: Some(renewal_expires_at),
        }
    }

    pub fn empty() -> Self {
        Self {
            payload: TokenPayload::empty(),
            renewal_expires_at: None,
        }
    }
}
