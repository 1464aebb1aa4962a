use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use uuid::Uuid;

use super::errors::TokenError;
use super::handle::Token;
use crate::jwt::Claims;
use crate::jwt::JwtHandler;
use crate::jwt::TokenType;

/// Lifetimes applied when minting tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
    pub sliding: Duration,
    pub sliding_refresh: Duration,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::minutes(5),
            refresh: Duration::days(1),
            sliding: Duration::minutes(5),
            sliding_refresh: Duration::days(1),
        }
    }
}

/// Mints and parses access, refresh and sliding tokens.
///
/// All operations take the current instant explicitly; one clock reading
/// per request keeps `iat`, `exp` and cookie expirations consistent.
pub struct TokenBackend {
    handler: JwtHandler,
    lifetimes: TokenLifetimes,
    leeway: Duration,
}

impl TokenBackend {
    pub fn new(handler: JwtHandler, lifetimes: TokenLifetimes) -> Self {
        Self {
            handler,
            lifetimes,
            leeway: Duration::zero(),
        }
    }

    /// Tolerance applied when checking `exp` and `refresh_exp`.
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    pub fn lifetimes(&self) -> &TokenLifetimes {
        &self.lifetimes
    }

    /// Mint a refresh token for an authenticated user.
    pub fn refresh_for_user(
        &self,
        user_id: &str,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<Token, TokenError> {
        let claims = self
            .base_claims(TokenType::Refresh, now, self.lifetimes.refresh)
            .with_subject(user_id)
            .with_extra("username", username);

        self.sign(claims)
    }

    /// Mint an access token carrying the refresh token's identity claims.
    ///
    /// The access token gets its own `jti`, `iat` and `exp`.
    pub fn access_for(&self, refresh: &Token, now: DateTime<Utc>) -> Result<Token, TokenError> {
        let claims = Claims {
            token_type: Some(TokenType::Access),
            exp: Some((now + self.lifetimes.access).timestamp()),
            iat: Some(now.timestamp()),
            jti: Some(new_jti()),
            refresh_exp: None,
            ..refresh.claims().clone()
        };

        self.sign(claims)
    }

    /// Re-issue a refresh token with a new `jti` and a full lifetime.
    pub fn rotate(&self, refresh: &Token, now: DateTime<Utc>) -> Result<Token, TokenError> {
        let claims = Claims {
            exp: Some((now + self.lifetimes.refresh).timestamp()),
            iat: Some(now.timestamp()),
            jti: Some(new_jti()),
            ..refresh.claims().clone()
        };

        self.sign(claims)
    }

    /// Mint a sliding token for an authenticated user.
    pub fn sliding_for_user(
        &self,
        user_id: &str,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<Token, TokenError> {
        let claims = self
            .base_claims(TokenType::Sliding, now, self.lifetimes.sliding)
            .with_refresh_expiration((now + self.lifetimes.sliding_refresh).timestamp())
            .with_subject(user_id)
            .with_extra("username", username);

        self.sign(claims)
    }

    /// Extend a sliding token whose refresh period has not lapsed.
    ///
    /// The new token keeps the `jti` and `refresh_exp` of the original, so a
    /// revoked sliding token stays revoked after sliding.
    ///
    /// # Errors
    /// * `MissingClaim` - No `refresh_exp` claim
    /// * `ClaimExpired` - Refresh period has lapsed
    pub fn slide(&self, sliding: &Token, now: DateTime<Utc>) -> Result<Token, TokenError> {
        let refresh_exp = sliding
            .claims()
            .refresh_exp
            .ok_or(TokenError::MissingClaim("refresh_exp"))?;
        self.check_not_lapsed("refresh_exp", refresh_exp, now)?;

        let claims = Claims {
            exp: Some((now + self.lifetimes.sliding).timestamp()),
            iat: Some(now.timestamp()),
            ..sliding.claims().clone()
        };

        self.sign(claims)
    }

    /// Decode and validate a presented token.
    ///
    /// # Arguments
    /// * `raw` - Encoded token
    /// * `expected` - Required token type, or `None` to accept any type
    /// * `now` - Instant the expiration is checked against
    ///
    /// # Errors
    /// * `Invalid` - Signature, issuer, audience or format is invalid
    /// * `MissingClaim` - `exp`, `jti` or `token_type` is absent
    /// * `ClaimExpired` - `exp` has passed
    /// * `WrongType` - Token type differs from `expected`
    pub fn parse(
        &self,
        raw: &str,
        expected: Option<TokenType>,
        now: DateTime<Utc>,
    ) -> Result<Token, TokenError> {
        let claims: Claims = self.handler.decode(raw).map_err(TokenError::Invalid)?;

        let exp = claims.exp.ok_or(TokenError::MissingClaim("exp"))?;
        self.check_not_lapsed("exp", exp, now)?;

        let token_type = claims
            .token_type
            .ok_or(TokenError::MissingClaim("token_type"))?;
        if let Some(expected) = expected {
            if token_type != expected {
                return Err(TokenError::WrongType {
                    expected,
                    found: token_type.to_string(),
                });
            }
        }

        if claims.jti.is_none() {
            return Err(TokenError::MissingClaim("jti"));
        }

        Ok(Token::new(raw.to_string(), claims))
    }

    /// Instant after which a revocation entry for `token` can be discarded.
    ///
    /// Sliding generations share one `jti` until `refresh_exp`, so the entry
    /// must outlive both expirations, plus the leeway `parse` still honors.
    pub fn revocation_expiry(&self, token: &Token) -> Option<DateTime<Utc>> {
        let expires_at = token.expires_at()?;
        let honored_until = token
            .refresh_expires_at()
            .map_or(expires_at, |refresh| refresh.max(expires_at));
        Some(honored_until + self.leeway)
    }

    fn base_claims(&self, token_type: TokenType, now: DateTime<Utc>, lifetime: Duration) -> Claims {
        Claims::new()
            .with_token_type(token_type)
            .with_issued_at(now.timestamp())
            .with_expiration((now + lifetime).timestamp())
            .with_jti(new_jti())
            .with_issuer(self.handler.issuer().map(str::to_string))
            .with_audience(self.handler.audience().map(str::to_string))
    }

    fn check_not_lapsed(
        &self,
        claim: &'static str,
        timestamp: i64,
        now: DateTime<Utc>,
    ) -> Result<(), TokenError> {
        let deadline = Claims::new().with_expiration(timestamp + self.leeway.num_seconds());
        if deadline.is_expired(now.timestamp()) {
            return Err(TokenError::ClaimExpired(claim));
        }
        Ok(())
    }

    fn sign(&self, claims: Claims) -> Result<Token, TokenError> {
        let raw = self.handler.encode(&claims).map_err(TokenError::Signing)?;
        Ok(Token::new(raw, claims))
    }
}

fn new_jti() -> String {
    Uuid::new_v4().simple().to_string()
}
