use auth::Token;
use auth::TokenError;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

/// Refresh token rotation settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Mint a new refresh token on every refresh
    pub rotate_refresh_tokens: bool,
    /// Revoke the superseded refresh token after rotating
    pub blacklist_after_rotation: bool,
}

/// What a refresh does with the presented refresh token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDecision {
    /// A new refresh token is minted, valid until `expires_at`
    Rotate { expires_at: DateTime<Utc> },
    /// The presented refresh token is handed back; it stays valid until its
    /// own `exp`, which is never extended
    Reuse { expires_at: DateTime<Utc> },
}

impl RotationDecision {
    /// Expiration the renewal credential carries after the refresh.
    pub fn expires_at(&self) -> DateTime<Utc> {
        match self {
            RotationDecision::Rotate { expires_at } | RotationDecision::Reuse { expires_at } => {
                *expires_at
            }
        }
    }
}

impl RotationPolicy {
    /// Decide how a refresh treats `original`.
    ///
    /// # Arguments
    /// * `original` - The verified refresh token being exchanged
    /// * `now` - Instant of the refresh
    /// * `refresh_lifetime` - Lifetime of a newly minted refresh token
    ///
    /// # Errors
    /// * `MissingClaim` - `original` carries no usable `exp` claim
    pub fn evaluate(
        &self,
        original: &Token,
        now: DateTime<Utc>,
        refresh_lifetime: Duration,
    ) -> Result<RotationDecision, TokenError> {
        if self.rotate_refresh_tokens {
            return Ok(RotationDecision::Rotate {
                expires_at: now + refresh_lifetime,
            });
        }

        original
            .expires_at()
            .map(|expires_at| RotationDecision::Reuse { expires_at })
            .ok_or(TokenError::MissingClaim("exp"))
    }
}
