use thiserror::Error;

use crate::jwt::JwtError;
use crate::jwt::TokenType;

/// Error type for token lifecycle operations.
///
/// Every variant except `Signing` describes a token the caller presented
/// that must not be honored.
#[derive(Debug, Clone, Error)]
pub enum TokenError {
    #[error("Token is invalid or expired")]
    Invalid(#[source] JwtError),

    #[error("Token has no '{0}' claim")]
    MissingClaim(&'static str),

    #[error("Token '{0}' claim has expired")]
    ClaimExpired(&'static str),

    #[error("Token has wrong type: expected {expected}, found {found}")]
    WrongType { expected: TokenType, found: String },

    #[error("Failed to sign token: {0}")]
    Signing(#[source] JwtError),
}

impl TokenError {
    /// Whether the error describes the presented token rather than a
    /// failure of the signing primitive itself.
    pub fn is_token_level(&self) -> bool {
        !matches!(self, TokenError::Signing(_))
    }
}
