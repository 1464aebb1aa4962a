use thiserror::Error;

/// Error type for JWT encoding and signature validation.
#[derive(Debug, Clone, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Failed to decode token: {0}")]
    DecodingFailed(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token issuer or audience does not match: {0}")]
    InvalidOrigin(String),
}
