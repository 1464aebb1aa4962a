use auth::PasswordError;
use auth::TokenError;
use thiserror::Error;

/// Error for revocation store operations
#[derive(Debug, Clone, Error)]
pub enum RevocationStoreError {
    #[error("Revocation store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Error for credential verification
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is inactive")]
    InactiveAccount,

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Identity verifier unavailable: {0}")]
    Unavailable(String),
}

/// Deployment wiring errors. Raised at start-up, never per request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Token blacklisting requires a revocation store")]
    MissingRevocationStore,

    #[error("Postgres revocation store requires blacklist.database_url")]
    MissingDatabaseUrl,

    #[error("Lifetime '{0}' must be a positive number of seconds")]
    InvalidLifetime(&'static str),

    #[error("Signing key must be at least {min} bytes, got {actual}")]
    WeakSigningKey { min: usize, actual: usize },

    #[error("Auth cookie name must not be empty")]
    EmptyCookieName,

    #[error("SameSite=None cookies must be marked secure")]
    InsecureSameSiteNone,

    #[error("Duplicate username in user directory: {0}")]
    DuplicateUsername(String),
}

/// Top-level error for token lifecycle operations
#[derive(Debug, Clone, Error)]
pub enum TokenServiceError {
    #[error("No active account found with the given credentials")]
    AuthenticationFailed,

    /// Any reason a presented token is not honored. The cause is only
    /// logged, so expired, mistyped and blacklisted tokens look alike.
    #[error("Token is invalid or expired")]
    InvalidToken,

    #[error("Revocation store error: {0}")]
    RevocationStore(#[from] RevocationStoreError),

    #[error("Identity verification failed: {0}")]
    Identity(String),

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl From<TokenError> for TokenServiceError {
    fn from(err: TokenError) -> Self {
        if err.is_token_level() {
            TokenServiceError::InvalidToken
        } else {
            TokenServiceError::Signing(err.to_string())
        }
    }
}

impl From<IdentityError> for TokenServiceError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidCredentials | IdentityError::InactiveAccount => {
                TokenServiceError::AuthenticationFailed
            }
            IdentityError::Password(_) | IdentityError::Unavailable(_) => {
                TokenServiceError::Identity(err.to_string())
            }
        }
    }
}
