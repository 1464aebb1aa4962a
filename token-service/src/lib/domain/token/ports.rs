use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use super::errors::IdentityError;
use super::errors::RevocationStoreError;
use super::errors::TokenServiceError;
use super::models::Credentials;
use super::models::Identity;
use super::models::TokenGrant;
use super::models::TokenModel;

/// Port for the token lifecycle operations.
#[async_trait]
pub trait TokenServicePort: Send + Sync + 'static {
    /// Token model issued by this deployment.
    fn model(&self) -> TokenModel;

    /// Whether a revocation store is wired in.
    fn supports_blacklist(&self) -> bool;

    /// Exchange credentials for a token pair or a sliding token.
    ///
    /// # Errors
    /// * `AuthenticationFailed` - Unknown user, wrong password or inactive account
    /// * `Identity` - Credential verifier failed
    /// * `Signing` - Token could not be signed
    async fn obtain(&self, credentials: Credentials) -> Result<TokenGrant, TokenServiceError>;

    /// Exchange a refresh (or sliding) token for fresh credentials.
    ///
    /// # Errors
    /// * `InvalidToken` - Token is malformed, expired, of the wrong type,
    ///   past its refresh period, or blacklisted
    /// * `RevocationStore` - Store lookup failed
    async fn refresh(&self, token: &str) -> Result<TokenGrant, TokenServiceError>;

    /// Check that a token of any type is still honored.
    ///
    /// # Errors
    /// * `InvalidToken` - Token is malformed, expired or blacklisted
    /// * `RevocationStore` - Store lookup failed
    async fn verify(&self, token: &str) -> Result<TokenGrant, TokenServiceError>;

    /// Revoke a refresh (or sliding) token.
    ///
    /// # Errors
    /// * `InvalidToken` - Token is not honored in the first place
    /// * `RevocationStore` - Store write failed
    /// * `Configuration` - No revocation store is wired in
    async fn blacklist(&self, token: &str) -> Result<TokenGrant, TokenServiceError>;
}

/// Persistence of revoked token identifiers.
#[async_trait]
pub trait RevocationStore: Send + Sync + 'static {
    /// Record a token identifier as revoked.
    ///
    /// Idempotent: revoking an already revoked `jti` succeeds.
    ///
    /// # Arguments
    /// * `jti` - Unique token identifier
    /// * `expires_at` - Last instant any token with this `jti` can still be
    ///   honored, after which the entry can be purged
    async fn blacklist(&self, jti: &str, expires_at: DateTime<Utc>)
        -> Result<(), RevocationStoreError>;

    /// Check whether a token identifier has been revoked.
    async fn is_blacklisted(&self, jti: &str) -> Result<bool, RevocationStoreError>;

    /// Drop entries whose token has expired anyway.
    ///
    /// # Returns
    /// Number of entries removed
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RevocationStoreError>;
}

/// Verification of user credentials.
#[async_trait]
pub trait IdentityVerifier: Send + Sync + 'static {
    /// Resolve credentials to an active identity.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or wrong password
    /// * `InactiveAccount` - Credentials match an inactive account
    /// * `Password` - Stored hash is unusable
    async fn verify_credentials(&self, credentials: &Credentials)
        -> Result<Identity, IdentityError>;
}
