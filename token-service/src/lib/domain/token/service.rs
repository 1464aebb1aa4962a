use std::sync::Arc;

use async_trait::async_trait;
use auth::Token;
use auth::TokenBackend;
use auth::TokenType;
use chrono::DateTime;
use chrono::SubsecRound;
use chrono::Utc;

use super::errors::ConfigurationError;
use super::errors::TokenServiceError;
use super::models::Credentials;
use super::models::TokenGrant;
use super::models::TokenModel;
use super::models::TokenPayload;
use super::ports::IdentityVerifier;
use super::ports::RevocationStore;
use super::ports::TokenServicePort;
use super::rotation::RotationDecision;
use super::rotation::RotationPolicy;

/// Deployment-wide settings of the lifecycle dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenServiceSettings {
    pub model: TokenModel,
    pub rotation: RotationPolicy,
}

/// Concrete implementation of TokenServicePort.
///
/// Dispatches Obtain, Refresh, Verify and Blacklist for the configured token
/// model. Every presented token is checked against the revocation store (when
/// one is wired in) before it is honored.
pub struct TokenService<I>
where
    I: IdentityVerifier,
{
    backend: Arc<TokenBackend>,
    identity_verifier: Arc<I>,
    revocation_store: Option<Arc<dyn RevocationStore>>,
    settings: TokenServiceSettings,
}

impl<I> TokenService<I>
where
    I: IdentityVerifier,
{
    /// Wire the service.
    ///
    /// # Errors
    /// * `MissingRevocationStore` - Rotation is set to blacklist superseded
    ///   refresh tokens but no store is given
    pub fn new(
        backend: Arc<TokenBackend>,
        identity_verifier: Arc<I>,
        revocation_store: Option<Arc<dyn RevocationStore>>,
        settings: TokenServiceSettings,
    ) -> Result<Self, ConfigurationError> {
        if settings.rotation.blacklist_after_rotation && revocation_store.is_none() {
            return Err(ConfigurationError::MissingRevocationStore);
        }

        Ok(Self {
            backend,
            identity_verifier,
            revocation_store,
            settings,
        })
    }

    /// Parse a presented token and make sure it has not been revoked.
    async fn parse_honored(
        &self,
        raw: &str,
        expected: Option<TokenType>,
        now: DateTime<Utc>,
    ) -> Result<Token, TokenServiceError> {
        let token = self.backend.parse(raw, expected, now).map_err(|e| {
            tracing::debug!(error = %e, "Presented token rejected");
            TokenServiceError::from(e)
        })?;

        if let (Some(store), Some(jti)) = (&self.revocation_store, token.jti()) {
            if store.is_blacklisted(jti).await? {
                tracing::debug!(jti = %jti, "Presented token is blacklisted");
                return Err(TokenServiceError::InvalidToken);
            }
        }

        Ok(token)
    }

    async fn revoke(
        &self,
        store: &Arc<dyn RevocationStore>,
        token: &Token,
    ) -> Result<(), TokenServiceError> {
        let (Some(jti), Some(expires_at)) = (token.jti(), self.backend.revocation_expiry(token))
        else {
            tracing::debug!("Token without jti or exp cannot be revoked");
            return Err(TokenServiceError::InvalidToken);
        };

        store.blacklist(jti, expires_at).await?;
        tracing::info!(jti = %jti, subject = ?token.subject(), "Token blacklisted");
        Ok(())
    }

    fn renewal_type(&self) -> TokenType {
        match self.settings.model {
            TokenModel::Pair => TokenType::Refresh,
            TokenModel::Sliding => TokenType::Sliding,
        }
    }

    async fn refresh_pair(
        &self,
        raw: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenGrant, TokenServiceError> {
        let refresh = self
            .parse_honored(raw, Some(TokenType::Refresh), now)
            .await?;
        let access = self.backend.access_for(&refresh, now)?;

        let lifetimes = self.backend.lifetimes();
        let decision = self
            .settings
            .rotation
            .evaluate(&refresh, now, lifetimes.refresh)?;

        let renewed = match decision {
            RotationDecision::Rotate { .. } => {
                let rotated = self.backend.rotate(&refresh, now)?;
                if self.settings.rotation.blacklist_after_rotation {
                    if let Some(store) = &self.revocation_store {
                        self.revoke(store, &refresh).await?;
                    }
                }
                tracing::info!(
                    subject = ?refresh.subject(),
                    old_jti = ?refresh.jti(),
                    new_jti = ?rotated.jti(),
                    "Refresh token rotated"
                );
                rotated.into_string()
            }
            RotationDecision::Reuse { .. } => {
                tracing::info!(
                    subject = ?refresh.subject(),
                    jti = ?refresh.jti(),
                    "Access token refreshed"
                );
                refresh.into_string()
            }
        };

        Ok(TokenGrant::issued(
            TokenPayload::pair(access, renewed),
            decision.expires_at(),
        ))
    }

    async fn refresh_sliding(
        &self,
        raw: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenGrant, TokenServiceError> {
        let sliding = self
            .parse_honored(raw, Some(TokenType::Sliding), now)
            .await?;
        let slid = self.backend.slide(&sliding, now).map_err(|e| {
            tracing::debug!(error = %e, jti = ?sliding.jti(), "Sliding token not extended");
            TokenServiceError::from(e)
        })?;

        tracing::info!(
            subject = ?slid.subject(),
            jti = ?slid.jti(),
            "Sliding token refreshed"
        );

        Ok(TokenGrant::issued(
            TokenPayload::sliding(slid),
            now + self.backend.lifetimes().refresh,
        ))
    }
}

/// Current instant at whole-second precision, matching JWT timestamps.
fn clock() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

#[async_trait]
impl<I> TokenServicePort for TokenService<I>
where
    I: IdentityVerifier + 'static,
{
    fn model(&self) -> TokenModel {
        self.settings.model
    }

    fn supports_blacklist(&self) -> bool {
        self.revocation_store.is_some()
    }

    async fn obtain(&self, credentials: Credentials) -> Result<TokenGrant, TokenServiceError> {
        let identity = self
            .identity_verifier
            .verify_credentials(&credentials)
            .await
            .map_err(|e| {
                tracing::info!(username = %credentials.username, error = %e, "Authentication failed");
                TokenServiceError::from(e)
            })?;

        let now = clock();
        let renewal_expires_at = now + self.backend.lifetimes().refresh;

        let payload = match self.settings.model {
            TokenModel::Pair => {
                let refresh =
                    self.backend
                        .refresh_for_user(&identity.user_id, &identity.username, now)?;
                let access = self.backend.access_for(&refresh, now)?;
                tracing::info!(
                    user_id = %identity.user_id,
                    refresh_jti = ?refresh.jti(),
                    "Token pair issued"
                );
                TokenPayload::pair(access, refresh.into_string())
            }
            TokenModel::Sliding => {
                let sliding =
                    self.backend
                        .sliding_for_user(&identity.user_id, &identity.username, now)?;
                tracing::info!(
                    user_id = %identity.user_id,
                    jti = ?sliding.jti(),
                    "Sliding token issued"
                );
                TokenPayload::sliding(sliding)
            }
        };

        Ok(TokenGrant::issued(payload, renewal_expires_at))
    }

    async fn refresh(&self, token: &str) -> Result<TokenGrant, TokenServiceError> {
        let now = clock();
        match self.settings.model {
            TokenModel::Pair => self.refresh_pair(token, now).await,
            TokenModel::Sliding => self.refresh_sliding(token, now).await,
        }
    }

    async fn verify(&self, token: &str) -> Result<TokenGrant, TokenServiceError> {
        self.parse_honored(token, None, clock()).await?;
        Ok(TokenGrant::empty())
    }

    async fn blacklist(&self, token: &str) -> Result<TokenGrant, TokenServiceError> {
        let store = self
            .revocation_store
            .as_ref()
            .ok_or(ConfigurationError::MissingRevocationStore)?;

        let token = self
            .parse_honored(token, Some(self.renewal_type()), clock())
            .await?;
        self.revoke(store, &token).await?;

        Ok(TokenGrant::empty())
    }
}
