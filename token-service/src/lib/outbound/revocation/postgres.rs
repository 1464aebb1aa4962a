use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;

use crate::domain::token::errors::RevocationStoreError;
use crate::domain::token::ports::RevocationStore;

/// Revocation store backed by the `blacklisted_tokens` table.
pub struct PostgresRevocationStore {
    pool: PgPool,
}

impl PostgresRevocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RevocationStore for PostgresRevocationStore {
    async fn blacklist(
        &self,
        jti: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RevocationStoreError> {
        sqlx::query(
            r#"
            INSERT INTO blacklisted_tokens (jti, expires_at, blacklisted_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(jti)
        .bind(expires_at)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| RevocationStoreError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn is_blacklisted(&self, jti: &str) -> Result<bool, RevocationStoreError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (SELECT 1 FROM blacklisted_tokens WHERE jti = $1)
            "#,
        )
        .bind(jti)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RevocationStoreError::DatabaseError(e.to_string()))?;

        Ok(exists)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RevocationStoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM blacklisted_tokens
            WHERE expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| RevocationStoreError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
