//! API Key Repository

use crate::api_key::entity::ApiKey;
use crate::shared::error::Result;
use sqlx::PgPool;

pub struct ApiKeyRepository {
    pool: PgPool,
}

impl ApiKeyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS api_keys (
                key_id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                key_hash TEXT NOT NULL UNIQUE,
                prefix TEXT NOT NULL,
                scopes JSONB NOT NULL DEFAULT '[]',
                access_level TEXT NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                expires_at TIMESTAMPTZ,
                last_used_at TIMESTAMPTZ,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                legacy_cleartext TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_api_keys_user ON api_keys(user_id);
            CREATE INDEX IF NOT EXISTS idx_api_keys_legacy_cleartext ON api_keys(legacy_cleartext) WHERE legacy_cleartext IS NOT NULL;
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert(&self, conn: &mut sqlx::PgConnection, key: &ApiKey) -> Result<()> {
        sqlx::query(
            "INSERT INTO api_keys \
             (key_id, user_id, name, key_hash, prefix, scopes, access_level, is_active, expires_at, last_used_at, created_at, legacy_cleartext) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(&key.key_id)
        .bind(&key.user_id)
        .bind(&key.name)
        .bind(&key.key_hash)
        .bind(&key.prefix)
        .bind(&key.scopes)
        .bind(&key.access_level)
        .bind(key.is_active)
        .bind(key.expires_at)
        .bind(key.last_used_at)
        .bind(key.created_at)
        .bind(&key.legacy_cleartext)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, key_id: &str) -> Result<Option<ApiKey>> {
        Ok(sqlx::query_as::<_, ApiKey>("SELECT * FROM api_keys WHERE key_id = $1")
            .bind(key_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn find_by_hash(&self, key_hash: &str) -> Result<Option<ApiKey>> {
        Ok(sqlx::query_as::<_, ApiKey>("SELECT * FROM api_keys WHERE key_hash = $1")
            .bind(key_hash)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Fallback path for records predating hashed storage: plaintext equality
    /// against the cleartext retained at migration time.
    pub async fn find_by_legacy_cleartext(&self, cleartext: &str) -> Result<Option<ApiKey>> {
        Ok(
            sqlx::query_as::<_, ApiKey>("SELECT * FROM api_keys WHERE legacy_cleartext = $1")
                .bind(cleartext)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<ApiKey>> {
        Ok(sqlx::query_as::<_, ApiKey>(
            "SELECT * FROM api_keys WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Best-effort — the caller fires this without awaiting correctness.
    pub async fn touch_last_used(&self, key_id: &str) -> Result<()> {
        sqlx::query("UPDATE api_keys SET last_used_at = now() WHERE key_id = $1")
            .bind(key_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Re-hash a legacy record once it has been matched by plaintext fallback,
    /// clearing the retained cleartext so it is never read again.
    pub async fn rehash_legacy(&self, key_id: &str, key_hash: &str) -> Result<()> {
        sqlx::query("UPDATE api_keys SET key_hash = $1, legacy_cleartext = NULL WHERE key_id = $2")
            .bind(key_hash)
            .bind(key_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn deactivate(&self, conn: &mut sqlx::PgConnection, key_id: &str) -> Result<()> {
        sqlx::query("UPDATE api_keys SET is_active = FALSE WHERE key_id = $1")
            .bind(key_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    /// Idempotent: revoking an already-revoked key still succeeds.
    pub async fn revoke(&self, conn: &mut sqlx::PgConnection, key_id: &str) -> Result<()> {
        self.deactivate(conn, key_id).await
    }
}
