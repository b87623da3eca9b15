//! OAuth Client Repository

use sqlx::PgPool;

use crate::auth::oauth_entity::OAuthClient;
use crate::shared::error::Result;

pub struct OAuthClientRepository {
    pool: PgPool,
}

impl OAuthClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS oauth_clients (
                client_id TEXT PRIMARY KEY,
                client_name TEXT NOT NULL,
                client_type TEXT NOT NULL,
                client_secret_hash TEXT,
                require_pkce BOOLEAN NOT NULL DEFAULT TRUE,
                allowed_redirect_uris JSONB NOT NULL DEFAULT '[]',
                allowed_scopes JSONB NOT NULL DEFAULT '[]',
                default_scopes JSONB NOT NULL DEFAULT '[]',
                status TEXT NOT NULL DEFAULT 'active',
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert(&self, client: &OAuthClient) -> Result<()> {
        sqlx::query(
            "INSERT INTO oauth_clients \
             (client_id, client_name, client_type, client_secret_hash, require_pkce, allowed_redirect_uris, allowed_scopes, default_scopes, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(&client.client_id)
        .bind(&client.client_name)
        .bind(client.client_type)
        .bind(&client.client_secret_hash)
        .bind(client.require_pkce)
        .bind(&client.allowed_redirect_uris)
        .bind(&client.allowed_scopes)
        .bind(&client.default_scopes)
        .bind(client.status)
        .bind(client.created_at)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_client_id(&self, client_id: &str) -> Result<Option<OAuthClient>> {
        Ok(
            sqlx::query_as::<_, OAuthClient>("SELECT * FROM oauth_clients WHERE client_id = $1")
                .bind(client_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn find_all(&self) -> Result<Vec<OAuthClient>> {
        Ok(
            sqlx::query_as::<_, OAuthClient>("SELECT * FROM oauth_clients ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    pub async fn exists_by_client_id(&self, client_id: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM oauth_clients WHERE client_id = $1")
            .bind(client_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count > 0)
    }
}
