//! Authorization Code Repository

use sqlx::PgPool;

use crate::auth::authorization_code::AuthorizationCode;
use crate::shared::error::Result;

pub struct AuthorizationCodeRepository {
    pool: PgPool,
}

impl AuthorizationCodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS authorization_codes (
                code TEXT PRIMARY KEY,
                client_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                redirect_uri TEXT NOT NULL,
                scope TEXT,
                code_challenge TEXT,
                code_challenge_method TEXT,
                state TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                expires_at TIMESTAMPTZ NOT NULL,
                used BOOLEAN NOT NULL DEFAULT FALSE
            );
            CREATE INDEX IF NOT EXISTS idx_authorization_codes_expires ON authorization_codes(expires_at);
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert(&self, code: &AuthorizationCode) -> Result<()> {
        sqlx::query(
            "INSERT INTO authorization_codes \
             (code, client_id, user_id, redirect_uri, scope, code_challenge, code_challenge_method, state, created_at, expires_at, used) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(&code.code)
        .bind(&code.client_id)
        .bind(&code.user_id)
        .bind(&code.redirect_uri)
        .bind(&code.scope)
        .bind(&code.code_challenge)
        .bind(&code.code_challenge_method)
        .bind(&code.state)
        .bind(code.created_at)
        .bind(code.expires_at)
        .bind(code.used)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_valid(&self, code: &str) -> Result<Option<AuthorizationCode>> {
        Ok(sqlx::query_as::<_, AuthorizationCode>(
            "SELECT * FROM authorization_codes WHERE code = $1 AND used = FALSE AND expires_at > now()",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Returns `true` only if a still-unused row was flipped, guarding
    /// against the code being redeemed twice in a race.
    pub async fn mark_used(&self, code: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE authorization_codes SET used = TRUE WHERE code = $1 AND used = FALSE")
            .bind(code)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM authorization_codes WHERE expires_at < now()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
