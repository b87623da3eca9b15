//! One-Time Code Repository

use sqlx::PgPool;

use crate::auth::one_time_code::OneTimeCode;
use crate::shared::error::Result;

pub struct OneTimeCodeRepository {
    pool: PgPool,
}

impl OneTimeCodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS one_time_codes (
                code TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                refresh_token TEXT NOT NULL,
                state TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                expires_at TIMESTAMPTZ NOT NULL,
                used BOOLEAN NOT NULL DEFAULT FALSE
            );
            CREATE INDEX IF NOT EXISTS idx_one_time_codes_expires ON one_time_codes(expires_at);
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert(&self, code: &OneTimeCode) -> Result<()> {
        sqlx::query(
            "INSERT INTO one_time_codes (code, user_id, refresh_token, state, created_at, expires_at, used) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&code.code)
        .bind(&code.user_id)
        .bind(&code.refresh_token)
        .bind(&code.state)
        .bind(code.created_at)
        .bind(code.expires_at)
        .bind(code.used)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Exactly-once consume: a valid row is deleted and returned in a single
    /// statement, so a raced second caller sees no row at all rather than a
    /// `used=true` one it could race against.
    pub async fn consume(&self, code: &str) -> Result<Option<OneTimeCode>> {
        Ok(sqlx::query_as::<_, OneTimeCode>(
            "DELETE FROM one_time_codes WHERE code = $1 AND used = FALSE AND expires_at > now() RETURNING *",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?)
    }

    pub async fn delete_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM one_time_codes WHERE expires_at < now()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
