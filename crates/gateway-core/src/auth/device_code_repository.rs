//! Device Code Repository

use sqlx::PgPool;

use crate::auth::device_code::DeviceCode;
use crate::shared::error::Result;

pub struct DeviceCodeRepository {
    pool: PgPool,
}

impl DeviceCodeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS device_codes (
                device_code TEXT PRIMARY KEY,
                user_code TEXT NOT NULL UNIQUE,
                client_id TEXT NOT NULL,
                scope TEXT,
                status TEXT NOT NULL DEFAULT 'pending',
                user_id TEXT,
                interval_secs INT NOT NULL DEFAULT 5,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                expires_at TIMESTAMPTZ NOT NULL,
                last_polled_at TIMESTAMPTZ
            );
            CREATE INDEX IF NOT EXISTS idx_device_codes_expires ON device_codes(expires_at);
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert(&self, code: &DeviceCode) -> Result<()> {
        sqlx::query(
            "INSERT INTO device_codes \
             (device_code, user_code, client_id, scope, status, user_id, interval_secs, created_at, expires_at, last_polled_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(&code.device_code)
        .bind(&code.user_code)
        .bind(&code.client_id)
        .bind(&code.scope)
        .bind(code.status)
        .bind(&code.user_id)
        .bind(code.interval_secs)
        .bind(code.created_at)
        .bind(code.expires_at)
        .bind(code.last_polled_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_device_code(&self, device_code: &str) -> Result<Option<DeviceCode>> {
        Ok(
            sqlx::query_as::<_, DeviceCode>("SELECT * FROM device_codes WHERE device_code = $1")
                .bind(device_code)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn find_by_user_code(&self, user_code: &str) -> Result<Option<DeviceCode>> {
        Ok(
            sqlx::query_as::<_, DeviceCode>("SELECT * FROM device_codes WHERE user_code = $1")
                .bind(user_code)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn update_status(&self, device_code: &str, status: crate::auth::device_code::DeviceCodeStatus, user_id: Option<&str>) -> Result<()> {
        sqlx::query("UPDATE device_codes SET status = $1, user_id = $2 WHERE device_code = $3")
            .bind(status)
            .bind(user_id)
            .bind(device_code)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn touch_poll(&self, device_code: &str) -> Result<()> {
        sqlx::query("UPDATE device_codes SET last_polled_at = now() WHERE device_code = $1")
            .bind(device_code)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM device_codes WHERE expires_at < now()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
