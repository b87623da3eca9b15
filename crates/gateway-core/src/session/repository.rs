//! Session Repository

use crate::session::entity::Session;
use crate::shared::error::Result;
use chrono::{Duration, Utc};
use sqlx::PgPool;

pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                session_id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                platform TEXT NOT NULL,
                access_token_hash TEXT NOT NULL UNIQUE,
                refresh_token_hash TEXT NOT NULL,
                ip_address TEXT,
                user_agent TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                expires_at TIMESTAMPTZ NOT NULL,
                revoked_at TIMESTAMPTZ,
                previous_refresh_token_hash TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
            CREATE INDEX IF NOT EXISTS idx_sessions_refresh_hash ON sessions(refresh_token_hash);
            CREATE INDEX IF NOT EXISTS idx_sessions_prev_refresh_hash ON sessions(previous_refresh_token_hash);
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn insert(&self, conn: &mut sqlx::PgConnection, session: &Session) -> Result<()> {
        sqlx::query(
            "INSERT INTO sessions \
             (session_id, user_id, platform, access_token_hash, refresh_token_hash, ip_address, user_agent, created_at, expires_at, revoked_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(&session.session_id)
        .bind(&session.user_id)
        .bind(&session.platform)
        .bind(&session.access_token_hash)
        .bind(&session.refresh_token_hash)
        .bind(&session.ip_address)
        .bind(&session.user_agent)
        .bind(session.created_at)
        .bind(session.expires_at)
        .bind(session.revoked_at)
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
        Ok(sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE session_id = $1")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn lookup_by_access_token_hash(&self, hash: &str) -> Result<Option<Session>> {
        Ok(
            sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE access_token_hash = $1")
                .bind(hash)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn find_by_refresh_token_hash(&self, hash: &str) -> Result<Option<Session>> {
        Ok(
            sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE refresh_token_hash = $1")
                .bind(hash)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// A hit here means `hash` was valid once but has since been rotated away
    /// — presenting it again is refresh-token reuse, not a stale credential.
    pub async fn find_by_previous_refresh_token_hash(&self, hash: &str) -> Result<Option<Session>> {
        Ok(sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE previous_refresh_token_hash = $1",
        )
        .bind(hash)
        .fetch_optional(&self.pool)
        .await?)
    }

    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<Session>> {
        Ok(sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn revoke(&self, conn: &mut sqlx::PgConnection, session_id: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE sessions SET revoked_at = now() WHERE session_id = $1 AND revoked_at IS NULL")
            .bind(session_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Rotate both token hashes and push out `expires_at` in place. Used by
    /// token refresh and one-time-code exchange; never touches `created_at`.
    pub async fn rotate(
        &self,
        conn: &mut sqlx::PgConnection,
        session_id: &str,
        new_access_token_hash: &str,
        new_refresh_token_hash: &str,
        new_expires_at: chrono::DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE sessions SET previous_refresh_token_hash = refresh_token_hash, \
             access_token_hash = $1, refresh_token_hash = $2, expires_at = $3 \
             WHERE session_id = $4 AND revoked_at IS NULL",
        )
        .bind(new_access_token_hash)
        .bind(new_refresh_token_hash)
        .bind(new_expires_at)
        .bind(session_id)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn revoke_by_access_token_hash(&self, conn: &mut sqlx::PgConnection, hash: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE sessions SET revoked_at = now() WHERE access_token_hash = $1 AND revoked_at IS NULL",
        )
        .bind(hash)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Revoke every live session for a user — used when refresh token reuse
    /// indicates the chain is compromised.
    pub async fn revoke_all_for_user(&self, conn: &mut sqlx::PgConnection, user_id: &str) -> Result<u64> {
        let result = sqlx::query("UPDATE sessions SET revoked_at = now() WHERE user_id = $1 AND revoked_at IS NULL")
            .bind(user_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Periodic cleanup: rows already revoked, or expired more than 7 days ago.
    pub async fn gc(&self) -> Result<u64> {
        let cutoff = Utc::now() - Duration::days(7);
        let result = sqlx::query("DELETE FROM sessions WHERE revoked_at IS NOT NULL OR expires_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
