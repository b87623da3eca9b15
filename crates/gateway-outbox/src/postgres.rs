//! PostgreSQL-backed outbox repository.
//!
//! `fetch_due` claims rows with `SELECT ... FOR UPDATE SKIP LOCKED` so several
//! processor instances can poll the same table concurrently without double
//! delivery.

use crate::repository::{OutboxRepository, OutboxTableConfig};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gateway_common::{OutboxEntry, OutboxStatus};
use sqlx::{PgPool, Row};
use std::time::Duration;
use tracing::{debug, info};

pub struct PostgresOutboxRepository {
    pool: PgPool,
    table_config: OutboxTableConfig,
}

impl PostgresOutboxRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            table_config: OutboxTableConfig::default(),
        }
    }

    pub fn with_config(pool: PgPool, table_config: OutboxTableConfig) -> Self {
        Self { pool, table_config }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn parse_row(&self, row: &sqlx::postgres::PgRow) -> Result<OutboxEntry> {
        let status_str: String = row.get("status");
        let status = match status_str.as_str() {
            "PENDING" => OutboxStatus::PENDING,
            "IN_PROGRESS" => OutboxStatus::IN_PROGRESS,
            "SENT" => OutboxStatus::SENT,
            "FAILED" => OutboxStatus::FAILED,
            other => return Err(anyhow::anyhow!("unknown outbox status: {}", other)),
        };

        Ok(OutboxEntry {
            event_id: row.get("event_id"),
            aggregate_type: row.get("aggregate_type"),
            aggregate_id: row.get("aggregate_id"),
            seq: row.get("seq"),
            destination: row.get("destination"),
            payload: row.get("payload"),
            status,
            attempts: row.get("attempts"),
            last_error: row.try_get("last_error").ok(),
            created_at: row.get("created_at"),
            next_attempt_at: row.get("next_attempt_at"),
        })
    }
}

fn status_str(status: OutboxStatus) -> &'static str {
    match status {
        OutboxStatus::PENDING => "PENDING",
        OutboxStatus::IN_PROGRESS => "IN_PROGRESS",
        OutboxStatus::SENT => "SENT",
        OutboxStatus::FAILED => "FAILED",
    }
}

#[async_trait]
impl OutboxRepository for PostgresOutboxRepository {
    async fn fetch_due(&self, limit: u32) -> Result<Vec<OutboxEntry>> {
        let table = &self.table_config.table;
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let query = format!(
            "SELECT event_id, aggregate_type, aggregate_id, seq, destination, payload, \
             status, attempts, last_error, created_at, next_attempt_at \
             FROM {table} \
             WHERE status = 'PENDING' AND next_attempt_at <= $1 \
             ORDER BY created_at ASC \
             LIMIT $2 \
             FOR UPDATE SKIP LOCKED"
        );

        let rows = sqlx::query(&query)
            .bind(now)
            .bind(limit as i64)
            .fetch_all(&mut *tx)
            .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            entries.push(self.parse_row(row)?);
        }

        if !entries.is_empty() {
            let ids: Vec<&str> = entries.iter().map(|e| e.event_id.as_str()).collect();
            let mark_query = format!(
                "UPDATE {table} SET status = '{}' WHERE event_id = ANY($1)",
                status_str(OutboxStatus::IN_PROGRESS)
            );
            sqlx::query(&mark_query).bind(&ids).execute(&mut *tx).await?;
        }

        tx.commit().await?;

        debug!(table = %table, count = entries.len(), "claimed due outbox entries");
        Ok(entries)
    }

    async fn mark_sent(&self, event_id: &str) -> Result<()> {
        let table = &self.table_config.table;
        let query = format!("UPDATE {table} SET status = 'SENT', last_error = NULL WHERE event_id = $1");
        sqlx::query(&query).bind(event_id).execute(&self.pool).await?;
        Ok(())
    }

    async fn mark_retry(
        &self,
        event_id: &str,
        error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<()> {
        let table = &self.table_config.table;
        let query = format!(
            "UPDATE {table} SET status = 'PENDING', attempts = attempts + 1, \
             last_error = $1, next_attempt_at = $2 WHERE event_id = $3"
        );
        sqlx::query(&query)
            .bind(error)
            .bind(next_attempt_at)
            .bind(event_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn mark_failed(&self, event_id: &str, error: &str) -> Result<()> {
        let table = &self.table_config.table;
        let query = format!(
            "UPDATE {table} SET status = 'FAILED', attempts = attempts + 1, last_error = $1 WHERE event_id = $2"
        );
        sqlx::query(&query).bind(error).bind(event_id).execute(&self.pool).await?;
        Ok(())
    }

    async fn recover_stuck(&self, timeout: Duration) -> Result<u64> {
        let table = &self.table_config.table;
        let cutoff = Utc::now() - chrono::Duration::from_std(timeout).unwrap_or_default();

        let query = format!(
            "UPDATE {table} SET status = 'PENDING' \
             WHERE status = 'IN_PROGRESS' AND next_attempt_at < $1"
        );

        let result = sqlx::query(&query).bind(cutoff).execute(&self.pool).await?;
        let count = result.rows_affected();
        if count > 0 {
            info!(table = %table, count, "reset stuck outbox entries to PENDING");
        }
        Ok(count)
    }

    async fn init_schema(&self) -> Result<()> {
        let table = &self.table_config.table;
        let schema = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table} (
                event_id TEXT PRIMARY KEY,
                aggregate_type TEXT NOT NULL,
                aggregate_id TEXT NOT NULL,
                seq BIGINT NOT NULL,
                destination TEXT NOT NULL,
                payload JSONB NOT NULL,
                status TEXT NOT NULL DEFAULT 'PENDING',
                attempts INTEGER NOT NULL DEFAULT 0,
                last_error TEXT,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                next_attempt_at TIMESTAMPTZ NOT NULL DEFAULT now()
            );
            CREATE INDEX IF NOT EXISTS idx_{table}_status_due ON {table}(status, next_attempt_at);
            CREATE INDEX IF NOT EXISTS idx_{table}_aggregate ON {table}(aggregate_type, aggregate_id, seq);
            "#
        );

        sqlx::query(&schema).execute(&self.pool).await?;

        info!(table = %table, "initialized postgres outbox schema");
        Ok(())
    }

    fn table_config(&self) -> &OutboxTableConfig {
        &self.table_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_config_default() {
        let config = OutboxTableConfig::default();
        assert_eq!(config.table, "outbox");
    }

    #[test]
    fn test_status_str_round_trip() {
        assert_eq!(status_str(OutboxStatus::PENDING), "PENDING");
        assert_eq!(status_str(OutboxStatus::SENT), "SENT");
    }
}
