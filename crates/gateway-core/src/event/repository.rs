//! Event Repository
//!
//! Read access to the append-only event log. Writes happen exclusively
//! through [`crate::usecase::unit_of_work::UnitOfWorkTx::commit`] so that an
//! event row never exists without a matching outbox row.

use crate::shared::error::Result;
use crate::Event;
use sqlx::PgPool;

pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Event>> {
        Ok(sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn find_by_subject(&self, subject: &str) -> Result<Vec<Event>> {
        Ok(sqlx::query_as::<_, Event>("SELECT * FROM events WHERE subject = $1 ORDER BY seq ASC")
            .bind(subject)
            .fetch_all(&self.pool)
            .await?)
    }

    pub async fn find_by_correlation_id(&self, correlation_id: &str) -> Result<Vec<Event>> {
        Ok(sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE correlation_id = $1 ORDER BY created_at ASC",
        )
        .bind(correlation_id)
        .fetch_all(&self.pool)
        .await?)
    }

    /// Recent events with pagination, for admin/debug inspection.
    pub async fn find_recent_paged(&self, page: u32, size: u32) -> Result<Vec<Event>> {
        let offset = (page as i64) * (size as i64);
        Ok(sqlx::query_as::<_, Event>(
            "SELECT * FROM events ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(size as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn count_all(&self) -> Result<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM events").fetch_one(&self.pool).await?)
    }
}
