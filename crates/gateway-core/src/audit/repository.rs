//! Audit Log Repository

use crate::shared::error::Result;
use crate::AuditLog;
use sqlx::PgPool;

pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Best-effort insert outside a unit-of-work transaction, used by
    /// [`crate::audit::service::AuditService`] for events that don't flow
    /// through a use case (e.g. admin bypass attempts).
    pub async fn insert(&self, log: &AuditLog) -> Result<()> {
        sqlx::query(
            "INSERT INTO audit_logs (id, entity_type, entity_id, operation, operation_json, principal_id, performed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&log.id)
        .bind(&log.entity_type)
        .bind(&log.entity_id)
        .bind(&log.operation)
        .bind(&log.operation_json)
        .bind(&log.principal_id)
        .bind(log.performed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<AuditLog>> {
        Ok(sqlx::query_as::<_, AuditLog>("SELECT * FROM audit_logs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn find_by_entity(&self, entity_type: &str, entity_id: &str, limit: i64) -> Result<Vec<AuditLog>> {
        Ok(sqlx::query_as::<_, AuditLog>(
            "SELECT * FROM audit_logs WHERE entity_type = $1 AND entity_id = $2 \
             ORDER BY performed_at DESC LIMIT $3",
        )
        .bind(entity_type)
        .bind(entity_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn find_by_principal(&self, principal_id: &str, limit: i64) -> Result<Vec<AuditLog>> {
        Ok(sqlx::query_as::<_, AuditLog>(
            "SELECT * FROM audit_logs WHERE principal_id = $1 ORDER BY performed_at DESC LIMIT $2",
        )
        .bind(principal_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn find_recent(&self, limit: i64) -> Result<Vec<AuditLog>> {
        Ok(
            sqlx::query_as::<_, AuditLog>("SELECT * FROM audit_logs ORDER BY performed_at DESC LIMIT $1")
                .bind(limit)
                .fetch_all(&self.pool)
                .await?,
        )
    }

    /// Search audit logs with optional filters, each applied only when present.
    pub async fn search(
        &self,
        entity_type: Option<&str>,
        entity_id: Option<&str>,
        operation: Option<&str>,
        principal_id: Option<&str>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<AuditLog>> {
        Ok(sqlx::query_as::<_, AuditLog>(
            "SELECT * FROM audit_logs \
             WHERE ($1::text IS NULL OR entity_type = $1) \
             AND ($2::text IS NULL OR entity_id = $2) \
             AND ($3::text IS NULL OR operation = $3) \
             AND ($4::text IS NULL OR principal_id = $4) \
             ORDER BY performed_at DESC \
             OFFSET $5 LIMIT $6",
        )
        .bind(entity_type)
        .bind(entity_id)
        .bind(operation)
        .bind(principal_id)
        .bind(skip)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn count(&self) -> Result<i64> {
        Ok(sqlx::query_scalar("SELECT COUNT(*) FROM audit_logs").fetch_one(&self.pool).await?)
    }

    pub async fn count_with_filters(
        &self,
        entity_type: Option<&str>,
        entity_id: Option<&str>,
        operation: Option<&str>,
        principal_id: Option<&str>,
    ) -> Result<i64> {
        Ok(sqlx::query_scalar(
            "SELECT COUNT(*) FROM audit_logs \
             WHERE ($1::text IS NULL OR entity_type = $1) \
             AND ($2::text IS NULL OR entity_id = $2) \
             AND ($3::text IS NULL OR operation = $3) \
             AND ($4::text IS NULL OR principal_id = $4)",
        )
        .bind(entity_type)
        .bind(entity_id)
        .bind(operation)
        .bind(principal_id)
        .fetch_one(&self.pool)
        .await?)
    }

    pub async fn find_distinct_entity_types(&self) -> Result<Vec<String>> {
        Ok(sqlx::query_scalar("SELECT DISTINCT entity_type FROM audit_logs").fetch_all(&self.pool).await?)
    }

    pub async fn find_distinct_operations(&self) -> Result<Vec<String>> {
        Ok(sqlx::query_scalar("SELECT DISTINCT operation FROM audit_logs").fetch_all(&self.pool).await?)
    }
}
