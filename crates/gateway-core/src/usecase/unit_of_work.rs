//! Unit of Work
//!
//! Atomic commit of a domain event, its audit log entry, and its outbox row
//! within a single Postgres transaction. Aggregate-specific writes (inserting
//! or updating the session/user/api-key row) happen against the same
//! transaction before `commit` is called.
//!
//! `UseCaseResult::success()` is crate-private, so the only way a use case
//! can report success is by calling [`UnitOfWorkTx::commit`]. That keeps the
//! event log, the audit trail, and the outbox in lockstep with every state
//! change this gateway makes.

use chrono::Utc;
use gateway_common::{OutboxEntry, OutboxStatus};
use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, error};

use super::domain_event::DomainEvent;
use super::error::UseCaseError;
use super::result::UseCaseResult;
use crate::{AuditLog, Event};

/// Opens [`UnitOfWorkTx`] transactions against a Postgres pool.
#[derive(Clone)]
pub struct UnitOfWork {
    pool: PgPool,
    source: String,
    outbox_destination: String,
}

impl UnitOfWork {
    pub fn new(pool: PgPool, source: impl Into<String>, outbox_destination: impl Into<String>) -> Self {
        Self {
            pool,
            source: source.into(),
            outbox_destination: outbox_destination.into(),
        }
    }

    /// Begin a transaction. The caller performs its aggregate-specific insert
    /// or update against [`UnitOfWorkTx::connection`], then calls `commit`.
    pub async fn begin(&self) -> Result<UnitOfWorkTx<'_>, sqlx::Error> {
        let tx = self.pool.begin().await?;
        Ok(UnitOfWorkTx {
            tx,
            source: self.source.clone(),
            outbox_destination: self.outbox_destination.clone(),
        })
    }
}

/// An open transaction plus the bookkeeping needed to commit an event.
pub struct UnitOfWorkTx<'a> {
    tx: Transaction<'a, Postgres>,
    source: String,
    outbox_destination: String,
}

impl<'a> UnitOfWorkTx<'a> {
    /// Connection for aggregate-specific writes, issued before `commit`.
    pub fn connection(&mut self) -> &mut sqlx::PgConnection {
        &mut self.tx
    }

    /// Extract the aggregate type from a subject string.
    /// Subject format: `"gateway.session.01h..."` -> `"session"`.
    fn extract_aggregate_type(subject: &str) -> String {
        subject.split('.').nth(1).unwrap_or("unknown").to_string()
    }

    fn extract_entity_id(subject: &str) -> Option<String> {
        subject.split('.').nth(2).map(String::from)
    }

    /// Persist the event, its audit log entry, and its outbox row, then
    /// commit the underlying transaction. This is the only way to produce a
    /// successful [`UseCaseResult`].
    pub async fn commit<E, C>(mut self, event: E, command: &C) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
        C: Serialize + Send + Sync,
    {
        let aggregate_type = Self::extract_aggregate_type(event.subject());
        let aggregate_id = Self::extract_entity_id(event.subject()).unwrap_or_default();

        let data_json = event.to_data_json();
        let data: serde_json::Value = serde_json::from_str(&data_json).unwrap_or(serde_json::json!({}));

        let seq: i64 = match sqlx::query_scalar(
            "SELECT COALESCE(MAX(seq), 0) + 1 FROM events WHERE event_type LIKE $1 AND subject = $2",
        )
        .bind(format!("{}%", self.source))
        .bind(event.subject())
        .fetch_one(&mut *self.tx)
        .await
        {
            Ok(s) => s,
            Err(e) => {
                let _ = self.tx.rollback().await;
                return UseCaseResult::failure(UseCaseError::commit(format!("failed to allocate seq: {}", e)));
            }
        };

        let row = Event {
            id: event.event_id().to_string(),
            event_type: event.event_type().to_string(),
            source: event.source().to_string(),
            subject: Some(event.subject().to_string()),
            time: event.time(),
            data,
            data_content_type: "application/json".to_string(),
            spec_version: event.spec_version().to_string(),
            message_group: Some(event.message_group().to_string()),
            correlation_id: Some(event.correlation_id().to_string()),
            causation_id: event.causation_id().map(String::from),
            seq,
            client_id: None,
            created_at: Utc::now(),
        };

        if let Err(e) = sqlx::query(
            "INSERT INTO events (id, event_type, source, subject, time, data, data_content_type, \
             spec_version, message_group, correlation_id, causation_id, seq, client_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(&row.id)
        .bind(&row.event_type)
        .bind(&row.source)
        .bind(&row.subject)
        .bind(row.time)
        .bind(&row.data)
        .bind(&row.data_content_type)
        .bind(&row.spec_version)
        .bind(&row.message_group)
        .bind(&row.correlation_id)
        .bind(&row.causation_id)
        .bind(row.seq)
        .bind(&row.client_id)
        .bind(row.created_at)
        .execute(&mut *self.tx)
        .await
        {
            let _ = self.tx.rollback().await;
            error!("failed to insert event: {}", e);
            return UseCaseResult::failure(UseCaseError::commit(format!("failed to insert event: {}", e)));
        }

        let audit_log = AuditLog::from_command(
            &aggregate_type,
            &aggregate_id,
            command,
            Some(event.principal_id().to_string()),
        )
        .with_performed_at(event.time());

        if let Err(e) = sqlx::query(
            "INSERT INTO audit_logs (id, entity_type, entity_id, operation, operation_json, principal_id, performed_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&audit_log.id)
        .bind(&audit_log.entity_type)
        .bind(&audit_log.entity_id)
        .bind(&audit_log.operation)
        .bind(&audit_log.operation_json)
        .bind(&audit_log.principal_id)
        .bind(audit_log.performed_at)
        .execute(&mut *self.tx)
        .await
        {
            let _ = self.tx.rollback().await;
            error!("failed to insert audit log: {}", e);
            return UseCaseResult::failure(UseCaseError::commit(format!("failed to insert audit log: {}", e)));
        }

        let outbox_entry = OutboxEntry {
            event_id: row.id.clone(),
            aggregate_type,
            aggregate_id,
            seq: row.seq,
            destination: self.outbox_destination.clone(),
            payload: serde_json::to_value(&row).unwrap_or(serde_json::json!({})),
            status: OutboxStatus::PENDING,
            attempts: 0,
            last_error: None,
            created_at: row.created_at,
            next_attempt_at: row.created_at,
        };

        if let Err(e) = sqlx::query(
            "INSERT INTO outbox (event_id, aggregate_type, aggregate_id, seq, destination, payload, \
             status, attempts, created_at, next_attempt_at) \
             VALUES ($1, $2, $3, $4, $5, $6, 'PENDING', 0, $7, $7)",
        )
        .bind(&outbox_entry.event_id)
        .bind(&outbox_entry.aggregate_type)
        .bind(&outbox_entry.aggregate_id)
        .bind(outbox_entry.seq)
        .bind(&outbox_entry.destination)
        .bind(&outbox_entry.payload)
        .bind(outbox_entry.created_at)
        .execute(&mut *self.tx)
        .await
        {
            let _ = self.tx.rollback().await;
            error!("failed to insert outbox row: {}", e);
            return UseCaseResult::failure(UseCaseError::commit(format!("failed to insert outbox row: {}", e)));
        }

        if let Err(e) = self.tx.commit().await {
            error!("failed to commit transaction: {}", e);
            return UseCaseResult::failure(UseCaseError::commit(format!("failed to commit transaction: {}", e)));
        }

        debug!(event_id = event.event_id(), event_type = event.event_type(), "committed use case transaction");

        UseCaseResult::success(event)
    }

    /// Roll back without committing anything. Use when an aggregate-specific
    /// write after `begin()` fails before an event has been constructed.
    pub async fn rollback(self) -> Result<(), sqlx::Error> {
        self.tx.rollback().await
    }
}

/// Records commits in memory instead of touching a database. Used by use
/// case unit tests that don't need a real transaction.
#[cfg(test)]
pub struct InMemoryUnitOfWork {
    pub committed_events: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl InMemoryUnitOfWork {
    pub fn new() -> Self {
        Self {
            committed_events: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn commit<E: DomainEvent>(&self, event: E) -> UseCaseResult<E> {
        self.committed_events.lock().unwrap().push(event.event_id().to_string());
        UseCaseResult::success(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_aggregate_type() {
        assert_eq!(UnitOfWorkTx::extract_aggregate_type("gateway.session.abc123"), "session");
        assert_eq!(UnitOfWorkTx::extract_aggregate_type("gateway.user_account.xyz"), "user_account");
        assert_eq!(UnitOfWorkTx::extract_aggregate_type(""), "unknown");
    }

    #[test]
    fn test_extract_entity_id() {
        assert_eq!(
            UnitOfWorkTx::extract_entity_id("gateway.session.abc123"),
            Some("abc123".to_string())
        );
        assert_eq!(UnitOfWorkTx::extract_entity_id("gateway.session"), None);
    }

    #[test]
    fn test_in_memory_unit_of_work_records_commits() {
        use super::super::domain_event::EventMetadata;
        use crate::impl_domain_event;
        use serde::Serialize as _;

        #[derive(Debug, Clone, serde::Serialize)]
        struct TestEvent {
            metadata: EventMetadata,
        }
        impl_domain_event!(TestEvent);

        let uow = InMemoryUnitOfWork::new();
        let metadata = EventMetadata::new(
            "evt-1".to_string(),
            "gateway:auth:session:created",
            "1.0",
            "gateway:auth",
            "gateway.session.1".to_string(),
            "gateway:session:1".to_string(),
            "exec-1".to_string(),
            "corr-1".to_string(),
            None,
            "user-1".to_string(),
        );
        let _ = uow.commit(TestEvent { metadata });
        assert_eq!(uow.committed_events.lock().unwrap().len(), 1);
    }
}
