//! Shared types used across every auth-gateway crate: outbox status codes,
//! the outbox payload envelope, and the logging bootstrap.

pub mod logging;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Delivery state of an [`OutboxEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboxStatus {
    /// Waiting for the delivery loop to claim it.
    PENDING,
    /// Currently claimed by a delivery loop instance.
    IN_PROGRESS,
    /// Downstream accepted the event (2xx).
    SENT,
    /// Attempts exhausted; requires manual intervention.
    FAILED,
}

impl OutboxStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OutboxStatus::SENT | OutboxStatus::FAILED)
    }
}

/// A durable row pairing an append-only event with its downstream delivery state.
///
/// `destination` is the read-model endpoint this row is addressed to; `event_id`
/// doubles as the idempotency key the downstream MUST dedupe on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboxEntry {
    pub event_id: String,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub seq: i64,
    pub destination: String,
    pub payload: serde_json::Value,
    pub status: OutboxStatus,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub next_attempt_at: DateTime<Utc>,
}

/// Errors shared by infrastructure code that isn't transactional (config
/// loading, logging setup, outbox delivery). Command-layer errors live in
/// `gateway-core`'s `UseCaseError`/`GatewayError`, which are categorized
/// against the HTTP surface instead.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, InfraError>;
