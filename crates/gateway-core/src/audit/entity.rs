//! Audit Log Entity
//!
//! Records every state-changing use case execution for compliance and
//! debugging. Written atomically with its triggering event and outbox row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    /// TSID as Crockford Base32 string.
    pub id: String,

    /// Aggregate type affected, e.g. "Session", "UserAccount", "ApiKey".
    pub entity_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,

    /// Command type name, e.g. "LoginWithPassword".
    pub operation: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_json: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,

    pub performed_at: DateTime<Utc>,
}

impl AuditLog {
    pub fn new(
        entity_type: impl Into<String>,
        entity_id: Option<String>,
        operation: impl Into<String>,
        operation_json: Option<String>,
        principal_id: Option<String>,
    ) -> Self {
        Self {
            id: crate::TsidGenerator::generate(),
            entity_type: entity_type.into(),
            entity_id,
            operation: operation.into(),
            operation_json,
            principal_id,
            performed_at: Utc::now(),
        }
    }

    pub fn from_command<C: serde::Serialize>(
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        command: &C,
        principal_id: Option<String>,
    ) -> Self {
        let command_name = std::any::type_name::<C>()
            .rsplit("::")
            .next()
            .unwrap_or("Unknown")
            .to_string();

        Self {
            id: crate::TsidGenerator::generate(),
            entity_type: entity_type.into(),
            entity_id: Some(entity_id.into()),
            operation: command_name,
            operation_json: serde_json::to_string(command).ok(),
            principal_id,
            performed_at: Utc::now(),
        }
    }

    pub fn with_performed_at(mut self, time: DateTime<Utc>) -> Self {
        self.performed_at = time;
        self
    }
}
