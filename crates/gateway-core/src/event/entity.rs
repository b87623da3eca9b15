//! Event Entity
//!
//! CloudEvents spec 1.0 compliant event storage. Immutable once created.
//! Every event written here gets a matching row in the outbox within the
//! same transaction (see [`crate::usecase::unit_of_work`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const CLOUDEVENTS_SPEC_VERSION: &str = "1.0";

/// Event entity - immutable event storage.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// TSID as Crockford Base32 string.
    pub id: String,

    /// CloudEvents type: `{application}:{subdomain}:{aggregate}:{event}`.
    #[serde(rename = "type")]
    #[sqlx(rename = "event_type")]
    pub event_type: String,

    pub source: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    pub time: DateTime<Utc>,

    pub data: serde_json::Value,

    #[serde(default = "default_content_type")]
    pub data_content_type: String,

    #[serde(default = "default_spec_version")]
    pub spec_version: String,

    /// Ordering key within which this gateway guarantees sequential delivery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_group: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<String>,

    /// Monotonic position within the aggregate's event stream.
    pub seq: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    pub created_at: DateTime<Utc>,
}

fn default_content_type() -> String {
    "application/json".to_string()
}

fn default_spec_version() -> String {
    CLOUDEVENTS_SPEC_VERSION.to_string()
}

impl Event {
    pub fn new(
        event_type: impl Into<String>,
        source: impl Into<String>,
        data: serde_json::Value,
        seq: i64,
    ) -> Self {
        Self {
            id: crate::TsidGenerator::generate(),
            event_type: event_type.into(),
            source: source.into(),
            subject: None,
            time: Utc::now(),
            data,
            data_content_type: default_content_type(),
            spec_version: default_spec_version(),
            message_group: None,
            correlation_id: None,
            causation_id: None,
            seq,
            client_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_message_group(mut self, group: impl Into<String>) -> Self {
        self.message_group = Some(group.into());
        self
    }

    pub fn with_correlation_id(mut self, id: impl Into<String>) -> Self {
        self.correlation_id = Some(id.into());
        self
    }

    pub fn with_causation_id(mut self, id: impl Into<String>) -> Self {
        self.causation_id = Some(id.into());
        self
    }

    pub fn with_client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self
    }

    /// Extract the aggregate type from the event type, e.g. `"session"` from
    /// `"gateway:auth:session:created"`.
    pub fn aggregate(&self) -> Option<&str> {
        self.event_type.split(':').nth(2)
    }

    pub fn event_name(&self) -> Option<&str> {
        self.event_type.split(':').nth(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_and_event_name_parse_event_type() {
        let event = Event::new("gateway:auth:session:created", "gateway:auth", serde_json::json!({}), 1);
        assert_eq!(event.aggregate(), Some("session"));
        assert_eq!(event.event_name(), Some("created"));
    }
}
