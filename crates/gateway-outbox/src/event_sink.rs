//! HTTP delivery of outbox entries to the downstream read-model projector.
//!
//! Each entry is POSTed individually with an `Idempotency-Key` header set to
//! its event id, so a downstream retrying a connection drop after it already
//! committed the write still dedupes correctly.

use async_trait::async_trait;
use gateway_common::OutboxEntry;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct EventSinkConfig {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub bearer_token: Option<String>,
}

impl Default for EventSinkConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(15),
            bearer_token: None,
        }
    }
}

/// Outcome of a single delivery attempt.
#[derive(Debug)]
pub enum DeliveryOutcome {
    Delivered,
    Retryable(String),
    Terminal(String),
}

/// Destination an [`OutboxEntry`] is delivered to. `destination` on the entry
/// is joined onto the sink's base URL.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn deliver(&self, entry: &OutboxEntry) -> DeliveryOutcome;
}

pub struct HttpEventSink {
    base_url: String,
    config: EventSinkConfig,
    client: reqwest::Client,
}

impl HttpEventSink {
    pub fn new(base_url: impl Into<String>, config: EventSinkConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.into(),
            config,
            client,
        })
    }

    fn url_for(&self, entry: &OutboxEntry) -> String {
        format!("{}{}", self.base_url, entry.destination)
    }
}

#[async_trait]
impl EventSink for HttpEventSink {
    async fn deliver(&self, entry: &OutboxEntry) -> DeliveryOutcome {
        let url = self.url_for(entry);
        let mut request = self
            .client
            .post(&url)
            .header("Idempotency-Key", entry.event_id.as_str())
            .json(&entry.payload);

        if let Some(ref token) = self.config.bearer_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        debug!(event_id = %entry.event_id, %url, "delivering outbox entry");

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    DeliveryOutcome::Delivered
                } else if status.as_u16() == 400 || status.as_u16() == 403 || status.as_u16() == 422 {
                    let body = response.text().await.unwrap_or_default();
                    warn!(event_id = %entry.event_id, %status, "outbox entry rejected, terminal");
                    DeliveryOutcome::Terminal(format!("HTTP {}: {}", status, body))
                } else {
                    let body = response.text().await.unwrap_or_default();
                    DeliveryOutcome::Retryable(format!("HTTP {}: {}", status, body))
                }
            }
            Err(e) => DeliveryOutcome::Retryable(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gateway_common::OutboxStatus;
    use serde_json::json;

    fn sample_entry() -> OutboxEntry {
        OutboxEntry {
            event_id: "evt_1".to_string(),
            aggregate_type: "session".to_string(),
            aggregate_id: "sess_1".to_string(),
            seq: 1,
            destination: "/events".to_string(),
            payload: json!({"kind": "SessionCreated"}),
            status: OutboxStatus::PENDING,
            attempts: 0,
            last_error: None,
            created_at: Utc::now(),
            next_attempt_at: Utc::now(),
        }
    }

    #[test]
    fn test_url_for_joins_base_and_destination() {
        let sink = HttpEventSink::new("http://localhost:8090", EventSinkConfig::default()).unwrap();
        assert_eq!(sink.url_for(&sample_entry()), "http://localhost:8090/events");
    }
}
