pub mod event_sink;
pub mod recovery;
pub mod repository;

#[cfg(feature = "postgres")]
pub mod postgres;

use anyhow::Result;
use gateway_common::OutboxEntry;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

pub use event_sink::{DeliveryOutcome, EventSink, EventSinkConfig, HttpEventSink};
pub use recovery::{RecoveryConfig, RecoveryTask};
pub use repository::{backoff_delay, OutboxRepository, OutboxTableConfig};

/// Polls the outbox table and delivers due entries to the configured [`EventSink`].
pub struct OutboxProcessor {
    repository: Arc<dyn OutboxRepository>,
    sink: Arc<dyn EventSink>,
    poll_interval: Duration,
    batch_size: u32,
    max_attempts: i32,
    backoff_base_secs: u64,
    backoff_cap_secs: u64,
}

impl OutboxProcessor {
    pub fn new(
        repository: Arc<dyn OutboxRepository>,
        sink: Arc<dyn EventSink>,
        poll_interval: Duration,
        batch_size: u32,
        max_attempts: i32,
        backoff_base_secs: u64,
        backoff_cap_secs: u64,
    ) -> Self {
        Self {
            repository,
            sink,
            poll_interval,
            batch_size,
            max_attempts,
            backoff_base_secs,
            backoff_cap_secs,
        }
    }

    pub async fn start(&self) {
        info!(
            poll_interval_ms = %self.poll_interval.as_millis(),
            batch_size = %self.batch_size,
            "starting outbox processor"
        );

        loop {
            if let Err(e) = self.process_batch().await {
                error!("error processing outbox batch: {}", e);
            }
            sleep(self.poll_interval).await;
        }
    }

    async fn process_batch(&self) -> Result<()> {
        let entries = self.repository.fetch_due(self.batch_size).await?;
        if entries.is_empty() {
            return Ok(());
        }

        for entry in entries {
            self.deliver_one(&entry).await?;
        }

        Ok(())
    }

    async fn deliver_one(&self, entry: &OutboxEntry) -> Result<()> {
        debug!(event_id = %entry.event_id, attempts = entry.attempts, "delivering outbox entry");

        match self.sink.deliver(entry).await {
            DeliveryOutcome::Delivered => {
                self.repository.mark_sent(&entry.event_id).await?;
            }
            DeliveryOutcome::Terminal(error) => {
                warn!(event_id = %entry.event_id, %error, "outbox entry failed permanently");
                self.repository.mark_failed(&entry.event_id, &error).await?;
            }
            DeliveryOutcome::Retryable(error) => {
                if entry.attempts + 1 >= self.max_attempts {
                    warn!(event_id = %entry.event_id, %error, "outbox entry exhausted retries");
                    self.repository.mark_failed(&entry.event_id, &error).await?;
                } else {
                    let delay = backoff_delay(entry.attempts, self.backoff_base_secs, self.backoff_cap_secs);
                    let next_attempt_at = chrono::Utc::now() + chrono::Duration::from_std(delay).unwrap_or_default();
                    self.repository
                        .mark_retry(&entry.event_id, &error, next_attempt_at)
                        .await?;
                }
            }
        }

        Ok(())
    }
}
