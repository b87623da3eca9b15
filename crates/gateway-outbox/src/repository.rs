//! Outbox persistence contract.
//!
//! One row per event destined for the downstream read-model projector.
//! `fetch_due` is expected to claim rows with `SELECT ... FOR UPDATE SKIP LOCKED`
//! so multiple processor instances can poll the same table safely.

use anyhow::Result;
use async_trait::async_trait;
use gateway_common::{OutboxEntry, OutboxStatus};
use std::time::Duration;

/// Outbox table name, overridable for tests that need isolated schemas.
#[derive(Debug, Clone)]
pub struct OutboxTableConfig {
    pub table: String,
}

impl Default for OutboxTableConfig {
    fn default() -> Self {
        Self {
            table: "outbox".to_string(),
        }
    }
}

#[async_trait]
pub trait OutboxRepository: Send + Sync {
    /// Claim up to `limit` entries that are pending and due, marking them IN_PROGRESS.
    async fn fetch_due(&self, limit: u32) -> Result<Vec<OutboxEntry>>;

    /// Mark an entry delivered.
    async fn mark_sent(&self, event_id: &str) -> Result<()>;

    /// Mark an entry for retry at `next_attempt_at`, recording the failure and
    /// incrementing `attempts`.
    async fn mark_retry(&self, event_id: &str, error: &str, next_attempt_at: chrono::DateTime<chrono::Utc>) -> Result<()>;

    /// Mark an entry permanently failed (attempts exhausted or terminal response).
    async fn mark_failed(&self, event_id: &str, error: &str) -> Result<()>;

    /// Reset entries stuck IN_PROGRESS past `timeout` back to PENDING.
    /// Returns the number of entries reset.
    async fn recover_stuck(&self, timeout: Duration) -> Result<u64>;

    async fn init_schema(&self) -> Result<()>;

    fn table_config(&self) -> &OutboxTableConfig;
}

/// Exponential backoff with full jitter: `rand(0, min(cap, base * 2^attempts))`.
pub fn backoff_delay(attempts: i32, base_secs: u64, cap_secs: u64) -> Duration {
    let exp = base_secs.saturating_mul(1u64.checked_shl(attempts.max(0) as u32).unwrap_or(u64::MAX));
    let bound = exp.min(cap_secs).max(1);
    let jittered = rand::random::<u64>() % bound + 1;
    Duration::from_secs(jittered)
}

pub fn initial_status() -> OutboxStatus {
    OutboxStatus::PENDING
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_delay_respects_cap() {
        for attempts in 0..20 {
            let d = backoff_delay(attempts, 1, 3600);
            assert!(d.as_secs() <= 3600);
            assert!(d.as_secs() >= 1);
        }
    }

    #[test]
    fn test_backoff_delay_grows_with_attempts() {
        let d0 = backoff_delay(0, 1, 3600);
        let d5 = backoff_delay(5, 1, 3600);
        assert!(d0.as_secs() <= 1);
        assert!(d5.as_secs() <= 32);
    }
}
