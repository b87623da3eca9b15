//! Device Code
//!
//! Backs the OAuth device authorization grant for headless/CLI clients:
//! the device polls `/oauth/token` with `device_code` while a human visits
//! a verification URL and approves using the short `user_code`.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Crockford-style base32 without `0/O/1/I/L` so a human reading the code
/// off a screen can't confuse glyphs.
const USER_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
#[serde(rename_all = "snake_case")]
pub enum DeviceCodeStatus {
    Pending,
    Approved,
    Denied,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCode {
    pub device_code: String,
    pub user_code: String,
    pub client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    pub status: DeviceCodeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub interval_secs: i32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Last time this `device_code` was polled, for `slow_down` enforcement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_polled_at: Option<DateTime<Utc>>,
}

impl DeviceCode {
    const TTL_SECS: i64 = 600;
    const POLL_INTERVAL_SECS: i32 = 5;

    pub fn new(device_code: impl Into<String>, user_code: impl Into<String>, client_id: impl Into<String>, scope: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            device_code: device_code.into(),
            user_code: user_code.into(),
            client_id: client_id.into(),
            scope,
            status: DeviceCodeStatus::Pending,
            user_id: None,
            interval_secs: Self::POLL_INTERVAL_SECS,
            created_at: now,
            expires_at: now + Duration::seconds(Self::TTL_SECS),
            last_polled_at: None,
        }
    }

    pub fn generate_user_code() -> String {
        let mut rng = rand::thread_rng();
        let chars: String = (0..8)
            .map(|i| {
                if i == 4 {
                    '-'
                } else {
                    let idx = rng.gen_range(0..USER_CODE_ALPHABET.len());
                    USER_CODE_ALPHABET[idx] as char
                }
            })
            .collect();
        chars
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    pub fn approve(&mut self, user_id: impl Into<String>) {
        self.status = DeviceCodeStatus::Approved;
        self.user_id = Some(user_id.into());
    }

    pub fn deny(&mut self) {
        self.status = DeviceCodeStatus::Denied;
    }

    /// `true` when the device is polling faster than `interval_secs` allows,
    /// per RFC 8628's `slow_down` response.
    pub fn is_polling_too_fast(&self) -> bool {
        match self.last_polled_at {
            Some(last) => (Utc::now() - last).num_seconds() < self.interval_secs as i64,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_code_shape() {
        let code = DeviceCode::generate_user_code();
        assert_eq!(code.len(), 8);
        assert_eq!(code.chars().nth(4), Some('-'));
        for c in code.chars().filter(|c| *c != '-') {
            assert!(USER_CODE_ALPHABET.contains(&(c as u8)));
        }
    }

    #[test]
    fn test_approve_sets_user_and_status() {
        let mut code = DeviceCode::new("dc1", "ABCD-EFGH", "cli-1", None);
        code.approve("user-1");
        assert_eq!(code.status, DeviceCodeStatus::Approved);
        assert_eq!(code.user_id.as_deref(), Some("user-1"));
    }

    #[test]
    fn test_slow_down_detection() {
        let mut code = DeviceCode::new("dc1", "ABCD-EFGH", "cli-1", None);
        assert!(!code.is_polling_too_fast());
        code.last_polled_at = Some(Utc::now());
        assert!(code.is_polling_too_fast());
    }
}
