//! One-Time Code
//!
//! The cross-origin login hand-off bearer issued by `POST /v1/auth/login`
//! when `redirect_to` is set, consumed by `POST /v1/auth/exchange`. Holds
//! the raw refresh token in a dedicated column guarded by `used` + a strict
//! TTL; the row is deleted on first read-and-consume, bounding exposure to
//! the single-use window (see DESIGN.md for why this isn't encrypted
//! separately).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OneTimeCode {
    pub code: String,
    pub user_id: String,
    /// The raw refresh token, present only until consumed. Never returned
    /// in any API response — callers read it once, inside the same
    /// transaction that deletes the row.
    #[serde(skip_serializing)]
    pub refresh_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
}

impl OneTimeCode {
    const TTL_SECS: i64 = 120;

    pub fn new(code: impl Into<String>, user_id: impl Into<String>, refresh_token: impl Into<String>, state: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            code: code.into(),
            user_id: user_id.into(),
            refresh_token: refresh_token.into(),
            state,
            created_at: now,
            expires_at: now + Duration::seconds(Self::TTL_SECS),
            used: false,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        !self.used && !self.is_expired()
    }

    /// 192 bits of entropy, base64url encoded, per the token-format table.
    pub fn generate_code() -> String {
        use base64::Engine;
        use rand::RngCore;
        let mut bytes = [0u8; 24];
        rand::thread_rng().fill_bytes(&mut bytes);
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_code_is_valid() {
        let code = OneTimeCode::new("abc", "user-1", "refresh-xyz", None);
        assert!(code.is_valid());
        assert!(!code.is_expired());
    }

    #[test]
    fn test_expired_code_is_invalid() {
        let mut code = OneTimeCode::new("abc", "user-1", "refresh-xyz", None);
        code.expires_at = Utc::now() - Duration::seconds(1);
        assert!(!code.is_valid());
    }
}
