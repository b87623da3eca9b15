//! Session Entity
//!
//! A platform-scoped live credential. Never stores a cleartext token; both
//! the access and refresh token are hashed (SHA-256 hex) before the row
//! exists at all, so a leaked database dump never yields a bearer token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Web,
    Mcp,
    Cli,
    Api,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Web => "web",
            Self::Mcp => "mcp",
            Self::Cli => "cli",
            Self::Api => "api",
        };
        write!(f, "{}", s)
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::Web
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "web" => Ok(Self::Web),
            "mcp" => Ok(Self::Mcp),
            "cli" => Ok(Self::Cli),
            "api" => Ok(Self::Api),
            other => Err(format!("unknown platform: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: String,
    pub user_id: String,
    pub platform: String,
    pub access_token_hash: String,
    pub refresh_token_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
    /// The refresh token hash this session carried before its last rotation.
    /// Presenting it again after rotation is refresh-token reuse.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_refresh_token_hash: Option<String>,
}

impl Session {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: impl Into<String>,
        platform: Platform,
        access_token: &str,
        refresh_token: &str,
        ip_address: Option<String>,
        user_agent: Option<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            session_id: crate::TsidGenerator::generate(),
            user_id: user_id.into(),
            platform: platform.to_string(),
            access_token_hash: Self::hash_token(access_token),
            refresh_token_hash: Self::hash_token(refresh_token),
            ip_address,
            user_agent,
            created_at: Utc::now(),
            expires_at,
            revoked_at: None,
            previous_refresh_token_hash: None,
        }
    }

    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// `revoked_at IS NULL AND now < expires_at`.
    pub fn is_valid(&self) -> bool {
        self.revoked_at.is_none() && Utc::now() < self.expires_at
    }

    pub fn revoke(&mut self) {
        self.revoked_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_session_hashes_tokens() {
        let session = Session::new(
            "user-1",
            Platform::Web,
            "access-token-raw",
            "refresh-token-raw",
            Some("127.0.0.1".to_string()),
            None,
            Utc::now() + Duration::hours(1),
        );
        assert_ne!(session.access_token_hash, "access-token-raw");
        assert_eq!(session.access_token_hash.len(), 64);
        assert!(session.is_valid());
    }

    #[test]
    fn test_revoke_invalidates() {
        let mut session = Session::new(
            "user-1",
            Platform::Cli,
            "a",
            "b",
            None,
            None,
            Utc::now() + Duration::hours(1),
        );
        session.revoke();
        assert!(!session.is_valid());
    }

    #[test]
    fn test_expired_is_invalid() {
        let session = Session::new(
            "user-1",
            Platform::Api,
            "a",
            "b",
            None,
            None,
            Utc::now() - Duration::seconds(1),
        );
        assert!(!session.is_valid());
    }
}
