//! API Key Entity
//!
//! Key format: `<prefix>_<base62-random-192bits>`. Only `key_hash =
//! SHA256(cleartext)` is ever persisted; `prefix` is the first 8 cleartext
//! characters kept around for display in key-management UIs.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const BASE62_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    Public,
    Authenticated,
    Team,
    Admin,
    Enterprise,
}

impl std::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Public => "public",
            Self::Authenticated => "authenticated",
            Self::Team => "team",
            Self::Admin => "admin",
            Self::Enterprise => "enterprise",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for AccessLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "authenticated" => Ok(Self::Authenticated),
            "team" => Ok(Self::Team),
            "admin" => Ok(Self::Admin),
            "enterprise" => Ok(Self::Enterprise),
            other => Err(format!("unknown access level: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub key_id: String,
    pub user_id: String,
    pub name: String,
    pub key_hash: String,
    pub prefix: String,
    /// Ordered, stored as a JSON array — simplest representation that still
    /// preserves the insertion order the spec's scope-matching rules rely on.
    pub scopes: serde_json::Value,
    pub access_level: String,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Set only for records migrated from the legacy plaintext-key corpus;
    /// cleared the first time a re-hash happens.
    #[serde(skip_serializing)]
    pub legacy_cleartext: Option<String>,
}

impl ApiKey {
    /// Generate `(cleartext, key_hash, prefix)` for a fresh key in the given namespace.
    pub fn generate_cleartext(prefix_namespace: &str) -> (String, String, String) {
        let mut rng = rand::thread_rng();
        let random_part: String = (0..32)
            .map(|_| {
                let idx = rng.gen_range(0..BASE62_ALPHABET.len());
                BASE62_ALPHABET[idx] as char
            })
            .collect();
        let cleartext = format!("{}_{}", prefix_namespace, random_part);
        let key_hash = Self::hash(&cleartext);
        let prefix = cleartext.chars().take(8).collect();
        (cleartext, key_hash, prefix)
    }

    pub fn hash(cleartext: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(cleartext.as_bytes());
        hex::encode(hasher.finalize())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        key_hash: impl Into<String>,
        prefix: impl Into<String>,
        scopes: Vec<String>,
        access_level: AccessLevel,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            key_id: crate::TsidGenerator::generate(),
            user_id: user_id.into(),
            name: name.into(),
            key_hash: key_hash.into(),
            prefix: prefix.into(),
            scopes: serde_json::json!(scopes),
            access_level: access_level.to_string(),
            is_active: true,
            expires_at,
            last_used_at: None,
            created_at: Utc::now(),
            legacy_cleartext: None,
        }
    }

    pub fn scopes_vec(&self) -> Vec<String> {
        self.scopes
            .as_array()
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(String::from)).collect())
            .unwrap_or_default()
    }

    /// `is_active ∧ (expires_at IS NULL ∨ now < expires_at)`.
    pub fn is_valid(&self) -> bool {
        self.is_active && self.expires_at.map(|exp| Utc::now() < exp).unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_cleartext_shape() {
        let (cleartext, hash, prefix) = ApiKey::generate_cleartext("lano");
        assert!(cleartext.starts_with("lano_"));
        assert_eq!(hash, ApiKey::hash(&cleartext));
        assert_eq!(prefix, cleartext.chars().take(8).collect::<String>());
    }

    #[test]
    fn test_revoked_key_never_valid() {
        let mut key = ApiKey::new("u1", "ci key", "hash", "lano_abc", vec!["memories.read".into()], AccessLevel::Authenticated, None);
        assert!(key.is_valid());
        key.is_active = false;
        assert!(!key.is_valid());
    }

    #[test]
    fn test_expired_key_invalid() {
        let key = ApiKey::new(
            "u1",
            "ci key",
            "hash",
            "lano_abc",
            vec![],
            AccessLevel::Authenticated,
            Some(Utc::now() - chrono::Duration::seconds(1)),
        );
        assert!(!key.is_valid());
    }
}
