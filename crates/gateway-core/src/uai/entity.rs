//! Universal Account Identity (UAI) Entities
//!
//! A UAI is the stable identity a user keeps across every credential method
//! (IdP JWT, API key, OAuth client) that has ever authenticated as them. A
//! `CredentialLink` row ties one `(method, identifier)` pair to exactly one
//! UAI; `identifier` is never stored in the clear, only its hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Uai {
    pub universal_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Uai {
    pub fn new(primary_email: Option<String>) -> Self {
        Self {
            universal_id: Uuid::new_v4().to_string(),
            primary_email,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CredentialLink {
    pub method: String,
    pub identifier_hash: String,
    pub universal_id: String,
    pub linked_at: DateTime<Utc>,
}

impl CredentialLink {
    /// `SHA256(method || ":" || identifier)`, hex-encoded.
    pub fn hash_identifier(method: &str, identifier: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(method.as_bytes());
        hasher.update(b":");
        hasher.update(identifier.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn new(method: impl Into<String>, identifier_hash: impl Into<String>, universal_id: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            identifier_hash: identifier_hash.into(),
            universal_id: universal_id.into(),
            linked_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_identifier_is_deterministic() {
        let a = CredentialLink::hash_identifier("supabase_jwt", "u1");
        let b = CredentialLink::hash_identifier("supabase_jwt", "u1");
        assert_eq!(a, b);
    }

    #[test]
    fn test_hash_identifier_distinguishes_method() {
        let a = CredentialLink::hash_identifier("supabase_jwt", "u1");
        let b = CredentialLink::hash_identifier("api_key", "u1");
        assert_ne!(a, b);
    }

    #[test]
    fn test_new_uai_generates_unique_ids() {
        let a = Uai::new(None);
        let b = Uai::new(None);
        assert_ne!(a.universal_id, b.universal_id);
    }
}
