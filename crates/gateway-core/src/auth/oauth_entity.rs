//! OAuth Client Entity
//!
//! A registered relying party for the Authorization Code + PKCE flow.
//! Public clients (SPAs, CLIs, mobile apps) can't keep a secret and must
//! present PKCE; confidential clients authenticate with `client_secret`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
#[serde(rename_all = "snake_case")]
pub enum OAuthClientType {
    Public,
    Confidential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
#[serde(rename_all = "snake_case")]
pub enum OAuthClientStatus {
    Active,
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OAuthClient {
    pub client_id: String,
    pub client_name: String,
    pub client_type: OAuthClientType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret_hash: Option<String>,
    pub require_pkce: bool,
    /// Stored as a JSON array, same convention as `ApiKey::scopes`.
    pub allowed_redirect_uris: serde_json::Value,
    pub allowed_scopes: serde_json::Value,
    pub default_scopes: serde_json::Value,
    pub status: OAuthClientStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OAuthClient {
    pub fn new_public(client_id: impl Into<String>, client_name: impl Into<String>, redirect_uris: Vec<String>, allowed_scopes: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            client_id: client_id.into(),
            client_name: client_name.into(),
            client_type: OAuthClientType::Public,
            client_secret_hash: None,
            require_pkce: true,
            allowed_redirect_uris: serde_json::json!(redirect_uris),
            allowed_scopes: serde_json::json!(allowed_scopes),
            default_scopes: serde_json::json!(Vec::<String>::new()),
            status: OAuthClientStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn new_confidential(client_id: impl Into<String>, client_name: impl Into<String>, client_secret_hash: impl Into<String>, redirect_uris: Vec<String>, allowed_scopes: Vec<String>) -> Self {
        let mut client = Self::new_public(client_id, client_name, redirect_uris, allowed_scopes);
        client.client_type = OAuthClientType::Confidential;
        client.client_secret_hash = Some(client_secret_hash.into());
        client.require_pkce = false;
        client
    }

    pub fn hash_secret(secret: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(secret.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn verify_secret(&self, presented: &str) -> bool {
        match &self.client_secret_hash {
            Some(hash) => *hash == Self::hash_secret(presented),
            None => false,
        }
    }

    pub fn redirect_uris_vec(&self) -> Vec<String> {
        json_strings(&self.allowed_redirect_uris)
    }

    pub fn allowed_scopes_vec(&self) -> Vec<String> {
        json_strings(&self.allowed_scopes)
    }

    pub fn default_scopes_vec(&self) -> Vec<String> {
        json_strings(&self.default_scopes)
    }

    pub fn is_active(&self) -> bool {
        self.status == OAuthClientStatus::Active
    }

    pub fn is_redirect_uri_allowed(&self, uri: &str) -> bool {
        self.redirect_uris_vec().iter().any(|allowed| allowed == uri)
    }

    pub fn is_scope_allowed(&self, scope: &str) -> bool {
        self.allowed_scopes_vec().iter().any(|allowed| allowed == scope)
    }
}

fn json_strings(value: &serde_json::Value) -> Vec<String> {
    value
        .as_array()
        .map(|arr| arr.iter().filter_map(|v| v.as_str().map(String::from)).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_client_requires_pkce_and_has_no_secret() {
        let client = OAuthClient::new_public("cli-prod", "CLI", vec!["http://localhost:8080/callback".into()], vec!["memories.read".into()]);
        assert!(client.require_pkce);
        assert!(client.client_secret_hash.is_none());
        assert!(!client.verify_secret("anything"));
    }

    #[test]
    fn test_confidential_client_verifies_secret() {
        let hash = OAuthClient::hash_secret("s3cr3t");
        let client = OAuthClient::new_confidential("svc-a", "Service A", hash, vec![], vec![]);
        assert!(client.verify_secret("s3cr3t"));
        assert!(!client.verify_secret("wrong"));
    }

    #[test]
    fn test_redirect_uri_exact_match_only() {
        let client = OAuthClient::new_public("cli", "CLI", vec!["https://app.example.com/cb".into()], vec![]);
        assert!(client.is_redirect_uri_allowed("https://app.example.com/cb"));
        assert!(!client.is_redirect_uri_allowed("https://app.example.com/cb2"));
    }
}
