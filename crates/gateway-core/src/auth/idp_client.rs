//! Upstream Identity Provider Client
//!
//! The gateway delegates password verification, account creation, and email
//! OTP dispatch to an external IdP rather than owning user credentials
//! itself. Modeled as a trait, grounded on `gateway-outbox`'s
//! `EventSink`/`HttpEventSink` split, so tests can substitute a local fake
//! instead of reaching the network.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::shared::error::{PlatformError, Result};

/// The IdP's view of a user, enough to upsert a `UserAccount` row.
#[derive(Debug, Clone, Deserialize)]
pub struct IdpUser {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub raw_metadata: Option<serde_json::Value>,
}

#[async_trait]
pub trait IdpClient: Send + Sync {
    /// `POST /v1/auth/signup`: create an account upstream.
    async fn signup(&self, email: &str, password: &str, user_metadata: Option<serde_json::Value>) -> Result<IdpUser>;

    /// Verify a password for `POST /v1/auth/login`. Returns
    /// `PlatformError::Unauthorized` on any credential failure — the IdP's
    /// exact rejection reason is never surfaced to the caller.
    async fn verify_password(&self, email: &str, password: &str) -> Result<IdpUser>;
}

pub struct HttpIdpClient {
    base_url: String,
    anon_key: String,
    client: reqwest::Client,
}

impl HttpIdpClient {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| PlatformError::internal(format!("failed to build IdP HTTP client: {}", e)))?;
        Ok(Self { base_url: base_url.into(), anon_key: anon_key.into(), client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl IdpClient for HttpIdpClient {
    async fn signup(&self, email: &str, password: &str, user_metadata: Option<serde_json::Value>) -> Result<IdpUser> {
        let body = serde_json::json!({ "email": email, "password": password, "data": user_metadata });

        let response = self
            .client
            .post(self.url("/auth/v1/signup"))
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PlatformError::ServiceUnavailable { message: format!("IdP signup request failed: {}", e) })?;

        if !response.status().is_success() {
            return Err(PlatformError::SignupFailed { message: "IdP rejected signup".to_string() });
        }

        response
            .json::<IdpUser>()
            .await
            .map_err(|e| PlatformError::internal(format!("malformed IdP signup response: {}", e)))
    }

    async fn verify_password(&self, email: &str, password: &str) -> Result<IdpUser> {
        let body = serde_json::json!({ "email": email, "password": password });

        let response = self
            .client
            .post(self.url("/auth/v1/token?grant_type=password"))
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PlatformError::ServiceUnavailable { message: format!("IdP login request failed: {}", e) })?;

        if !response.status().is_success() {
            return Err(PlatformError::unauthorized("invalid email or password"));
        }

        response
            .json::<IdpUser>()
            .await
            .map_err(|e| PlatformError::internal(format!("malformed IdP login response: {}", e)))
    }
}

#[cfg(test)]
pub mod fake {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory `IdpClient` double: `(email -> (password, user))`.
    pub struct FakeIdpClient {
        users: Mutex<HashMap<String, (String, IdpUser)>>,
    }

    impl FakeIdpClient {
        pub fn new() -> Self {
            Self { users: Mutex::new(HashMap::new()) }
        }

        pub fn with_user(self, email: &str, password: &str, user_id: &str) -> Self {
            self.users.lock().unwrap().insert(
                email.to_string(),
                (password.to_string(), IdpUser { user_id: user_id.to_string(), email: email.to_string(), raw_metadata: None }),
            );
            self
        }
    }

    #[async_trait]
    impl IdpClient for FakeIdpClient {
        async fn signup(&self, email: &str, password: &str, _user_metadata: Option<serde_json::Value>) -> Result<IdpUser> {
            let user_id = crate::TsidGenerator::generate();
            let user = IdpUser { user_id, email: email.to_string(), raw_metadata: None };
            self.users.lock().unwrap().insert(email.to_string(), (password.to_string(), user.clone()));
            Ok(user)
        }

        async fn verify_password(&self, email: &str, password: &str) -> Result<IdpUser> {
            let users = self.users.lock().unwrap();
            match users.get(email) {
                Some((stored_password, user)) if stored_password == password => Ok(user.clone()),
                _ => Err(PlatformError::unauthorized("invalid email or password")),
            }
        }
    }
}
