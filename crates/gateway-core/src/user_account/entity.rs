//! User Account Entity
//!
//! Mirrored from the upstream IdP. The gateway never deletes a user account
//! and never verifies a password against it directly; it upserts this row on
//! every successful login so the rest of the system has a stable local
//! identity to hang sessions, API keys, and UAI links off of.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    /// Opaque subject ID from the upstream IdP. Not a TSID.
    pub user_id: String,

    pub email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,

    /// IdP that authenticated this user, e.g. `"supabase"`, `"google"`.
    pub provider: String,

    /// Free-form claims the IdP attached to the token, kept for audit/display.
    pub raw_metadata: serde_json::Value,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sign_in_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserAccount {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>, provider: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            email: email.into(),
            role: None,
            plan: None,
            organization_id: None,
            provider: provider.into(),
            raw_metadata: serde_json::json!({}),
            last_sign_in_at: Some(now),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.organization_id = Some(organization_id.into());
        self
    }

    pub fn with_raw_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.raw_metadata = metadata;
        self
    }

    /// Apply the fields an IdP login carries, bumping `updated_at` and
    /// `last_sign_in_at`. Used to merge a fresh login against an existing row.
    pub fn apply_login(&mut self, email: &str, role: Option<&str>, plan: Option<&str>, raw_metadata: serde_json::Value) {
        self.email = email.to_string();
        self.role = role.map(String::from);
        self.plan = plan.map(String::from);
        self.raw_metadata = raw_metadata;
        self.last_sign_in_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sets_last_sign_in_at() {
        let account = UserAccount::new("idp-123", "user@example.com", "supabase");
        assert_eq!(account.user_id, "idp-123");
        assert!(account.last_sign_in_at.is_some());
        assert_eq!(account.role, None);
    }

    #[test]
    fn test_apply_login_updates_fields() {
        let mut account = UserAccount::new("idp-123", "user@example.com", "supabase");
        let original_updated_at = account.updated_at;
        std::thread::sleep(std::time::Duration::from_millis(2));
        account.apply_login("new@example.com", Some("admin"), Some("pro"), serde_json::json!({"k": "v"}));
        assert_eq!(account.email, "new@example.com");
        assert_eq!(account.role, Some("admin".to_string()));
        assert!(account.updated_at > original_updated_at);
    }
}
