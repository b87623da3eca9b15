//! Authorization Code
//!
//! Single-use, short-lived code issued on OAuth consent and exchanged for
//! tokens at `/oauth/token`. Bound to PKCE for public clients.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationCode {
    pub code: String,
    pub client_id: String,
    pub user_id: String,
    pub redirect_uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_challenge: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_challenge_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
}

impl AuthorizationCode {
    /// The spec caps authorization codes at 60 seconds, far shorter than a
    /// typical OAuth server, since this gateway issues them synchronously
    /// in the same request/redirect round trip as consent.
    const TTL_SECS: i64 = 60;

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        code: impl Into<String>,
        client_id: impl Into<String>,
        user_id: impl Into<String>,
        redirect_uri: impl Into<String>,
        scope: Option<String>,
        code_challenge: Option<String>,
        code_challenge_method: Option<String>,
        state: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            code: code.into(),
            client_id: client_id.into(),
            user_id: user_id.into(),
            redirect_uri: redirect_uri.into(),
            scope,
            code_challenge,
            code_challenge_method,
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

    /// Verify a presented PKCE `code_verifier` against the stored challenge.
    /// `S256`: `base64url(SHA256(verifier)) == challenge`. `plain`:
    /// `verifier == challenge`. No challenge recorded means PKCE wasn't
    /// used (confidential-client flow) and this always fails — callers must
    /// gate on `code_challenge.is_some()` before requiring PKCE.
    pub fn verify_pkce(&self, verifier: &str) -> bool {
        use base64::Engine;
        use sha2::{Digest, Sha256};

        let (Some(challenge), method) = (&self.code_challenge, self.code_challenge_method.as_deref().unwrap_or("S256")) else {
            return false;
        };

        match method {
            "plain" => verifier == challenge,
            _ => {
                let digest = Sha256::digest(verifier.as_bytes());
                let computed = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest);
                computed == *challenge
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code() -> AuthorizationCode {
        AuthorizationCode::new("abc123", "client-1", "user-1", "https://example.com/cb", None, None, None, None)
    }

    #[test]
    fn test_new_code_is_valid() {
        let code = code();
        assert!(!code.used);
        assert!(code.is_valid());
    }

    #[test]
    fn test_mark_used_invalidates() {
        let mut code = code();
        code.used = true;
        assert!(!code.is_valid());
    }

    #[test]
    fn test_pkce_s256_round_trip() {
        use base64::Engine;
        use sha2::{Digest, Sha256};

        let verifier = "a".repeat(43);
        let challenge = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));

        let mut code = code();
        code.code_challenge = Some(challenge);
        code.code_challenge_method = Some("S256".to_string());

        assert!(code.verify_pkce(&verifier));
        assert!(!code.verify_pkce("wrong-verifier"));
    }

    #[test]
    fn test_pkce_plain_method() {
        let mut code = code();
        code.code_challenge = Some("literal-value".to_string());
        code.code_challenge_method = Some("plain".to_string());

        assert!(code.verify_pkce("literal-value"));
        assert!(!code.verify_pkce("something-else"));
    }
}
