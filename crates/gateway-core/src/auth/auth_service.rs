//! Authentication Service
//!
//! JWT access-token generation and validation.
//! Supports both RS256 (RSA) for production and HS256 (HMAC) for development.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation, Algorithm};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use crate::shared::error::{PlatformError, Result};

/// JWT claims for access tokens, per the gateway's token contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject. Normally the user's `user_id`; for admin bypass tokens, `"admin:<email>"`.
    pub sub: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    pub role: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "organization_id")]
    pub organization_id: Option<String>,

    pub platform: String,

    #[serde(skip_serializing_if = "Option::is_none", rename = "project_scope")]
    pub project_scope: Option<String>,

    /// OAuth client this token was minted for. Only set for tokens issued
    /// through `/oauth/token`; absent for password-login sessions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Space-delimited OAuth scope string, present on the same tokens as `client_id`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// JWT ID (unique identifier).
    pub jti: String,

    /// Short-circuits `requireScopes` when true. Only ever set on admin bypass tokens.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bypass_all_checks: bool,
}

/// Configuration for the auth service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// RSA private key PEM content (for RS256). Takes precedence over `secret_key` if set.
    pub rsa_private_key: Option<String>,

    /// RSA public key PEM content (for RS256).
    pub rsa_public_key: Option<String>,

    /// JWT secret key for HS256 (fallback for development).
    pub secret_key: String,

    /// Token issuer.
    pub issuer: String,

    /// Token audience.
    pub audience: String,

    /// Access token expiration in seconds.
    pub access_token_expiry_secs: i64,

    /// Refresh token expiration in seconds.
    pub refresh_token_expiry_secs: i64,

    /// Admin bypass token expiration in seconds.
    pub admin_bypass_token_expiry_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            rsa_private_key: None,
            rsa_public_key: None,
            secret_key: String::new(),
            issuer: "lanonasis-gateway".to_string(),
            audience: "lanonasis-gateway".to_string(),
            access_token_expiry_secs: 3600,             // 1 hour
            refresh_token_expiry_secs: 86400 * 30,      // 30 days
            admin_bypass_token_expiry_secs: 86400,      // 24 hours
        }
    }
}

impl AuthConfig {
    /// Load RSA keys from file paths, falling back to env vars if files not found.
    pub fn load_rsa_keys(
        private_key_path: Option<&str>,
        public_key_path: Option<&str>,
    ) -> (Option<String>, Option<String>) {
        let private_key = private_key_path
            .and_then(|p| Self::load_key_from_path_or_env(p, "GATEWAY_JWT_PRIVATE_KEY"));

        let public_key = public_key_path
            .and_then(|p| Self::load_key_from_path_or_env(p, "GATEWAY_JWT_PUBLIC_KEY"));

        (private_key, public_key)
    }

    fn load_key_from_path_or_env(path: &str, env_var: &str) -> Option<String> {
        if !path.is_empty() {
            if let Ok(content) = fs::read_to_string(path) {
                info!("Loaded JWT key from file: {}", path);
                return Some(content);
            }
        }

        if let Ok(content) = std::env::var(env_var) {
            if !content.is_empty() {
                info!("Loaded JWT key from env: {}", env_var);
                return Some(content);
            }
        }

        None
    }

    /// Generate an RSA key pair and optionally persist it to a directory.
    /// Returns `(private_key_pem, public_key_pem)`.
    pub fn generate_rsa_keys(persist_dir: Option<&Path>) -> Result<(String, String)> {
        use rsa::{RsaPrivateKey, RsaPublicKey, pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding}};

        info!("Generating RSA key pair (2048 bit)");

        let mut rng = rand::thread_rng();
        let private_key = RsaPrivateKey::new(&mut rng, 2048)
            .map_err(|e| PlatformError::Internal { message: format!("Failed to generate RSA key: {}", e) })?;
        let public_key = RsaPublicKey::from(&private_key);

        let private_pem = private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|e| PlatformError::Internal { message: format!("Failed to encode private key: {}", e) })?
            .to_string();

        let public_pem = public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| PlatformError::Internal { message: format!("Failed to encode public key: {}", e) })?;

        if let Some(dir) = persist_dir {
            if let Err(e) = fs::create_dir_all(dir) {
                warn!("Could not create key directory: {}", e);
            } else {
                let private_path = dir.join("private.key");
                let public_path = dir.join("public.key");

                if let Err(e) = fs::write(&private_path, &private_pem) {
                    warn!("Could not persist private key: {}", e);
                } else if let Err(e) = fs::write(&public_path, &public_pem) {
                    warn!("Could not persist public key: {}", e);
                } else {
                    info!("Persisted RSA keys to {}", dir.display());
                }
            }
        }

        Ok((private_pem, public_pem))
    }

    /// Load or generate RSA keys:
    /// 1. Try loading from configured paths / env vars.
    /// 2. Try loading from the persisted `.jwt-keys` directory.
    /// 3. Generate new keys and persist them.
    pub fn load_or_generate_rsa_keys(
        private_key_path: Option<&str>,
        public_key_path: Option<&str>,
    ) -> Result<(String, String)> {
        let (private, public) = Self::load_rsa_keys(private_key_path, public_key_path);
        if let (Some(priv_key), Some(pub_key)) = (private, public) {
            return Ok((priv_key, pub_key));
        }

        let keys_dir = Path::new(".jwt-keys");
        let private_path = keys_dir.join("private.key");
        let public_path = keys_dir.join("public.key");

        if private_path.exists() && public_path.exists() {
            if let (Ok(priv_key), Ok(pub_key)) = (
                fs::read_to_string(&private_path),
                fs::read_to_string(&public_path),
            ) {
                info!("Loaded persisted RSA keys from .jwt-keys/");
                return Ok((priv_key, pub_key));
            }
        }

        Self::generate_rsa_keys(Some(keys_dir))
    }
}

/// RSA public key components for JWKS.
#[derive(Debug, Clone)]
pub struct RsaPublicKeyComponents {
    /// Modulus (n), base64url encoded.
    pub n: String,
    /// Exponent (e), base64url encoded.
    pub e: String,
}

/// Authentication service for access-token minting and verification.
pub struct AuthService {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    key_id: Option<String>,
    rsa_components: Option<RsaPublicKeyComponents>,
}

impl AuthService {
    /// Create an auth service backed by RSA keys (RS256) — recommended for production.
    pub fn new_with_rsa(config: AuthConfig, private_key_pem: &str, public_key_pem: &str) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|e| PlatformError::Internal { message: format!("Invalid RSA private key: {}", e) })?;

        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
            .map_err(|e| PlatformError::Internal { message: format!("Invalid RSA public key: {}", e) })?;

        let key_id = Self::generate_key_id(public_key_pem);
        let rsa_components = Self::extract_rsa_components(public_key_pem)?;

        info!("AuthService initialized with RS256 (key_id: {})", key_id);

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
            algorithm: Algorithm::RS256,
            key_id: Some(key_id),
            rsa_components: Some(rsa_components),
        })
    }

    fn extract_rsa_components(public_key_pem: &str) -> Result<RsaPublicKeyComponents> {
        use rsa::{RsaPublicKey, pkcs8::DecodePublicKey, traits::PublicKeyParts};
        use base64::Engine;

        let public_key = RsaPublicKey::from_public_key_pem(public_key_pem)
            .map_err(|e| PlatformError::Internal { message: format!("Failed to parse RSA public key: {}", e) })?;

        let n_bytes = public_key.n().to_bytes_be();
        let e_bytes = public_key.e().to_bytes_be();

        let n = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&n_bytes);
        let e = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&e_bytes);

        Ok(RsaPublicKeyComponents { n, e })
    }

    /// Create an auth service backed by an HMAC secret (HS256) — development/simple setups.
    pub fn new_with_secret(config: AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret_key.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret_key.as_bytes());

        info!("AuthService initialized with HS256");

        Self {
            config,
            encoding_key,
            decoding_key,
            algorithm: Algorithm::HS256,
            key_id: None,
            rsa_components: None,
        }
    }

    /// Create an auth service: RSA if keys are configured, HMAC otherwise.
    pub fn new(config: AuthConfig) -> Self {
        if let (Some(ref private_key), Some(ref public_key)) = (&config.rsa_private_key, &config.rsa_public_key) {
            match Self::new_with_rsa(config.clone(), private_key, public_key) {
                Ok(service) => return service,
                Err(e) => warn!("Failed to initialize RSA keys, falling back to HMAC: {}", e),
            }
        }

        Self::new_with_secret(config)
    }

    fn generate_key_id(public_key_pem: &str) -> String {
        use sha2::{Sha256, Digest};
        let mut hasher = Sha256::new();
        hasher.update(public_key_pem.as_bytes());
        let hash = hasher.finalize();
        base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, &hash[..6])
    }

    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref()
    }

    pub fn rsa_components(&self) -> Option<&RsaPublicKeyComponents> {
        self.rsa_components.as_ref()
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn access_token_expiry_secs(&self) -> i64 {
        self.config.access_token_expiry_secs
    }

    pub fn refresh_token_expiry_secs(&self) -> i64 {
        self.config.refresh_token_expiry_secs
    }

    /// Mint an access token for an authenticated user.
    #[allow(clippy::too_many_arguments)]
    pub fn generate_access_token(
        &self,
        user_id: &str,
        email: Option<&str>,
        role: &str,
        plan: Option<&str>,
        organization_id: Option<&str>,
        platform: &str,
        project_scope: Option<&str>,
    ) -> Result<String> {
        self.generate_access_token_for_client(user_id, email, role, plan, organization_id, platform, project_scope, None, None)
    }

    /// Same as [`Self::generate_access_token`] but also stamps `client_id`/`scope`,
    /// for tokens minted through an OAuth client grant so `/oauth/introspect`
    /// has something to report back.
    #[allow(clippy::too_many_arguments)]
    pub fn generate_access_token_for_client(
        &self,
        user_id: &str,
        email: Option<&str>,
        role: &str,
        plan: Option<&str>,
        organization_id: Option<&str>,
        platform: &str,
        project_scope: Option<&str>,
        client_id: Option<&str>,
        scope: Option<&str>,
    ) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.config.access_token_expiry_secs);

        let claims = AccessTokenClaims {
            sub: user_id.to_string(),
            email: email.map(String::from),
            role: role.to_string(),
            plan: plan.map(String::from),
            organization_id: organization_id.map(String::from),
            platform: platform.to_string(),
            project_scope: project_scope.map(String::from),
            client_id: client_id.map(String::from),
            scope: scope.map(String::from),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: crate::TsidGenerator::generate(),
            bypass_all_checks: false,
        };

        self.encode(&claims)
    }

    /// Mint an admin bypass token per the emergency override path.
    /// `bypass_all_checks` short-circuits scope enforcement in `requireScopes`.
    pub fn generate_admin_bypass_token(&self, email: &str) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.config.admin_bypass_token_expiry_secs);

        let claims = AccessTokenClaims {
            sub: format!("admin:{}", email),
            email: Some(email.to_string()),
            role: "admin_override".to_string(),
            plan: None,
            organization_id: None,
            platform: "admin".to_string(),
            project_scope: None,
            client_id: None,
            scope: None,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: crate::TsidGenerator::generate(),
            bypass_all_checks: true,
        };

        self.encode(&claims)
    }

    fn encode(&self, claims: &AccessTokenClaims) -> Result<String> {
        let mut header = Header::new(self.algorithm);
        header.kid = self.key_id.clone();
        encode(&header, claims, &self.encoding_key)
            .map_err(|e| PlatformError::Internal { message: format!("Failed to encode JWT: {}", e) })
    }

    /// Validate an access token and extract its claims.
    pub fn validate_token(&self, token: &str) -> Result<AccessTokenClaims> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(&[&self.config.issuer]);
        validation.validate_aud = false;

        decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => PlatformError::TokenExpired,
                _ => PlatformError::InvalidToken { message: format!("{}", e) },
            })
    }
}

/// Extract a bearer token from an `Authorization` header value.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// Mint an opaque 256-bit refresh token, base64url encoded. Never stored in
/// the clear — callers hash it via [`crate::Session::hash_token`] before
/// persisting.
pub fn generate_refresh_token() -> String {
    use base64::Engine;
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        let mut config = AuthConfig::default();
        config.secret_key = "test-secret-key-for-unit-tests".to_string();
        AuthService::new(config)
    }

    #[test]
    fn test_generate_and_validate_token() {
        let service = service();
        let token = service
            .generate_access_token("user-1", Some("a@b.c"), "user", None, None, "web", None)
            .unwrap();

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.platform, "web");
        assert!(!claims.bypass_all_checks);
    }

    #[test]
    fn test_admin_bypass_token_bypasses_checks() {
        let service = service();
        let token = service.generate_admin_bypass_token("admin@example.com").unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "admin:admin@example.com");
        assert_eq!(claims.role, "admin_override");
        assert!(claims.bypass_all_checks);
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("bearer abc123"), None);
        assert_eq!(extract_bearer_token("Basic abc123"), None);
    }
}
