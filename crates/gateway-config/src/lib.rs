//! Auth Gateway Configuration System
//!
//! TOML-based configuration with environment variable override support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub idp: IdpConfig,
    pub auth: AuthConfig,
    pub api_keys: ApiKeyConfig,
    pub admin_bypass: AdminBypassConfig,
    pub outbox: OutboxConfig,
    pub rate_limit: RateLimitConfig,
    pub cookie: CookieConfig,

    /// Enable development mode (relaxed cookie security, verbose logging)
    pub dev_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            database: DatabaseConfig::default(),
            idp: IdpConfig::default(),
            auth: AuthConfig::default(),
            api_keys: ApiKeyConfig::default(),
            admin_bypass: AdminBypassConfig::default(),
            outbox: OutboxConfig::default(),
            rate_limit: RateLimitConfig::default(),
            cookie: CookieConfig::default(),
            dev_mode: false,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            cors_origins: vec!["http://localhost:4200".to_string()],
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Relational store configuration. Sessions, API keys, events, outbox rows,
/// UAI links, and the mirrored user table all live in this one database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/auth_gateway".to_string(),
            pool_size: 10,
        }
    }
}

/// Upstream identity provider the gateway delegates password verification,
/// OAuth provider dance, and email OTP dispatch to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdpConfig {
    pub base_url: String,
    pub anon_key: String,
    pub service_key: String,
    pub timeout_secs: u64,
}

impl Default for IdpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9999".to_string(),
            anon_key: String::new(),
            service_key: String::new(),
            timeout_secs: 10,
        }
    }
}

/// JWT signing configuration for access tokens and the admin-bypass token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// "hs256" or "rs256"
    pub algorithm: String,
    /// HS256 symmetric secret (>=32 bytes); ignored for rs256.
    pub jwt_secret: String,
    /// Directory RSA keys are generated into / loaded from for rs256.
    pub rsa_key_dir: String,
    pub access_token_ttl_secs: u64,
    pub refresh_token_ttl_secs: u64,
    pub one_time_code_ttl_secs: u64,
    pub authorization_code_ttl_secs: u64,
    pub device_code_ttl_secs: u64,
    pub device_code_poll_interval_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            algorithm: "hs256".to_string(),
            jwt_secret: String::new(),
            rsa_key_dir: "./.jwt-keys".to_string(),
            access_token_ttl_secs: 3600,
            refresh_token_ttl_secs: 2_592_000,
            one_time_code_ttl_secs: 120,
            authorization_code_ttl_secs: 60,
            device_code_ttl_secs: 600,
            device_code_poll_interval_secs: 5,
        }
    }
}

/// API key subsystem configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeyConfig {
    /// Recognized cleartext prefixes, e.g. "lano", "lms", "pk".
    pub prefixes: Vec<String>,
    /// Whether the legacy plaintext-equality fallback lookup is attempted.
    pub legacy_plaintext_fallback: bool,
}

impl Default for ApiKeyConfig {
    fn default() -> Self {
        Self {
            prefixes: vec!["lano".to_string(), "lms".to_string(), "pk".to_string()],
            legacy_plaintext_fallback: true,
        }
    }
}

/// Emergency admin bypass account configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminBypassConfig {
    pub email: String,
    /// Argon2id PHC hash. Empty means "not yet bootstrapped" — the bootstrap
    /// binary refuses to start the gateway until at least one admin exists.
    pub password_hash: String,
    pub token_ttl_secs: u64,
}

impl Default for AdminBypassConfig {
    fn default() -> Self {
        Self {
            email: String::new(),
            password_hash: String::new(),
            token_ttl_secs: 86_400,
        }
    }
}

/// Outbox delivery loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutboxConfig {
    /// Downstream read-model endpoint events are POSTed to.
    pub destination_url: String,
    pub poll_interval_ms: u64,
    pub batch_size: u32,
    pub max_attempts: i32,
    pub backoff_base_secs: u64,
    pub backoff_cap_secs: u64,
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            destination_url: "http://localhost:8090/events".to_string(),
            poll_interval_ms: 500,
            batch_size: 50,
            max_attempts: 12,
            backoff_base_secs: 1,
            backoff_cap_secs: 3600,
        }
    }
}

/// Token-bucket rate limit knobs per `(ip, route-class)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub login_per_minute: u32,
    pub token_per_minute: u32,
    pub introspect_per_minute: u32,
    pub generic_per_minute: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            login_per_minute: 10,
            token_per_minute: 60,
            introspect_per_minute: 600,
            generic_per_minute: 500,
        }
    }
}

/// Web SSO cookie configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieConfig {
    pub name: String,
    /// Parent domain the cookie is scoped to, e.g. ".lanonasis.com".
    pub parent_domain: String,
    pub secure: bool,
    /// "none", "lax", or "strict". Production cross-origin flows require "none".
    pub same_site: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "lanonasis_session".to_string(),
            parent_domain: String::new(),
            secure: true,
            same_site: "none".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        let loader = ConfigLoader::new();
        loader.load()
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# Auth Gateway Configuration
# Environment variables prefixed GATEWAY_ override these settings.

[http]
port = 8080
host = "0.0.0.0"
cors_origins = ["http://localhost:4200"]
max_body_bytes = 1048576

[database]
url = "postgres://localhost/auth_gateway"
pool_size = 10

[idp]
base_url = "http://localhost:9999"
anon_key = ""
service_key = ""
timeout_secs = 10

[auth]
algorithm = "hs256"  # hs256 or rs256
jwt_secret = ""
rsa_key_dir = "./.jwt-keys"
access_token_ttl_secs = 3600
refresh_token_ttl_secs = 2592000
one_time_code_ttl_secs = 120
authorization_code_ttl_secs = 60
device_code_ttl_secs = 600
device_code_poll_interval_secs = 5

[api_keys]
prefixes = ["lano", "lms", "pk"]
legacy_plaintext_fallback = true

[admin_bypass]
email = ""
password_hash = ""
token_ttl_secs = 86400

[outbox]
destination_url = "http://localhost:8090/events"
poll_interval_ms = 500
batch_size = 50
max_attempts = 12
backoff_base_secs = 1
backoff_cap_secs = 3600

[rate_limit]
login_per_minute = 10
token_per_minute = 60
introspect_per_minute = 600
generic_per_minute = 500

[cookie]
name = "lanonasis_session"
parent_domain = ""
secure = true
same_site = "none"

dev_mode = false
"#
        .to_string()
    }
}
