//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "application.toml",
    "gateway.toml",
    "./config/config.toml",
    "./config/application.toml",
    "/etc/auth-gateway/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        self.apply_env_overrides(&mut config);

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        if let Ok(path) = env::var("GATEWAY_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        for path in CONFIG_PATHS {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&self, config: &mut AppConfig) {
        // HTTP
        if let Ok(val) = env::var("GATEWAY_HTTP_PORT") {
            if let Ok(port) = val.parse() {
                config.http.port = port;
            }
        }
        if let Ok(val) = env::var("GATEWAY_HTTP_HOST") {
            config.http.host = val;
        }
        if let Ok(val) = env::var("GATEWAY_CORS_ORIGINS") {
            config.http.cors_origins = val.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(val) = env::var("GATEWAY_HTTP_MAX_BODY_BYTES") {
            if let Ok(n) = val.parse() {
                config.http.max_body_bytes = n;
            }
        }

        // Database
        if let Ok(val) = env::var("GATEWAY_DATABASE_URL") {
            config.database.url = val;
        }
        if let Ok(val) = env::var("GATEWAY_DATABASE_POOL_SIZE") {
            if let Ok(size) = val.parse() {
                config.database.pool_size = size;
            }
        }

        // IdP
        if let Ok(val) = env::var("GATEWAY_IDP_BASE_URL") {
            config.idp.base_url = val;
        }
        if let Ok(val) = env::var("GATEWAY_IDP_ANON_KEY") {
            config.idp.anon_key = val;
        }
        if let Ok(val) = env::var("GATEWAY_IDP_SERVICE_KEY") {
            config.idp.service_key = val;
        }
        if let Ok(val) = env::var("GATEWAY_IDP_TIMEOUT_SECS") {
            if let Ok(t) = val.parse() {
                config.idp.timeout_secs = t;
            }
        }

        // Auth / JWT
        if let Ok(val) = env::var("GATEWAY_AUTH_ALGORITHM") {
            config.auth.algorithm = val;
        }
        if let Ok(val) = env::var("GATEWAY_JWT_SECRET") {
            config.auth.jwt_secret = val;
        }
        if let Ok(val) = env::var("GATEWAY_RSA_KEY_DIR") {
            config.auth.rsa_key_dir = val;
        }
        if let Ok(val) = env::var("GATEWAY_ACCESS_TOKEN_TTL_SECS") {
            if let Ok(t) = val.parse() {
                config.auth.access_token_ttl_secs = t;
            }
        }
        if let Ok(val) = env::var("GATEWAY_REFRESH_TOKEN_TTL_SECS") {
            if let Ok(t) = val.parse() {
                config.auth.refresh_token_ttl_secs = t;
            }
        }

        // API keys
        if let Ok(val) = env::var("GATEWAY_API_KEY_PREFIXES") {
            config.api_keys.prefixes = val.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(val) = env::var("GATEWAY_API_KEY_LEGACY_FALLBACK") {
            config.api_keys.legacy_plaintext_fallback = val.parse().unwrap_or(true);
        }

        // Admin bypass
        if let Ok(val) = env::var("GATEWAY_ADMIN_EMAIL") {
            config.admin_bypass.email = val;
        }
        if let Ok(val) = env::var("GATEWAY_ADMIN_PASSWORD_HASH") {
            config.admin_bypass.password_hash = val;
        }

        // Outbox
        if let Ok(val) = env::var("GATEWAY_OUTBOX_DESTINATION_URL") {
            config.outbox.destination_url = val;
        }
        if let Ok(val) = env::var("GATEWAY_OUTBOX_POLL_INTERVAL_MS") {
            if let Ok(interval) = val.parse() {
                config.outbox.poll_interval_ms = interval;
            }
        }
        if let Ok(val) = env::var("GATEWAY_OUTBOX_BATCH_SIZE") {
            if let Ok(size) = val.parse() {
                config.outbox.batch_size = size;
            }
        }
        if let Ok(val) = env::var("GATEWAY_OUTBOX_MAX_ATTEMPTS") {
            if let Ok(n) = val.parse() {
                config.outbox.max_attempts = n;
            }
        }

        // Rate limit
        if let Ok(val) = env::var("GATEWAY_RATE_LIMIT_LOGIN_PER_MINUTE") {
            if let Ok(n) = val.parse() {
                config.rate_limit.login_per_minute = n;
            }
        }
        if let Ok(val) = env::var("GATEWAY_RATE_LIMIT_TOKEN_PER_MINUTE") {
            if let Ok(n) = val.parse() {
                config.rate_limit.token_per_minute = n;
            }
        }

        // Cookie
        if let Ok(val) = env::var("GATEWAY_COOKIE_NAME") {
            config.cookie.name = val;
        }
        if let Ok(val) = env::var("GATEWAY_COOKIE_PARENT_DOMAIN") {
            config.cookie.parent_domain = val;
        }
        if let Ok(val) = env::var("GATEWAY_COOKIE_SECURE") {
            config.cookie.secure = val.parse().unwrap_or(true);
        }
        if let Ok(val) = env::var("GATEWAY_COOKIE_SAME_SITE") {
            config.cookie.same_site = val;
        }

        // General
        if let Ok(val) = env::var("GATEWAY_DEV_MODE") {
            config.dev_mode = val.parse().unwrap_or(false);
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_file_none_when_absent() {
        let loader = ConfigLoader::with_path("/nonexistent/gateway.toml");
        assert!(loader.find_config_file().is_none());
    }

    #[test]
    fn test_default_config_has_sane_ttls() {
        let config = AppConfig::default();
        assert_eq!(config.auth.access_token_ttl_secs, 3600);
        assert_eq!(config.auth.refresh_token_ttl_secs, 2_592_000);
        assert_eq!(config.auth.one_time_code_ttl_secs, 120);
    }
}
