//! Validate API Key
//!
//! A pure read path: no domain event is emitted for a successful validation,
//! only the best-effort side effects the spec calls for (last-used timestamp,
//! legacy re-hash). Never promotes a revoked or expired key.

use std::sync::Arc;
use tracing::warn;

use crate::api_key::entity::ApiKey;
use crate::api_key::repository::ApiKeyRepository;

pub struct ValidateApiKeyUseCase {
    repo: Arc<ApiKeyRepository>,
}

impl ValidateApiKeyUseCase {
    pub fn new(repo: Arc<ApiKeyRepository>) -> Self {
        Self { repo }
    }

    /// 1. Hash the presented key and look it up directly.
    /// 2. If that misses, fall back to a plaintext match against legacy
    ///    records and schedule a re-hash.
    /// 3. Reject anything inactive or expired.
    /// 4. Touch `last_used_at` best-effort; never fail validation over it.
    pub async fn execute(&self, presented: &str) -> Option<ApiKey> {
        let key_hash = ApiKey::hash(presented);

        let found = match self.repo.find_by_hash(&key_hash).await {
            Ok(Some(key)) => Some(key),
            Ok(None) => match self.repo.find_by_legacy_cleartext(presented).await {
                Ok(Some(key)) => {
                    if let Err(e) = self.repo.rehash_legacy(&key.key_id, &key_hash).await {
                        warn!(key_id = %key.key_id, error = %e, "failed to rehash legacy api key");
                    }
                    Some(key)
                }
                Ok(None) => None,
                Err(e) => {
                    warn!(error = %e, "api key legacy lookup failed");
                    None
                }
            },
            Err(e) => {
                warn!(error = %e, "api key hash lookup failed");
                None
            }
        }?;

        if !found.is_valid() {
            return None;
        }

        if let Err(e) = self.repo.touch_last_used(&found.key_id).await {
            warn!(key_id = %found.key_id, error = %e, "failed to touch api key last_used_at");
        }

        Some(found)
    }
}
