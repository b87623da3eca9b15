//! Create API Key Use Case
//!
//! The cleartext key is generated here and returned exactly once; only its
//! hash and display prefix survive past this call.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::events::ApiKeyCreated;
use crate::api_key::entity::{AccessLevel, ApiKey};
use crate::api_key::repository::ApiKeyRepository;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApiKeyCommand {
    pub user_id: String,
    pub name: String,
    pub scopes: Vec<String>,
    pub access_level: AccessLevel,
    pub expires_at: Option<DateTime<Utc>>,
    /// Configured namespace prefix, e.g. `lano`, `lms`, `pk`.
    pub prefix_namespace: String,
}

/// Result of a successful creation. `cleartext` is shown to the caller once
/// and never stored.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedApiKey {
    pub key_id: String,
    pub cleartext: String,
}

pub struct CreateApiKeyUseCase {
    repo: Arc<ApiKeyRepository>,
    unit_of_work: Arc<UnitOfWork>,
}

impl CreateApiKeyUseCase {
    pub fn new(repo: Arc<ApiKeyRepository>, unit_of_work: Arc<UnitOfWork>) -> Self {
        Self { repo, unit_of_work }
    }

    pub async fn execute(
        &self,
        command: CreateApiKeyCommand,
        ctx: ExecutionContext,
    ) -> (UseCaseResult<ApiKeyCreated>, Option<CreatedApiKey>) {
        let (cleartext, key_hash, prefix) = ApiKey::generate_cleartext(&command.prefix_namespace);
        let key = ApiKey::new(
            &command.user_id,
            &command.name,
            &key_hash,
            &prefix,
            command.scopes.clone(),
            command.access_level,
            command.expires_at,
        );

        let mut tx = match self.unit_of_work.begin().await {
            Ok(tx) => tx,
            Err(e) => return (UseCaseResult::failure(UseCaseError::commit(e.to_string())), None),
        };

        if let Err(e) = self.repo.insert(tx.connection(), &key).await {
            let _ = tx.rollback().await;
            return (UseCaseResult::failure(UseCaseError::commit(e.to_string())), None);
        }

        let event = ApiKeyCreated::new(&ctx, &key.key_id, &key.user_id, &key.name);
        let result = tx.commit(event, &command).await;

        if result.is_success() {
            let created = CreatedApiKey { key_id: key.key_id, cleartext };
            (result, Some(created))
        } else {
            (result, None)
        }
    }
}
