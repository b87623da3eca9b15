//! Rotate API Key Use Case
//!
//! Issues a new key and deactivates the old record in the same transaction.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::events::ApiKeyRotated;
use crate::api_key::entity::ApiKey;
use crate::api_key::repository::ApiKeyRepository;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotateApiKeyCommand {
    pub key_id: String,
    pub prefix_namespace: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RotatedApiKey {
    pub key_id: String,
    pub new_cleartext: String,
}

pub struct RotateApiKeyUseCase {
    repo: Arc<ApiKeyRepository>,
    unit_of_work: Arc<UnitOfWork>,
}

impl RotateApiKeyUseCase {
    pub fn new(repo: Arc<ApiKeyRepository>, unit_of_work: Arc<UnitOfWork>) -> Self {
        Self { repo, unit_of_work }
    }

    pub async fn execute(
        &self,
        command: RotateApiKeyCommand,
        ctx: ExecutionContext,
    ) -> (UseCaseResult<ApiKeyRotated>, Option<RotatedApiKey>) {
        let old_key = match self.repo.find_by_id(&command.key_id).await {
            Ok(Some(key)) => key,
            Ok(None) => {
                return (
                    UseCaseResult::failure(UseCaseError::not_found(
                        "API_KEY_NOT_FOUND",
                        format!("api key {} not found", command.key_id),
                    )),
                    None,
                )
            }
            Err(e) => return (UseCaseResult::failure(UseCaseError::commit(e.to_string())), None),
        };

        let (cleartext, key_hash, prefix) = ApiKey::generate_cleartext(&command.prefix_namespace);
        let new_key = ApiKey::new(
            &old_key.user_id,
            &old_key.name,
            &key_hash,
            &prefix,
            old_key.scopes_vec(),
            old_key.access_level.parse().unwrap_or(crate::api_key::entity::AccessLevel::Authenticated),
            old_key.expires_at,
        );

        let mut tx = match self.unit_of_work.begin().await {
            Ok(tx) => tx,
            Err(e) => return (UseCaseResult::failure(UseCaseError::commit(e.to_string())), None),
        };

        if let Err(e) = self.repo.insert(tx.connection(), &new_key).await {
            let _ = tx.rollback().await;
            return (UseCaseResult::failure(UseCaseError::commit(e.to_string())), None);
        }

        if let Err(e) = self.repo.deactivate(tx.connection(), &old_key.key_id).await {
            let _ = tx.rollback().await;
            return (UseCaseResult::failure(UseCaseError::commit(e.to_string())), None);
        }

        let event = ApiKeyRotated::new(&ctx, &old_key.key_id, &new_key.key_id, &new_key.user_id);
        let result = tx.commit(event, &command).await;

        if result.is_success() {
            let rotated = RotatedApiKey { key_id: new_key.key_id, new_cleartext: cleartext };
            (result, Some(rotated))
        } else {
            (result, None)
        }
    }
}
