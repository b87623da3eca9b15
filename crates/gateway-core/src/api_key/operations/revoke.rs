//! Revoke API Key Use Case
//!
//! Idempotent: revoking an already-revoked key still commits a
//! `ApiKeyRevoked` event. A revoked key must never validate again.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::events::ApiKeyRevoked;
use crate::api_key::repository::ApiKeyRepository;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeApiKeyCommand {
    pub key_id: String,
}

pub struct RevokeApiKeyUseCase {
    repo: Arc<ApiKeyRepository>,
    unit_of_work: Arc<UnitOfWork>,
}

impl RevokeApiKeyUseCase {
    pub fn new(repo: Arc<ApiKeyRepository>, unit_of_work: Arc<UnitOfWork>) -> Self {
        Self { repo, unit_of_work }
    }

    pub async fn execute(&self, command: RevokeApiKeyCommand, ctx: ExecutionContext) -> UseCaseResult<ApiKeyRevoked> {
        let mut tx = match self.unit_of_work.begin().await {
            Ok(tx) => tx,
            Err(e) => return UseCaseResult::failure(UseCaseError::commit(e.to_string())),
        };

        if let Err(e) = self.repo.revoke(tx.connection(), &command.key_id).await {
            let _ = tx.rollback().await;
            return UseCaseResult::failure(UseCaseError::commit(e.to_string()));
        }

        let event = ApiKeyRevoked::new(&ctx, &command.key_id);
        tx.commit(event, &command).await
    }
}
