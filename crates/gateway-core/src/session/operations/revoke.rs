//! Revoke Session Use Case
//!
//! Used by logout and by explicit session-management calls. Idempotent:
//! revoking an already-revoked or missing session still commits a
//! `SessionRevoked` event so callers never have to branch on prior state.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::events::SessionRevoked;
use crate::session::repository::SessionRepository;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeSessionCommand {
    pub session_id: String,
    pub reason: String,
}

pub struct RevokeSessionUseCase {
    repo: Arc<SessionRepository>,
    unit_of_work: Arc<UnitOfWork>,
}

impl RevokeSessionUseCase {
    pub fn new(repo: Arc<SessionRepository>, unit_of_work: Arc<UnitOfWork>) -> Self {
        Self { repo, unit_of_work }
    }

    pub async fn execute(&self, command: RevokeSessionCommand, ctx: ExecutionContext) -> UseCaseResult<SessionRevoked> {
        let mut tx = match self.unit_of_work.begin().await {
            Ok(tx) => tx,
            Err(e) => return UseCaseResult::failure(UseCaseError::commit(e.to_string())),
        };

        if let Err(e) = self.repo.revoke(tx.connection(), &command.session_id).await {
            let _ = tx.rollback().await;
            return UseCaseResult::failure(UseCaseError::commit(e.to_string()));
        }

        let event = SessionRevoked::new(&ctx, &command.session_id, &command.reason);
        tx.commit(event, &command).await
    }
}
