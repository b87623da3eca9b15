//! Create Session Use Case
//!
//! Runs at the end of every successful credential exchange (password login,
//! OAuth token grant, device code grant). Persists the session row and the
//! `SessionCreated` event in one transaction.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::events::SessionCreated;
use crate::session::entity::{Platform, Session};
use crate::session::repository::SessionRepository;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionCommand {
    pub user_id: String,
    pub platform: Platform,
    #[serde(skip)]
    pub access_token: String,
    #[serde(skip)]
    pub refresh_token: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub expires_at: DateTime<Utc>,
}

pub struct CreateSessionUseCase {
    repo: Arc<SessionRepository>,
    unit_of_work: Arc<UnitOfWork>,
}

impl CreateSessionUseCase {
    pub fn new(repo: Arc<SessionRepository>, unit_of_work: Arc<UnitOfWork>) -> Self {
        Self { repo, unit_of_work }
    }

    pub async fn execute(&self, command: CreateSessionCommand, ctx: ExecutionContext) -> UseCaseResult<SessionCreated> {
        let session = Session::new(
            &command.user_id,
            command.platform,
            &command.access_token,
            &command.refresh_token,
            command.ip_address.clone(),
            command.user_agent.clone(),
            command.expires_at,
        );

        let mut tx = match self.unit_of_work.begin().await {
            Ok(tx) => tx,
            Err(e) => return UseCaseResult::failure(UseCaseError::commit(e.to_string())),
        };

        if let Err(e) = self.repo.insert(tx.connection(), &session).await {
            let _ = tx.rollback().await;
            return UseCaseResult::failure(UseCaseError::commit(e.to_string()));
        }

        let event = SessionCreated::new(&ctx, &session.session_id, &session.user_id, &session.platform);
        tx.commit(event, &command).await
    }
}
