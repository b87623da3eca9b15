//! Logout Use Case
//!
//! Always answers `{success: true}` from the HTTP layer regardless of
//! outcome — a distinguishable "no such session" response would let a
//! caller probe for live tokens (a revocation oracle).

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::session::entity::Session;
use crate::session::operations::events::SessionRevoked;
use crate::session::repository::SessionRepository;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutCommand {
    #[serde(skip)]
    pub access_token: String,
}

/// Whether this call actually revoked a session, or found nothing to do.
/// Both map to the same `{success: true}` HTTP response.
pub enum LogoutResult {
    NoSessionFound,
    Revoked(UseCaseResult<SessionRevoked>),
}

pub struct LogoutUseCase {
    sessions: Arc<SessionRepository>,
    unit_of_work: Arc<UnitOfWork>,
}

impl LogoutUseCase {
    pub fn new(sessions: Arc<SessionRepository>, unit_of_work: Arc<UnitOfWork>) -> Self {
        Self { sessions, unit_of_work }
    }

    pub async fn execute(&self, command: LogoutCommand, ctx: ExecutionContext) -> LogoutResult {
        let hash = Session::hash_token(&command.access_token);
        let session = match self.sessions.lookup_by_access_token_hash(&hash).await {
            Ok(Some(session)) if session.is_valid() => session,
            Ok(_) => return LogoutResult::NoSessionFound,
            Err(_) => return LogoutResult::NoSessionFound,
        };

        let mut tx = match self.unit_of_work.begin().await {
            Ok(tx) => tx,
            Err(e) => return LogoutResult::Revoked(UseCaseResult::failure(UseCaseError::commit(e.to_string()))),
        };

        match self.sessions.revoke(tx.connection(), &session.session_id).await {
            Ok(true) => {}
            Ok(false) => {
                let _ = tx.rollback().await;
                return LogoutResult::NoSessionFound;
            }
            Err(e) => {
                let _ = tx.rollback().await;
                return LogoutResult::Revoked(UseCaseResult::failure(UseCaseError::commit(e.to_string())));
            }
        }

        let event = SessionRevoked::new(&ctx, &session.session_id, "logout");
        LogoutResult::Revoked(tx.commit(event, &command).await)
    }
}
