//! Token Refresh Use Case
//!
//! `POST /v1/auth/refresh`. Simple rotation, no reuse-detection chain — that
//! protection lives in the OAuth `refresh_token` grant at `/oauth/token`,
//! which tracks rotation lineage per client.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::rotate::rotate_session_tokens;
use crate::auth::auth_service::AuthService;
use crate::session::entity::Session;
use crate::session::operations::events::SessionRefreshed;
use crate::session::repository::SessionRepository;
use crate::user_account::repository::UserAccountRepository;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenCommand {
    #[serde(skip)]
    pub refresh_token: String,
}

#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: &'static str,
}

pub struct RefreshTokenUseCase {
    sessions: Arc<SessionRepository>,
    user_accounts: Arc<UserAccountRepository>,
    auth_service: Arc<AuthService>,
    unit_of_work: Arc<UnitOfWork>,
}

impl RefreshTokenUseCase {
    pub fn new(
        sessions: Arc<SessionRepository>,
        user_accounts: Arc<UserAccountRepository>,
        auth_service: Arc<AuthService>,
        unit_of_work: Arc<UnitOfWork>,
    ) -> Self {
        Self { sessions, user_accounts, auth_service, unit_of_work }
    }

    pub async fn execute(&self, command: RefreshTokenCommand, ctx: ExecutionContext) -> (UseCaseResult<SessionRefreshed>, Option<RefreshOutcome>) {
        let hash = Session::hash_token(&command.refresh_token);
        let session = match self.sessions.find_by_refresh_token_hash(&hash).await {
            Ok(Some(session)) if session.is_valid() => session,
            Ok(_) => return (UseCaseResult::failure(UseCaseError::validation("REFRESH_FAILED", "invalid or expired refresh token")), None),
            Err(e) => return (UseCaseResult::failure(UseCaseError::commit(e.to_string())), None),
        };

        let account = match self.user_accounts.find_by_user_id(&session.user_id).await {
            Ok(Some(account)) => account,
            Ok(None) => return (UseCaseResult::failure(UseCaseError::not_found("USER_NOT_FOUND", "user account not found")), None),
            Err(e) => return (UseCaseResult::failure(UseCaseError::commit(e.to_string())), None),
        };

        let (result, tokens) = rotate_session_tokens(&self.auth_service, &self.sessions, &self.unit_of_work, &session, &account, ctx, &command).await;
        let Some(tokens) = tokens else { return (result, None) };

        (
            result,
            Some(RefreshOutcome {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
                expires_in: tokens.expires_in,
                token_type: "bearer",
            }),
        )
    }
}
