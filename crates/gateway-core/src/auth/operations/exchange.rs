//! One-Time Code Exchange Use Case
//!
//! Consumes the code handed out by `LoginUseCase`, finds the session it was
//! bound to, and rotates it — the caller walks away with a fresh token pair
//! without the pair ever having been visible in a redirect URL.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::rotate::rotate_session_tokens;
use crate::auth::auth_service::AuthService;
use crate::auth::one_time_code_repository::OneTimeCodeRepository;
use crate::session::entity::Session;
use crate::session::operations::events::SessionRefreshed;
use crate::session::repository::SessionRepository;
use crate::user_account::repository::UserAccountRepository;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeOneTimeCodeCommand {
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExchangedUser {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone)]
pub struct ExchangeOutcome {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: &'static str,
    pub user: ExchangedUser,
}

pub struct ExchangeOneTimeCodeUseCase {
    one_time_codes: Arc<OneTimeCodeRepository>,
    sessions: Arc<SessionRepository>,
    user_accounts: Arc<UserAccountRepository>,
    auth_service: Arc<AuthService>,
    unit_of_work: Arc<UnitOfWork>,
}

impl ExchangeOneTimeCodeUseCase {
    pub fn new(
        one_time_codes: Arc<OneTimeCodeRepository>,
        sessions: Arc<SessionRepository>,
        user_accounts: Arc<UserAccountRepository>,
        auth_service: Arc<AuthService>,
        unit_of_work: Arc<UnitOfWork>,
    ) -> Self {
        Self { one_time_codes, sessions, user_accounts, auth_service, unit_of_work }
    }

    pub async fn execute(&self, command: ExchangeOneTimeCodeCommand, ctx: ExecutionContext) -> (UseCaseResult<SessionRefreshed>, Option<ExchangeOutcome>) {
        let code = match self.one_time_codes.consume(&command.code).await {
            Ok(Some(code)) => code,
            Ok(None) => return (UseCaseResult::failure(UseCaseError::validation("INVALID_CODE", "invalid or expired code")), None),
            Err(e) => return (UseCaseResult::failure(UseCaseError::commit(e.to_string())), None),
        };

        let refresh_hash = Session::hash_token(&code.refresh_token);
        let session = match self.sessions.find_by_refresh_token_hash(&refresh_hash).await {
            Ok(Some(session)) if session.is_valid() => session,
            Ok(_) => return (UseCaseResult::failure(UseCaseError::validation("INVALID_CODE", "session for this code no longer exists")), None),
            Err(e) => return (UseCaseResult::failure(UseCaseError::commit(e.to_string())), None),
        };

        let account = match self.user_accounts.find_by_user_id(&code.user_id).await {
            Ok(Some(account)) => account,
            Ok(None) => return (UseCaseResult::failure(UseCaseError::not_found("USER_NOT_FOUND", "user account not found")), None),
            Err(e) => return (UseCaseResult::failure(UseCaseError::commit(e.to_string())), None),
        };

        let (result, tokens) = rotate_session_tokens(&self.auth_service, &self.sessions, &self.unit_of_work, &session, &account, ctx, &command).await;
        let Some(tokens) = tokens else { return (result, None) };

        let outcome = ExchangeOutcome {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            token_type: "bearer",
            user: ExchangedUser { id: account.user_id, email: account.email },
        };
        (result, Some(outcome))
    }
}
