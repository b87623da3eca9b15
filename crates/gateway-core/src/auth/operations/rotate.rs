//! Shared session-rotation logic
//!
//! Both one-time-code exchange and `/v1/auth/refresh` mint a fresh
//! access/refresh pair for an existing session and update it in place.
//! Factored out so the two call sites can't drift on what "rotate" means.

use std::sync::Arc;

use crate::auth::auth_service::{generate_refresh_token, AuthService};
use crate::session::entity::Session;
use crate::session::operations::events::SessionRefreshed;
use crate::session::repository::SessionRepository;
use crate::user_account::entity::UserAccount;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use chrono::{Duration, Utc};
use serde::Serialize;

pub struct RotatedTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

#[allow(clippy::too_many_arguments)]
pub async fn rotate_session_tokens<C: Serialize + Send + Sync>(
    auth_service: &Arc<AuthService>,
    sessions: &Arc<SessionRepository>,
    unit_of_work: &Arc<UnitOfWork>,
    session: &Session,
    account: &UserAccount,
    ctx: ExecutionContext,
    command: &C,
) -> (UseCaseResult<SessionRefreshed>, Option<RotatedTokens>) {
    let access_token = match auth_service.generate_access_token(
        &account.user_id,
        Some(&account.email),
        account.role.as_deref().unwrap_or("user"),
        account.plan.as_deref(),
        account.organization_id.as_deref(),
        &session.platform,
        None,
    ) {
        Ok(token) => token,
        Err(e) => return (UseCaseResult::failure(UseCaseError::commit(e.to_string())), None),
    };
    let refresh_token = generate_refresh_token();
    let new_expires_at = Utc::now() + Duration::seconds(auth_service.refresh_token_expiry_secs());

    let mut tx = match unit_of_work.begin().await {
        Ok(tx) => tx,
        Err(e) => return (UseCaseResult::failure(UseCaseError::commit(e.to_string())), None),
    };

    match sessions
        .rotate(
            tx.connection(),
            &session.session_id,
            &Session::hash_token(&access_token),
            &Session::hash_token(&refresh_token),
            new_expires_at,
        )
        .await
    {
        Ok(true) => {}
        Ok(false) => {
            let _ = tx.rollback().await;
            return (UseCaseResult::failure(UseCaseError::validation("REFRESH_FAILED", "session is no longer active")), None);
        }
        Err(e) => {
            let _ = tx.rollback().await;
            return (UseCaseResult::failure(UseCaseError::commit(e.to_string())), None);
        }
    }

    let event = SessionRefreshed::new(&ctx, &session.session_id, &account.user_id);
    let result = tx.commit(event, command).await;
    if result.is_failure() {
        return (result, None);
    }

    let expires_in = auth_service.access_token_expiry_secs();
    (result, Some(RotatedTokens { access_token, refresh_token, expires_in }))
}
