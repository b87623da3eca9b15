//! Password Login Use Case
//!
//! Forwards credentials to the upstream IdP, mirrors the account locally,
//! mints a session, and hands the caller back a one-time code rather than
//! the token pair directly — the code is exchanged at `/v1/auth/exchange`
//! (or followed via `redirect_to`), so an access/refresh pair is never
//! echoed into a URL or a log line.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::auth_service::{generate_refresh_token, AuthService};
use crate::auth::idp_client::IdpClient;
use crate::auth::one_time_code::OneTimeCode;
use crate::auth::one_time_code_repository::OneTimeCodeRepository;
use crate::session::entity::{Platform, Session};
use crate::session::operations::create::{CreateSessionCommand, CreateSessionUseCase};
use crate::session::operations::events::SessionCreated;
use crate::user_account::operations::upsert::{UpsertUserAccountCommand, UpsertUserAccountUseCase};
use crate::usecase::{ExecutionContext, UseCaseError, UseCaseResult};
use crate::AuditService;
use chrono::{Duration, Utc};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginCommand {
    pub email: String,
    #[serde(skip)]
    pub password: String,
    #[serde(default)]
    pub platform: Platform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// What the HTTP layer does with a successful login — return the code as
/// JSON, or follow `redirect_to` with it attached.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    Code { code: String, expires_in: i64 },
    Redirect { location: String },
}

const ONE_TIME_CODE_TTL_SECS: i64 = 120;

pub struct LoginUseCase {
    idp_client: Arc<dyn IdpClient>,
    upsert_user: Arc<UpsertUserAccountUseCase>,
    create_session: Arc<CreateSessionUseCase>,
    one_time_codes: Arc<OneTimeCodeRepository>,
    auth_service: Arc<AuthService>,
    audit: Arc<AuditService>,
}

impl LoginUseCase {
    pub fn new(
        idp_client: Arc<dyn IdpClient>,
        upsert_user: Arc<UpsertUserAccountUseCase>,
        create_session: Arc<CreateSessionUseCase>,
        one_time_codes: Arc<OneTimeCodeRepository>,
        auth_service: Arc<AuthService>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self { idp_client, upsert_user, create_session, one_time_codes, auth_service, audit }
    }

    pub async fn execute(&self, command: LoginCommand, ctx: ExecutionContext) -> (UseCaseResult<SessionCreated>, Option<LoginOutcome>) {
        let idp_user = match self.idp_client.verify_password(&command.email, &command.password).await {
            Ok(user) => user,
            Err(_) => {
                let _ = self.audit.log_login(&command.email, false, command.ip_address.as_deref()).await;
                return (UseCaseResult::failure(UseCaseError::validation("UNAUTHORIZED", "invalid email or password")), None);
            }
        };

        let upsert_command = UpsertUserAccountCommand {
            user_id: idp_user.user_id.clone(),
            email: idp_user.email.clone(),
            provider: "idp".to_string(),
            role: None,
            plan: None,
            organization_id: None,
            raw_metadata: idp_user.raw_metadata.clone().unwrap_or_else(|| serde_json::json!({})),
        };
        if self.upsert_user.execute(upsert_command, ctx.with_principal(&idp_user.user_id)).await.is_failure() {
            return (UseCaseResult::failure(UseCaseError::commit("failed to upsert user account")), None);
        }

        let access_token = match self.auth_service.generate_access_token(
            &idp_user.user_id,
            Some(&idp_user.email),
            "user",
            None,
            None,
            &command.platform.to_string(),
            command.project_scope.as_deref(),
        ) {
            Ok(token) => token,
            Err(e) => return (UseCaseResult::failure(UseCaseError::commit(e.to_string())), None),
        };
        let refresh_token = generate_refresh_token();
        let session_expires_at = Utc::now() + Duration::seconds(self.auth_service.refresh_token_expiry_secs());

        let session_command = CreateSessionCommand {
            user_id: idp_user.user_id.clone(),
            platform: command.platform,
            access_token: access_token.clone(),
            refresh_token: refresh_token.clone(),
            ip_address: command.ip_address.clone(),
            user_agent: command.user_agent.clone(),
            expires_at: session_expires_at,
        };
        let result = self.create_session.execute(session_command, ctx.with_principal(&idp_user.user_id)).await;
        if result.is_failure() {
            return (result, None);
        }

        let one_time_code = OneTimeCode::new(OneTimeCode::generate_code(), &idp_user.user_id, &refresh_token, command.state.clone());
        if let Err(e) = self.one_time_codes.insert(&one_time_code).await {
            return (UseCaseResult::failure(UseCaseError::commit(e.to_string())), None);
        }

        let _ = self.audit.log_login(&command.email, true, command.ip_address.as_deref()).await;

        let outcome = match &command.redirect_to {
            Some(redirect_to) => {
                let separator = if redirect_to.contains('?') { '&' } else { '?' };
                let mut location = format!("{}{}code={}", redirect_to, separator, one_time_code.code);
                if let Some(state) = &command.state {
                    location.push_str(&format!("&state={}", state));
                }
                LoginOutcome::Redirect { location }
            }
            None => LoginOutcome::Code { code: one_time_code.code, expires_in: ONE_TIME_CODE_TTL_SECS },
        };

        (result, Some(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::idp_client::fake::FakeIdpClient;
    use crate::session::repository::SessionRepository;
    use crate::user_account::repository::UserAccountRepository;
    use crate::usecase::UnitOfWork;

    fn ctx() -> ExecutionContext {
        ExecutionContext::create("system")
    }

    #[test]
    fn test_login_command_skips_password_in_serialization() {
        let command = LoginCommand {
            email: "a@b.c".to_string(),
            password: "secret".to_string(),
            platform: Platform::Web,
            project_scope: None,
            redirect_to: None,
            state: None,
            ip_address: None,
            user_agent: None,
        };
        let json = serde_json::to_string(&command).unwrap();
        assert!(!json.contains("secret"));
    }

    #[test]
    fn test_platform_defaults_to_web() {
        assert_eq!(Platform::default(), Platform::Web);
    }

    #[allow(dead_code)]
    fn wiring_compiles(pool: sqlx::PgPool, idp: Arc<FakeIdpClient>) {
        let unit_of_work = Arc::new(UnitOfWork::new(pool.clone(), "gateway:auth", "outbox"));
        let user_repo = Arc::new(UserAccountRepository::new(pool.clone()));
        let session_repo = Arc::new(SessionRepository::new(pool.clone()));
        let upsert = Arc::new(UpsertUserAccountUseCase::new(user_repo, unit_of_work.clone()));
        let create_session = Arc::new(CreateSessionUseCase::new(session_repo, unit_of_work));
        let one_time_codes = Arc::new(OneTimeCodeRepository::new(pool.clone()));
        let auth_service = Arc::new(AuthService::new(crate::auth::auth_service::AuthConfig::default()));
        let audit = Arc::new(AuditService::new(Arc::new(crate::audit::repository::AuditLogRepository::new(pool))));
        let _use_case = LoginUseCase::new(idp, upsert, create_session, one_time_codes, auth_service, audit);
        let _ = ctx();
    }
}
