//! Admin Bypass Login Use Case
//!
//! A single emergency account, configured out-of-band
//! (`gateway_config::AdminBypassConfig`), that mints a token with
//! `bypass_all_checks: true`. The password is verified against an Argon2id
//! hash, which is constant-time by construction — no separate timing-safe
//! comparison is needed on top of it.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::events::AdminBypassUsed;
use crate::auth::auth_service::AuthService;
use crate::auth::password_service::PasswordService;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BypassLoginCommand {
    pub email: String,
    #[serde(skip)]
    pub password: String,
}

pub struct BypassLoginUseCase {
    password_service: Arc<PasswordService>,
    auth_service: Arc<AuthService>,
    unit_of_work: Arc<UnitOfWork>,
    configured_email: String,
    configured_password_hash: String,
}

impl BypassLoginUseCase {
    pub fn new(
        password_service: Arc<PasswordService>,
        auth_service: Arc<AuthService>,
        unit_of_work: Arc<UnitOfWork>,
        configured_email: String,
        configured_password_hash: String,
    ) -> Self {
        Self {
            password_service,
            auth_service,
            unit_of_work,
            configured_email,
            configured_password_hash,
        }
    }

    pub async fn execute(&self, command: BypassLoginCommand, ctx: ExecutionContext) -> (UseCaseResult<AdminBypassUsed>, Option<String>) {
        if self.configured_password_hash.is_empty() || self.configured_email.is_empty() {
            return (
                UseCaseResult::failure(UseCaseError::validation("ADMIN_BYPASS_NOT_CONFIGURED", "admin bypass account not bootstrapped")),
                None,
            );
        }

        if command.email != self.configured_email {
            return (
                UseCaseResult::failure(UseCaseError::validation("INVALID_CREDENTIALS", "invalid admin bypass credentials")),
                None,
            );
        }

        match self.password_service.verify_password(&command.password, &self.configured_password_hash) {
            Ok(true) => {}
            Ok(false) => {
                return (
                    UseCaseResult::failure(UseCaseError::validation("INVALID_CREDENTIALS", "invalid admin bypass credentials")),
                    None,
                )
            }
            Err(e) => return (UseCaseResult::failure(UseCaseError::commit(e.to_string())), None),
        }

        let token = match self.auth_service.generate_admin_bypass_token(&command.email) {
            Ok(token) => token,
            Err(e) => return (UseCaseResult::failure(UseCaseError::commit(e.to_string())), None),
        };

        let mut tx = match self.unit_of_work.begin().await {
            Ok(tx) => tx,
            Err(e) => return (UseCaseResult::failure(UseCaseError::commit(e.to_string())), None),
        };

        let event = AdminBypassUsed::new(&ctx, &command.email);
        let result = tx.commit(event, &command).await;

        if result.is_success() {
            (result, Some(token))
        } else {
            (result, None)
        }
    }
}
