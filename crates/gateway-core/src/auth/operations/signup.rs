//! Signup Use Case
//!
//! Delegates account creation to the IdP, then mirrors the new account
//! locally so it has a row to hang sessions and API keys off of before the
//! caller's first login.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::idp_client::IdpClient;
use crate::user_account::operations::upsert::{UpsertUserAccountCommand, UpsertUserAccountUseCase};
use crate::user_account::operations::events::UserUpserted;
use crate::usecase::{ExecutionContext, UseCaseError, UseCaseResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupCommand {
    pub email: String,
    #[serde(skip)]
    pub password: String,
    #[serde(default)]
    pub user_metadata: Option<serde_json::Value>,
}

pub struct SignupUseCase {
    idp_client: Arc<dyn IdpClient>,
    upsert_user: Arc<UpsertUserAccountUseCase>,
}

impl SignupUseCase {
    pub fn new(idp_client: Arc<dyn IdpClient>, upsert_user: Arc<UpsertUserAccountUseCase>) -> Self {
        Self { idp_client, upsert_user }
    }

    pub async fn execute(&self, command: SignupCommand, ctx: ExecutionContext) -> UseCaseResult<UserUpserted> {
        let idp_user = match self.idp_client.signup(&command.email, &command.password, command.user_metadata.clone()).await {
            Ok(user) => user,
            Err(e) => return UseCaseResult::failure(UseCaseError::validation("SIGNUP_FAILED", e.to_string())),
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

        self.upsert_user.execute(upsert_command, ctx.with_principal(&idp_user.user_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_command_skips_password() {
        let command = SignupCommand { email: "a@b.c".to_string(), password: "secret".to_string(), user_metadata: None };
        let json = serde_json::to_string(&command).unwrap();
        assert!(!json.contains("secret"));
    }
}
