//! Upsert User Account Use Case
//!
//! Runs on every successful login. Merges the IdP's claims into the local
//! mirror row and emits `UserUpserted` in the same transaction.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::events::UserUpserted;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseResult};
use crate::user_account::entity::UserAccount;
use crate::user_account::repository::UserAccountRepository;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertUserAccountCommand {
    pub user_id: String,
    pub email: String,
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(default)]
    pub raw_metadata: serde_json::Value,
}

pub struct UpsertUserAccountUseCase {
    repo: Arc<UserAccountRepository>,
    unit_of_work: Arc<UnitOfWork>,
}

impl UpsertUserAccountUseCase {
    pub fn new(repo: Arc<UserAccountRepository>, unit_of_work: Arc<UnitOfWork>) -> Self {
        Self { repo, unit_of_work }
    }

    pub async fn execute(&self, command: UpsertUserAccountCommand, ctx: ExecutionContext) -> UseCaseResult<UserUpserted> {
        let existing = match self.repo.find_by_user_id(&command.user_id).await {
            Ok(account) => account,
            Err(e) => return UseCaseResult::failure(crate::usecase::UseCaseError::commit(e.to_string())),
        };
        let is_new = existing.is_none();

        let mut account = existing.unwrap_or_else(|| {
            UserAccount::new(&command.user_id, &command.email, &command.provider)
        });
        account.apply_login(
            &command.email,
            command.role.as_deref(),
            command.plan.as_deref(),
            command.raw_metadata.clone(),
        );
        account.organization_id = command.organization_id.clone().or(account.organization_id);

        let mut tx = match self.unit_of_work.begin().await {
            Ok(tx) => tx,
            Err(e) => return UseCaseResult::failure(crate::usecase::UseCaseError::commit(e.to_string())),
        };

        if let Err(e) = self.repo.upsert(tx.connection(), &account).await {
            let _ = tx.rollback().await;
            return UseCaseResult::failure(crate::usecase::UseCaseError::commit(e.to_string()));
        }

        let event = UserUpserted::new(&ctx, &account.user_id, &account.email, &account.provider, is_new);
        tx.commit(event, &command).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let cmd = UpsertUserAccountCommand {
            user_id: "idp-1".to_string(),
            email: "user@example.com".to_string(),
            provider: "supabase".to_string(),
            role: None,
            plan: None,
            organization_id: None,
            raw_metadata: serde_json::json!({}),
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("idp-1"));
    }
}
