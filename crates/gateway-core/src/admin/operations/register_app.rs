//! Register App Use Case
//!
//! `POST /admin/register-app`. Admin-JWT-gated OAuth client registration —
//! the caller is expected to be a trusted first-party integrator, so a
//! freshly registered client gets the wildcard scope rather than an empty
//! one a human would then have to come back and grant piecemeal.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::events::AppRegistered;
use crate::auth::oauth_client_repository::OAuthClientRepository;
use crate::auth::oauth_entity::OAuthClient;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterAppCommand {
    pub app_id: String,
    pub app_name: String,
    pub redirect_uris: Vec<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

pub struct RegisterAppUseCase {
    clients: Arc<OAuthClientRepository>,
    unit_of_work: Arc<UnitOfWork>,
}

impl RegisterAppUseCase {
    pub fn new(clients: Arc<OAuthClientRepository>, unit_of_work: Arc<UnitOfWork>) -> Self {
        Self { clients, unit_of_work }
    }

    pub async fn execute(&self, command: RegisterAppCommand, ctx: ExecutionContext) -> (UseCaseResult<AppRegistered>, Option<OAuthClient>) {
        match self.clients.exists_by_client_id(&command.app_id).await {
            Ok(true) => return (UseCaseResult::failure(UseCaseError::business_rule("APP_EXISTS", "an app with this app_id is already registered")), None),
            Ok(false) => {}
            Err(e) => return (UseCaseResult::failure(UseCaseError::commit(e.to_string())), None),
        }

        let client = OAuthClient::new_public(&command.app_id, &command.app_name, command.redirect_uris.clone(), vec!["*".to_string()]);

        if let Err(e) = self.clients.insert(&client).await {
            return (UseCaseResult::failure(UseCaseError::commit(e.to_string())), None);
        }

        let mut tx = match self.unit_of_work.begin().await {
            Ok(tx) => tx,
            Err(e) => return (UseCaseResult::failure(UseCaseError::commit(e.to_string())), None),
        };

        let event = AppRegistered::new(&ctx, &client.client_id);
        let result = tx.commit(event, &command).await;
        if result.is_failure() {
            return (result, None);
        }
        (result, Some(client))
    }
}
