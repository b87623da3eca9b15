//! Device Authorization Grant
//!
//! `POST /oauth/device_authorization` bootstraps the pair; the device then
//! polls `/oauth/token` (handled in [`super::oauth::TokenUseCase`]) while a
//! human visits the verification URL and approves or denies using
//! [`ApproveDeviceCodeUseCase`].

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::device_code::DeviceCode;
use crate::auth::device_code_repository::DeviceCodeRepository;
use crate::auth::oauth_client_repository::OAuthClientRepository;
use crate::usecase::UseCaseError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAuthorizationCommand {
    pub client_id: String,
    #[serde(default)]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAuthorizationOutcome {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    pub verification_uri_complete: String,
    pub expires_in: i64,
    pub interval: i32,
}

pub struct DeviceAuthorizationUseCase {
    clients: Arc<OAuthClientRepository>,
    device_codes: Arc<DeviceCodeRepository>,
    verification_base_url: String,
}

impl DeviceAuthorizationUseCase {
    pub fn new(clients: Arc<OAuthClientRepository>, device_codes: Arc<DeviceCodeRepository>, verification_base_url: impl Into<String>) -> Self {
        Self { clients, device_codes, verification_base_url: verification_base_url.into() }
    }

    pub async fn execute(&self, command: DeviceAuthorizationCommand) -> Result<DeviceAuthorizationOutcome, UseCaseError> {
        let client = match self.clients.find_by_client_id(&command.client_id).await {
            Ok(Some(client)) if client.is_active() => client,
            Ok(_) => return Err(UseCaseError::validation("invalid_client", "unknown or disabled client")),
            Err(e) => return Err(UseCaseError::commit(e.to_string())),
        };

        if let Some(scope) = &command.scope {
            for requested in scope.split_whitespace() {
                if !client.is_scope_allowed(requested) {
                    return Err(UseCaseError::validation("invalid_scope", format!("scope not allowed for client: {}", requested)));
                }
            }
        }

        let device_code_value = crate::TsidGenerator::generate();
        let user_code = DeviceCode::generate_user_code();
        let device_code = DeviceCode::new(device_code_value, user_code, &client.client_id, command.scope.clone());

        self.device_codes.insert(&device_code).await.map_err(|e| UseCaseError::commit(e.to_string()))?;

        let verification_uri = format!("{}/device", self.verification_base_url);
        Ok(DeviceAuthorizationOutcome {
            verification_uri_complete: format!("{}?user_code={}", verification_uri, device_code.user_code),
            device_code: device_code.device_code,
            user_code: device_code.user_code,
            verification_uri,
            expires_in: (device_code.expires_at - device_code.created_at).num_seconds(),
            interval: device_code.interval_secs,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveDeviceCodeCommand {
    pub user_code: String,
}

/// Invoked from the authenticated verification page; not part of the OAuth
/// wire protocol itself.
pub struct ApproveDeviceCodeUseCase {
    device_codes: Arc<DeviceCodeRepository>,
}

impl ApproveDeviceCodeUseCase {
    pub fn new(device_codes: Arc<DeviceCodeRepository>) -> Self {
        Self { device_codes }
    }

    pub async fn approve(&self, command: ApproveDeviceCodeCommand, user_id: &str) -> Result<(), UseCaseError> {
        let code = self.lookup(&command.user_code).await?;
        self.device_codes
            .update_status(&code.device_code, crate::auth::device_code::DeviceCodeStatus::Approved, Some(user_id))
            .await
            .map_err(|e| UseCaseError::commit(e.to_string()))
    }

    pub async fn deny(&self, command: ApproveDeviceCodeCommand) -> Result<(), UseCaseError> {
        let code = self.lookup(&command.user_code).await?;
        self.device_codes
            .update_status(&code.device_code, crate::auth::device_code::DeviceCodeStatus::Denied, None)
            .await
            .map_err(|e| UseCaseError::commit(e.to_string()))
    }

    async fn lookup(&self, user_code: &str) -> Result<DeviceCode, UseCaseError> {
        match self.device_codes.find_by_user_code(user_code).await {
            Ok(Some(code)) if !code.is_expired() => Ok(code),
            Ok(_) => Err(UseCaseError::not_found("NOT_FOUND", "device code not found or expired")),
            Err(e) => Err(UseCaseError::commit(e.to_string())),
        }
    }
}
