//! List Apps Use Case
//!
//! `GET /admin/list-apps`. Pure query, no event — reads follow
//! `uai/operations/resolve.rs`'s lead and return `shared::error::Result`
//! rather than going through `UseCaseResult`.

use std::sync::Arc;

use crate::auth::oauth_client_repository::OAuthClientRepository;
use crate::auth::oauth_entity::OAuthClient;
use crate::shared::error::Result;

pub struct ListAppsUseCase {
    clients: Arc<OAuthClientRepository>,
}

impl ListAppsUseCase {
    pub fn new(clients: Arc<OAuthClientRepository>) -> Self {
        Self { clients }
    }

    pub async fn execute(&self) -> Result<Vec<OAuthClient>> {
        self.clients.find_all().await
    }
}
