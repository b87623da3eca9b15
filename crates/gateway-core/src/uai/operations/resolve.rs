//! Resolve UAI Use Case
//!
//! Called on every successful authentication to attach a `universal_id` to
//! the request. Never blocks or fails the surrounding auth flow: callers get
//! `None` on any error, with the failure logged here.

use std::sync::Arc;
use tracing::warn;

use super::events::UaiLinked;
use crate::shared::error::Result;
use crate::uai::entity::{CredentialLink, Uai};
use crate::uai::repository::UaiRepository;
use crate::usecase::{ExecutionContext, UnitOfWork};

#[derive(Debug, Clone, serde::Serialize)]
pub struct ResolveUaiCommand {
    /// Credential method, e.g. `"supabase_jwt"`, `"api_key"`, `"oauth_client"`.
    pub method: String,
    /// Raw identifier for that method (JWT `sub`, API key id, ...). Hashed
    /// before it ever reaches storage.
    pub identifier: String,
    /// Email claimed by this credential, used to join an existing UAI when
    /// none is linked yet. First-seen `primary_email` wins ties.
    pub primary_email: Option<String>,
    pub create_if_missing: bool,
}

pub struct ResolveUaiUseCase {
    repo: Arc<UaiRepository>,
    unit_of_work: Arc<UnitOfWork>,
}

impl ResolveUaiUseCase {
    pub fn new(repo: Arc<UaiRepository>, unit_of_work: Arc<UnitOfWork>) -> Self {
        Self { repo, unit_of_work }
    }

    /// Returns the resolved `universal_id`, or `None` if no link exists and
    /// `create_if_missing` was false, or if resolution failed.
    pub async fn resolve(&self, command: ResolveUaiCommand, ctx: ExecutionContext) -> Option<String> {
        match self.try_resolve(&command, &ctx).await {
            Ok(universal_id) => universal_id,
            Err(e) => {
                warn!(method = %command.method, error = %e, "uai resolution failed, continuing without it");
                None
            }
        }
    }

    async fn try_resolve(&self, command: &ResolveUaiCommand, ctx: &ExecutionContext) -> Result<Option<String>> {
        let identifier_hash = CredentialLink::hash_identifier(&command.method, &command.identifier);

        if let Some(link) = self.repo.find_link(&command.method, &identifier_hash).await? {
            return Ok(Some(link.universal_id));
        }

        if !command.create_if_missing {
            return Ok(None);
        }

        let existing_uai = match &command.primary_email {
            Some(email) => self.repo.find_uai_by_primary_email(email).await?,
            None => None,
        };
        let created_new_uai = existing_uai.is_none();
        let uai = existing_uai.unwrap_or_else(|| Uai::new(command.primary_email.clone()));
        let link = CredentialLink::new(&command.method, &identifier_hash, &uai.universal_id);

        let mut tx = self.unit_of_work.begin().await?;

        if created_new_uai {
            self.repo.insert_uai(tx.connection(), &uai).await?;
        }
        self.repo.insert_link(tx.connection(), &link).await?;

        let event = UaiLinked::new(ctx, &uai.universal_id, &command.method, created_new_uai);
        let result = tx.commit(event, command).await;

        if result.is_failure() {
            return Err(crate::shared::error::PlatformError::internal(
                "failed to commit uai link",
            ));
        }

        Ok(Some(uai.universal_id))
    }
}
