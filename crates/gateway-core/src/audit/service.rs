//! Audit Service
//!
//! Centralized audit logging for state-changing gateway operations that
//! happen outside the Use Case/`UnitOfWork` path (e.g. read-path admin
//! actions). Mutations that go through a use case get their audit row
//! written atomically by `UnitOfWorkTx::commit`; this service covers the
//! rest.

use std::sync::Arc;
use tracing::{info, error};

use crate::AuditLog;
use crate::AuditLogRepository;
use crate::AuthContext;
use crate::shared::error::Result;

/// Audit service for recording platform actions
#[derive(Clone)]
pub struct AuditService {
    repo: Arc<AuditLogRepository>,
}

impl AuditService {
    pub fn new(repo: Arc<AuditLogRepository>) -> Self {
        Self { repo }
    }

    /// Log a create action
    pub async fn log_create(
        &self,
        auth: &AuthContext,
        entity_type: &str,
        entity_id: &str,
        operation: impl Into<String>,
    ) -> Result<()> {
        let log = self.build_log(auth, entity_type, Some(entity_id), operation);
        self.insert(log).await
    }

    /// Log an update action
    pub async fn log_update(
        &self,
        auth: &AuthContext,
        entity_type: &str,
        entity_id: &str,
        operation: impl Into<String>,
    ) -> Result<()> {
        let log = self.build_log(auth, entity_type, Some(entity_id), operation);
        self.insert(log).await
    }

    /// Log a delete action
    pub async fn log_delete(
        &self,
        auth: &AuthContext,
        entity_type: &str,
        entity_id: &str,
        operation: impl Into<String>,
    ) -> Result<()> {
        let log = self.build_log(auth, entity_type, Some(entity_id), operation);
        self.insert(log).await
    }

    /// Log a login attempt, successful or not. No `AuthContext` exists yet
    /// at this point in the credential state machine.
    pub async fn log_login(
        &self,
        _email: &str,
        success: bool,
        _ip_address: Option<&str>,
    ) -> Result<()> {
        let operation = if success { "LoginCommand" } else { "FailedLoginCommand" };
        let log = AuditLog::new("Session", None, operation, None, None);
        self.insert(log).await
    }

    /// Log a logout
    pub async fn log_logout(&self, auth: &AuthContext) -> Result<()> {
        let log = self.build_log(auth, "Session", None, "LogoutCommand");
        self.insert(log).await
    }

    fn build_log(
        &self,
        auth: &AuthContext,
        entity_type: &str,
        entity_id: Option<&str>,
        operation: impl Into<String>,
    ) -> AuditLog {
        AuditLog::new(
            entity_type,
            entity_id.map(String::from),
            operation,
            None,
            Some(auth.user_id.clone()),
        )
    }

    async fn insert(&self, log: AuditLog) -> Result<()> {
        info!(
            operation = %log.operation,
            entity_type = %log.entity_type,
            entity_id = ?log.entity_id,
            principal_id = ?log.principal_id,
            "audit log recorded"
        );

        if let Err(e) = self.repo.insert(&log).await {
            error!(error = %e, "failed to insert audit log");
        }

        Ok(())
    }
}
