//! Session Domain Events

use crate::impl_domain_event;
use crate::usecase::domain_event::EventMetadata;
use crate::usecase::ExecutionContext;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub session_id: String,
    pub user_id: String,
    pub platform: String,
}

impl_domain_event!(SessionCreated);

impl SessionCreated {
    const EVENT_TYPE: &'static str = "gateway:auth:session:created";
    const SPEC_VERSION: &'static str = "1.0";
    const SOURCE: &'static str = "gateway:auth";

    pub fn new(ctx: &ExecutionContext, session_id: &str, user_id: &str, platform: &str) -> Self {
        let event_id = crate::TsidGenerator::generate();
        let subject = format!("gateway.session.{}", session_id);
        let message_group = format!("gateway:session:{}", session_id);

        Self {
            metadata: EventMetadata::new(
                event_id,
                Self::EVENT_TYPE,
                Self::SPEC_VERSION,
                Self::SOURCE,
                subject,
                message_group,
                ctx.execution_id.clone(),
                ctx.correlation_id.clone(),
                ctx.causation_id.clone(),
                ctx.principal_id.clone(),
            ),
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
            platform: platform.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRevoked {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub session_id: String,
    pub reason: String,
}

impl_domain_event!(SessionRevoked);

impl SessionRevoked {
    const EVENT_TYPE: &'static str = "gateway:auth:session:revoked";
    const SPEC_VERSION: &'static str = "1.0";
    const SOURCE: &'static str = "gateway:auth";

    pub fn new(ctx: &ExecutionContext, session_id: &str, reason: &str) -> Self {
        let event_id = crate::TsidGenerator::generate();
        let subject = format!("gateway.session.{}", session_id);
        let message_group = format!("gateway:session:{}", session_id);

        Self {
            metadata: EventMetadata::new(
                event_id,
                Self::EVENT_TYPE,
                Self::SPEC_VERSION,
                Self::SOURCE,
                subject,
                message_group,
                ctx.execution_id.clone(),
                ctx.correlation_id.clone(),
                ctx.causation_id.clone(),
                ctx.principal_id.clone(),
            ),
            session_id: session_id.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRefreshed {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub session_id: String,
    pub user_id: String,
}

impl_domain_event!(SessionRefreshed);

impl SessionRefreshed {
    const EVENT_TYPE: &'static str = "gateway:auth:session:refreshed";
    const SPEC_VERSION: &'static str = "1.0";
    const SOURCE: &'static str = "gateway:auth";

    pub fn new(ctx: &ExecutionContext, session_id: &str, user_id: &str) -> Self {
        let event_id = crate::TsidGenerator::generate();
        let subject = format!("gateway.session.{}", session_id);
        let message_group = format!("gateway:session:{}", session_id);

        Self {
            metadata: EventMetadata::new(
                event_id,
                Self::EVENT_TYPE,
                Self::SPEC_VERSION,
                Self::SOURCE,
                subject,
                message_group,
                ctx.execution_id.clone(),
                ctx.correlation_id.clone(),
                ctx.causation_id.clone(),
                ctx.principal_id.clone(),
            ),
            session_id: session_id.to_string(),
            user_id: user_id.to_string(),
        }
    }
}

/// Emitted when a rotated refresh token is presented again, indicating the
/// token chain has leaked. Every live session for the user is revoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCompromised {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub user_id: String,
    pub sessions_revoked: u64,
}

impl_domain_event!(SessionCompromised);

impl SessionCompromised {
    const EVENT_TYPE: &'static str = "gateway:auth:session:compromised";
    const SPEC_VERSION: &'static str = "1.0";
    const SOURCE: &'static str = "gateway:auth";

    pub fn new(ctx: &ExecutionContext, user_id: &str, sessions_revoked: u64) -> Self {
        let event_id = crate::TsidGenerator::generate();
        let subject = format!("gateway.session.{}", user_id);
        let message_group = format!("gateway:session:{}", user_id);

        Self {
            metadata: EventMetadata::new(
                event_id,
                Self::EVENT_TYPE,
                Self::SPEC_VERSION,
                Self::SOURCE,
                subject,
                message_group,
                ctx.execution_id.clone(),
                ctx.correlation_id.clone(),
                ctx.causation_id.clone(),
                ctx.principal_id.clone(),
            ),
            user_id: user_id.to_string(),
            sessions_revoked,
        }
    }
}
