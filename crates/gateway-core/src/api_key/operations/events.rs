//! API Key Domain Events

use crate::impl_domain_event;
use crate::usecase::domain_event::EventMetadata;
use crate::usecase::ExecutionContext;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyCreated {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub key_id: String,
    pub user_id: String,
    pub name: String,
}

impl_domain_event!(ApiKeyCreated);

impl ApiKeyCreated {
    const EVENT_TYPE: &'static str = "gateway:auth:api_key:created";
    const SPEC_VERSION: &'static str = "1.0";
    const SOURCE: &'static str = "gateway:auth";

    pub fn new(ctx: &ExecutionContext, key_id: &str, user_id: &str, name: &str) -> Self {
        let event_id = crate::TsidGenerator::generate();
        let subject = format!("gateway.api_key.{}", key_id);
        let message_group = format!("gateway:api_key:{}", key_id);

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
            key_id: key_id.to_string(),
            user_id: user_id.to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyRotated {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub old_key_id: String,
    pub new_key_id: String,
    pub user_id: String,
}

impl_domain_event!(ApiKeyRotated);

impl ApiKeyRotated {
    const EVENT_TYPE: &'static str = "gateway:auth:api_key:rotated";
    const SPEC_VERSION: &'static str = "1.0";
    const SOURCE: &'static str = "gateway:auth";

    pub fn new(ctx: &ExecutionContext, old_key_id: &str, new_key_id: &str, user_id: &str) -> Self {
        let event_id = crate::TsidGenerator::generate();
        let subject = format!("gateway.api_key.{}", new_key_id);
        let message_group = format!("gateway:api_key:{}", new_key_id);

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
            old_key_id: old_key_id.to_string(),
            new_key_id: new_key_id.to_string(),
            user_id: user_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyRevoked {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub key_id: String,
}

impl_domain_event!(ApiKeyRevoked);

impl ApiKeyRevoked {
    const EVENT_TYPE: &'static str = "gateway:auth:api_key:revoked";
    const SPEC_VERSION: &'static str = "1.0";
    const SOURCE: &'static str = "gateway:auth";

    pub fn new(ctx: &ExecutionContext, key_id: &str) -> Self {
        let event_id = crate::TsidGenerator::generate();
        let subject = format!("gateway.api_key.{}", key_id);
        let message_group = format!("gateway:api_key:{}", key_id);

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
            key_id: key_id.to_string(),
        }
    }
}
