//! Admin Bypass Domain Events

use crate::impl_domain_event;
use crate::usecase::domain_event::EventMetadata;
use crate::usecase::ExecutionContext;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminBypassUsed {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub email: String,
}

impl_domain_event!(AdminBypassUsed);

impl AdminBypassUsed {
    const EVENT_TYPE: &'static str = "gateway:auth:admin:bypass_used";
    const SPEC_VERSION: &'static str = "1.0";
    const SOURCE: &'static str = "gateway:auth";

    pub fn new(ctx: &ExecutionContext, email: &str) -> Self {
        let event_id = crate::TsidGenerator::generate();
        let subject = format!("gateway.admin.{}", email);
        let message_group = format!("gateway:admin:{}", email);

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
            email: email.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRegistered {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub client_id: String,
}

impl_domain_event!(AppRegistered);

impl AppRegistered {
    const EVENT_TYPE: &'static str = "gateway:auth:admin:app_registered";
    const SPEC_VERSION: &'static str = "1.0";
    const SOURCE: &'static str = "gateway:auth";

    pub fn new(ctx: &ExecutionContext, client_id: &str) -> Self {
        let event_id = crate::TsidGenerator::generate();
        let subject = format!("gateway.oauth_client.{}", client_id);
        let message_group = format!("gateway:oauth_client:{}", client_id);

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
            client_id: client_id.to_string(),
        }
    }
}
