//! UAI Domain Events

use crate::impl_domain_event;
use crate::usecase::domain_event::EventMetadata;
use crate::usecase::ExecutionContext;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UaiLinked {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub universal_id: String,
    pub method: String,
    /// New UAI created by this link, as opposed to an existing one being
    /// joined by a second credential method.
    pub created_new_uai: bool,
}

impl_domain_event!(UaiLinked);

impl UaiLinked {
    const EVENT_TYPE: &'static str = "gateway:auth:uai:linked";
    const SPEC_VERSION: &'static str = "1.0";
    const SOURCE: &'static str = "gateway:auth";

    pub fn new(ctx: &ExecutionContext, universal_id: &str, method: &str, created_new_uai: bool) -> Self {
        let event_id = crate::TsidGenerator::generate();
        let subject = format!("gateway.uai.{}", universal_id);
        let message_group = format!("gateway:uai:{}", universal_id);

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
            universal_id: universal_id.to_string(),
            method: method.to_string(),
            created_new_uai,
        }
    }
}
