//! User Account Domain Events

use crate::impl_domain_event;
use crate::usecase::domain_event::EventMetadata;
use crate::usecase::ExecutionContext;
use serde::{Deserialize, Serialize};

/// Emitted whenever a login upserts the local mirror of an IdP user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpserted {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub user_id: String,
    pub email: String,
    pub provider: String,
    pub is_new: bool,
}

impl_domain_event!(UserUpserted);

impl UserUpserted {
    const EVENT_TYPE: &'static str = "gateway:auth:user:upserted";
    const SPEC_VERSION: &'static str = "1.0";
    const SOURCE: &'static str = "gateway:auth";

    pub fn new(ctx: &ExecutionContext, user_id: &str, email: &str, provider: &str, is_new: bool) -> Self {
        let event_id = crate::TsidGenerator::generate();
        let subject = format!("gateway.user.{}", user_id);
        let message_group = format!("gateway:user:{}", user_id);

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
            email: email.to_string(),
            provider: provider.to_string(),
            is_new,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::DomainEvent;

    #[test]
    fn test_user_upserted_event() {
        let ctx = ExecutionContext::create("system");
        let event = UserUpserted::new(&ctx, "idp-1", "user@example.com", "supabase", true);
        assert_eq!(event.event_type(), "gateway:auth:user:upserted");
        assert_eq!(event.subject(), "gateway.user.idp-1");
        assert!(event.is_new);
    }
}
