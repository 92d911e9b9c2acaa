//! Escalation sync from Opsgenie.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};
use xavyo_connector::prelude::*;

use crate::client::OpsgenieClient;
use crate::error::OpsgenieResult;
use crate::models::{Escalation, ListResponse};
use crate::resource_types::{ESCALATION, MEMBER, USER};

const ESCALATION_PROFILE: ProfileSchema =
    &["escalation_id", "escalation_name", "escalation_description"];

impl OpsgenieClient {
    /// Lists all escalation policies.
    #[instrument(skip(self, ctx))]
    pub async fn list_escalations(&self, ctx: &SyncContext) -> OpsgenieResult<Vec<Escalation>> {
        let url = self.endpoint(&["v2", "escalations"])?;
        let response: ListResponse<Escalation> = self.get(ctx, url).await?;
        debug!(count = response.data.len(), "Fetched escalations");
        Ok(response.data)
    }
}

/// Maps an Opsgenie escalation to a group resource.
pub fn escalation_resource(escalation: &Escalation) -> ConnectorResult<Resource> {
    let profile = Profile::builder(ESCALATION_PROFILE)
        .string("escalation_id", &escalation.id)
        .string("escalation_name", &escalation.name)
        .string("escalation_description", &escalation.description)
        .build()?;

    Resource::builder(&ESCALATION, &escalation.id, &escalation.name)
        .profile(profile)
        .build()
}

/// The `member` entitlement of an escalation.
pub fn escalation_member_entitlement(resource: &Resource) -> Entitlement {
    let name = resource.display_name();
    Entitlement::assignment(resource, MEMBER)
        .grantable_to(&[&USER])
        .with_display_name(format!("{name} Escalation Member"))
        .with_description(format!("Is member of the {name} escalation in Opsgenie"))
}

/// Syncer for the `escalation` resource type.
///
/// Escalation membership is not resolved; `grants` is always empty.
#[derive(Debug, Clone)]
pub struct EscalationSyncer {
    client: Arc<OpsgenieClient>,
}

impl EscalationSyncer {
    pub fn new(client: Arc<OpsgenieClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceSyncer for EscalationSyncer {
    fn resource_type(&self) -> &'static ResourceType {
        &ESCALATION
    }

    async fn list(
        &self,
        ctx: &SyncContext,
        _parent: Option<&ResourceId>,
        _page: &PageToken,
    ) -> ConnectorResult<Page<Resource>> {
        let escalations = self
            .client
            .list_escalations(ctx)
            .await
            .map_err(|e| e.for_operation("list escalations"))?;

        let resources = escalations
            .iter()
            .map(escalation_resource)
            .collect::<ConnectorResult<Vec<_>>>()?;
        Ok(Page::last(resources))
    }

    async fn entitlements(
        &self,
        _ctx: &SyncContext,
        resource: &Resource,
        _page: &PageToken,
    ) -> ConnectorResult<Page<Entitlement>> {
        Ok(Page::last(vec![escalation_member_entitlement(resource)]))
    }

    async fn grants(
        &self,
        _ctx: &SyncContext,
        _resource: &Resource,
        _page: &PageToken,
    ) -> ConnectorResult<Page<Grant>> {
        Ok(Page::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_escalation_mapping_and_entitlement() {
        let escalation: Escalation = serde_json::from_value(json!({
            "id": "e1",
            "name": "Night",
            "description": "After hours",
            "rules": []
        }))
        .unwrap();

        let resource = escalation_resource(&escalation).unwrap();
        assert_eq!(resource.id().to_string(), "escalation:e1");
        assert_eq!(resource.profile().get_str("escalation_name"), Some("Night"));
        assert_eq!(
            resource.profile().get_str("escalation_description"),
            Some("After hours")
        );

        let ent = escalation_member_entitlement(&resource);
        assert_eq!(ent.id, "escalation:e1:member");
        assert_eq!(ent.display_name, "Night Escalation Member");
        assert_eq!(ent.description, "Is member of the Night escalation in Opsgenie");
        assert_eq!(ent.grantable_to, ["user"]);
    }

    #[test]
    fn test_description_omitted_when_empty() {
        let escalation: Escalation =
            serde_json::from_value(json!({"id": "e2", "name": "Day"})).unwrap();
        let resource = escalation_resource(&escalation).unwrap();
        assert!(!resource.profile().contains_key("escalation_description"));
    }
}
