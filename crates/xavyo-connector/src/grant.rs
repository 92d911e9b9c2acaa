//! Grants: "principal holds entitlement on resource".

use serde::Serialize;

use crate::annotations::{Annotation, Annotations};
use crate::entitlement::entitlement_id;
use crate::resource::{Resource, ResourceId};

/// Reference to the entitlement a grant is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntitlementRef {
    pub id: String,
    pub resource: ResourceId,
    pub slug: String,
}

/// A single grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grant {
    pub id: String,
    pub entitlement: EntitlementRef,
    pub principal: ResourceId,
    #[serde(skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

impl Grant {
    /// Grant the entitlement `slug` on `resource` to `principal`.
    pub fn new(resource: &Resource, slug: &str, principal: ResourceId) -> Self {
        let ent_id = entitlement_id(resource.id(), slug);
        Self {
            id: format!(
                "{}:{}:{}",
                ent_id, principal.resource_type, principal.resource
            ),
            entitlement: EntitlementRef {
                id: ent_id,
                resource: resource.id().clone(),
                slug: slug.to_string(),
            },
            principal,
            annotations: Annotations::new(),
        }
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.update(annotation);
        self
    }

    /// Entitlements the host should expand this grant through, if any.
    pub fn expandable_entitlements(&self) -> Option<&[String]> {
        self.annotations.expandable_entitlements()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ResourceTrait, ResourceType};

    static SCHEDULE: ResourceType = ResourceType {
        id: "schedule",
        display_name: "Schedule",
        traits: &[ResourceTrait::Group],
        skip_entitlements_and_grants: false,
    };

    static TEAM: ResourceType = ResourceType {
        id: "team",
        display_name: "Team",
        traits: &[ResourceTrait::Group],
        skip_entitlements_and_grants: false,
    };

    #[test]
    fn test_grant_ids() {
        let schedule = Resource::builder(&SCHEDULE, "s1", "Primary").build().unwrap();
        let team = ResourceId::new(&TEAM, "t1").unwrap();
        let expansion = entitlement_id(&team, "member");

        let grant = Grant::new(&schedule, "on-call", team)
            .with_annotation(Annotation::grant_expandable([expansion]));

        assert_eq!(grant.entitlement.id, "schedule:s1:on-call");
        assert_eq!(grant.id, "schedule:s1:on-call:team:t1");
        assert_eq!(
            grant.expandable_entitlements(),
            Some(&["team:t1:member".to_string()][..])
        );
    }
}
