//! Resource types exposed by the connector.

use xavyo_connector::types::{ResourceTrait, ResourceType};

pub static ROLE: ResourceType = ResourceType {
    id: "role",
    display_name: "Role",
    traits: &[ResourceTrait::Role],
    skip_entitlements_and_grants: false,
};

pub static TEAM: ResourceType = ResourceType {
    id: "team",
    display_name: "Team",
    traits: &[ResourceTrait::Group],
    skip_entitlements_and_grants: false,
};

/// Users are leaves of the grant graph.
pub static USER: ResourceType = ResourceType {
    id: "user",
    display_name: "User",
    traits: &[ResourceTrait::User],
    skip_entitlements_and_grants: true,
};

pub static SCHEDULE: ResourceType = ResourceType {
    id: "schedule",
    display_name: "Schedule",
    traits: &[ResourceTrait::Group],
    skip_entitlements_and_grants: false,
};

pub static ESCALATION: ResourceType = ResourceType {
    id: "escalation",
    display_name: "Escalation",
    traits: &[ResourceTrait::Group],
    skip_entitlements_and_grants: false,
};

/// Slug of the membership entitlement on teams, roles, schedules and escalations.
pub const MEMBER: &str = "member";

/// Slug of the on-call entitlement on schedules.
pub const ON_CALL: &str = "on-call";

/// V1 id of a membership entitlement.
pub fn v1_membership_id(resource_id: &str) -> String {
    format!("membership:{resource_id}")
}

/// V1 id of a grant of a membership entitlement.
pub fn v1_grant_id(entitlement_id: &str, principal_id: &str) -> String {
    format!("grant:{entitlement_id}:{principal_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v1_ids() {
        let ent = v1_membership_id("r1");
        assert_eq!(ent, "membership:r1");
        assert_eq!(v1_grant_id(&ent, "u1"), "grant:membership:r1:u1");
    }

    #[test]
    fn test_only_users_skip_grants() {
        for rt in [&ROLE, &TEAM, &SCHEDULE, &ESCALATION] {
            assert!(!rt.skip_entitlements_and_grants, "{rt}");
        }
        assert!(USER.skip_entitlements_and_grants);
        assert!(USER.has_trait(ResourceTrait::User));
    }
}
