//! Connector Framework type definitions
//!
//! Resource types, capability traits and connector metadata.

use serde::Serialize;
use std::fmt;

/// Capability trait of a resource type.
///
/// The trait decides which generic fields a resource carries: users have
/// contact emails and a status, groups and roles only a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceTrait {
    /// A person or account; a leaf principal in the grant graph.
    User,
    /// A collection of principals (teams, schedules, escalations).
    Group,
    /// A role principals are assigned to.
    Role,
}

impl ResourceTrait {
    /// Get the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceTrait::User => "user",
            ResourceTrait::Group => "group",
            ResourceTrait::Role => "role",
        }
    }
}

impl fmt::Display for ResourceTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Static description of a kind of resource a connector syncs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceType {
    /// Stable identifier, used in resource ids and entitlement ids.
    pub id: &'static str,
    /// Human readable name.
    pub display_name: &'static str,
    /// Capability traits of this resource type.
    pub traits: &'static [ResourceTrait],
    /// Tells the host that resources of this type never own entitlements or grants.
    pub skip_entitlements_and_grants: bool,
}

impl ResourceType {
    /// Check whether this resource type carries the given trait.
    #[must_use]
    pub fn has_trait(&self, resource_trait: ResourceTrait) -> bool {
        self.traits.contains(&resource_trait)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Static display information about a connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectorMetadata {
    pub display_name: String,
    pub description: String,
}
