//! Entitlements: named capabilities a resource can grant.

use serde::Serialize;

use crate::annotations::{Annotation, Annotations};
use crate::resource::{Resource, ResourceId};
use crate::types::ResourceType;

/// Format the id of the entitlement `slug` on the given resource.
///
/// Hosts resolve `GrantExpandable` annotations by this id, so it must stay
/// stable: `"{resource_type}:{resource_id}:{slug}"`.
pub fn entitlement_id(resource: &ResourceId, slug: &str) -> String {
    format!("{}:{}:{}", resource.resource_type, resource.resource, slug)
}

/// What holding the entitlement means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntitlementPurpose {
    /// Membership or assignment.
    #[default]
    Assignment,
    /// A permission on the resource.
    Permission,
}

/// An entitlement owned by a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entitlement {
    pub id: String,
    pub resource: ResourceId,
    pub slug: String,
    pub display_name: String,
    pub description: String,
    /// Ids of the resource types that may hold this entitlement.
    pub grantable_to: Vec<String>,
    pub purpose: EntitlementPurpose,
    #[serde(skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

impl Entitlement {
    /// Create an assignment entitlement on `resource`.
    ///
    /// Display name and description default to the slug.
    pub fn assignment(resource: &Resource, slug: &str) -> Self {
        Self {
            id: entitlement_id(resource.id(), slug),
            resource: resource.id().clone(),
            slug: slug.to_string(),
            display_name: slug.to_string(),
            description: String::new(),
            grantable_to: Vec::new(),
            purpose: EntitlementPurpose::Assignment,
            annotations: Annotations::new(),
        }
    }

    #[must_use]
    pub fn grantable_to(mut self, resource_types: &[&ResourceType]) -> Self {
        self.grantable_to = resource_types.iter().map(|rt| rt.id.to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.update(annotation);
        self
    }

    /// Check whether principals of the given type may hold this entitlement.
    pub fn is_grantable_to(&self, resource_type: &str) -> bool {
        self.grantable_to.iter().any(|rt| rt == resource_type)
    }
}
