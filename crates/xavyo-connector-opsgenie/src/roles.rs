//! Role sync from Opsgenie.
//!
//! Roles come from two places: custom roles from the API and the built-in
//! roles every account has, which the API does not list.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};
use xavyo_connector::prelude::*;

use crate::client::OpsgenieClient;
use crate::config::BuiltinRoles;
use crate::error::OpsgenieResult;
use crate::models::{CustomRole, ListResponse, User};
use crate::pagination::{handle_next_page, parse_page_token};
use crate::resource_types::{v1_grant_id, v1_membership_id, MEMBER, ROLE, USER};
use crate::users::page_limit;

const ROLE_PROFILE: ProfileSchema = &["role_id", "role_name"];

impl OpsgenieClient {
    /// Lists custom user roles.
    #[instrument(skip(self, ctx))]
    pub async fn list_custom_roles(&self, ctx: &SyncContext) -> OpsgenieResult<Vec<CustomRole>> {
        let url = self.endpoint(&["v2", "roles"])?;
        let response: ListResponse<CustomRole> = self.get(ctx, url).await?;
        debug!(count = response.data.len(), "Fetched custom roles");
        Ok(response.data)
    }
}

/// Maps a role to a role resource.
pub fn role_resource(id: &str, name: &str) -> ConnectorResult<Resource> {
    let profile = Profile::builder(ROLE_PROFILE)
        .string("role_id", id)
        .string("role_name", name)
        .build()?;

    Resource::builder(&ROLE, id, name)
        .profile(profile)
        .annotation(Annotation::v1_identifier(id))
        .build()
}

/// Custom roles followed by every built-in role. No de-duplication.
pub fn merge_roles(
    custom: &[CustomRole],
    builtin: &BuiltinRoles,
) -> ConnectorResult<Vec<Resource>> {
    custom
        .iter()
        .map(|r| (r.id.as_str(), r.name.as_str()))
        .chain(builtin.iter().map(|r| (r.id.as_str(), r.name.as_str())))
        .map(|(id, name)| role_resource(id, name))
        .collect()
}

/// The `member` entitlement of a role.
pub fn role_member_entitlement(resource: &Resource) -> Entitlement {
    let name = resource.display_name();
    Entitlement::assignment(resource, MEMBER)
        .grantable_to(&[&USER])
        .with_display_name(format!("{name} Role Member"))
        .with_description(format!("Has the {name} role in Opsgenie"))
        .with_annotation(Annotation::v1_identifier(v1_membership_id(
            &resource.id().resource,
        )))
}

/// `member` grants for the users whose role name equals the role's display
/// name. The comparison is exact and case-sensitive.
pub fn role_member_grants(resource: &Resource, users: &[User]) -> ConnectorResult<Vec<Grant>> {
    let v1_entitlement = v1_membership_id(&resource.id().resource);

    users
        .iter()
        .filter(|user| user.role_name() == resource.display_name())
        .map(|user| -> ConnectorResult<Grant> {
            let principal = ResourceId::new(&USER, &user.id)?;
            Ok(Grant::new(resource, MEMBER, principal)
                .with_annotation(Annotation::v1_identifier(v1_grant_id(&v1_entitlement, &user.id))))
        })
        .collect()
}

/// Syncer for the `role` resource type.
#[derive(Debug, Clone)]
pub struct RoleSyncer {
    client: Arc<OpsgenieClient>,
    builtin_roles: BuiltinRoles,
    page_size: u32,
}

impl RoleSyncer {
    pub fn new(client: Arc<OpsgenieClient>, builtin_roles: BuiltinRoles, page_size: u32) -> Self {
        Self {
            client,
            builtin_roles,
            page_size,
        }
    }
}

#[async_trait]
impl ResourceSyncer for RoleSyncer {
    fn resource_type(&self) -> &'static ResourceType {
        &ROLE
    }

    async fn list(
        &self,
        ctx: &SyncContext,
        _parent: Option<&ResourceId>,
        _page: &PageToken,
    ) -> ConnectorResult<Page<Resource>> {
        let custom = self
            .client
            .list_custom_roles(ctx)
            .await
            .map_err(|e| e.for_operation("list custom roles"))?;

        let resources = merge_roles(&custom, &self.builtin_roles)?;
        info!(
            custom = custom.len(),
            builtin = self.builtin_roles.len(),
            "Listed roles"
        );
        Ok(Page::last(resources))
    }

    async fn entitlements(
        &self,
        _ctx: &SyncContext,
        resource: &Resource,
        _page: &PageToken,
    ) -> ConnectorResult<Page<Entitlement>> {
        Ok(Page::last(vec![role_member_entitlement(resource)]))
    }

    /// Pages through the whole user directory; each page yields the grants
    /// of the users on it.
    async fn grants(
        &self,
        ctx: &SyncContext,
        resource: &Resource,
        page: &PageToken,
    ) -> ConnectorResult<Page<Grant>> {
        let id = resource.id();
        let seed = PageState::new(id.resource_type.as_str(), id.resource.as_str());
        let (mut bag, offset) = parse_page_token(&page.token, seed)?;
        let limit = page_limit(page.size, self.page_size);

        let response = self
            .client
            .list_users(ctx, limit, offset)
            .await
            .map_err(|e| e.for_operation("list users for role grants"))?;

        let grants = role_member_grants(resource, &response.data)?;
        let next = handle_next_page(&mut bag, response.next_link())?;
        Ok(Page::with_next(grants, next))
    }
}
