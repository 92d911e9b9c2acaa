//! Team sync from Opsgenie.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};
use xavyo_connector::prelude::*;

use crate::client::OpsgenieClient;
use crate::error::OpsgenieResult;
use crate::models::{DataResponse, ListResponse, Team, TeamDetail};
use crate::resource_types::{v1_grant_id, v1_membership_id, MEMBER, TEAM, USER};

const TEAM_PROFILE: ProfileSchema = &["team_id", "team_name", "team_description"];

impl OpsgenieClient {
    /// Lists all teams. The endpoint is not paged.
    #[instrument(skip(self, ctx))]
    pub async fn list_teams(&self, ctx: &SyncContext) -> OpsgenieResult<Vec<Team>> {
        let url = self.endpoint(&["v2", "teams"])?;
        let response: ListResponse<Team> = self.get(ctx, url).await?;
        debug!(count = response.data.len(), "Fetched teams");
        Ok(response.data)
    }

    /// Fetches a team by id, members included.
    #[instrument(skip(self, ctx))]
    pub async fn get_team(&self, ctx: &SyncContext, team_id: &str) -> OpsgenieResult<TeamDetail> {
        let mut url = self.endpoint(&["v2", "teams", team_id])?;
        url.query_pairs_mut().append_pair("identifierType", "id");
        let response: DataResponse<TeamDetail> = self.get(ctx, url).await?;
        debug!(members = response.data.members.len(), "Fetched team");
        Ok(response.data)
    }
}

/// Maps an Opsgenie team to a group resource.
pub fn team_resource(team: &Team) -> ConnectorResult<Resource> {
    let profile = Profile::builder(TEAM_PROFILE)
        .string("team_id", &team.id)
        .string("team_name", &team.name)
        .string("team_description", &team.description)
        .build()?;

    Resource::builder(&TEAM, &team.id, &team.name)
        .profile(profile)
        .annotation(Annotation::v1_identifier(&team.id))
        .build()
}

/// The `member` entitlement of a team.
pub fn team_member_entitlement(resource: &Resource) -> Entitlement {
    let name = resource.display_name();
    Entitlement::assignment(resource, MEMBER)
        .grantable_to(&[&USER])
        .with_display_name(format!("{name} Team Member"))
        .with_description(format!("Is member of the {name} team in Opsgenie"))
        .with_annotation(Annotation::v1_identifier(v1_membership_id(
            &resource.id().resource,
        )))
}

/// One `member` grant per team member with a user id.
pub fn team_member_grants(resource: &Resource, team: &TeamDetail) -> ConnectorResult<Vec<Grant>> {
    let v1_entitlement = v1_membership_id(&resource.id().resource);
    let mut grants = Vec::with_capacity(team.members.len());

    for member in &team.members {
        let Some(user) = member.user.as_ref().filter(|u| !u.id.is_empty()) else {
            warn!(team_id = %team.id, "Team member without a user id, skipping");
            continue;
        };

        let principal = ResourceId::new(&USER, &user.id)?;
        grants.push(
            Grant::new(resource, MEMBER, principal)
                .with_annotation(Annotation::v1_identifier(v1_grant_id(&v1_entitlement, &user.id))),
        );
    }

    Ok(grants)
}

/// Syncer for the `team` resource type.
#[derive(Debug, Clone)]
pub struct TeamSyncer {
    client: Arc<OpsgenieClient>,
}

impl TeamSyncer {
    pub fn new(client: Arc<OpsgenieClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceSyncer for TeamSyncer {
    fn resource_type(&self) -> &'static ResourceType {
        &TEAM
    }

    async fn list(
        &self,
        ctx: &SyncContext,
        _parent: Option<&ResourceId>,
        _page: &PageToken,
    ) -> ConnectorResult<Page<Resource>> {
        let teams = self
            .client
            .list_teams(ctx)
            .await
            .map_err(|e| e.for_operation("list teams"))?;

        let resources = teams
            .iter()
            .map(team_resource)
            .collect::<ConnectorResult<Vec<_>>>()?;
        Ok(Page::last(resources))
    }

    async fn entitlements(
        &self,
        _ctx: &SyncContext,
        resource: &Resource,
        _page: &PageToken,
    ) -> ConnectorResult<Page<Entitlement>> {
        Ok(Page::last(vec![team_member_entitlement(resource)]))
    }

    async fn grants(
        &self,
        ctx: &SyncContext,
        resource: &Resource,
        _page: &PageToken,
    ) -> ConnectorResult<Page<Grant>> {
        let team = self
            .client
            .get_team(ctx, &resource.id().resource)
            .await
            .map_err(|e| e.for_operation("get team"))?;

        Ok(Page::last(team_member_grants(resource, &team)?))
    }
}
