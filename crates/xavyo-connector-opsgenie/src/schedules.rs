//! Schedule sync from Opsgenie.
//!
//! A schedule has two kinds of holders: the teams and users that take part
//! in its rotations (`member`), and whoever is on call right now (`on-call`).

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};
use xavyo_connector::prelude::*;

use crate::client::OpsgenieClient;
use crate::error::{OpsgenieError, OpsgenieResult};
use crate::models::{
    DataResponse, ListResponse, OnCalls, Participant, ParticipantKind, Rotation, Schedule,
};
use crate::resource_types::{ESCALATION, MEMBER, ON_CALL, SCHEDULE, TEAM, USER};

const SCHEDULE_PROFILE: ProfileSchema = &[
    "schedule_id",
    "schedule_name",
    "schedule_description",
    "schedule_timezone",
    "schedule_enabled",
    "schedule_teams",
    "schedule_users",
];

impl OpsgenieClient {
    /// Lists all schedules with their rotations expanded.
    #[instrument(skip(self, ctx))]
    pub async fn list_schedules(&self, ctx: &SyncContext) -> OpsgenieResult<Vec<Schedule>> {
        let mut url = self.endpoint(&["v2", "schedules"])?;
        url.query_pairs_mut().append_pair("expand", "rotation");
        let response: ListResponse<Schedule> = self.get(ctx, url).await?;
        debug!(count = response.data.len(), "Fetched schedules");
        Ok(response.data)
    }

    /// Fetches the current on-call participants of a schedule, by name.
    #[instrument(skip(self, ctx))]
    pub async fn get_on_calls(
        &self,
        ctx: &SyncContext,
        schedule_name: &str,
    ) -> OpsgenieResult<OnCalls> {
        let mut url = self.endpoint(&["v2", "schedules", schedule_name, "on-calls"])?;
        url.query_pairs_mut()
            .append_pair("scheduleIdentifierType", "name")
            .append_pair("flat", "false");
        let response: DataResponse<OnCalls> = self.get(ctx, url).await?;
        debug!(
            participants = response.data.on_call_participants.len(),
            "Fetched on-call participants"
        );
        Ok(response.data)
    }
}

/// Teams and users taking part in the rotations, each in first-seen order
/// without duplicates. Other participant kinds are ignored.
pub fn rotation_participants(rotations: &[Rotation]) -> (Vec<String>, Vec<String>) {
    let mut teams: Vec<String> = Vec::new();
    let mut users: Vec<String> = Vec::new();

    for participant in rotations.iter().flat_map(|r| &r.participants) {
        let bucket = match ParticipantKind::parse(&participant.kind) {
            Some(ParticipantKind::Team) => &mut teams,
            Some(ParticipantKind::User) => &mut users,
            _ => continue,
        };
        if !participant.id.is_empty() && !bucket.contains(&participant.id) {
            bucket.push(participant.id.clone());
        }
    }

    (teams, users)
}

/// Maps an Opsgenie schedule to a group resource.
pub fn schedule_resource(schedule: &Schedule) -> ConnectorResult<Resource> {
    let (teams, users) = rotation_participants(&schedule.rotations);

    let profile = Profile::builder(SCHEDULE_PROFILE)
        .string("schedule_id", &schedule.id)
        .string("schedule_name", &schedule.name)
        .string("schedule_description", &schedule.description)
        .string("schedule_timezone", &schedule.timezone)
        .bool("schedule_enabled", schedule.enabled)
        .string_list("schedule_teams", teams)
        .string_list("schedule_users", users)
        .build()?;

    Resource::builder(&SCHEDULE, &schedule.id, &schedule.name)
        .profile(profile)
        .build()
}

/// The `member` and `on-call` entitlements of a schedule.
pub fn schedule_entitlements(resource: &Resource) -> Vec<Entitlement> {
    let name = resource.display_name();
    vec![
        Entitlement::assignment(resource, MEMBER)
            .grantable_to(&[&USER, &TEAM])
            .with_display_name(format!("{name} schedule {MEMBER}"))
            .with_description(format!("{name} Opsgenie schedule {MEMBER}")),
        Entitlement::assignment(resource, ON_CALL)
            .grantable_to(&[&USER, &TEAM, &ESCALATION])
            .with_display_name(format!("{name} schedule {ON_CALL}"))
            .with_description(format!("{name} Opsgenie schedule {ON_CALL}")),
    ]
}

/// Expansion hint pointing at a team's `member` entitlement.
fn team_expansion(team: &ResourceId) -> Annotation {
    Annotation::grant_expandable([entitlement_id(team, MEMBER)])
}

/// `member` grants from the rotation participants stored in the profile.
///
/// A schedule without users or teams is normal; the absence is logged.
pub fn schedule_member_grants(resource: &Resource) -> ConnectorResult<Vec<Grant>> {
    let profile = resource.profile();
    let users = profile.get_string_list("schedule_users").unwrap_or_else(|| {
        info!(schedule = %resource.id(), "No users found for schedule");
        &[][..]
    });
    let teams = profile.get_string_list("schedule_teams").unwrap_or_else(|| {
        info!(schedule = %resource.id(), "No teams found for schedule");
        &[][..]
    });

    let mut grants = Vec::with_capacity(users.len() + teams.len());
    for user in users {
        grants.push(Grant::new(resource, MEMBER, ResourceId::new(&USER, user.as_str())?));
    }
    for team in teams {
        let principal = ResourceId::new(&TEAM, team.as_str())?;
        let expansion = team_expansion(&principal);
        grants.push(Grant::new(resource, MEMBER, principal).with_annotation(expansion));
    }
    Ok(grants)
}

/// `on-call` grants for the current participants.
///
/// Fails on a participant kind the connector does not know; no partial
/// result is returned.
pub fn schedule_on_call_grants(
    resource: &Resource,
    participants: &[Participant],
) -> OpsgenieResult<Vec<Grant>> {
    participants
        .iter()
        .map(|participant| -> OpsgenieResult<Grant> {
            let kind = ParticipantKind::parse(&participant.kind).ok_or_else(|| {
                OpsgenieError::UnexpectedResponse(format!(
                    "unknown participant type: {}",
                    participant.kind
                ))
            })?;

            let grant = match kind {
                ParticipantKind::User => {
                    Grant::new(resource, ON_CALL, ResourceId::new(&USER, participant.id.as_str())?)
                }
                ParticipantKind::Team => {
                    let principal = ResourceId::new(&TEAM, participant.id.as_str())?;
                    let expansion = team_expansion(&principal);
                    Grant::new(resource, ON_CALL, principal).with_annotation(expansion)
                }
                ParticipantKind::Escalation => Grant::new(
                    resource,
                    ON_CALL,
                    ResourceId::new(&ESCALATION, participant.id.as_str())?,
                ),
            };
            Ok(grant)
        })
        .collect()
}

/// Syncer for the `schedule` resource type.
#[derive(Debug, Clone)]
pub struct ScheduleSyncer {
    client: Arc<OpsgenieClient>,
}

impl ScheduleSyncer {
    pub fn new(client: Arc<OpsgenieClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceSyncer for ScheduleSyncer {
    fn resource_type(&self) -> &'static ResourceType {
        &SCHEDULE
    }

    async fn list(
        &self,
        ctx: &SyncContext,
        _parent: Option<&ResourceId>,
        _page: &PageToken,
    ) -> ConnectorResult<Page<Resource>> {
        let schedules = self
            .client
            .list_schedules(ctx)
            .await
            .map_err(|e| e.for_operation("list schedules"))?;

        let resources = schedules
            .iter()
            .map(schedule_resource)
            .collect::<ConnectorResult<Vec<_>>>()?;
        Ok(Page::last(resources))
    }

    async fn entitlements(
        &self,
        _ctx: &SyncContext,
        resource: &Resource,
        _page: &PageToken,
    ) -> ConnectorResult<Page<Entitlement>> {
        Ok(Page::last(schedule_entitlements(resource)))
    }

    async fn grants(
        &self,
        ctx: &SyncContext,
        resource: &Resource,
        _page: &PageToken,
    ) -> ConnectorResult<Page<Grant>> {
        let mut grants = schedule_member_grants(resource)?;

        let on_calls = self
            .client
            .get_on_calls(ctx, resource.display_name())
            .await
            .map_err(|e| e.for_operation("list on-calls"))?;

        let on_call_grants = schedule_on_call_grants(resource, &on_calls.on_call_participants)
            .map_err(|e| e.for_operation("list on-calls"))?;
        grants.extend(on_call_grants);

        Ok(Page::last(grants))
    }
}
