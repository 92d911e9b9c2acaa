//! Opsgenie connector entry point.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};
use xavyo_connector::prelude::*;

use crate::client::OpsgenieClient;
use crate::config::OpsgenieConfig;
use crate::escalations::EscalationSyncer;
use crate::roles::RoleSyncer;
use crate::schedules::ScheduleSyncer;
use crate::teams::TeamSyncer;
use crate::users::UserSyncer;

const DISPLAY_NAME: &str = "Opsgenie";
const DESCRIPTION: &str = "Syncs Opsgenie users, teams, roles, schedules and escalations";

/// Opsgenie identity connector.
///
/// Exposes users, teams, roles, schedules and escalations. All syncers share
/// one HTTP client.
pub struct OpsgenieConnector {
    config: OpsgenieConfig,
    client: Arc<OpsgenieClient>,
}

impl OpsgenieConnector {
    /// Validate the configuration and build the HTTP client.
    pub fn new(config: OpsgenieConfig) -> ConnectorResult<Self> {
        config.validate()?;
        let client = OpsgenieClient::new(&config).map_err(|e| e.for_operation("build client"))?;

        Ok(Self {
            config,
            client: Arc::new(client),
        })
    }

    pub fn config(&self) -> &OpsgenieConfig {
        &self.config
    }

    pub fn client(&self) -> &Arc<OpsgenieClient> {
        &self.client
    }
}

impl fmt::Debug for OpsgenieConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpsgenieConnector")
            .field("config", &self.config.redacted())
            .finish_non_exhaustive()
    }
}

/// One syncer per Opsgenie resource type.
#[derive(Debug, Clone)]
pub enum OpsgenieSyncer {
    User(UserSyncer),
    Team(TeamSyncer),
    Role(RoleSyncer),
    Schedule(ScheduleSyncer),
    Escalation(EscalationSyncer),
}

impl OpsgenieSyncer {
    fn inner(&self) -> &dyn ResourceSyncer {
        match self {
            Self::User(s) => s,
            Self::Team(s) => s,
            Self::Role(s) => s,
            Self::Schedule(s) => s,
            Self::Escalation(s) => s,
        }
    }
}

#[async_trait]
impl ResourceSyncer for OpsgenieSyncer {
    fn resource_type(&self) -> &'static ResourceType {
        self.inner().resource_type()
    }

    async fn list(
        &self,
        ctx: &SyncContext,
        parent: Option<&ResourceId>,
        page: &PageToken,
    ) -> ConnectorResult<Page<Resource>> {
        self.inner().list(ctx, parent, page).await
    }

    async fn entitlements(
        &self,
        ctx: &SyncContext,
        resource: &Resource,
        page: &PageToken,
    ) -> ConnectorResult<Page<Entitlement>> {
        self.inner().entitlements(ctx, resource, page).await
    }

    async fn grants(
        &self,
        ctx: &SyncContext,
        resource: &Resource,
        page: &PageToken,
    ) -> ConnectorResult<Page<Grant>> {
        self.inner().grants(ctx, resource, page).await
    }
}

#[async_trait]
impl Connector for OpsgenieConnector {
    type Syncer = OpsgenieSyncer;

    fn metadata(&self) -> ConnectorMetadata {
        ConnectorMetadata {
            display_name: DISPLAY_NAME.to_string(),
            description: DESCRIPTION.to_string(),
        }
    }

    /// Checks the API key by fetching a single user.
    #[instrument(skip(self, ctx))]
    async fn validate(&self, ctx: &SyncContext) -> ConnectorResult<Annotations> {
        self.client
            .list_users(ctx, 1, 0)
            .await
            .map_err(|e| e.for_operation("validate credentials"))?;

        info!(base_url = %self.client.base_url(), "Opsgenie credentials validated");
        Ok(Annotations::new())
    }

    fn resource_syncers(&self) -> Vec<OpsgenieSyncer> {
        let client = &self.client;
        vec![
            OpsgenieSyncer::Team(TeamSyncer::new(Arc::clone(client))),
            OpsgenieSyncer::Role(RoleSyncer::new(
                Arc::clone(client),
                self.config.builtin_roles.clone(),
                self.config.page_size,
            )),
            OpsgenieSyncer::User(UserSyncer::new(Arc::clone(client), self.config.page_size)),
            OpsgenieSyncer::Schedule(ScheduleSyncer::new(Arc::clone(client))),
            OpsgenieSyncer::Escalation(EscalationSyncer::new(Arc::clone(client))),
        ]
    }
}
