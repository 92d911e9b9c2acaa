//! User sync from Opsgenie.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument};
use xavyo_connector::prelude::*;

use crate::client::OpsgenieClient;
use crate::config::MAX_PAGE_SIZE;
use crate::error::OpsgenieResult;
use crate::models::{ListResponse, User};
use crate::pagination::{handle_next_page, parse_page_token};
use crate::resource_types::USER;

const USER_PROFILE: ProfileSchema = &["full_name", "time_zone", "blocked", "verified", "email"];

impl OpsgenieClient {
    /// Fetches one page of the user directory.
    #[instrument(skip(self, ctx))]
    pub async fn list_users(
        &self,
        ctx: &SyncContext,
        limit: u32,
        offset: u32,
    ) -> OpsgenieResult<ListResponse<User>> {
        let mut url = self.endpoint(&["v2", "users"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());

        let page: ListResponse<User> = self.get(ctx, url).await?;
        debug!(count = page.data.len(), total = ?page.total_count, "Fetched users page");
        Ok(page)
    }
}

/// Page size to request: the host's hint when given, the configured size otherwise.
pub(crate) fn page_limit(requested: u32, configured: u32) -> u32 {
    if requested == 0 {
        configured
    } else {
        requested.min(MAX_PAGE_SIZE)
    }
}

/// Maps an Opsgenie user to a user resource.
///
/// The username is the login email and becomes the primary email. Opsgenie
/// has no account status the connector can see, so users are always enabled.
pub fn user_resource(user: &User) -> ConnectorResult<Resource> {
    let profile = Profile::builder(USER_PROFILE)
        .string("full_name", &user.full_name)
        .string("time_zone", &user.time_zone)
        .bool("blocked", user.blocked)
        .bool("verified", user.verified)
        .string("email", &user.username)
        .build()?;

    let display_name = if user.full_name.is_empty() {
        &user.username
    } else {
        &user.full_name
    };

    Resource::builder(&USER, &user.id, display_name)
        .profile(profile)
        .user_trait(
            UserTrait::default()
                .with_email(&user.username, true)
                .with_status(UserStatus::Enabled),
        )
        .annotation(Annotation::v1_identifier(&user.id))
        .build()
}

/// Syncer for the `user` resource type.
#[derive(Debug, Clone)]
pub struct UserSyncer {
    client: Arc<OpsgenieClient>,
    page_size: u32,
}

impl UserSyncer {
    pub fn new(client: Arc<OpsgenieClient>, page_size: u32) -> Self {
        Self { client, page_size }
    }
}

#[async_trait]
impl ResourceSyncer for UserSyncer {
    fn resource_type(&self) -> &'static ResourceType {
        &USER
    }

    async fn list(
        &self,
        ctx: &SyncContext,
        _parent: Option<&ResourceId>,
        page: &PageToken,
    ) -> ConnectorResult<Page<Resource>> {
        let (mut bag, offset) = parse_page_token(&page.token, PageState::new(USER.id, ""))?;
        let limit = page_limit(page.size, self.page_size);

        let response = self
            .client
            .list_users(ctx, limit, offset)
            .await
            .map_err(|e| e.for_operation("list users"))?;

        let resources = response
            .data
            .iter()
            .map(user_resource)
            .collect::<ConnectorResult<Vec<_>>>()?;

        let next = handle_next_page(&mut bag, response.next_link())?;
        Ok(Page::with_next(resources, next))
    }

    async fn entitlements(
        &self,
        _ctx: &SyncContext,
        _resource: &Resource,
        _page: &PageToken,
    ) -> ConnectorResult<Page<Entitlement>> {
        Ok(Page::empty())
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
