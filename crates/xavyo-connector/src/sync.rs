//! Reference sync driver.
//!
//! Walks every syncer of a connector the way the host does: page through
//! `list`, then page through `entitlements` and `grants` of each resource,
//! feeding back the previous call's token each time.

use std::future::Future;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::context::SyncContext;
use crate::entitlement::Entitlement;
use crate::error::{ConnectorError, ConnectorResult};
use crate::grant::Grant;
use crate::pagination::{Page, PageToken};
use crate::resource::Resource;
use crate::traits::{Connector, ResourceSyncer};

/// Everything collected in one sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSnapshot {
    pub resources: Vec<Resource>,
    pub entitlements: Vec<Entitlement>,
    pub grants: Vec<Grant>,
}

impl SyncSnapshot {
    /// Grants whose entitlement lives on the given resource id.
    pub fn grants_for<'a>(&'a self, resource_id: &'a str) -> impl Iterator<Item = &'a Grant> {
        self.grants
            .iter()
            .filter(move |g| g.entitlement.resource.resource == resource_id)
    }
}

/// Drives a [`Connector`] through a full sync pass.
pub struct SyncRunner<'a, C: Connector> {
    connector: &'a C,
    page_size: u32,
}

impl<'a, C: Connector> SyncRunner<'a, C> {
    pub fn new(connector: &'a C) -> Self {
        Self {
            connector,
            page_size: 0,
        }
    }

    /// Page size hint passed to every call; 0 lets the connector choose.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Run one full pass over every resource type.
    #[instrument(skip(self, ctx))]
    pub async fn run(&self, ctx: &SyncContext) -> ConnectorResult<SyncSnapshot> {
        let mut snapshot = SyncSnapshot::default();

        for syncer in self.connector.resource_syncers() {
            ctx.check()?;
            let resource_type = syncer.resource_type();
            let syncer = &syncer;

            let resources = self
                .drain(resource_type.id, "list", move |page| async move {
                    syncer.list(ctx, None, &page).await
                })
                .await?;

            if !resource_type.skip_entitlements_and_grants {
                for resource in &resources {
                    let entitlements = self
                        .drain(resource_type.id, "entitlements", move |page| async move {
                            syncer.entitlements(ctx, resource, &page).await
                        })
                        .await?;
                    snapshot.entitlements.extend(entitlements);

                    let grants = self
                        .drain(resource_type.id, "grants", move |page| async move {
                            syncer.grants(ctx, resource, &page).await
                        })
                        .await?;
                    snapshot.grants.extend(grants);
                }
            }

            info!(
                resource_type = resource_type.id,
                count = resources.len(),
                "Synced resource type"
            );
            snapshot.resources.extend(resources);
        }

        info!(
            resources = snapshot.resources.len(),
            entitlements = snapshot.entitlements.len(),
            grants = snapshot.grants.len(),
            "Sync pass complete"
        );
        Ok(snapshot)
    }

    /// Call `fetch` until the returned token is empty.
    ///
    /// A token that comes back unchanged would loop forever and is rejected.
    async fn drain<T, F, Fut>(
        &self,
        resource_type: &str,
        operation: &str,
        mut fetch: F,
    ) -> ConnectorResult<Vec<T>>
    where
        F: FnMut(PageToken) -> Fut,
        Fut: Future<Output = ConnectorResult<Page<T>>>,
    {
        let mut items = Vec::new();
        let mut token = PageToken::first().with_size(self.page_size);
        let mut pages = 0usize;

        loop {
            let page = fetch(token.clone()).await?;
            pages += 1;
            debug!(
                resource_type,
                operation,
                page = pages,
                items = page.items.len(),
                "Fetched page"
            );
            items.extend(page.items);

            if page.next_page_token.is_empty() {
                return Ok(items);
            }
            if page.next_page_token == token.token {
                return Err(ConnectorError::internal(format!(
                    "{operation} on {resource_type} returned the same page token twice"
                )));
            }
            token = PageToken::new(page.next_page_token).with_size(self.page_size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::Annotations;
    use crate::types::{ConnectorMetadata, ResourceTrait, ResourceType};
    use async_trait::async_trait;

    static TEAM: ResourceType = ResourceType {
        id: "team",
        display_name: "Team",
        traits: &[ResourceTrait::Group],
        skip_entitlements_and_grants: false,
    };

    static USER: ResourceType = ResourceType {
        id: "user",
        display_name: "User",
        traits: &[ResourceTrait::User],
        skip_entitlements_and_grants: true,
    };

    /// Serves `total` resources two per page; optionally gets stuck.
    struct FakeSyncer {
        resource_type: &'static ResourceType,
        total: usize,
        stuck: bool,
    }

    #[async_trait]
    impl ResourceSyncer for FakeSyncer {
        fn resource_type(&self) -> &'static ResourceType {
            self.resource_type
        }

        async fn list(
            &self,
            _ctx: &SyncContext,
            _parent: Option<&crate::resource::ResourceId>,
            page: &PageToken,
        ) -> ConnectorResult<Page<Resource>> {
            if self.stuck {
                return Ok(Page::with_next(Vec::new(), "same".to_string()));
            }
            let offset: usize = page.token.parse().unwrap_or(0);
            let end = (offset + 2).min(self.total);
            let items = (offset..end)
                .map(|i| {
                    Resource::builder(self.resource_type, format!("r{i}"), format!("R{i}"))
                        .build()
                        .unwrap()
                })
                .collect();
            let next = if end < self.total {
                end.to_string()
            } else {
                String::new()
            };
            Ok(Page::with_next(items, next))
        }

        async fn entitlements(
            &self,
            _ctx: &SyncContext,
            resource: &Resource,
            _page: &PageToken,
        ) -> ConnectorResult<Page<Entitlement>> {
            Ok(Page::last(vec![Entitlement::assignment(resource, "member")]))
        }

        async fn grants(
            &self,
            _ctx: &SyncContext,
            resource: &Resource,
            _page: &PageToken,
        ) -> ConnectorResult<Page<Grant>> {
            let principal = crate::resource::ResourceId::new(&USER, "u1")?;
            Ok(Page::last(vec![Grant::new(resource, "member", principal)]))
        }
    }

    struct FakeConnector {
        stuck: bool,
    }

    #[async_trait]
    impl Connector for FakeConnector {
        type Syncer = FakeSyncer;

        fn metadata(&self) -> ConnectorMetadata {
            ConnectorMetadata {
                display_name: "Fake".to_string(),
                description: "Test connector".to_string(),
            }
        }

        async fn validate(&self, _ctx: &SyncContext) -> ConnectorResult<Annotations> {
            Ok(Annotations::new())
        }

        fn resource_syncers(&self) -> Vec<FakeSyncer> {
            vec![
                FakeSyncer {
                    resource_type: &TEAM,
                    total: 3,
                    stuck: self.stuck,
                },
                FakeSyncer {
                    resource_type: &USER,
                    total: 5,
                    stuck: false,
                },
            ]
        }
    }

    #[tokio::test]
    async fn test_run_collects_everything() {
        let connector = FakeConnector { stuck: false };
        let snapshot = SyncRunner::new(&connector)
            .run(&SyncContext::new())
            .await
            .unwrap();

        assert_eq!(snapshot.resources.len(), 8);
        // Users skip entitlements and grants.
        assert_eq!(snapshot.entitlements.len(), 3);
        assert_eq!(snapshot.grants.len(), 3);
        assert_eq!(snapshot.grants_for("r1").count(), 1);
    }

    #[tokio::test]
    async fn test_run_rejects_stuck_token() {
        let connector = FakeConnector { stuck: true };
        let result = SyncRunner::new(&connector).run(&SyncContext::new()).await;
        assert!(matches!(result, Err(ConnectorError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_run_honors_cancellation() {
        let ctx = SyncContext::new();
        ctx.cancellation_token().cancel();

        let connector = FakeConnector { stuck: false };
        let result = SyncRunner::new(&connector).run(&ctx).await;
        assert!(matches!(result, Err(ConnectorError::Cancelled)));
    }
}
