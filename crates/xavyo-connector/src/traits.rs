//! Connector Framework traits
//!
//! A connector exposes one [`ResourceSyncer`] per resource type it knows
//! about. The host walks each syncer page by page: resources first, then the
//! entitlements and grants of every resource.

use async_trait::async_trait;

use crate::annotations::Annotations;
use crate::context::SyncContext;
use crate::entitlement::Entitlement;
use crate::error::ConnectorResult;
use crate::grant::Grant;
use crate::pagination::{Page, PageToken};
use crate::resource::{Resource, ResourceId};
use crate::types::{ConnectorMetadata, ResourceType};

/// Read-only sync of a single resource type.
///
/// Every operation is paginated through an opaque token. Implementations
/// return an empty `next_page_token` once the listing is exhausted and must
/// honor cancellation through `ctx`.
#[async_trait]
pub trait ResourceSyncer: Send + Sync {
    /// The resource type this syncer handles.
    fn resource_type(&self) -> &'static ResourceType;

    /// List resources of this type, optionally scoped to a parent.
    async fn list(
        &self,
        ctx: &SyncContext,
        parent: Option<&ResourceId>,
        page: &PageToken,
    ) -> ConnectorResult<Page<Resource>>;

    /// List the entitlements offered by `resource`.
    async fn entitlements(
        &self,
        ctx: &SyncContext,
        resource: &Resource,
        page: &PageToken,
    ) -> ConnectorResult<Page<Entitlement>>;

    /// List the grants of the entitlements offered by `resource`.
    async fn grants(
        &self,
        ctx: &SyncContext,
        resource: &Resource,
        page: &PageToken,
    ) -> ConnectorResult<Page<Grant>>;
}

/// Base trait for all connectors.
#[async_trait]
pub trait Connector: Send + Sync {
    type Syncer: ResourceSyncer;

    /// Static description of this connector.
    fn metadata(&self) -> ConnectorMetadata;

    /// Check that the configured credentials work against the target system.
    async fn validate(&self, ctx: &SyncContext) -> ConnectorResult<Annotations>;

    /// One syncer per supported resource type.
    fn resource_syncers(&self) -> Vec<Self::Syncer>;
}
