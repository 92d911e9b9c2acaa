//! # Connector Framework
//!
//! Core abstractions for syncing identity data out of external systems.
//!
//! A connector projects an upstream system onto a small governance graph:
//! resources (users, groups, roles), the entitlements those resources offer,
//! and the grants that say who holds which entitlement.
//!
//! ## Architecture
//!
//! - [`Connector`] - Metadata, credential validation and the list of syncers
//! - [`ResourceSyncer`] - Paged `list`, `entitlements` and `grants` per resource type
//! - [`Bag`] - Opaque, versioned pagination state handed back and forth with the host
//! - [`SyncContext`] - Cancellation and deadline carried through every call
//! - [`SyncRunner`] - Reference driver that pages through a connector like the host does
//!
//! ## Example
//!
//! ```ignore
//! use xavyo_connector::prelude::*;
//!
//! let ctx = SyncContext::new().with_timeout(Duration::from_secs(300));
//! connector.validate(&ctx).await?;
//!
//! let snapshot = SyncRunner::new(&connector).run(&ctx).await?;
//! println!("{} grants", snapshot.grants.len());
//! ```
//!
//! ## Crate Organization
//!
//! - [`types`] - Resource types and connector metadata
//! - [`resource`] - Resources, profiles and user fields
//! - [`entitlement`] / [`grant`] - Graph edges
//! - [`annotations`] - Typed hints attached to graph elements
//! - [`pagination`] - Page tokens, pages and the state bag
//! - [`error`] - Error types with transient/permanent classification
//! - [`resilience`] - Retry policy
//! - [`config`] - Configuration trait and shared connection settings

pub mod annotations;
pub mod config;
pub mod context;
pub mod entitlement;
pub mod error;
pub mod grant;
pub mod pagination;
pub mod resilience;
pub mod resource;
pub mod sync;
pub mod traits;
pub mod types;

pub use context::SyncContext;
pub use pagination::Bag;
pub use sync::SyncRunner;
pub use traits::{Connector, ResourceSyncer};

/// Prelude module for convenient imports.
///
/// ```
/// use xavyo_connector::prelude::*;
/// ```
pub mod prelude {
    // Types
    pub use crate::types::{ConnectorMetadata, ResourceTrait, ResourceType};

    // Graph
    pub use crate::annotations::{Annotation, Annotations};
    pub use crate::entitlement::{entitlement_id, Entitlement, EntitlementPurpose};
    pub use crate::grant::{EntitlementRef, Grant};
    pub use crate::resource::{
        Profile, ProfileSchema, ProfileValue, Resource, ResourceId, TraitData, UserStatus,
        UserTrait,
    };

    // Pagination
    pub use crate::pagination::{Bag, Page, PageState, PageToken};

    // Error handling
    pub use crate::error::{ConnectorError, ConnectorResult};

    // Traits
    pub use crate::traits::{Connector, ResourceSyncer};

    // Runtime
    pub use crate::context::SyncContext;
    pub use crate::sync::{SyncRunner, SyncSnapshot};

    // Configuration
    pub use crate::config::{ConnectionSettings, ConnectorConfig};
    pub use crate::resilience::RetryConfig;
}

// Re-export async_trait for connector implementors
pub use async_trait::async_trait;
