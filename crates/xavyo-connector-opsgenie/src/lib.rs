//! Opsgenie Connector for xavyo
//!
//! Read-only identity sync from the Opsgenie REST API. The connector exposes
//! users, teams, roles, schedules and escalations as resources, with
//! membership and on-call entitlements and the grants that back them.
//!
//! # Example
//!
//! ```no_run
//! use xavyo_connector::prelude::*;
//! use xavyo_connector_opsgenie::{OpsgenieConfig, OpsgenieConnector};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OpsgenieConfig::builder("your-api-key").build();
//! let connector = OpsgenieConnector::new(config)?;
//!
//! let ctx = SyncContext::new();
//! connector.validate(&ctx).await?;
//! let snapshot = SyncRunner::new(&connector).run(&ctx).await?;
//! println!("{} resources", snapshot.resources.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod connector;
mod error;
mod escalations;
mod models;
mod pagination;
mod resource_types;
mod roles;
mod schedules;
mod teams;
mod users;

// Re-exports
pub use client::OpsgenieClient;
pub use config::{
    default_retry_config, BuiltinRole, BuiltinRoles, ConfigError, OpsgenieConfig,
    OpsgenieConfigBuilder, DEFAULT_BASE_URL, MAX_PAGE_SIZE,
};
pub use connector::{OpsgenieConnector, OpsgenieSyncer};
pub use error::{ApiErrorBody, OpsgenieError, OpsgenieResult};
pub use escalations::EscalationSyncer;
pub use models::{
    CustomRole, Escalation, OnCalls, Participant, ParticipantKind, Rotation, Schedule, Team,
    TeamDetail, User,
};
pub use pagination::{handle_next_page, parse_page_token};
pub use resource_types::{ESCALATION, MEMBER, ON_CALL, ROLE, SCHEDULE, TEAM, USER};
pub use roles::RoleSyncer;
pub use schedules::ScheduleSyncer;
pub use teams::TeamSyncer;
pub use users::UserSyncer;
