//! Opsgenie REST v2 response shapes.
//!
//! Only the fields the connector reads are modelled; everything else in the
//! payloads is ignored.

use serde::Deserialize;

/// Envelope of list endpoints.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub paging: Option<Paging>,
    #[serde(rename = "totalCount", default)]
    pub total_count: Option<u64>,
}

impl<T> ListResponse<T> {
    /// The `paging.next` link, if any.
    pub fn next_link(&self) -> Option<&str> {
        self.paging.as_ref().and_then(|p| p.next.as_deref())
    }
}

/// Envelope of single-object endpoints.
#[derive(Debug, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

/// Continuation links of a paged response.
#[derive(Debug, Default, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub next: Option<String>,
}

/// A user from `GET /v2/users`.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(rename = "fullName", default)]
    pub full_name: String,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default)]
    pub verified: bool,
    #[serde(rename = "timeZone", default)]
    pub time_zone: String,
}

impl User {
    /// Name of the user's role, empty when the role is missing.
    pub fn role_name(&self) -> &str {
        self.role.as_ref().map_or("", |r| r.name.as_str())
    }
}

/// Role reference embedded in a user.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRole {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A team from `GET /v2/teams`.
#[derive(Debug, Clone, Deserialize)]
pub struct Team {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A team from `GET /v2/teams/{id}`, members included.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamDetail {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamMember {
    #[serde(default)]
    pub user: Option<MemberUser>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
}

/// A custom role from `GET /v2/roles`.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomRole {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A schedule from `GET /v2/schedules?expand=rotation`.
#[derive(Debug, Clone, Deserialize)]
pub struct Schedule {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub rotations: Vec<Rotation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rotation {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

/// A rotation or on-call participant.
///
/// `kind` is kept as the raw wire string so unknown kinds can be reported.
#[derive(Debug, Clone, Deserialize)]
pub struct Participant {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Participant kinds the connector understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantKind {
    User,
    Team,
    Escalation,
}

impl ParticipantKind {
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "user" => Some(ParticipantKind::User),
            "team" => Some(ParticipantKind::Team),
            "escalation" => Some(ParticipantKind::Escalation),
            _ => None,
        }
    }
}

/// Payload of `GET /v2/schedules/{name}/on-calls`.
#[derive(Debug, Clone, Deserialize)]
pub struct OnCalls {
    #[serde(rename = "onCallParticipants", default)]
    pub on_call_participants: Vec<Participant>,
}

/// An escalation from `GET /v2/escalations`.
#[derive(Debug, Clone, Deserialize)]
pub struct Escalation {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}
