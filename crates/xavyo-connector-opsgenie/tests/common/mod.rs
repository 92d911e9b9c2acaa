//! Common test utilities for xavyo-connector-opsgenie integration tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use xavyo_connector::resilience::RetryConfig;
use xavyo_connector_opsgenie::{OpsgenieConfig, OpsgenieConnector};

pub const API_KEY: &str = "test-genie-key";

/// Test data factory for creating Opsgenie users.
pub fn create_test_user(id: &str, username: &str, role: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "fullName": format!("Test User {id}"),
        "role": {"id": role, "name": role},
        "blocked": false,
        "verified": true,
        "timeZone": "Europe/Berlin",
        "locale": "en_US",
        "createdAt": "2024-01-01T00:00:00.000Z"
    })
}

/// Test data factory for creating Opsgenie teams.
pub fn create_test_team(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("Team {name}")
    })
}

/// Team detail with the given `(user id, username)` members.
pub fn create_team_detail(id: &str, name: &str, members: &[(&str, &str)]) -> Value {
    let members: Vec<Value> = members
        .iter()
        .map(|(user_id, username)| {
            json!({"user": {"id": user_id, "username": username}, "role": "user"})
        })
        .collect();
    json!({"id": id, "name": name, "members": members})
}

/// Schedule with one rotation holding the given participants.
pub fn create_test_schedule(id: &str, name: &str, participants: Vec<Value>) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("{name} schedule"),
        "timezone": "Europe/Kirov",
        "enabled": true,
        "ownerTeam": {"id": "t-owner", "name": "Owner"},
        "rotations": [
            {
                "id": format!("{id}-r1"),
                "name": "Weekly",
                "type": "weekly",
                "participants": participants
            }
        ]
    })
}

pub fn participant(kind: &str, id: &str) -> Value {
    json!({"type": kind, "id": id, "name": format!("{kind}-{id}")})
}

/// Non-flat on-call response for a schedule.
pub fn create_on_calls(schedule_id: &str, schedule_name: &str, participants: Vec<Value>) -> Value {
    json!({
        "data": {
            "_parent": {"id": schedule_id, "name": schedule_name, "enabled": true},
            "onCallParticipants": participants
        },
        "took": 0.012,
        "requestId": "req-on-calls"
    })
}

/// Wraps items in the Opsgenie list envelope.
pub fn create_list_response(items: Vec<Value>, next_link: Option<&str>, total: usize) -> Value {
    let mut response = json!({
        "data": items,
        "totalCount": total,
        "took": 0.05,
        "requestId": "req-list"
    });
    if let Some(link) = next_link {
        response["paging"] = json!({"next": link});
    }
    response
}

/// Creates an Opsgenie error body.
pub fn create_error_body(message: &str, request_id: &str) -> Value {
    json!({
        "message": message,
        "took": 0.002,
        "requestId": request_id
    })
}

/// Retry policy that keeps tests fast and deterministic.
pub fn fast_retry() -> RetryConfig {
    RetryConfig::new(3)
        .with_initial_backoff(1)
        .with_max_backoff(5)
        .without_jitter()
}

/// Mock server wrapper with common setup helpers.
pub struct MockOpsgenieServer {
    pub server: MockServer,
}

impl MockOpsgenieServer {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Configuration pointed at this server.
    pub fn config(&self, page_size: u32) -> OpsgenieConfig {
        OpsgenieConfig::builder(API_KEY)
            .base_url(self.url())
            .page_size(page_size)
            .retry(fast_retry())
            .build()
    }

    pub fn connector(&self, page_size: u32) -> OpsgenieConnector {
        OpsgenieConnector::new(self.config(page_size)).expect("connector builds")
    }

    /// Serves `users` in pages of `page_size`, keyed on the `offset` query.
    pub async fn mock_users_endpoint(&self, users: Vec<Value>, page_size: usize) {
        let total = users.len();
        let pages: Vec<Vec<Value>> = users.chunks(page_size).map(<[Value]>::to_vec).collect();
        let page_count = pages.len();

        if page_count == 0 {
            Mock::given(method("GET"))
                .and(path("/v2/users"))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(create_list_response(vec![], None, 0)),
                )
                .mount(&self.server)
                .await;
            return;
        }

        for (i, page) in pages.into_iter().enumerate() {
            let offset = i * page_size;
            let next_link = (i + 1 < page_count).then(|| {
                format!(
                    "{}/v2/users?limit={page_size}&offset={}",
                    self.url(),
                    offset + page_size
                )
            });

            Mock::given(method("GET"))
                .and(path("/v2/users"))
                .and(query_param("offset", offset.to_string()))
                .and(header("Authorization", format!("GenieKey {API_KEY}").as_str()))
                .respond_with(ResponseTemplate::new(200).set_body_json(create_list_response(
                    page,
                    next_link.as_deref(),
                    total,
                )))
                .expect(1..)
                .mount(&self.server)
                .await;
        }
    }

    pub async fn mock_teams_endpoint(&self, teams: Vec<Value>) {
        let total = teams.len();
        Mock::given(method("GET"))
            .and(path("/v2/teams"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(create_list_response(teams, None, total)),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mock_team_endpoint(&self, team_id: &str, detail: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/v2/teams/{team_id}")))
            .and(query_param("identifierType", "id"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": detail, "took": 0.01, "requestId": "req-team"})),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mock_roles_endpoint(&self, roles: Vec<Value>) {
        let total = roles.len();
        Mock::given(method("GET"))
            .and(path("/v2/roles"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(create_list_response(roles, None, total)),
            )
            .mount(&self.server)
            .await;
    }

    pub async fn mock_schedules_endpoint(&self, schedules: Vec<Value>) {
        let total = schedules.len();
        Mock::given(method("GET"))
            .and(path("/v2/schedules"))
            .and(query_param("expand", "rotation"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_list_response(schedules, None, total)),
            )
            .mount(&self.server)
            .await;
    }

    /// On-call endpoint. `encoded_name` is the schedule name as it appears in
    /// the request path.
    pub async fn mock_on_calls_endpoint(&self, encoded_name: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(format!("/v2/schedules/{encoded_name}/on-calls")))
            .and(query_param("scheduleIdentifierType", "name"))
            .and(query_param("flat", "false"))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_escalations_endpoint(&self, escalations: Vec<Value>) {
        let total = escalations.len();
        Mock::given(method("GET"))
            .and(path("/v2/escalations"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(create_list_response(escalations, None, total)),
            )
            .mount(&self.server)
            .await;
    }
}
