//! Integration tests for paged user listing.

mod common;

use common::*;
use std::sync::Arc;
use xavyo_connector::prelude::*;
use xavyo_connector_opsgenie::UserSyncer;

async fn drain_users(syncer: &UserSyncer, ctx: &SyncContext) -> (Vec<Resource>, usize) {
    let mut token = PageToken::first();
    let mut resources = Vec::new();
    let mut calls = 0;

    loop {
        let page = syncer.list(ctx, None, &token).await.unwrap();
        calls += 1;
        let more = page.has_more();
        resources.extend(page.items);
        if !more {
            return (resources, calls);
        }
        token = PageToken::new(page.next_page_token);
    }
}

#[tokio::test]
async fn test_users_paged_exactly_once() {
    let mock = MockOpsgenieServer::new().await;
    let users: Vec<_> = (0..7)
        .map(|i| create_test_user(&format!("u{i}"), &format!("user{i}@example.com"), "User"))
        .collect();
    mock.mock_users_endpoint(users, 3).await;

    let connector = mock.connector(3);
    let syncer = UserSyncer::new(Arc::clone(connector.client()), 3);
    let (resources, calls) = drain_users(&syncer, &SyncContext::new()).await;

    assert_eq!(calls, 3);
    let ids: Vec<&str> = resources.iter().map(|r| r.id().resource.as_str()).collect();
    assert_eq!(ids, ["u0", "u1", "u2", "u3", "u4", "u5", "u6"]);
    assert_eq!(resources[0].user_trait().unwrap().primary_email(), Some("user0@example.com"));
}

#[tokio::test]
async fn test_next_token_carries_offset() {
    let mock = MockOpsgenieServer::new().await;
    let users: Vec<_> = (0..4)
        .map(|i| create_test_user(&format!("u{i}"), &format!("user{i}@example.com"), "User"))
        .collect();
    mock.mock_users_endpoint(users, 2).await;

    let connector = mock.connector(2);
    let syncer = UserSyncer::new(Arc::clone(connector.client()), 2);
    let page = syncer
        .list(&SyncContext::new(), None, &PageToken::first())
        .await
        .unwrap();

    let bag = Bag::unmarshal(&page.next_page_token).unwrap();
    let state = bag.current().unwrap();
    assert_eq!(state.resource_type_id, "user");
    assert_eq!(state.token, "2");
    assert_eq!(bag.depth(), 1);

    // Feeding the token back resumes at offset 2 and ends the listing.
    let next = syncer
        .list(&SyncContext::new(), None, &PageToken::new(page.next_page_token))
        .await
        .unwrap();
    let ids: Vec<&str> = next.items.iter().map(|r| r.id().resource.as_str()).collect();
    assert_eq!(ids, ["u2", "u3"]);
    assert!(next.next_page_token.is_empty());
}

#[tokio::test]
async fn test_empty_directory() {
    let mock = MockOpsgenieServer::new().await;
    mock.mock_users_endpoint(vec![], 10).await;

    let connector = mock.connector(10);
    let syncer = UserSyncer::new(Arc::clone(connector.client()), 10);
    let page = syncer
        .list(&SyncContext::new(), None, &PageToken::first())
        .await
        .unwrap();

    assert!(page.items.is_empty());
    assert!(page.next_page_token.is_empty());
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let mock = MockOpsgenieServer::new().await;
    let connector = mock.connector(10);
    let syncer = UserSyncer::new(Arc::clone(connector.client()), 10);

    let err = syncer
        .list(&SyncContext::new(), None, &PageToken::new("%%not-a-token%%"))
        .await
        .unwrap_err();
    assert!(matches!(err, ConnectorError::InvalidPageToken { .. }));
}

#[tokio::test]
async fn test_user_entitlements_and_grants_empty() {
    let mock = MockOpsgenieServer::new().await;
    mock.mock_users_endpoint(
        vec![create_test_user("u1", "alice@example.com", "Admin")],
        10,
    )
    .await;

    let connector = mock.connector(10);
    let syncer = UserSyncer::new(Arc::clone(connector.client()), 10);
    let ctx = SyncContext::new();
    let page = syncer.list(&ctx, None, &PageToken::first()).await.unwrap();
    let user = &page.items[0];

    let entitlements = syncer.entitlements(&ctx, user, &PageToken::first()).await.unwrap();
    let grants = syncer.grants(&ctx, user, &PageToken::first()).await.unwrap();
    assert!(entitlements.items.is_empty());
    assert!(grants.items.is_empty());
}
