//! Integration tests for the generic CRUD helpers
//!
//! **Coverage:**
//! - Argument validation happens before any request is sent
//! - Create round-trips the server's body into a richer read shape
//! - List pagination only sends supplied values; filters are encoded
//! - Update, delete, bulk-set, add-member and download paths and methods

#![allow(dead_code)]

#[path = "support.rs"]
mod support;

use lookerkit_domain::{Identifier, ListOptions};
use lookerkit_infra::api::ApiErrorCategory;
use lookerkit_infra::ApiError;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Serialize)]
struct WriteGroup<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Group {
    id: i64,
    name: String,
    #[serde(default)]
    can_add_to_content_metadata: bool,
}

async fn strict_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_invalid_ids_send_no_requests() {
    let server = strict_server().await;
    let client = support::client(&server);
    let body = WriteGroup { name: "x" };

    for id in [0_i64, -1, -42] {
        let err = client.get_by_id::<Group>("4.0/groups", id).await.unwrap_err();
        assert!(err.is_argument_error());
        assert_eq!(err.to_string(), "id is invalid because cannot be less than 1");

        let err = client.update::<_, Group>("4.0/groups", id, &body, &[]).await.unwrap_err();
        assert!(err.is_argument_error());

        let err = client.delete("4.0/groups", id, &[]).await.unwrap_err();
        assert_eq!(err.category(), ApiErrorCategory::Argument);
    }

    let err = client.get_by_id::<Group>("4.0/groups", "").await.unwrap_err();
    assert!(err.is_argument_error());

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_bulk_set_sends_no_request() {
    let server = strict_server().await;
    let client = support::client(&server);

    let err = client.set::<Vec<i64>>("4.0/groups/3/groups", &[], &[]).await.unwrap_err();
    assert!(matches!(err, ApiError::Argument(_)));
    assert_eq!(err.to_string(), "ids is invalid because cannot be empty");

    let err = client
        .set::<Vec<i64>>("4.0/groups/3/groups", &[Identifier::from(4), Identifier::from(0)], &[])
        .await
        .unwrap_err();
    assert!(err.is_argument_error());

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_round_trip() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/4.0/groups"))
        .and(body_json(serde_json::json!({"name": "analysts"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": 12,
            "name": "analysts",
            "can_add_to_content_metadata": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = support::client(&server);
    let (group, response) = client
        .create::<_, Group>("4.0/groups", &WriteGroup { name: "analysts" }, &[])
        .await
        .unwrap();

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(
        group,
        Some(Group { id: 12, name: "analysts".to_string(), can_add_to_content_metadata: true })
    );
}

#[tokio::test]
async fn test_list_sends_only_supplied_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 1, "name": "a"},
            {"id": 2, "name": "b"}
        ])))
        .mount(&server)
        .await;

    let client = support::client(&server);

    let (groups, _) = client.list::<Group>("4.0/groups", None, &[]).await.unwrap();
    assert_eq!(groups.len(), 2);

    client.list::<Group>("4.0/groups", Some(&ListOptions::new(50, 0)), &[]).await.unwrap();
    client.list::<Group>("4.0/groups", Some(&ListOptions::new(50, 100)), &[]).await.unwrap();

    let queries: Vec<Option<String>> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.query().map(str::to_string))
        .collect();
    assert_eq!(
        queries,
        vec![None, Some("limit=50".to_string()), Some("limit=50&offset=100".to_string())]
    );
}

#[tokio::test]
async fn test_list_by_filter_encodes_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/users/search"))
        .and(query_param("email", "ada+ops@example.com"))
        .and(query_param("limit", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{"id": 10, "name": "Ada"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = support::client(&server);
    let (users, _) = client
        .list_by_filter::<Group>(
            "4.0/users/search",
            &[("email", "ada+ops@example.com")],
            Some(&ListOptions::new(1, 0)),
        )
        .await
        .unwrap();

    assert_eq!(users[0].id, 10);
}

#[tokio::test]
async fn test_update_delete_and_membership_paths() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/4.0/groups/12"))
        .and(body_json(serde_json::json!({"name": "renamed"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"id": 12, "name": "renamed"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/4.0/groups/12/users/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/4.0/roles/3/groups"))
        .and(body_json(serde_json::json!([1, "slug-2"])))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 1, "name": "a"},
                {"id": 2, "name": "b"}
            ])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/4.0/groups/12/users"))
        .and(body_json(serde_json::json!({"user_id": 7})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 7, "name": "ada"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = support::client(&server);

    let (group, _) = client
        .update::<_, Group>("4.0/groups", 12, &WriteGroup { name: "renamed" }, &[])
        .await
        .unwrap();
    assert_eq!(group.unwrap().name, "renamed");

    let response = client.delete("4.0/groups", 12, &["users", "7"]).await.unwrap();
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let ids = [Identifier::from(1), Identifier::from("slug-2")];
    let (groups, _) = client.set::<Vec<Group>>("4.0/roles/3", &ids, &["groups"]).await.unwrap();
    assert_eq!(groups.map(|g| g.len()), Some(2));

    let (member, _) = client
        .add_member::<_, Group>("4.0/groups/12/users", &serde_json::json!({"user_id": 7}))
        .await
        .unwrap();
    assert_eq!(member.unwrap().id, 7);
}

#[tokio::test]
async fn test_slug_ids_are_percent_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/projects/my%20project"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 1, "name": "p"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = support::client(&server);
    client.get_by_id::<Group>("4.0/projects", "my project").await.unwrap();
}

#[tokio::test]
async fn test_no_content_replies_are_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/4.0/projects/p1/deploy_to_production"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/4.0/groups/5"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/groups"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = support::client(&server);

    let (deployed, response) = client
        .post_empty::<String>("4.0/projects", &[], &["p1", "deploy_to_production"])
        .await
        .unwrap();
    assert!(deployed.is_none());
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let (group, response) = client
        .update::<_, serde_json::Value>("4.0/groups", 5, &WriteGroup { name: "x" }, &[])
        .await
        .unwrap();
    assert!(group.is_none());
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let (groups, _) = client.list::<Group>("4.0/groups", None, &[]).await.unwrap();
    assert!(groups.is_empty());
}

#[tokio::test]
async fn test_post_empty_sends_query_and_no_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/4.0/projects/p1/deploy_ref_to_production"))
        .and(query_param("branch", "main"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": 1, "name": "p1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = support::client(&server);
    client
        .post_empty::<Group>("4.0/projects/p1", &[("branch", "main")], &["deploy_ref_to_production"])
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].body.is_empty());
    assert_eq!(requests[0].headers["content-type"], "application/json");
}

#[tokio::test]
async fn test_download_streams_raw_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/4.0/projects/p1/git/deploy_key"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ssh-ed25519 AAAA key"))
        .mount(&server)
        .await;

    let client = support::client(&server);
    let mut sink = Vec::new();
    client.download("4.0/projects/p1", &["git", "deploy_key"], &mut sink).await.unwrap();

    assert_eq!(String::from_utf8(sink).unwrap(), "ssh-ed25519 AAAA key");
}
