//! Integration tests for the search engine client
//!
//! These tests validate the HTTP seam against a mock search engine:
//! - idempotent index creation (fresh, already existing, rejected)
//! - bulk upserts (all accepted, partially rejected, transport failure)

use cine_etl::config::SearchConfig;
use cine_etl::error::EtlError;
use cine_etl::search::{SearchClient, WriteAction};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> SearchClient {
    let config = SearchConfig {
        url: server.uri(),
        request_timeout_secs: 5,
        index_create_timeout: "3s".to_string(),
    };
    SearchClient::new(&config).expect("client should build")
}

fn genre_action(id: &str, name: &str) -> WriteAction {
    WriteAction {
        index: "genre",
        id: id.to_string(),
        body: json!({"uuid": id, "name": name}),
    }
}

#[tokio::test]
async fn test_ensure_index_creates_missing_index() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/genre"))
        .and(query_param("timeout", "3s"))
        .and(body_string_contains("ru_en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "acknowledged": true,
            "shards_acknowledged": true,
            "index": "genre"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let definition = json!({"settings": {"analysis": {"analyzer": {"ru_en": {}}}}});

    client
        .ensure_index("genre", &definition)
        .await
        .expect("index creation should succeed");
}

#[tokio::test]
async fn test_ensure_index_tolerates_existing_index() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/movies"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "type": "resource_already_exists_exception",
                "reason": "index [movies/abc] already exists"
            },
            "status": 400
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);

    client
        .ensure_index("movies", &json!({}))
        .await
        .expect("an existing index should count as success");
}

#[tokio::test]
async fn test_ensure_index_propagates_other_rejections() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/movies"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "type": "mapper_parsing_exception",
                "reason": "analyzer [missing] not found"
            },
            "status": 400
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let error = client
        .ensure_index("movies", &json!({}))
        .await
        .expect_err("a mapping rejection must propagate");

    match error {
        EtlError::SearchRejected { status, body, .. } => {
            assert_eq!(status, 400);
            assert!(body.contains("mapper_parsing_exception"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_bulk_accepts_all_documents() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .and(body_string_contains("\"_index\":\"genre\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 4,
            "errors": false,
            "items": [
                {"index": {"_index": "genre", "_id": "g1", "status": 201}},
                {"index": {"_index": "genre", "_id": "g2", "status": 200}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let actions = vec![genre_action("g1", "Drama"), genre_action("g2", "Comedy")];

    let outcome = client.bulk(&actions).await.expect("bulk should succeed");

    assert_eq!(outcome.succeeded, vec!["g1", "g2"]);
    assert!(outcome.failed.is_empty());
}

#[tokio::test]
async fn test_bulk_partitions_partial_failures() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 9,
            "errors": true,
            "items": [
                {"index": {"_index": "genre", "_id": "g1", "status": 200}},
                {"index": {"_index": "genre", "_id": "g2", "status": 400, "error": {
                    "type": "strict_dynamic_mapping_exception",
                    "reason": "mapping set to strict, dynamic introduction of [extra] within [genre] is not allowed"
                }}}
            ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let actions = vec![genre_action("g1", "Drama"), genre_action("g2", "Comedy")];

    let outcome = client.bulk(&actions).await.expect("bulk call itself succeeds");

    assert_eq!(outcome.succeeded, vec!["g1"]);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].id, "g2");
    assert!(outcome.failed[0]
        .reason
        .contains("strict_dynamic_mapping_exception"));
}

#[tokio::test]
async fn test_bulk_surfaces_transport_level_rejection() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(503).set_body_string("node unavailable"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let error = client
        .bulk(&[genre_action("g1", "Drama")])
        .await
        .expect_err("a 503 must propagate");

    match error {
        EtlError::SearchRejected { status, .. } => assert_eq!(status, 503),
        other => panic!("unexpected error: {other}"),
    }
}
