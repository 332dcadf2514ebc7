//! Elasticsearch adapter tests against a mock cluster
//!
//! These tests validate the REST calls the adapter issues:
//! - Index drop and creation (including conflicts)
//! - Single and bulk document writes
//! - Term and prefix searches, including missing indices

use generix_ontology::store::{ElasticsearchStore, IndexSchema, SearchQuery, SearchStore};
use generix_ontology::OntologyError;
use serde_json::json;
use std::time::Duration;
use wiremock::{
    matchers::{body_json, body_string_contains, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn store_for(server: &MockServer) -> ElasticsearchStore {
    ElasticsearchStore::new(&server.uri(), Duration::from_secs(5)).unwrap()
}

fn search_response() -> serde_json::Value {
    json!({
        "took": 1,
        "timed_out": false,
        "hits": {
            "total": { "value": 2, "relation": "eq" },
            "hits": [
                {
                    "_index": "generix-ont-units",
                    "_id": "UO:0000008",
                    "_score": 1.0,
                    "_source": { "term_id": "UO:0000008", "term_name": "meter" }
                },
                {
                    "_index": "generix-ont-units",
                    "_id": "UO:0000009",
                    "_score": 1.0,
                    "_source": { "term_id": "UO:0000009", "term_name": "kilogram" }
                }
            ]
        }
    })
}

// ============================================================================
// Index lifecycle
// ============================================================================

#[tokio::test]
async fn test_delete_existing_and_missing_index() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/generix-ont-units"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acknowledged": true})))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/generix-ont-env"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "type": "index_not_found_exception" },
            "status": 404
        })))
        .mount(&server)
        .await;

    let store = store_for(&server);
    assert!(store.delete_index("generix-ont-units").await.unwrap());
    assert!(!store.delete_index("generix-ont-env").await.unwrap());
}

#[tokio::test]
async fn test_create_index_sends_mappings() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/generix-ont-units"))
        .and(body_json(json!({
            "mappings": {
                "properties": {
                    "term_id": { "type": "keyword" },
                    "term_name_prefix": { "type": "text", "analyzer": "standard" }
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"acknowledged": true})))
        .expect(1)
        .mount(&server)
        .await;

    let schema = IndexSchema::new().keyword("term_id").text("term_name_prefix");
    store_for(&server).create_index("generix-ont-units", &schema).await.unwrap();
}

#[tokio::test]
async fn test_create_index_conflict() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/generix-ont-units"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "type": "resource_already_exists_exception",
                "reason": "index [generix-ont-units] already exists"
            },
            "status": 400
        })))
        .mount(&server)
        .await;

    let err = store_for(&server)
        .create_index("generix-ont-units", &IndexSchema::new())
        .await
        .unwrap_err();
    assert!(matches!(err, OntologyError::IndexAlreadyExists(name) if name == "generix-ont-units"));
}

#[tokio::test]
async fn test_server_error_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generix-ont-units/_refresh"))
        .respond_with(ResponseTemplate::new(503).set_body_string("cluster unavailable"))
        .mount(&server)
        .await;

    let err = store_for(&server).refresh("generix-ont-units").await.unwrap_err();
    match err {
        OntologyError::Store { status, message } => {
            assert_eq!(status, 503);
            assert!(message.contains("cluster unavailable"));
        },
        other => panic!("unexpected error: {other}"),
    }
}

// ============================================================================
// Document writes
// ============================================================================

#[tokio::test]
async fn test_index_single_document() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/generix-ont-units/_doc/UO:0000008"))
        .and(body_json(json!({"term_id": "UO:0000008"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"result": "created"})))
        .expect(1)
        .mount(&server)
        .await;

    store_for(&server)
        .index_document("generix-ont-units", "UO:0000008", &json!({"term_id": "UO:0000008"}))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_bulk_write() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .and(header("content-type", "application/x-ndjson"))
        .and(body_string_contains(r#""_id":"UO:0000009""#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 3,
            "errors": false,
            "items": [
                { "index": { "_id": "UO:0000008", "status": 201 } },
                { "index": { "_id": "UO:0000009", "status": 201 } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let documents = vec![
        ("UO:0000008".to_string(), json!({"term_id": "UO:0000008"})),
        ("UO:0000009".to_string(), json!({"term_id": "UO:0000009"})),
    ];
    let written = store_for(&server)
        .index_documents("generix-ont-units", &documents)
        .await
        .unwrap();
    assert_eq!(written, 2);
}

#[tokio::test]
async fn test_bulk_write_item_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 3,
            "errors": true,
            "items": [
                { "index": { "_id": "A", "status": 201 } },
                { "index": {
                    "_id": "B",
                    "status": 400,
                    "error": { "type": "mapper_parsing_exception", "reason": "bad field" }
                } }
            ]
        })))
        .mount(&server)
        .await;

    let documents = vec![
        ("A".to_string(), json!({"term_id": "A"})),
        ("B".to_string(), json!({"term_id": "B"})),
    ];
    let err = store_for(&server)
        .index_documents("generix-ont-units", &documents)
        .await
        .unwrap_err();
    match err {
        OntologyError::Store { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("'B'"));
            assert!(message.contains("mapper_parsing_exception"));
        },
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_empty_bulk_write_skips_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let written = store_for(&server)
        .index_documents("generix-ont-units", &[])
        .await
        .unwrap();
    assert_eq!(written, 0);
}

// ============================================================================
// Search
// ============================================================================

#[tokio::test]
async fn test_terms_search() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generix-ont-units/_search"))
        .and(body_json(json!({
            "query": { "terms": { "parent_term_ids": ["UO:0000001"] } },
            "size": 100
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_response()))
        .mount(&server)
        .await;

    let hits = store_for(&server)
        .search(
            "generix-ont-units",
            &SearchQuery::terms("parent_term_ids", ["UO:0000001"]),
            100,
        )
        .await
        .unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, "UO:0000008");
    assert_eq!(hits[1].source["term_name"], "kilogram");
    assert_eq!(hits[1].index, "generix-ont-units");
}

#[tokio::test]
async fn test_prefix_search_over_pattern() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generix-ont-*/_search"))
        .and(body_json(json!({
            "query": { "prefix": { "term_name_prefix": "met" } },
            "size": 10
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_response()))
        .expect(1)
        .mount(&server)
        .await;

    let hits = store_for(&server)
        .search("generix-ont-*", &SearchQuery::prefix("term_name_prefix", "met"), 10)
        .await
        .unwrap();
    assert_eq!(hits.len(), 2);
}

#[tokio::test]
async fn test_search_missing_index_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/generix-ont-env/_search"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "type": "index_not_found_exception" },
            "status": 404
        })))
        .mount(&server)
        .await;

    let hits = store_for(&server)
        .search("generix-ont-env", &SearchQuery::terms("term_id", ["ENV:1"]), 100)
        .await
        .unwrap();
    assert!(hits.is_empty());
}
