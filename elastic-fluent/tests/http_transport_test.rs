//! Wire format of the HTTP transport, checked against a mock server.

use elastic_fluent::{BulkAction, BulkBatch, ClientConfig, ElasticClient, ElasticError, UpdateRequest};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ElasticClient {
    ElasticClient::new(ClientConfig::new(server.uri()).with_api_key("secret")).unwrap()
}

#[tokio::test]
async fn test_search_request_on_the_wire() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/products/_search"))
        .and(header("authorization", "ApiKey secret"))
        .and(body_json(json!({ "query": { "match_all": {} } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 1,
            "timed_out": false,
            "_shards": { "total": 1, "successful": 1, "failed": 0 },
            "hits": { "total": { "value": 0, "relation": "eq" }, "max_score": null, "hits": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server)
        .query()
        .index("products")
        .get()
        .await
        .unwrap();

    assert_eq!(result.total.value, 0);
    assert_eq!(result.max_score, None);
}

#[tokio::test]
async fn test_update_tokens_in_query_string() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/products/_update/1"))
        .and(query_param("if_primary_term", "1"))
        .and(query_param("if_seq_no", "5"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": { "type": "version_conflict_engine_exception" },
            "status": 409
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .update("products", "1", UpdateRequest::doc(json!({ "name": "x" })).if_match(1, 5))
        .await
        .unwrap_err();

    assert!(matches!(err, ElasticError::Conflict { status: 409, .. }));
}

#[tokio::test]
async fn test_bulk_body_is_ndjson() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/_bulk"))
        .and(header("content-type", "application/x-ndjson"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 2,
            "errors": false,
            "items": [{ "delete": { "_index": "products", "_id": "4", "result": "deleted", "status": 200 } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut batch = BulkBatch::new();
    batch.add(BulkAction::Delete, "products", 4, None).unwrap();

    let result = client(&server).bulk(&batch).await.unwrap();
    assert_eq!(result.items.len(), 1);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        String::from_utf8(requests[0].body.clone()).unwrap(),
        "{\"delete\":{\"_index\":\"products\",\"_id\":\"4\"}}\n"
    );
}

#[tokio::test]
async fn test_empty_response_body_decodes_to_null() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server).indices().delete("products").await.unwrap_err();

    match err {
        ElasticError::Delete { message, status } => {
            assert_eq!(message, "null");
            assert_eq!(status, 404);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_document_ids_are_encoded_in_the_path() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_index": "products",
            "_id": "x",
            "_version": 2,
            "result": "deleted",
            "_shards": { "total": 2, "successful": 1, "failed": 0 },
            "_seq_no": 3,
            "_primary_term": 1
        })))
        .expect(3)
        .mount(&server)
        .await;

    let client = client(&server);
    for id in ["1#draft", "a/b", "7?refresh=true"] {
        client.delete("products", id).await.unwrap();
    }

    let requests = server.received_requests().await.unwrap();
    let paths: Vec<&str> = requests.iter().map(|request| request.url.path()).collect();
    assert_eq!(
        paths,
        vec![
            "/products/_doc/1%23draft",
            "/products/_doc/a%2Fb",
            "/products/_doc/7%3Frefresh=true",
        ]
    );
    assert!(requests.iter().all(|request| request.url.query().is_none()));
}

#[tokio::test]
async fn test_non_json_error_body_keeps_failure_kind() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/products/_search"))
        .respond_with(
            ResponseTemplate::new(413).set_body_string("<html>413 Request Entity Too Large</html>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server)
        .query()
        .index("products")
        .get()
        .await
        .unwrap_err();

    match err {
        ElasticError::Search { message, status } => {
            assert_eq!(message, "<html>413 Request Entity Too Large</html>");
            assert_eq!(status, 413);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}
