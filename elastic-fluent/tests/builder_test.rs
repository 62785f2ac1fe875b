//! Query builder execution against a scripted transport.

mod common;

use common::{ScriptedTransport, search_response, write_response};
use elastic_fluent::prelude::*;
use elastic_fluent::{RequestBody, WriteOutcome};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Product {
    name: String,
}

impl Document for Product {
    fn index_name() -> &'static str {
        "products"
    }
}

#[tokio::test]
async fn test_get_sends_compiled_body() {
    let transport = ScriptedTransport::new();
    transport.respond(200, search_response(&["1"], 1));

    let builder = transport
        .client()
        .query()
        .index("products")
        .where_keyword("category", "books")
        .where_between("price", [10, 50])
        .unwrap()
        .order_by("price", "asc", None)
        .unwrap()
        .select(["name", "price"])
        .offset(10)
        .limit(5);

    let result = builder.get().await.unwrap();

    let request = transport.single_request();
    assert_eq!(request.path, "products/_search");
    assert_eq!(
        request.body,
        Some(RequestBody::Json(json!({
            "query": { "bool": { "filter": [
                { "term": { "category.keyword": "books" } },
                { "range": { "price": { "gte": 10 } } },
                { "range": { "price": { "lte": 50 } } }
            ] } },
            "_source": ["name", "price"],
            "sort": [{ "price": "asc" }],
            "from": 10,
            "size": 5
        })))
    );
    assert_eq!(result.hits.len(), 1);
}

#[tokio::test]
async fn test_same_builder_sends_identical_requests() {
    let transport = ScriptedTransport::new();
    transport
        .respond(200, search_response(&[], 0))
        .respond(200, search_response(&[], 0));

    let builder = transport
        .client()
        .query()
        .index("products")
        .where_term("name", "test")
        .with_aggregation(Aggregation::new("max-price", json!({ "max": { "field": "price" } })));

    builder.get().await.unwrap();
    builder.get().await.unwrap();

    let requests = transport.requests();
    assert_eq!(requests[0].body, requests[1].body);
}

#[tokio::test]
async fn test_empty_query_searches_everything() {
    let transport = ScriptedTransport::new();
    transport.respond(200, search_response(&[], 0));

    transport.client().query().index("products").get().await.unwrap();

    assert_eq!(
        transport.single_request().body,
        Some(RequestBody::Json(json!({ "query": { "match_all": {} } })))
    );
}

#[tokio::test]
async fn test_count_drops_paging() {
    let transport = ScriptedTransport::new();
    transport.respond(200, json!({ "count": 3 }));

    let count = transport
        .client()
        .query()
        .index("products")
        .where_term("name", "test")
        .limit(10)
        .count()
        .await
        .unwrap();

    assert_eq!(count, 3);
    assert_eq!(
        transport.single_request().body,
        Some(RequestBody::Json(json!({
            "query": { "bool": { "filter": [{ "term": { "name": "test" } }] } }
        })))
    );
}

#[tokio::test]
async fn test_paginate_through_builder() {
    let transport = ScriptedTransport::new();
    transport
        .respond(200, json!({ "count": 11 }))
        .respond(200, search_response(&[], 11));

    let page = transport
        .client()
        .query()
        .index("products")
        .paginate(2, 100)
        .await
        .unwrap();

    let requests = transport.requests();
    assert_eq!(
        requests[0].body,
        Some(RequestBody::Json(json!({ "query": { "match_all": {} } })))
    );
    assert_eq!(
        requests[1].body,
        Some(RequestBody::Json(json!({
            "query": { "match_all": {} },
            "from": 200,
            "size": 100
        })))
    );
    assert_eq!(page.total_pages, 1);
}

#[tokio::test]
async fn test_document_binding() {
    let transport = ScriptedTransport::new();
    transport.respond(200, search_response(&["1", "2"], 2));

    let products: Vec<Product> = Product::query(&transport.client())
        .where_like("name", "product*")
        .get()
        .await
        .unwrap()
        .sources_as()
        .unwrap();

    assert_eq!(transport.single_request().path, "products/_search");
    assert_eq!(
        products,
        vec![
            Product { name: "product 1".to_string() },
            Product { name: "product 2".to_string() },
        ]
    );
}

#[tokio::test]
async fn test_document_writes_through_builder() {
    let transport = ScriptedTransport::new();
    transport
        .respond(201, write_response("9", "created"))
        .respond(200, write_response("9", "updated"))
        .respond(200, write_response("9", "deleted"));

    let query = Product::query(&transport.client());
    let product = Product { name: "new".to_string() };

    let created = query.create(9, &product).await.unwrap();
    let updated = query
        .update(9, UpdateRequest::doc(json!({ "name": "newer" })))
        .await
        .unwrap();
    let deleted = query.delete(9).await.unwrap();

    assert_eq!(created.result, Some(WriteOutcome::Created));
    assert_eq!(updated.result, Some(WriteOutcome::Updated));
    assert_eq!(deleted.result, Some(WriteOutcome::Deleted));

    let paths: Vec<String> = transport.requests().into_iter().map(|r| r.path).collect();
    assert_eq!(
        paths,
        vec!["products/_create/9", "products/_update/9", "products/_doc/9"]
    );
}

#[tokio::test]
async fn test_find_through_builder() {
    let transport = ScriptedTransport::new();
    transport.respond(
        200,
        json!({
            "_index": "products",
            "_id": "3",
            "_version": 1,
            "_seq_no": 0,
            "_primary_term": 1,
            "found": true,
            "_source": { "name": "found" }
        }),
    );

    let found = Product::query(&transport.client())
        .find_or_fail(3)
        .await
        .unwrap();

    assert_eq!(
        found.source_as::<Product>().unwrap(),
        Product { name: "found".to_string() }
    );
}

#[tokio::test]
async fn test_missing_index_is_rejected_before_sending() {
    let transport = ScriptedTransport::new();

    let err = transport.client().query().get().await.unwrap_err();

    assert_eq!(err.message(), "Index name is required.");
    assert!(transport.requests().is_empty());
}
