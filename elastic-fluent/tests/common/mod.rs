//! Shared test helpers.

#![allow(dead_code)]

use async_trait::async_trait;
use elastic_fluent::{
    ClientConfig, ElasticClient, ElasticError, Result, Transport, TransportRequest,
    TransportResponse,
};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// In-memory transport replaying canned responses in order and recording
/// every request it receives.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    responses: Arc<Mutex<VecDeque<TransportResponse>>>,
    requests: Arc<Mutex<Vec<TransportRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next response.
    pub fn respond(&self, status: u16, body: Value) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(TransportResponse::new(status, body));
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The only request received.
    pub fn single_request(&self) -> TransportRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request");
        requests.into_iter().next().unwrap()
    }

    pub fn client(&self) -> ElasticClient {
        ElasticClient::with_transport(ClientConfig::default(), self.clone())
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ElasticError::transport("no scripted response left"))
    }
}

/// A successful `_search` response with one hit per ID.
pub fn search_response(ids: &[&str], total: u64) -> Value {
    let hits: Vec<Value> = ids
        .iter()
        .map(|id| {
            json!({
                "_index": "products",
                "_id": id,
                "_score": 1.0,
                "_source": { "name": format!("product {}", id) }
            })
        })
        .collect();

    json!({
        "took": 3,
        "timed_out": false,
        "_shards": { "total": 1, "successful": 1, "skipped": 0, "failed": 0 },
        "hits": {
            "total": { "value": total, "relation": "eq" },
            "max_score": if ids.is_empty() { Value::Null } else { json!(1.0) },
            "hits": hits
        }
    })
}

/// A successful write acknowledgement.
pub fn write_response(id: &str, result: &str) -> Value {
    json!({
        "_index": "products",
        "_id": id,
        "_version": 1,
        "result": result,
        "_shards": { "total": 2, "successful": 1, "failed": 0 },
        "_seq_no": 0,
        "_primary_term": 1
    })
}
