//! Elasticsearch client implementation.

use crate::{
    admin::{AliasManager, IndexManager},
    builder::QueryBuilder,
    bulk::BulkBatch,
    config::ClientConfig,
    error::{ElasticError, Result},
    mapper,
    response::{self, BulkResult, FindResult, PageResult, SearchResult, WriteResult},
    transport::{HttpTransport, Method, Transport, TransportRequest, TransportResponse, request_path},
};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Elasticsearch client for document operations.
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct ElasticClient {
    transport: Arc<dyn Transport>,
    config: Arc<ClientConfig>,
}

impl ElasticClient {
    /// Create a client talking HTTP to the configured node.
    pub fn new(config: ClientConfig) -> Result<Self> {
        info!(url = %config.base_url(), "Initializing Elasticsearch client");

        let transport = HttpTransport::new(&config)?;
        Ok(Self {
            transport: Arc::new(transport),
            config: Arc::new(config),
        })
    }

    /// Create a client from `ELASTICSEARCH_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Create a client on top of a custom transport.
    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            transport: Arc::new(transport),
            config: Arc::new(config),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Create a query builder bound to this client.
    pub fn query(&self) -> QueryBuilder {
        QueryBuilder::new(self.clone())
    }

    /// Get an index manager for index operations.
    pub fn indices(&self) -> IndexManager {
        IndexManager::new(self.clone())
    }

    /// Get an alias manager for alias operations.
    pub fn aliases(&self) -> AliasManager {
        AliasManager::new(self.clone())
    }

    pub(crate) async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        self.transport.send(request).await
    }

    // =========================================================================
    // Search Operations
    // =========================================================================

    /// Run a search with the given request body.
    pub async fn search(&self, index: &str, body: Value) -> Result<SearchResult> {
        debug!(index, "Searching");

        let response = self
            .send(TransportRequest::new(Method::Post, request_path(&[index, "_search"])).json(body))
            .await?;

        if !response.is_success() {
            return Err(failed(ElasticError::Search {
                message: reason(&response.body),
                status: response.status,
            }));
        }

        mapper::search(&response.body)
    }

    /// Count documents matching `body`, or all documents when `None`.
    pub async fn count(&self, index: &str, body: Option<Value>) -> Result<u64> {
        debug!(index, "Counting documents");

        let body = body.unwrap_or_else(|| json!({ "query": { "match_all": {} } }));
        let response = self
            .send(TransportRequest::new(Method::Post, request_path(&[index, "_count"])).json(body))
            .await?;

        if !response.is_success() {
            return Err(failed(ElasticError::Search {
                message: reason(&response.body),
                status: response.status,
            }));
        }

        mapper::count(&response.body)
    }

    /// Fetch one page of results.
    ///
    /// Counts first, then searches with `from = page * per_page`. Page numbers
    /// are taken as given and not checked against the page count.
    pub async fn paginate(
        &self,
        index: &str,
        body: Option<Value>,
        page: u64,
        per_page: u64,
    ) -> Result<PageResult> {
        if per_page == 0 {
            return Err(ElasticError::validation("Per page value must be greater than zero."));
        }

        let mut body = match body {
            Some(Value::Object(map)) => map,
            Some(Value::Null) | None => Map::new(),
            Some(other) => {
                return Err(ElasticError::validation(format!(
                    "Search body must be an object, got {}",
                    other
                )));
            }
        };

        let count_body = match body.get("query") {
            Some(query) => json!({ "query": query }),
            None => json!({ "query": { "match_all": {} } }),
        };
        let total_documents = self.count(index, Some(count_body)).await?;

        body.insert("from".to_string(), json!(page.saturating_mul(per_page)));
        body.insert("size".to_string(), json!(per_page));

        let documents = self.search(index, Value::Object(body)).await?;

        Ok(PageResult {
            per_page,
            current_page: page,
            total_pages: response::total_pages(total_documents, per_page),
            total_documents,
            documents,
        })
    }

    // =========================================================================
    // Document Operations
    // =========================================================================

    /// Get a document by ID.
    ///
    /// Returns `None` when the document does not exist; a missing index is an
    /// [`ElasticError::IndexNotFound`] failure. A 404 counts as an absent
    /// document only when its body carries `"found": false`; any other 404
    /// (e.g. from a proxy) is a [`ElasticError::Find`] failure.
    pub async fn find(&self, index: &str, id: &str) -> Result<Option<FindResult>> {
        debug!(index, id, "Getting document");

        let response = self
            .send(TransportRequest::new(Method::Get, request_path(&[index, "_doc", id])))
            .await?;

        if response.is_not_found() {
            let error_type = mapper::lookup(&response.body, "error.type").and_then(Value::as_str);
            if error_type == Some("index_not_found_exception") {
                return Err(failed(ElasticError::IndexNotFound {
                    message: reason(&response.body),
                    status: response.status,
                }));
            }

            if mapper::lookup(&response.body, "found").and_then(Value::as_bool) == Some(false) {
                return Ok(None);
            }
        }

        if !response.is_success() {
            return Err(failed(ElasticError::Find {
                message: reason(&response.body),
                status: response.status,
            }));
        }

        mapper::find(&response.body).map(Some)
    }

    /// Get a document by ID, failing with [`ElasticError::NotFound`] when absent.
    pub async fn find_or_fail(&self, index: &str, id: &str) -> Result<FindResult> {
        self.find(index, id).await?.ok_or_else(|| {
            failed(ElasticError::NotFound {
                message: format!("Document [{}] in index [{}] not found.", id, index),
                status: 404,
            })
        })
    }

    /// Create a document; fails if the ID is already taken.
    pub async fn create<T: Serialize + ?Sized>(
        &self,
        index: &str,
        id: &str,
        data: &T,
    ) -> Result<WriteResult> {
        debug!(index, id, "Creating document");

        let body = serde_json::to_value(data)?;
        let response = self
            .send(TransportRequest::new(Method::Post, request_path(&[index, "_create", id])).json(body))
            .await?;

        if !response.is_success() {
            return Err(failed(ElasticError::Index {
                message: raw(&response.body),
                status: response.status,
            }));
        }

        mapper::write(&response.body)
    }

    /// Update a document with a partial document or a script.
    pub async fn update(&self, index: &str, id: &str, request: UpdateRequest) -> Result<WriteResult> {
        debug!(index, id, "Updating document");

        let guarded = request.is_guarded();
        let mut http = TransportRequest::new(Method::Post, request_path(&[index, "_update", id]));
        if let (Some(primary_term), Some(seq_no)) = (request.primary_term, request.seq_no) {
            http = http
                .query_param("if_primary_term", primary_term)
                .query_param("if_seq_no", seq_no);
        }

        let response = self.send(http.json(request.body.to_json()?)).await?;

        if response.is_not_found() {
            return Err(failed(ElasticError::NotFound {
                message: raw(&response.body),
                status: response.status,
            }));
        }

        if guarded && response.is_conflict() {
            return Err(failed(ElasticError::Conflict {
                message: raw(&response.body),
                status: response.status,
            }));
        }

        if !response.is_success() {
            return Err(failed(ElasticError::Update {
                message: raw(&response.body),
                status: response.status,
            }));
        }

        mapper::write(&response.body)
    }

    /// Add `value` to a numeric field.
    pub async fn increment(&self, index: &str, id: &str, field: &str, value: i64) -> Result<WriteResult> {
        self.update(index, id, UpdateRequest::script(Script::increment(field, value)?))
            .await
    }

    /// Subtract `value` from a numeric field.
    pub async fn decrement(&self, index: &str, id: &str, field: &str, value: i64) -> Result<WriteResult> {
        self.update(index, id, UpdateRequest::script(Script::decrement(field, value)?))
            .await
    }

    /// Delete a document by ID.
    pub async fn delete(&self, index: &str, id: &str) -> Result<WriteResult> {
        debug!(index, id, "Deleting document");

        let response = self
            .send(TransportRequest::new(Method::Delete, request_path(&[index, "_doc", id])))
            .await?;

        if response.is_not_found()
            && mapper::lookup(&response.body, "result").and_then(Value::as_str) == Some("not_found")
        {
            return Err(failed(ElasticError::NotFound {
                message: raw(&response.body),
                status: response.status,
            }));
        }

        if !response.is_success() {
            return Err(failed(ElasticError::Delete {
                message: raw(&response.body),
                status: response.status,
            }));
        }

        mapper::write(&response.body)
    }

    // =========================================================================
    // Bulk Operations
    // =========================================================================

    /// Send a bulk batch.
    ///
    /// Per-item failures do not fail the call; inspect
    /// [`BulkResult::errors`] and each item's status.
    pub async fn bulk(&self, batch: &BulkBatch) -> Result<BulkResult> {
        if batch.is_empty() {
            return Err(ElasticError::validation("Bulk batch is empty."));
        }

        debug!(operations = batch.len(), "Sending bulk request");

        let response = self
            .send(TransportRequest::new(Method::Post, "_bulk").ndjson(batch.to_ndjson()?))
            .await?;

        if !response.is_success() {
            return Err(failed(ElasticError::Search {
                message: reason(&response.body),
                status: response.status,
            }));
        }

        mapper::bulk(&response.body)
    }
}

impl std::fmt::Debug for ElasticClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticClient")
            .field("url", &self.config.base_url())
            .finish()
    }
}

/// Server-side update script.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Script {
    /// Script source.
    pub source: String,
    /// Script language; the engine defaults to painless.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Script parameters.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
}

impl Script {
    /// Create a script from source.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            lang: None,
            params: Map::new(),
        }
    }

    /// Set the script language.
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    /// Add a parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Script adding `value` to `field`.
    pub fn increment(field: &str, value: i64) -> Result<Self> {
        Self::arithmetic(field, "+=", value)
    }

    /// Script subtracting `value` from `field`.
    pub fn decrement(field: &str, value: i64) -> Result<Self> {
        Self::arithmetic(field, "-=", value)
    }

    fn arithmetic(field: &str, operator: &str, value: i64) -> Result<Self> {
        let valid = !field.is_empty()
            && !field.starts_with('.')
            && !field.ends_with('.')
            && field
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
        if !valid {
            return Err(ElasticError::validation(format!("Invalid field name [{}]", field)));
        }

        Ok(Self::new(format!("ctx._source.{} {} params.value", field, operator))
            .with_lang("painless")
            .with_param("value", value))
    }
}

/// Update payload.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateBody {
    /// Partial document merged into the stored one.
    Doc(Value),
    /// Script run against the stored document.
    Script(Script),
}

impl UpdateBody {
    fn to_json(&self) -> Result<Value> {
        Ok(match self {
            UpdateBody::Doc(doc) => json!({ "doc": doc }),
            UpdateBody::Script(script) => json!({ "script": serde_json::to_value(script)? }),
        })
    }
}

/// An update request with optional optimistic concurrency tokens.
///
/// The tokens are only sent, and a 409 only reported as
/// [`ElasticError::Conflict`], when both are set.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    /// Payload.
    pub body: UpdateBody,
    /// Expected primary term.
    pub primary_term: Option<u64>,
    /// Expected sequence number.
    pub seq_no: Option<u64>,
}

impl UpdateRequest {
    /// Partial document update.
    pub fn doc(data: impl Into<Value>) -> Self {
        Self::from_body(UpdateBody::Doc(data.into()))
    }

    /// Script update.
    pub fn script(script: Script) -> Self {
        Self::from_body(UpdateBody::Script(script))
    }

    fn from_body(body: UpdateBody) -> Self {
        Self {
            body,
            primary_term: None,
            seq_no: None,
        }
    }

    /// Set the expected primary term.
    pub fn with_primary_term(mut self, primary_term: u64) -> Self {
        self.primary_term = Some(primary_term);
        self
    }

    /// Set the expected sequence number.
    pub fn with_seq_no(mut self, seq_no: u64) -> Self {
        self.seq_no = Some(seq_no);
        self
    }

    /// Set both concurrency tokens, usually taken from a [`FindResult`].
    pub fn if_match(self, primary_term: u64, seq_no: u64) -> Self {
        self.with_primary_term(primary_term).with_seq_no(seq_no)
    }

    /// Whether both concurrency tokens are set.
    pub fn is_guarded(&self) -> bool {
        self.primary_term.is_some() && self.seq_no.is_some()
    }
}

/// `error.reason` of an error response, falling back to the raw payload.
pub(crate) fn reason(body: &Value) -> String {
    match mapper::lookup(body, "error.reason").and_then(Value::as_str) {
        Some(reason) => reason.to_string(),
        None => match mapper::lookup(body, "error") {
            Some(Value::String(error)) => error.clone(),
            _ => raw(body),
        },
    }
}

/// Error payload serialized as-is.
pub(crate) fn raw(body: &Value) -> String {
    match body {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn failed(error: ElasticError) -> ElasticError {
    warn!(status = ?error.status(), error = %error, "Elasticsearch request failed");
    error
}
