//! Typed response records.
//!
//! Built by [`crate::mapper`] from successful engine responses; every record
//! serializes back to a plain JSON object.

use crate::bulk::BulkAction;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Shard execution summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShardSummary {
    /// Shards the request was sent to.
    pub total: u64,
    /// Shards that answered successfully.
    pub successful: u64,
    /// Shards that failed.
    pub failed: u64,
    /// Shards skipped by the engine, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<u64>,
}

/// Qualifier of a total hit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotalRelation {
    /// The count is exact.
    Eq,
    /// The count is a lower bound.
    Gte,
}

/// Total hit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalHits {
    /// Number of matching documents.
    pub value: u64,
    /// Whether `value` is exact.
    pub relation: TotalRelation,
}

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Index the document lives in.
    pub index: String,
    /// Document ID.
    pub id: String,
    /// Relevance score; absent when sorting without scoring.
    pub score: Option<f64>,
    /// Document body.
    pub source: Value,
}

impl SearchHit {
    /// Deserialize the document body.
    pub fn source_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.source.clone())?)
    }
}

/// Search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Time taken in milliseconds.
    pub took: u64,
    /// Whether the search timed out.
    pub timed_out: bool,
    /// Shard summary.
    pub shards: ShardSummary,
    /// Total hits.
    pub total: TotalHits,
    /// Best score among the hits.
    pub max_score: Option<f64>,
    /// Hits, in engine order.
    pub hits: Vec<SearchHit>,
    /// Aggregation results, keyed by aggregation name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregations: Option<Value>,
}

impl SearchResult {
    /// Document bodies of all hits, in order.
    pub fn sources(&self) -> Vec<&Value> {
        self.hits.iter().map(|hit| &hit.source).collect()
    }

    /// Deserialize every hit's body.
    pub fn sources_as<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.hits.iter().map(SearchHit::source_as).collect()
    }

    /// Result of the named aggregation.
    pub fn aggregation(&self, name: &str) -> Option<&Value> {
        self.aggregations.as_ref().and_then(|aggs| aggs.get(name))
    }

    /// Whether the search returned no hits.
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// A document fetched by ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindResult {
    /// Index the document lives in.
    pub index: String,
    /// Document ID.
    pub id: String,
    /// Document version.
    pub version: u64,
    /// Sequence number, for optimistic concurrency.
    pub seq_no: u64,
    /// Primary term, for optimistic concurrency.
    pub primary_term: u64,
    /// Whether the document exists.
    pub found: bool,
    /// Document body.
    pub source: Value,
}

impl FindResult {
    /// Deserialize the document body.
    pub fn source_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.source.clone())?)
    }
}

/// Outcome keyword of a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    /// A new document was written.
    Created,
    /// An existing document was replaced or merged.
    Updated,
    /// The document was removed.
    Deleted,
    /// The document did not exist.
    NotFound,
    /// The update changed nothing.
    Noop,
}

impl WriteOutcome {
    /// Parse an outcome keyword.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "created" => Some(Self::Created),
            "updated" => Some(Self::Updated),
            "deleted" => Some(Self::Deleted),
            "not_found" => Some(Self::NotFound),
            "noop" => Some(Self::Noop),
            _ => None,
        }
    }
}

/// Acknowledgement of a create, update, delete or bulk item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteResult {
    /// Resulting index.
    pub index: String,
    /// Document ID.
    pub id: String,
    /// New document version.
    pub version: Option<u64>,
    /// Outcome keyword.
    pub result: Option<WriteOutcome>,
    /// Shard summary.
    pub shards: Option<ShardSummary>,
    /// Sequence number.
    pub seq_no: Option<u64>,
    /// Primary term.
    pub primary_term: Option<u64>,
    /// Per-item status code (bulk only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Per-item error object (bulk only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

impl WriteResult {
    /// Whether the engine reported an error for this write.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// One entry of a bulk response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkItemResult {
    /// Action that produced this entry.
    pub action: BulkAction,
    /// Write acknowledgement.
    pub result: WriteResult,
}

/// Bulk response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkResult {
    /// Time taken in milliseconds.
    pub took: u64,
    /// Whether any item failed.
    pub errors: bool,
    /// Items, in request order.
    pub items: Vec<BulkItemResult>,
}

impl BulkResult {
    /// Items the engine rejected.
    pub fn failed_items(&self) -> impl Iterator<Item = &BulkItemResult> {
        self.items.iter().filter(|item| item.result.is_error())
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    /// Page size.
    pub per_page: u64,
    /// Requested page, as given by the caller.
    pub current_page: u64,
    /// Number of pages.
    pub total_pages: u64,
    /// Number of matching documents.
    pub total_documents: u64,
    /// Hits of this page.
    pub documents: SearchResult,
}

/// Number of pages needed for `total` documents.
///
/// Zero documents give zero pages; anything up to one full page gives one.
/// A `per_page` of zero counts every document as one page.
pub fn total_pages(total: u64, per_page: u64) -> u64 {
    if total == 0 {
        0
    } else if per_page == 0 || total <= per_page {
        1
    } else {
        total.div_ceil(per_page)
    }
}
