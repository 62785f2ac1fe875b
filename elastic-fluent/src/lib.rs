//! Fluent Elasticsearch client.
//!
//! This crate turns chained query declarations into Elasticsearch request
//! bodies and maps the engine's responses into typed records:
//! - Fluent query builder (`where`, ranges, nested paths, sorting, paging)
//! - Document get, create, update, delete, count and pagination
//! - Named aggregation trees
//! - Bulk batches sent as newline-delimited JSON
//! - Index and alias administration
//!
//! # Example
//!
//! ```rust,no_run
//! use elastic_fluent::{Aggregation, BulkAction, BulkBatch, ClientConfig, ElasticClient};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ElasticClient::new(ClientConfig::new("http://localhost:9200"))?;
//!
//!     client
//!         .query()
//!         .index("products")
//!         .create(1, &json!({ "name": "Rust in Action", "price": 39 }))
//!         .await?;
//!
//!     let page = client
//!         .query()
//!         .index("products")
//!         .where_like("name", "*rust*")
//!         .where_greater_than("price", 10)
//!         .with_aggregation(Aggregation::new("max-price", json!({ "max": { "field": "price" } })))
//!         .paginate(0, 25)
//!         .await?;
//!
//!     println!("{} of {} pages", page.current_page, page.total_pages);
//!
//!     let mut batch = BulkBatch::new();
//!     batch
//!         .add(BulkAction::Update, "products", 1, json!({ "price": 29 }))?
//!         .add(BulkAction::Delete, "products", 2, None)?;
//!     client.bulk(&batch).await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod admin;
mod aggregation;
mod builder;
mod bulk;
mod client;
mod config;
mod document;
mod error;
pub mod mapper;
mod query;
mod response;
mod transport;

pub use admin::{AliasAction, AliasManager, IndexManager, IndexSettings};
pub use aggregation::Aggregation;
pub use builder::{IntoFields, QueryBuilder, SortMode, SortOrder};
pub use bulk::{BulkAction, BulkBatch, BulkOperation};
pub use client::{ElasticClient, Script, UpdateBody, UpdateRequest};
pub use config::ClientConfig;
pub use document::Document;
pub use error::{ElasticError, Result};
pub use query::{
    BoolQuery, Bucket, NestedQuery, Query, RangeQuery, TermQuery, TermsQuery, WildcardQuery,
};
pub use response::{
    BulkItemResult, BulkResult, FindResult, PageResult, SearchHit, SearchResult, ShardSummary,
    TotalHits, TotalRelation, WriteOutcome, WriteResult, total_pages,
};
pub use transport::{
    HttpTransport, Method, RequestBody, Transport, TransportRequest, TransportResponse,
    request_path,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::aggregation::Aggregation;
    pub use crate::builder::{QueryBuilder, SortMode, SortOrder};
    pub use crate::bulk::{BulkAction, BulkBatch};
    pub use crate::client::{ElasticClient, Script, UpdateRequest};
    pub use crate::config::ClientConfig;
    pub use crate::document::Document;
    pub use crate::error::{ElasticError, Result};
    pub use crate::response::{FindResult, PageResult, SearchResult, WriteResult};
}
