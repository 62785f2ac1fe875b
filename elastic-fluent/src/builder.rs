//! Fluent query builder.
//!
//! Conditions accumulate into a `bool` query as they are chained; the request
//! body is compiled on demand by [`QueryBuilder::search_body`], which never
//! mutates the builder, so executing the same builder twice sends the same
//! request.

use crate::{
    aggregation::{self, Aggregation},
    bulk::BulkBatch,
    client::{ElasticClient, UpdateRequest},
    error::{ElasticError, Result},
    query::{self, BoolQuery, Bucket, NestedQuery, Query},
    response::{BulkResult, FindResult, PageResult, SearchResult, WriteResult},
};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

impl SortOrder {
    /// Direction keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ElasticError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "desc" => Ok(SortOrder::Desc),
            "asc" => Ok(SortOrder::Asc),
            other => Err(ElasticError::validation(format!(
                "Available direction values [desc, asc]. Entered value: [{}]",
                other
            ))),
        }
    }
}

/// How multi-valued fields are reduced for sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// Lowest value.
    Min,
    /// Highest value.
    Max,
    /// Sum of values.
    Sum,
    /// Average of values.
    Avg,
    /// Median of values.
    Median,
}

impl SortMode {
    /// Mode keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Min => "min",
            SortMode::Max => "max",
            SortMode::Sum => "sum",
            SortMode::Avg => "avg",
            SortMode::Median => "median",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = ElasticError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "min" => Ok(SortMode::Min),
            "max" => Ok(SortMode::Max),
            "sum" => Ok(SortMode::Sum),
            "avg" => Ok(SortMode::Avg),
            "median" => Ok(SortMode::Median),
            other => Err(ElasticError::validation(format!(
                "Available direction values [min, max, sum, avg, median]. Entered value: [{}]",
                other
            ))),
        }
    }
}

/// Field lists accepted by [`QueryBuilder::select`].
pub trait IntoFields {
    /// Convert into owned field names.
    fn into_fields(self) -> Vec<String>;
}

impl IntoFields for &str {
    fn into_fields(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoFields for String {
    fn into_fields(self) -> Vec<String> {
        vec![self]
    }
}

impl<S: Into<String>> IntoFields for Vec<S> {
    fn into_fields(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<S: Into<String>, const N: usize> IntoFields for [S; N] {
    fn into_fields(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl IntoFields for &[&str] {
    fn into_fields(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

/// Fluent query builder bound to a client.
///
/// ```rust,no_run
/// use elastic_fluent::{ElasticClient, ClientConfig};
///
/// # async fn run() -> elastic_fluent::Result<()> {
/// let client = ElasticClient::new(ClientConfig::default())?;
///
/// let results = client
///     .query()
///     .index("products")
///     .where_keyword("category", "books")
///     .where_between("price", [10, 50])?
///     .order_by("price", "asc", None)?
///     .limit(20)
///     .get()
///     .await?;
///
/// for source in results.sources() {
///     println!("{}", source);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct QueryBuilder {
    client: ElasticClient,
    index: Option<String>,
    query: Option<Value>,
    nested: Vec<Value>,
    sort: Option<Value>,
    select: Option<Vec<String>>,
    aggregations: Vec<Aggregation>,
    from: Option<u64>,
    size: Option<u64>,
}

impl QueryBuilder {
    /// Create an empty builder.
    pub(crate) fn new(client: ElasticClient) -> Self {
        Self {
            client,
            index: None,
            query: None,
            nested: Vec::new(),
            sort: None,
            select: None,
            aggregations: Vec::new(),
            from: None,
            size: None,
        }
    }

    /// Set the target index.
    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    // =========================================================================
    // Conditions
    // =========================================================================

    /// Append a clause to a bucket of the root `bool` query.
    pub fn where_clause(mut self, bucket: Bucket, clause: Query) -> Self {
        query::push_clause(
            self.query.get_or_insert_with(|| Value::Object(Map::new())),
            bucket,
            clause.to_json(),
        );
        self
    }

    /// Exact match on the `.keyword` sub-field.
    pub fn where_keyword(self, field: &str, value: impl Into<String>) -> Self {
        let value: String = value.into();
        self.where_clause(Bucket::Filter, Query::term(keyword(field), value))
    }

    /// Optional exact match on the `.keyword` sub-field.
    pub fn or_where_keyword(self, field: &str, value: impl Into<String>) -> Self {
        let value: String = value.into();
        self.where_clause(Bucket::Should, Query::term(keyword(field), value))
    }

    /// Exact match.
    pub fn where_term(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clause(Bucket::Filter, Query::term(field, value))
    }

    /// Optional exact match.
    pub fn or_where(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clause(Bucket::Should, Query::term(field, value))
    }

    /// Match any of `values`.
    pub fn where_in<V: Into<Value>>(
        self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.where_clause(Bucket::Filter, Query::terms(field, values))
    }

    /// Optionally match any of `values`.
    pub fn or_where_in<V: Into<Value>>(
        self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.where_clause(Bucket::Should, Query::terms(field, values))
    }

    /// Wildcard match (`*` and `?`).
    pub fn where_like(self, field: impl Into<String>, pattern: impl Into<Value>) -> Self {
        self.where_clause(Bucket::Filter, Query::wildcard(field, pattern))
    }

    /// Optional wildcard match.
    pub fn or_where_like(self, field: impl Into<String>, pattern: impl Into<Value>) -> Self {
        self.where_clause(Bucket::Should, Query::wildcard(field, pattern))
    }

    /// Exclude an exact match.
    pub fn where_not(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_clause(Bucket::MustNot, Query::term(field, value))
    }

    /// Optionally exclude an exact match.
    pub fn or_where_not(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        let negated = BoolQuery::new().push(Bucket::MustNot, Query::term(field, value));
        self.where_clause(Bucket::Should, Query::Bool(negated))
    }

    /// Strictly greater than.
    pub fn where_greater_than(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_range(field, value, "gt")
    }

    /// Strictly less than.
    pub fn where_less_than(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.where_range(field, value, "lt")
    }

    /// Inclusive range from the first to the second value.
    ///
    /// Fails without touching the query when fewer than two values are given.
    pub fn where_between<V: Into<Value>>(
        self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Result<Self> {
        let mut values = values.into_iter();
        let (Some(lower), Some(upper)) = (values.next(), values.next()) else {
            return Err(ElasticError::validation("Provide two values"));
        };

        let field = field.into();
        Ok(self
            .where_range(field.clone(), lower, "gte")
            .where_range(field, upper, "lte"))
    }

    /// Range with a caller-chosen operator (`gt`, `gte`, `lt`, `lte`, ...).
    pub fn where_range(
        self,
        field: impl Into<String>,
        value: impl Into<Value>,
        operator: impl Into<String>,
    ) -> Self {
        self.where_clause(Bucket::Filter, Query::range(field, operator, value))
    }

    /// Conditions on nested documents under `path`.
    ///
    /// The callback receives a fresh builder. Its conditions become a
    /// `nested` clause under the root `must`; flat conditions of this builder,
    /// chained before or after, are kept together in one trailing `must` entry.
    pub fn where_nested(
        mut self,
        path: impl Into<String>,
        build: impl FnOnce(QueryBuilder) -> QueryBuilder,
    ) -> Self {
        let inner = build(QueryBuilder::new(self.client.clone()));
        let inner_query = inner.compiled_query().unwrap_or_else(match_all);

        self.nested
            .push(Query::Nested(NestedQuery::new(path, Query::Raw(inner_query))).to_json());
        self
    }

    /// Apply `build` only when `condition` holds.
    pub fn when(self, condition: bool, build: impl FnOnce(Self) -> Self) -> Self {
        if condition { build(self) } else { self }
    }

    /// Replace the whole query.
    ///
    /// Conditions chained afterwards are merged into it.
    pub fn raw_query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self
    }

    // =========================================================================
    // Sorting, projection, paging
    // =========================================================================

    /// Append a sort entry from direction and mode keywords.
    ///
    /// `direction` must be `asc` or `desc`; `mode` one of `min`, `max`,
    /// `sum`, `avg`, `median`.
    pub fn order_by(self, field: impl Into<String>, direction: &str, mode: Option<&str>) -> Result<Self> {
        let order = direction.parse::<SortOrder>()?;
        let mode = mode.map(str::parse::<SortMode>).transpose()?;
        Ok(self.sort_by(field, order, mode))
    }

    /// Append a sort entry.
    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder, mode: Option<SortMode>) -> Self {
        let direction = match mode {
            Some(mode) => json!({ "order": order.as_str(), "mode": mode.as_str() }),
            None => json!(order.as_str()),
        };

        let mut entry = Map::new();
        entry.insert(field.into(), direction);

        match &mut self.sort {
            Some(Value::Array(entries)) => entries.push(Value::Object(entry)),
            sort => *sort = Some(Value::Array(vec![Value::Object(entry)])),
        }
        self
    }

    /// Replace the whole sort.
    pub fn raw_sort(mut self, sort: Value) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Add fields to return in `_source`.
    pub fn select(mut self, fields: impl IntoFields) -> Self {
        self.select
            .get_or_insert_with(Vec::new)
            .extend(fields.into_fields());
        self
    }

    /// Set the result offset.
    pub fn offset(mut self, offset: u64) -> Self {
        self.from = Some(offset);
        self
    }

    /// Set the maximum number of results.
    pub fn limit(mut self, limit: u64) -> Self {
        self.size = Some(limit);
        self
    }

    /// Add a top-level aggregation.
    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregations.push(aggregation);
        self
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Target index, if set.
    pub fn index_name(&self) -> Option<&str> {
        self.index.as_deref()
    }

    /// Effective query, including nested clauses.
    pub fn compiled_query(&self) -> Option<Value> {
        if self.nested.is_empty() {
            return self.query.clone();
        }

        let mut must = self.nested.clone();
        if let Some(flat) = &self.query {
            must.push(flat.clone());
        }
        Some(json!({ "bool": { "must": must } }))
    }

    /// Accumulated sort.
    pub fn sort(&self) -> Option<&Value> {
        self.sort.as_ref()
    }

    /// Selected fields.
    pub fn selected_fields(&self) -> Option<&[String]> {
        self.select.as_deref()
    }

    /// Top-level aggregations.
    pub fn aggregations(&self) -> &[Aggregation] {
        &self.aggregations
    }

    /// Compile the search request body.
    ///
    /// A builder with nothing set compiles to a `match_all` query.
    pub fn search_body(&self) -> Value {
        let mut body = Map::new();

        if let Some(query) = self.compiled_query() {
            body.insert("query".to_string(), query);
        }

        if let Some(fields) = &self.select {
            body.insert("_source".to_string(), json!(fields));
        }

        if let Some(sort) = &self.sort {
            body.insert("sort".to_string(), sort.clone());
        }

        if !self.aggregations.is_empty() {
            body.insert(
                "aggs".to_string(),
                aggregation::aggs_object(&self.aggregations),
            );
        }

        if let Some(from) = self.from {
            body.insert("from".to_string(), json!(from));
        }

        if let Some(size) = self.size {
            body.insert("size".to_string(), json!(size));
        }

        if body.is_empty() {
            body.insert("query".to_string(), match_all());
        }

        Value::Object(body)
    }

    /// Compile the `_count` request body.
    pub fn count_body(&self) -> Value {
        json!({ "query": self.compiled_query().unwrap_or_else(match_all) })
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Run the search.
    pub async fn get(&self) -> Result<SearchResult> {
        let index = self.require_index()?;
        debug!(index, "Executing query");
        self.client.search(index, self.search_body()).await
    }

    /// Count matching documents.
    pub async fn count(&self) -> Result<u64> {
        let index = self.require_index()?;
        self.client.count(index, Some(self.count_body())).await
    }

    /// Fetch one page of matching documents.
    ///
    /// The offset is `page * per_page`.
    pub async fn paginate(&self, page: u64, per_page: u64) -> Result<PageResult> {
        let index = self.require_index()?;
        self.client
            .paginate(index, Some(self.search_body()), page, per_page)
            .await
    }

    /// Get a document by ID.
    pub async fn find(&self, id: impl ToString) -> Result<Option<FindResult>> {
        let index = self.require_index()?;
        self.client.find(index, &id.to_string()).await
    }

    /// Get a document by ID, failing when it does not exist.
    pub async fn find_or_fail(&self, id: impl ToString) -> Result<FindResult> {
        let index = self.require_index()?;
        self.client.find_or_fail(index, &id.to_string()).await
    }

    /// Create a document.
    pub async fn create<T: Serialize + ?Sized>(&self, id: impl ToString, data: &T) -> Result<WriteResult> {
        let index = self.require_index()?;
        self.client.create(index, &id.to_string(), data).await
    }

    /// Update a document.
    pub async fn update(&self, id: impl ToString, request: UpdateRequest) -> Result<WriteResult> {
        let index = self.require_index()?;
        self.client.update(index, &id.to_string(), request).await
    }

    /// Add `value` to a numeric field of a document.
    pub async fn increment(&self, id: impl ToString, field: &str, value: i64) -> Result<WriteResult> {
        let index = self.require_index()?;
        self.client.increment(index, &id.to_string(), field, value).await
    }

    /// Subtract `value` from a numeric field of a document.
    pub async fn decrement(&self, id: impl ToString, field: &str, value: i64) -> Result<WriteResult> {
        let index = self.require_index()?;
        self.client.decrement(index, &id.to_string(), field, value).await
    }

    /// Delete a document.
    pub async fn delete(&self, id: impl ToString) -> Result<WriteResult> {
        let index = self.require_index()?;
        self.client.delete(index, &id.to_string()).await
    }

    /// Send a bulk batch. Targets come from the batch, not the builder.
    pub async fn bulk(&self, batch: &BulkBatch) -> Result<BulkResult> {
        self.client.bulk(batch).await
    }

    fn require_index(&self) -> Result<&str> {
        self.index
            .as_deref()
            .ok_or_else(|| ElasticError::validation("Index name is required."))
    }
}

impl fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("index", &self.index)
            .field("body", &self.search_body())
            .finish()
    }
}

fn keyword(field: &str) -> String {
    format!("{}.keyword", field)
}

fn match_all() -> Value {
    Query::MatchAll.to_json()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::transport::{Transport, TransportRequest, TransportResponse};
    use async_trait::async_trait;

    struct Unreachable;

    #[async_trait]
    impl Transport for Unreachable {
        async fn send(&self, _request: TransportRequest) -> Result<TransportResponse> {
            Err(ElasticError::transport("no network in unit tests"))
        }
    }

    fn builder() -> QueryBuilder {
        ElasticClient::with_transport(ClientConfig::default(), Unreachable).query()
    }

    #[test]
    fn test_empty_builder_matches_all() {
        assert_eq!(
            serde_json::to_string(&builder().search_body()).expect("serializable"),
            r#"{"query":{"match_all":{}}}"#
        );
    }

    #[test]
    fn test_search_body_is_idempotent() {
        let builder = builder()
            .where_term("name", "test")
            .select(["name", "price"])
            .limit(10);

        let first = serde_json::to_string(&builder.search_body()).expect("serializable");
        let second = serde_json::to_string(&builder.search_body()).expect("serializable");

        assert_eq!(first, second);
    }

    #[test]
    fn test_conditions_keep_call_order() {
        let builder = builder()
            .where_term("a", 1)
            .or_where("b", 2)
            .where_in("c", [3, 4])
            .where_keyword("d", "x")
            .or_where_in("e", ["y"])
            .where_term("f", 5);

        assert_eq!(
            builder.compiled_query(),
            Some(json!({ "bool": {
                "filter": [
                    { "term": { "a": 1 } },
                    { "terms": { "c": [3, 4] } },
                    { "term": { "d.keyword": "x" } },
                    { "term": { "f": 5 } }
                ],
                "should": [
                    { "term": { "b": 2 } },
                    { "terms": { "e": ["y"] } }
                ]
            } }))
        );
    }

    #[test]
    fn test_where_like_and_negations() {
        let builder = builder()
            .where_like("name", "*test*")
            .or_where_like("name", "te?t")
            .where_not("status", "archived")
            .or_where_not("status", "draft")
            .or_where_keyword("brand", "acme");

        assert_eq!(
            builder.compiled_query(),
            Some(json!({ "bool": {
                "filter": [{ "wildcard": { "name": "*test*" } }],
                "should": [
                    { "wildcard": { "name": "te?t" } },
                    { "bool": { "must_not": [{ "term": { "status": "draft" } }] } },
                    { "term": { "brand.keyword": "acme" } }
                ],
                "must_not": [{ "term": { "status": "archived" } }]
            } }))
        );
    }

    #[test]
    fn test_where_between_emits_gte_then_lte() {
        let builder = builder()
            .where_between("price", [10, 20])
            .expect("two values");

        assert_eq!(
            builder.compiled_query(),
            Some(json!({ "bool": { "filter": [
                { "range": { "price": { "gte": 10 } } },
                { "range": { "price": { "lte": 20 } } }
            ] } }))
        );
    }

    #[test]
    fn test_where_between_requires_two_values() {
        let err = builder().where_between("price", [10]).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: Provide two values");

        let empty: [i64; 0] = [];
        assert!(builder().where_between("price", empty).is_err());
    }

    #[test]
    fn test_range_helpers() {
        let builder = builder()
            .where_greater_than("price", 10)
            .where_less_than("price", 100)
            .where_range("stock", 5, "gte");

        assert_eq!(
            builder.compiled_query(),
            Some(json!({ "bool": { "filter": [
                { "range": { "price": { "gt": 10 } } },
                { "range": { "price": { "lt": 100 } } },
                { "range": { "stock": { "gte": 5 } } }
            ] } }))
        );
    }

    #[test]
    fn test_order_by() {
        let builder = builder()
            .order_by("created_at", "desc", None)
            .expect("valid")
            .order_by("price", "asc", Some("avg"))
            .expect("valid");

        assert_eq!(
            builder.sort(),
            Some(&json!([
                { "created_at": "desc" },
                { "price": { "order": "asc", "mode": "avg" } }
            ]))
        );
    }

    #[test]
    fn test_order_by_rejects_unknown_keywords() {
        let err = builder().order_by("price", "up", None).unwrap_err();
        assert_eq!(
            err.message(),
            "Available direction values [desc, asc]. Entered value: [up]"
        );

        let err = builder().order_by("price", "asc", Some("mean")).unwrap_err();
        assert_eq!(
            err.message(),
            "Available direction values [min, max, sum, avg, median]. Entered value: [mean]"
        );
    }

    #[test]
    fn test_sort_by_defaults_to_desc() {
        let builder = builder().sort_by("price", SortOrder::default(), None);
        assert_eq!(builder.sort(), Some(&json!([{ "price": "desc" }])));
    }

    #[test]
    fn test_raw_sort_then_order_by() {
        let builder = builder()
            .raw_sort(json!({ "_score": "desc" }))
            .sort_by("price", SortOrder::Asc, None);
        assert_eq!(builder.sort(), Some(&json!([{ "price": "asc" }])));

        let builder = builder
            .raw_sort(json!([{ "name": "asc" }]))
            .sort_by("price", SortOrder::Desc, Some(SortMode::Max));
        assert_eq!(
            builder.sort(),
            Some(&json!([
                { "name": "asc" },
                { "price": { "order": "desc", "mode": "max" } }
            ]))
        );
    }

    #[test]
    fn test_select_appends() {
        let builder = builder()
            .select("name")
            .select(vec!["price", "stock"])
            .select(String::from("category"));

        assert_eq!(
            builder.selected_fields(),
            Some(&["name", "price", "stock", "category"].map(String::from)[..])
        );
        assert_eq!(
            builder.search_body()["_source"],
            json!(["name", "price", "stock", "category"])
        );
    }

    #[test]
    fn test_offset_and_limit_overwrite() {
        let body = builder().offset(5).limit(10).offset(20).limit(50).search_body();

        assert_eq!(body, json!({ "from": 20, "size": 50 }));
    }

    #[test]
    fn test_raw_query_replaces_and_later_conditions_merge() {
        let builder = builder()
            .where_term("ignored", 1)
            .raw_query(json!({ "bool": { "filter": { "term": { "a": 1 } } } }))
            .where_term("b", 2);

        assert_eq!(
            builder.compiled_query(),
            Some(json!({ "bool": { "filter": [
                { "term": { "a": 1 } },
                { "term": { "b": 2 } }
            ] } }))
        );
    }

    #[test]
    fn test_where_nested_keeps_flat_conditions_together() {
        let builder = builder()
            .where_term("status", "active")
            .where_nested("variants", |q| {
                q.where_term("variants.color", "red")
                    .where_greater_than("variants.stock", 0)
            })
            .where_term("brand", "acme");

        assert_eq!(
            builder.compiled_query(),
            Some(json!({ "bool": { "must": [
                { "nested": {
                    "path": "variants",
                    "query": { "bool": { "filter": [
                        { "term": { "variants.color": "red" } },
                        { "range": { "variants.stock": { "gt": 0 } } }
                    ] } }
                } },
                { "bool": { "filter": [
                    { "term": { "status": "active" } },
                    { "term": { "brand": "acme" } }
                ] } }
            ] } }))
        );
    }

    #[test]
    fn test_where_nested_without_flat_conditions() {
        let builder = builder().where_nested("variants", |q| q);

        assert_eq!(
            builder.search_body(),
            json!({ "query": { "bool": { "must": [
                { "nested": { "path": "variants", "query": { "match_all": {} } } }
            ] } } })
        );
    }

    #[test]
    fn test_aggregations_in_body() {
        let body = builder()
            .with_aggregation(Aggregation::new("by-category", json!({ "terms": { "field": "category" } })))
            .with_aggregation(Aggregation::new("max-price", json!({ "max": { "field": "price" } })))
            .limit(0)
            .search_body();

        assert_eq!(
            body,
            json!({
                "aggs": {
                    "by-category": { "terms": { "field": "category" } },
                    "max-price": { "max": { "field": "price" } }
                },
                "size": 0
            })
        );
    }

    #[test]
    fn test_when() {
        let applied = builder().when(true, |q| q.where_term("a", 1));
        let skipped = builder().when(false, |q| q.where_term("a", 1));

        assert!(applied.compiled_query().is_some());
        assert_eq!(skipped.compiled_query(), None);
    }

    #[test]
    fn test_count_body_ignores_paging_and_sort() {
        let builder = builder()
            .where_term("a", 1)
            .sort_by("price", SortOrder::Asc, None)
            .limit(5);

        assert_eq!(
            builder.count_body(),
            json!({ "query": { "bool": { "filter": [{ "term": { "a": 1 } }] } } })
        );
        assert_eq!(
            self::builder().count_body(),
            json!({ "query": { "match_all": {} } })
        );
    }

    #[tokio::test]
    async fn test_terminal_operations_require_index() {
        let builder = builder();

        let results = [
            builder.get().await.map(|_| ()),
            builder.count().await.map(|_| ()),
            builder.paginate(1, 10).await.map(|_| ()),
            builder.find(1).await.map(|_| ()),
            builder.find_or_fail(1).await.map(|_| ()),
            builder.create(1, &json!({})).await.map(|_| ()),
            builder.update(1, UpdateRequest::doc(json!({}))).await.map(|_| ()),
            builder.delete(1).await.map(|_| ()),
            builder.increment(1, "stock", 1).await.map(|_| ()),
        ];

        for result in results {
            match result {
                Err(ElasticError::Validation(message)) => {
                    assert_eq!(message, "Index name is required.")
                }
                other => panic!("unexpected result: {:?}", other.err()),
            }
        }
    }
}
