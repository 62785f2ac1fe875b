//! Query DSL clauses.
//!
//! Leaf conditions (`term`, `terms`, `range`, `wildcard`) and the compound
//! `bool` / `nested` clauses the builder assembles them into.

use serde_json::{Map, Value, json};

/// Boolean clause bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    /// AND, no scoring.
    Filter,
    /// OR.
    Should,
    /// NOT.
    MustNot,
    /// AND, scored.
    Must,
}

impl Bucket {
    /// Key of the bucket inside a `bool` clause.
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Filter => "filter",
            Bucket::Should => "should",
            Bucket::MustNot => "must_not",
            Bucket::Must => "must",
        }
    }
}

/// Query clauses.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Match all documents.
    MatchAll,
    /// Term query for exact matches.
    Term(TermQuery),
    /// Terms query for multiple exact matches.
    Terms(TermsQuery),
    /// Range query.
    Range(RangeQuery),
    /// Wildcard query.
    Wildcard(WildcardQuery),
    /// Bool query for combining queries.
    Bool(BoolQuery),
    /// Nested query.
    Nested(NestedQuery),
    /// Raw JSON query.
    Raw(Value),
}

impl Query {
    /// Convert query to JSON.
    pub fn to_json(&self) -> Value {
        match self {
            Query::MatchAll => json!({ "match_all": {} }),
            Query::Term(t) => t.to_json(),
            Query::Terms(t) => t.to_json(),
            Query::Range(r) => r.to_json(),
            Query::Wildcard(w) => w.to_json(),
            Query::Bool(b) => b.to_json(),
            Query::Nested(n) => n.to_json(),
            Query::Raw(v) => v.clone(),
        }
    }

    /// Term query.
    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::Term(TermQuery::new(field, value))
    }

    /// Terms query.
    pub fn terms(field: impl Into<String>, values: Vec<Value>) -> Self {
        Query::Terms(TermsQuery::new(field, values))
    }

    /// Single-bound range query.
    pub fn range(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Query::Range(RangeQuery::new(field).bound(operator, value))
    }

    /// Wildcard query.
    pub fn wildcard(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Query::Wildcard(WildcardQuery::new(field, value))
    }
}

impl From<Query> for Value {
    fn from(query: Query) -> Self {
        query.to_json()
    }
}

/// Term query for exact matching.
#[derive(Debug, Clone, PartialEq)]
pub struct TermQuery {
    /// Field name.
    pub field: String,
    /// Exact value to match.
    pub value: Value,
}

impl TermQuery {
    /// Create a new term query.
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    fn to_json(&self) -> Value {
        json!({ "term": { &self.field: self.value } })
    }
}

/// Terms query for matching any of several values.
#[derive(Debug, Clone, PartialEq)]
pub struct TermsQuery {
    /// Field name.
    pub field: String,
    /// Values to match.
    pub values: Vec<Value>,
}

impl TermsQuery {
    /// Create a new terms query.
    pub fn new(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            field: field.into(),
            values,
        }
    }

    fn to_json(&self) -> Value {
        json!({ "terms": { &self.field: self.values } })
    }
}

/// Range query.
///
/// Operators are passed through as given (`gt`, `gte`, `lt`, `lte`, ...);
/// the engine rejects unknown ones.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeQuery {
    /// Field name.
    pub field: String,
    /// Operator/value pairs, in insertion order.
    pub bounds: Vec<(String, Value)>,
}

impl RangeQuery {
    /// Create a new range query without bounds.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            bounds: Vec::new(),
        }
    }

    /// Add a bound.
    pub fn bound(mut self, operator: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bounds.push((operator.into(), value.into()));
        self
    }

    fn to_json(&self) -> Value {
        let mut range = Map::new();
        for (operator, value) in &self.bounds {
            range.insert(operator.clone(), value.clone());
        }

        json!({ "range": { &self.field: range } })
    }
}

/// Wildcard query.
#[derive(Debug, Clone, PartialEq)]
pub struct WildcardQuery {
    /// Field name.
    pub field: String,
    /// Wildcard pattern.
    pub value: Value,
}

impl WildcardQuery {
    /// Create a new wildcard query.
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    fn to_json(&self) -> Value {
        json!({ "wildcard": { &self.field: self.value } })
    }
}

/// Bool query for combining multiple queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    /// Must match (AND).
    pub must: Vec<Query>,
    /// Should match (OR).
    pub should: Vec<Query>,
    /// Must not match (NOT).
    pub must_not: Vec<Query>,
    /// Filter (non-scoring).
    pub filter: Vec<Query>,
}

impl BoolQuery {
    /// Create a new bool query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a clause to a bucket.
    pub fn push(mut self, bucket: Bucket, query: Query) -> Self {
        match bucket {
            Bucket::Filter => self.filter.push(query),
            Bucket::Should => self.should.push(query),
            Bucket::MustNot => self.must_not.push(query),
            Bucket::Must => self.must.push(query),
        }
        self
    }

    fn to_json(&self) -> Value {
        let mut bool_query = Map::new();

        for (bucket, clauses) in [
            (Bucket::Must, &self.must),
            (Bucket::Filter, &self.filter),
            (Bucket::Should, &self.should),
            (Bucket::MustNot, &self.must_not),
        ] {
            if !clauses.is_empty() {
                bool_query.insert(
                    bucket.as_str().to_string(),
                    Value::Array(clauses.iter().map(|q| q.to_json()).collect()),
                );
            }
        }

        json!({ "bool": bool_query })
    }
}

/// Nested query.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedQuery {
    /// Path to nested field.
    pub path: String,
    /// Inner query.
    pub query: Box<Query>,
}

impl NestedQuery {
    /// Create a new nested query.
    pub fn new(path: impl Into<String>, query: Query) -> Self {
        Self {
            path: path.into(),
            query: Box::new(query),
        }
    }

    fn to_json(&self) -> Value {
        json!({
            "nested": {
                "path": self.path,
                "query": self.query.to_json()
            }
        })
    }
}

/// Append `clause` to `target.bool.<bucket>`, creating the path as needed.
///
/// `target` may be an arbitrary caller-supplied query; a bucket that holds a
/// single clause object is promoted to a list.
pub(crate) fn push_clause(target: &mut Value, bucket: Bucket, clause: Value) {
    let root = ensure_object(target);
    let bool_query = ensure_object(
        root.entry("bool".to_string())
            .or_insert_with(|| Value::Object(Map::new())),
    );
    let list = bool_query
        .entry(bucket.as_str().to_string())
        .or_insert_with(|| Value::Array(Vec::new()));

    match list {
        Value::Array(clauses) => clauses.push(clause),
        other => {
            let existing = other.take();
            *other = Value::Array(vec![existing, clause]);
        }
    }
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced by an object"),
    }
}
