//! Named aggregation trees.

use crate::error::{ElasticError, Result};
use serde_json::{Map, Value};

/// A named aggregation with optional sub-aggregations.
///
/// `data` is the opaque metric or bucket definition (`{"terms": {...}}`,
/// `{"max": {...}}`, ...). Children are owned by their parent and serialized
/// under its `aggs` key in insertion order.
///
/// ```rust
/// use elastic_fluent::Aggregation;
/// use serde_json::json;
///
/// let mut by_category = Aggregation::new("by-category", json!({ "terms": { "field": "category" } }));
/// by_category.add_sub_aggregation(Aggregation::new("max-price", json!({ "max": { "field": "price" } })))?;
///
/// assert_eq!(
///     by_category.to_request_json(),
///     json!({ "by-category": {
///         "terms": { "field": "category" },
///         "aggs": { "max-price": { "max": { "field": "price" } } }
///     } })
/// );
/// # Ok::<(), elastic_fluent::ElasticError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    name: String,
    data: Value,
    sub_aggregations: Vec<Aggregation>,
}

impl Aggregation {
    /// Create an aggregation without children.
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self {
            name: name.into(),
            data,
            sub_aggregations: Vec::new(),
        }
    }

    /// Create an aggregation with the given children.
    ///
    /// Fails with [`ElasticError::Validation`] when `data` is neither an
    /// object nor null and children are given.
    pub fn with_sub_aggregations(
        name: impl Into<String>,
        data: Value,
        sub_aggregations: Vec<Aggregation>,
    ) -> Result<Self> {
        let aggregation = Self::new(name, data);
        if !sub_aggregations.is_empty() {
            aggregation.ensure_nestable()?;
        }

        Ok(Self {
            sub_aggregations,
            ..aggregation
        })
    }

    /// Append a child aggregation.
    ///
    /// Fails with [`ElasticError::Validation`] when this node's `data` is
    /// neither an object nor null.
    pub fn add_sub_aggregation(&mut self, sub_aggregation: Aggregation) -> Result<&mut Self> {
        self.ensure_nestable()?;
        self.sub_aggregations.push(sub_aggregation);
        Ok(self)
    }

    fn ensure_nestable(&self) -> Result<()> {
        match self.data {
            Value::Object(_) | Value::Null => Ok(()),
            _ => Err(ElasticError::validation(format!(
                "Aggregation [{}] must be an object to hold sub-aggregations.",
                self.name
            ))),
        }
    }

    /// Aggregation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Metric or bucket definition.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Direct children.
    pub fn sub_aggregations(&self) -> &[Aggregation] {
        &self.sub_aggregations
    }

    /// The `{name: body}` object for this node.
    pub fn to_request_json(&self) -> Value {
        let mut map = Map::new();
        map.insert(self.name.clone(), self.body());
        Value::Object(map)
    }

    /// Body of this node: `data` plus an `aggs` object when it has children.
    pub(crate) fn body(&self) -> Value {
        let mut body = match &self.data {
            Value::Object(map) => map.clone(),
            Value::Null => Map::new(),
            // childless by construction
            other => return other.clone(),
        };

        if !self.sub_aggregations.is_empty() {
            let mut aggs = match body.remove("aggs") {
                Some(Value::Object(existing)) => existing,
                _ => Map::new(),
            };
            for child in &self.sub_aggregations {
                aggs.insert(child.name.clone(), child.body());
            }
            body.insert("aggs".to_string(), Value::Object(aggs));
        }

        Value::Object(body)
    }
}

/// Merge top-level aggregations into one `aggs` object, keyed by name.
pub(crate) fn aggs_object(aggregations: &[Aggregation]) -> Value {
    let mut aggs = Map::new();
    for aggregation in aggregations {
        aggs.insert(aggregation.name.clone(), aggregation.body());
    }
    Value::Object(aggs)
}
