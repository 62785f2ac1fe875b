//! Response mappers.
//!
//! Pure functions from a decoded response body to the records in
//! [`crate::response`]. A field the engine always sends on success is
//! required and its absence is a [`ElasticError::Core`] failure; fields the
//! engine may leave out (`max_score`, `_shards.skipped`, `aggregations`,
//! per-item bulk details) map to `None`.

use crate::bulk::BulkAction;
use crate::error::{ElasticError, Result};
use crate::response::{
    BulkItemResult, BulkResult, FindResult, SearchHit, SearchResult, ShardSummary, TotalHits,
    TotalRelation, WriteOutcome, WriteResult,
};
use serde_json::Value;

/// Look up a dotted path (`hits.total.value`) in a JSON tree.
///
/// Numeric segments index into arrays.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Map a `_search` response.
pub fn search(body: &Value) -> Result<SearchResult> {
    let hits = required(body, "hits.hits")?
        .as_array()
        .ok_or_else(|| malformed("hits.hits"))?
        .iter()
        .map(hit)
        .collect::<Result<Vec<_>>>()?;

    Ok(SearchResult {
        took: required_u64(body, "took")?,
        timed_out: required_bool(body, "timed_out")?,
        shards: shards(required(body, "_shards")?)?,
        total: total(required(body, "hits.total")?)?,
        max_score: optional_f64(body, "hits.max_score"),
        hits,
        aggregations: lookup(body, "aggregations").filter(|v| !v.is_null()).cloned(),
    })
}

/// Map a `_doc` GET response.
pub fn find(body: &Value) -> Result<FindResult> {
    Ok(FindResult {
        index: required_string(body, "_index")?,
        id: required_string(body, "_id")?,
        version: required_u64(body, "_version")?,
        seq_no: required_u64(body, "_seq_no")?,
        primary_term: required_u64(body, "_primary_term")?,
        found: required_bool(body, "found")?,
        source: lookup(body, "_source").cloned().unwrap_or(Value::Null),
    })
}

/// Map a create, update or delete acknowledgement.
pub fn write(body: &Value) -> Result<WriteResult> {
    Ok(WriteResult {
        index: required_string(body, "_index")?,
        id: required_string(body, "_id")?,
        version: optional_u64(body, "_version"),
        result: lookup(body, "result")
            .and_then(Value::as_str)
            .and_then(WriteOutcome::parse),
        shards: lookup(body, "_shards").map(shards).transpose()?,
        seq_no: optional_u64(body, "_seq_no"),
        primary_term: optional_u64(body, "_primary_term"),
        status: optional_u64(body, "status").and_then(|s| u16::try_from(s).ok()),
        error: lookup(body, "error").filter(|v| !v.is_null()).cloned(),
    })
}

/// Map a `_bulk` response, flattening `items` into one ordered list.
pub fn bulk(body: &Value) -> Result<BulkResult> {
    let mut items = Vec::new();

    for entry in required(body, "items")?
        .as_array()
        .ok_or_else(|| malformed("items"))?
    {
        let entry = entry.as_object().ok_or_else(|| malformed("items"))?;
        for (action, data) in entry {
            let action = action
                .parse::<BulkAction>()
                .map_err(|_| ElasticError::core(format!("Unknown bulk item action [{}]", action)))?;
            items.push(BulkItemResult {
                action,
                result: write(data)?,
            });
        }
    }

    Ok(BulkResult {
        took: required_u64(body, "took")?,
        errors: required_bool(body, "errors")?,
        items,
    })
}

/// Extract the document count of a `_count` response.
pub fn count(body: &Value) -> Result<u64> {
    required_u64(body, "count")
}

/// Map a `_shards` object.
pub fn shards(value: &Value) -> Result<ShardSummary> {
    Ok(ShardSummary {
        total: required_u64(value, "total")?,
        successful: required_u64(value, "successful")?,
        failed: required_u64(value, "failed")?,
        skipped: optional_u64(value, "skipped"),
    })
}

/// Map `hits.total`, in either the object or the legacy numeric form.
fn total(value: &Value) -> Result<TotalHits> {
    if let Some(value) = value.as_u64() {
        return Ok(TotalHits {
            value,
            relation: TotalRelation::Eq,
        });
    }

    let relation = match lookup(value, "relation").and_then(Value::as_str) {
        Some("gte") => TotalRelation::Gte,
        Some("eq") | None => TotalRelation::Eq,
        Some(other) => {
            return Err(ElasticError::core(format!(
                "Unknown total relation [{}] in response",
                other
            )));
        }
    };

    Ok(TotalHits {
        value: required_u64(value, "value")?,
        relation,
    })
}

fn hit(value: &Value) -> Result<SearchHit> {
    Ok(SearchHit {
        index: required_string(value, "_index")?,
        id: required_string(value, "_id")?,
        score: optional_f64(value, "_score"),
        source: lookup(value, "_source").cloned().unwrap_or(Value::Null),
    })
}

fn required<'a>(value: &'a Value, path: &str) -> Result<&'a Value> {
    lookup(value, path)
        .filter(|v| !v.is_null())
        .ok_or_else(|| ElasticError::core(format!("Missing field [{}] in response", path)))
}

fn required_u64(value: &Value, path: &str) -> Result<u64> {
    required(value, path)?
        .as_u64()
        .ok_or_else(|| malformed(path))
}

fn required_bool(value: &Value, path: &str) -> Result<bool> {
    required(value, path)?
        .as_bool()
        .ok_or_else(|| malformed(path))
}

fn required_string(value: &Value, path: &str) -> Result<String> {
    match required(value, path)? {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(malformed(path)),
    }
}

fn optional_u64(value: &Value, path: &str) -> Option<u64> {
    lookup(value, path).and_then(Value::as_u64)
}

fn optional_f64(value: &Value, path: &str) -> Option<f64> {
    lookup(value, path).and_then(Value::as_f64)
}

fn malformed(path: &str) -> ElasticError {
    ElasticError::core(format!("Malformed field [{}] in response", path))
}
