//! Bulk write batches.

use crate::error::{ElasticError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;
use std::str::FromStr;

/// Bulk operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkAction {
    /// Index a document, replacing any existing one.
    Index,
    /// Create a document (fail if exists).
    Create,
    /// Partially update a document.
    Update,
    /// Delete a document.
    Delete,
}

impl BulkAction {
    /// Action name as used in the bulk header line.
    pub fn as_str(&self) -> &'static str {
        match self {
            BulkAction::Index => "index",
            BulkAction::Create => "create",
            BulkAction::Update => "update",
            BulkAction::Delete => "delete",
        }
    }
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BulkAction {
    type Err = ElasticError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "index" => Ok(BulkAction::Index),
            "create" => Ok(BulkAction::Create),
            "update" => Ok(BulkAction::Update),
            "delete" => Ok(BulkAction::Delete),
            other => Err(ElasticError::validation(format!(
                "Unknown bulk action [{}]. Available actions [index, create, update, delete]",
                other
            ))),
        }
    }
}

/// One write action in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkOperation {
    /// Action kind.
    pub action: BulkAction,
    /// Target index.
    pub index: String,
    /// Document ID.
    pub id: String,
    /// Document or partial document; ignored for deletes.
    pub data: Map<String, Value>,
}

impl BulkOperation {
    /// Header line plus, when there is a payload to send, the body line.
    pub fn to_bulk_lines(&self) -> Vec<Value> {
        let mut lines = vec![json!({
            self.action.as_str(): { "_index": self.index, "_id": self.id }
        })];

        if self.action == BulkAction::Delete || self.data.is_empty() {
            return lines;
        }

        match self.action {
            BulkAction::Update => lines.push(json!({ "doc": self.data })),
            _ => lines.push(Value::Object(self.data.clone())),
        }

        lines
    }
}

/// Ordered batch of write actions sent as one `_bulk` request.
///
/// ```rust
/// use elastic_fluent::{BulkAction, BulkBatch};
/// use serde_json::json;
///
/// let mut batch = BulkBatch::new();
/// batch
///     .add(BulkAction::Update, "products", 2, json!({ "name": "test" }))?
///     .add(BulkAction::Delete, "products", 4, None)?;
///
/// assert_eq!(
///     batch.to_ndjson()?,
///     "{\"update\":{\"_index\":\"products\",\"_id\":\"2\"}}\n\
///      {\"doc\":{\"name\":\"test\"}}\n\
///      {\"delete\":{\"_index\":\"products\",\"_id\":\"4\"}}\n"
/// );
/// # Ok::<(), elastic_fluent::ElasticError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkBatch {
    operations: Vec<BulkOperation>,
}

impl BulkBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one action.
    ///
    /// `data` must be a JSON object or absent (`None` / `Value::Null`).
    pub fn add(
        &mut self,
        action: BulkAction,
        index: impl Into<String>,
        id: impl ToString,
        data: impl Into<Option<Value>>,
    ) -> Result<&mut Self> {
        let data: Option<Value> = data.into();
        let data = payload(data.unwrap_or(Value::Null))?;

        self.operations.push(BulkOperation {
            action,
            index: index.into(),
            id: id.to_string(),
            data,
        });

        Ok(self)
    }

    /// Append raw documents of the form `{action, index, id, data}`.
    ///
    /// Every document is validated before any is appended; one malformed entry
    /// rejects the whole call and leaves the batch untouched.
    pub fn add_many(&mut self, documents: Vec<Value>) -> Result<&mut Self> {
        let operations = documents
            .iter()
            .map(validate_document)
            .collect::<Result<Vec<_>>>()?;

        self.operations.extend(operations);
        Ok(self)
    }

    /// Queued actions, in order.
    pub fn operations(&self) -> &[BulkOperation] {
        &self.operations
    }

    /// Number of queued actions.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// All request lines, in order.
    pub fn lines(&self) -> Vec<Value> {
        self.operations
            .iter()
            .flat_map(BulkOperation::to_bulk_lines)
            .collect()
    }

    /// Newline-delimited request body, terminated by a newline.
    pub fn to_ndjson(&self) -> Result<String> {
        let mut body = String::new();
        for line in self.lines() {
            body.push_str(&serde_json::to_string(&line)?);
            body.push('\n');
        }
        Ok(body)
    }
}

fn payload(data: Value) -> Result<Map<String, Value>> {
    match data {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        Value::Array(items) if items.is_empty() => Ok(Map::new()),
        other => Err(ElasticError::validation(format!(
            "Bulk document data must be an object, got {}",
            other
        ))),
    }
}

fn validate_document(document: &Value) -> Result<BulkOperation> {
    let invalid = || ElasticError::validation("Document has incorrect structure.");

    let action = document
        .get("action")
        .and_then(Value::as_str)
        .ok_or_else(invalid)?
        .parse::<BulkAction>()?;
    let index = document.get("index").and_then(scalar_key).ok_or_else(invalid)?;
    let id = document.get("id").and_then(scalar_key).ok_or_else(invalid)?;
    let data = match document.get("data") {
        Some(data @ (Value::Object(_) | Value::Array(_))) => payload(data.clone())?,
        _ => return Err(invalid()),
    };

    Ok(BulkOperation {
        action,
        index,
        id,
        data,
    })
}

/// Strings and integers are accepted for index names and IDs.
fn scalar_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => None,
    }
}
