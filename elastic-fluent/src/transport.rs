//! HTTP transport used by the client.
//!
//! The client never talks to the network directly: it hands a
//! [`TransportRequest`] to a [`Transport`] and receives the status code and
//! decoded JSON body back. [`HttpTransport`] is the production implementation.

use crate::{
    config::ClientConfig,
    error::{ElasticError, Result},
};
use async_trait::async_trait;
use opensearch::http::{
    Method as HttpMethod, Url,
    headers::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
    transport::{SingleNodeConnectionPool, Transport as OpenSearchTransport, TransportBuilder},
};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde_json::Value;
use tracing::{debug, info};

/// Characters escaped inside a single path segment.
///
/// `,` and `*` stay literal so multi-index targets and wildcards still work.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Join path segments, percent-encoding each one.
///
/// ```
/// use elastic_fluent::request_path;
///
/// assert_eq!(request_path(&["products", "_doc", "a/b#1"]), "products/_doc/a%2Fb%231");
/// ```
pub fn request_path(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// HTTP method of a transport request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET.
    Get,
    /// POST.
    Post,
    /// PUT.
    Put,
    /// DELETE.
    Delete,
}

impl Method {
    /// Method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// Request body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// A JSON document.
    Json(Value),
    /// Pre-encoded newline-delimited JSON.
    NdJson(String),
}

/// A single request to the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the base URL, e.g. `products/_search`.
    pub path: String,
    /// Query-string pairs, in order.
    pub query: Vec<(String, String)>,
    /// Optional body.
    pub body: Option<RequestBody>,
}

impl TransportRequest {
    /// Create a request without body or query string.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Attach a newline-delimited JSON body.
    pub fn ndjson(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::NdJson(body.into()));
        self
    }

    /// Append a query-string pair.
    pub fn query_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }
}

/// Engine response: status code and decoded body.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded JSON body (`Value::Null` when empty, `Value::String` when the
    /// body is not JSON).
    pub body: Value,
}

impl TransportResponse {
    /// Create a response.
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 404.
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// 409.
    pub fn is_conflict(&self) -> bool {
        self.status == 409
    }
}

/// Sends requests to the engine.
///
/// Implementations perform exactly one HTTP exchange per call; no retries.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return the raw response.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// [`Transport`] backed by the `opensearch` crate's HTTP transport.
pub struct HttpTransport {
    inner: OpenSearchTransport,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the configured node.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = config.base_url();
        info!(url = %base_url, "Initializing Elasticsearch transport");

        let url = Url::parse(&base_url)
            .map_err(|e| ElasticError::validation(format!("Invalid URL: {}", e)))?;

        let conn_pool = SingleNodeConnectionPool::new(url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();

        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(&format!("ApiKey {}", key))
                .map_err(|e| ElasticError::validation(format!("Invalid API key: {}", e)))?;
            builder = builder.header(AUTHORIZATION, value);
        }

        let inner = builder
            .build()
            .map_err(|e| ElasticError::transport(e.to_string()))?;

        Ok(Self { inner, base_url })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        debug!(method = request.method.as_str(), path = %request.path, "Sending request");

        let method = match request.method {
            Method::Get => HttpMethod::Get,
            Method::Post => HttpMethod::Post,
            Method::Put => HttpMethod::Put,
            Method::Delete => HttpMethod::Delete,
        };

        let mut headers = HeaderMap::new();
        let body = match request.body {
            Some(RequestBody::Json(value)) => Some(serde_json::to_string(&value)?),
            Some(RequestBody::NdJson(lines)) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/x-ndjson"));
                Some(lines)
            }
            None => None,
        };

        let query = (!request.query.is_empty()).then_some(&request.query);
        let path = format!("/{}", request.path.trim_start_matches('/'));

        let response = self
            .inner
            .send(method, &path, headers, query, body, None)
            .await?;

        let status = response.status_code().as_u16();
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(TransportResponse { status, body })
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let request = TransportRequest::new(Method::Post, "products/_update/1")
            .query_param("if_primary_term", 1)
            .query_param("if_seq_no", 5)
            .json(json!({ "doc": { "name": "test" } }));

        assert_eq!(request.path, "products/_update/1");
        assert_eq!(
            request.query,
            vec![
                ("if_primary_term".to_string(), "1".to_string()),
                ("if_seq_no".to_string(), "5".to_string()),
            ]
        );
        assert_eq!(
            request.body,
            Some(RequestBody::Json(json!({ "doc": { "name": "test" } })))
        );
    }

    #[test]
    fn test_request_path_encodes_segments() {
        assert_eq!(request_path(&["products", "_doc", "1"]), "products/_doc/1");
        assert_eq!(request_path(&["products", "_doc", "1#draft"]), "products/_doc/1%23draft");
        assert_eq!(request_path(&["products", "_doc", "a/b"]), "products/_doc/a%2Fb");
        assert_eq!(
            request_path(&["products", "_doc", "7?refresh=true"]),
            "products/_doc/7%3Frefresh=true"
        );
        assert_eq!(request_path(&["logs-*,metrics", "_search"]), "logs-*,metrics/_search");
        assert_eq!(request_path(&["products", "_doc", "50%"]), "products/_doc/50%25");
    }

    #[test]
    fn test_response_status_helpers() {
        assert!(TransportResponse::new(201, Value::Null).is_success());
        assert!(TransportResponse::new(404, Value::Null).is_not_found());
        assert!(TransportResponse::new(409, Value::Null).is_conflict());
        assert!(!TransportResponse::new(400, Value::Null).is_success());
    }

    #[test]
    fn test_http_transport_rejects_invalid_url() {
        let result = HttpTransport::new(&ClientConfig::new("not a url"));
        assert!(matches!(result, Err(ElasticError::Validation(_))));
    }

    #[test]
    fn test_http_transport_base_url() {
        let transport = HttpTransport::new(&ClientConfig::new("http://localhost").with_port(9200))
            .expect("valid config");
        assert_eq!(transport.base_url(), "http://localhost:9200");
    }
}
