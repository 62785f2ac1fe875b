//! Elasticsearch client configuration.

use crate::error::{ElasticError, Result};
use std::env;
use std::time::Duration;

/// Default engine URL used when none is configured.
pub const DEFAULT_URL: &str = "http://localhost:9200";

/// Environment variable holding the engine URL.
pub const URL_VAR: &str = "ELASTICSEARCH_URL";
/// Environment variable holding an optional port suffix.
pub const PORT_VAR: &str = "ELASTICSEARCH_PORT";
/// Environment variable holding an optional API key.
pub const API_KEY_VAR: &str = "ELASTICSEARCH_API_KEY";

/// Elasticsearch client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Engine URL.
    pub url: String,
    /// Port appended to the URL when set.
    pub port: Option<u16>,
    /// API key sent as `Authorization: ApiKey <key>`.
    pub api_key: Option<String>,
    /// Request timeout. `None` keeps the transport default.
    pub request_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Create a new configuration for the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            port: None,
            api_key: None,
            request_timeout: None,
        }
    }

    /// Load configuration from the environment.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let url = env::var(URL_VAR).unwrap_or_else(|_| DEFAULT_URL.to_string());
        let mut config = Self::new(url);

        if let Ok(port) = env::var(PORT_VAR) {
            let port = port.trim().parse::<u16>().map_err(|e| {
                ElasticError::validation(format!("Invalid {}: {} ({})", PORT_VAR, port, e))
            })?;
            config.port = Some(port);
        }

        if let Ok(key) = env::var(API_KEY_VAR)
            && !key.is_empty()
        {
            config.api_key = Some(key);
        }

        Ok(config)
    }

    /// Set the port suffix.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the API key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// URL the client talks to, including the port suffix.
    pub fn base_url(&self) -> String {
        let url = self.url.trim_end_matches('/');
        match self.port {
            Some(port) => format!("{}:{}", url, port),
            None => url.to_string(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}
