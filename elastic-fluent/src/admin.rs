//! Index and alias administration.

use crate::{
    client::{ElasticClient, failed, raw, reason},
    error::{ElasticError, Result},
    transport::{Method, TransportRequest, request_path},
};
use serde_json::{Map, Value, json};
use tracing::{debug, info};

/// Index manager for creating and deleting indices.
#[derive(Clone, Debug)]
pub struct IndexManager {
    client: ElasticClient,
}

impl IndexManager {
    /// Create a new index manager.
    pub(crate) fn new(client: ElasticClient) -> Self {
        Self { client }
    }

    /// Create a new index.
    pub async fn create(&self, name: &str, settings: IndexSettings) -> Result<bool> {
        self.create_raw(name, settings.to_json()).await
    }

    /// Create a new index from a raw settings/mappings body.
    pub async fn create_raw(&self, name: &str, body: Value) -> Result<bool> {
        info!(index = name, "Creating index");

        let body = match body {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        let response = self
            .client
            .send(TransportRequest::new(Method::Put, request_path(&[name])).json(body))
            .await?;

        if !response.is_success() {
            return Err(failed(ElasticError::Update {
                message: raw(&response.body),
                status: response.status,
            }));
        }

        Ok(true)
    }

    /// Delete an index.
    pub async fn delete(&self, name: &str) -> Result<bool> {
        info!(index = name, "Deleting index");

        let response = self
            .client
            .send(TransportRequest::new(Method::Delete, request_path(&[name])))
            .await?;

        if !response.is_success() {
            return Err(failed(ElasticError::Delete {
                message: raw(&response.body),
                status: response.status,
            }));
        }

        Ok(true)
    }
}

/// Index settings for creating indices.
#[derive(Debug, Clone, Default)]
pub struct IndexSettings {
    /// Number of shards.
    pub number_of_shards: Option<u32>,
    /// Number of replicas.
    pub number_of_replicas: Option<u32>,
    /// Refresh interval.
    pub refresh_interval: Option<String>,
    /// Analysis settings.
    pub analysis: Option<Value>,
    /// Field mappings, as sent to the engine.
    pub mappings: Option<Value>,
}

impl IndexSettings {
    /// Create new index settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set number of shards.
    pub fn shards(mut self, shards: u32) -> Self {
        self.number_of_shards = Some(shards);
        self
    }

    /// Set number of replicas.
    pub fn replicas(mut self, replicas: u32) -> Self {
        self.number_of_replicas = Some(replicas);
        self
    }

    /// Set refresh interval.
    pub fn refresh_interval(mut self, interval: impl Into<String>) -> Self {
        self.refresh_interval = Some(interval.into());
        self
    }

    /// Set analysis settings.
    pub fn analysis(mut self, analysis: Value) -> Self {
        self.analysis = Some(analysis);
        self
    }

    /// Set mappings.
    pub fn mappings(mut self, mappings: Value) -> Self {
        self.mappings = Some(mappings);
        self
    }

    /// Request body for index creation.
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        let mut settings = Map::new();

        if let Some(shards) = self.number_of_shards {
            settings.insert("number_of_shards".to_string(), json!(shards));
        }
        if let Some(replicas) = self.number_of_replicas {
            settings.insert("number_of_replicas".to_string(), json!(replicas));
        }
        if let Some(interval) = &self.refresh_interval {
            settings.insert("refresh_interval".to_string(), json!(interval));
        }
        if let Some(analysis) = &self.analysis {
            settings.insert("analysis".to_string(), analysis.clone());
        }

        if !settings.is_empty() {
            body.insert("settings".to_string(), Value::Object(settings));
        }

        if let Some(mappings) = &self.mappings {
            body.insert("mappings".to_string(), mappings.clone());
        }

        Value::Object(body)
    }
}

/// One step of an atomic alias update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasAction {
    /// Point `alias` at `index`.
    Add {
        /// Index name.
        index: String,
        /// Alias name.
        alias: String,
    },
    /// Detach `alias` from `index`.
    Remove {
        /// Index name.
        index: String,
        /// Alias name.
        alias: String,
    },
}

impl AliasAction {
    /// Add action.
    pub fn add(index: impl Into<String>, alias: impl Into<String>) -> Self {
        AliasAction::Add {
            index: index.into(),
            alias: alias.into(),
        }
    }

    /// Remove action.
    pub fn remove(index: impl Into<String>, alias: impl Into<String>) -> Self {
        AliasAction::Remove {
            index: index.into(),
            alias: alias.into(),
        }
    }

    /// Action as sent to `_aliases`.
    pub fn to_json(&self) -> Value {
        match self {
            AliasAction::Add { index, alias } => {
                json!({ "add": { "index": index, "alias": alias } })
            }
            AliasAction::Remove { index, alias } => {
                json!({ "remove": { "index": index, "alias": alias } })
            }
        }
    }
}

/// Alias manager.
#[derive(Clone, Debug)]
pub struct AliasManager {
    client: ElasticClient,
}

impl AliasManager {
    /// Create a new alias manager.
    pub(crate) fn new(client: ElasticClient) -> Self {
        Self { client }
    }

    /// Names of the indices an alias points at.
    pub async fn indices_for_alias(&self, alias: &str) -> Result<Vec<String>> {
        debug!(alias, "Resolving alias");

        let response = self
            .client
            .send(TransportRequest::new(Method::Get, request_path(&[alias, "_alias"])))
            .await?;

        if !response.is_success() {
            return Err(failed(ElasticError::Search {
                message: reason(&response.body),
                status: response.status,
            }));
        }

        Ok(response
            .body
            .as_object()
            .map(|indices| indices.keys().cloned().collect())
            .unwrap_or_default())
    }

    /// Point `alias` at `index`.
    pub async fn add(&self, index: &str, alias: &str) -> Result<bool> {
        self.run_actions(&[AliasAction::add(index, alias)]).await?;
        Ok(true)
    }

    /// Detach `alias` from `index`.
    pub async fn remove(&self, index: &str, alias: &str) -> Result<bool> {
        self.run_actions(&[AliasAction::remove(index, alias)]).await?;
        Ok(true)
    }

    /// Move `alias` to `new_index` in one atomic update.
    ///
    /// Without `old_index`, the first index the alias currently points at is
    /// detached.
    pub async fn replace(&self, alias: &str, new_index: &str, old_index: Option<&str>) -> Result<bool> {
        let old_index = match old_index {
            Some(index) => index.to_string(),
            None => self
                .indices_for_alias(alias)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| ElasticError::validation("Old index is not defined."))?,
        };

        self.run_actions(&[
            AliasAction::add(new_index, alias),
            AliasAction::remove(old_index, alias),
        ])
        .await?;
        Ok(true)
    }

    /// Run alias actions atomically and return the acknowledgement.
    pub async fn run_actions(&self, actions: &[AliasAction]) -> Result<Value> {
        info!(actions = actions.len(), "Updating aliases");

        let body = json!({ "actions": actions.iter().map(AliasAction::to_json).collect::<Vec<_>>() });
        let response = self
            .client
            .send(TransportRequest::new(Method::Post, "_aliases").json(body))
            .await?;

        if !response.is_success() {
            return Err(failed(ElasticError::Update {
                message: raw(&response.body),
                status: response.status,
            }));
        }

        Ok(response.body)
    }
}
