//! Error types for Elasticsearch operations.

use thiserror::Error;

/// Elasticsearch error type.
///
/// Every HTTP-level failure carries the message reported by the engine (or the
/// raw error payload) together with the response status code.
#[derive(Error, Debug)]
pub enum ElasticError {
    /// A search, count or bulk request was rejected.
    #[error("Search failed [{status}]: {message}")]
    Search {
        /// Engine reason.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// Fetching a single document failed.
    #[error("Find failed [{status}]: {message}")]
    Find {
        /// Engine reason.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// Writing a new document failed.
    #[error("Index failed [{status}]: {message}")]
    Index {
        /// Raw error payload.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// Updating a document failed.
    #[error("Update failed [{status}]: {message}")]
    Update {
        /// Raw error payload.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// Deleting a document failed.
    #[error("Delete failed [{status}]: {message}")]
    Delete {
        /// Raw error payload.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// The document does not exist.
    #[error("Not found [{status}]: {message}")]
    NotFound {
        /// Description or raw error payload.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// The target index does not exist.
    #[error("Index not found [{status}]: {message}")]
    IndexNotFound {
        /// Engine reason.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// Optimistic concurrency check failed.
    #[error("Version conflict [{status}]: {message}")]
    Conflict {
        /// Raw error payload.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// A successful response did not have the shape the engine guarantees.
    #[error("Unexpected response [{status}]: {message}")]
    Core {
        /// What was missing or malformed.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// Validation error raised before any request is sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The HTTP transport failed before a response was received.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl ElasticError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a contract violation error.
    pub fn core(msg: impl Into<String>) -> Self {
        Self::Core {
            message: msg.into(),
            status: 500,
        }
    }

    /// HTTP status code associated with the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Search { status, .. }
            | Self::Find { status, .. }
            | Self::Index { status, .. }
            | Self::Update { status, .. }
            | Self::Delete { status, .. }
            | Self::NotFound { status, .. }
            | Self::IndexNotFound { status, .. }
            | Self::Conflict { status, .. }
            | Self::Core { status, .. } => Some(*status),
            Self::Validation(_) | Self::Serialization(_) | Self::Transport(_) => None,
        }
    }

    /// Message carried by the failure.
    pub fn message(&self) -> String {
        match self {
            Self::Search { message, .. }
            | Self::Find { message, .. }
            | Self::Index { message, .. }
            | Self::Update { message, .. }
            | Self::Delete { message, .. }
            | Self::NotFound { message, .. }
            | Self::IndexNotFound { message, .. }
            | Self::Conflict { message, .. }
            | Self::Core { message, .. } => message.clone(),
            Self::Validation(message) | Self::Transport(message) => message.clone(),
            Self::Serialization(e) => e.to_string(),
        }
    }

    /// Whether this is a document or index not-found failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::IndexNotFound { .. })
    }
}

impl From<opensearch::Error> for ElasticError {
    fn from(e: opensearch::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

/// Result type alias for Elasticsearch operations.
pub type Result<T> = std::result::Result<T, ElasticError>;
