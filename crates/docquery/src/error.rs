//! Error types for the document query client

use serde::Serialize;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Client errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File rejected at selection time
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Upload transport failed (network, status or missing locator)
    #[error("Upload failed: {0}")]
    Upload(String),

    /// File was stored but the backend could not index it
    #[error("Indexing failed: {0}")]
    Indexing(String),

    /// Query transport failed (network, status or malformed body)
    #[error("Query failed: {0}")]
    Query(String),

    /// Question submitted before any document reached Ready
    #[error("No document is ready to query")]
    NoDocument,

    /// Question was empty after trimming
    #[error("Question is empty")]
    EmptyQuestion,

    /// Another operation holds the session
    #[error("Busy: {0} already in progress")]
    Busy(&'static str),

    /// Auxiliary backend call (startup lookup, reset, health)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Recipe API error
    #[error("Recipe lookup failed: {0}")]
    Recipe(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// User-facing failure category carried by notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Upload,
    Indexing,
    Query,
    Precondition,
    Backend,
    Recipe,
    Other,
}

impl FailureKind {
    /// Short label used in notifications
    pub fn label(&self) -> &'static str {
        match self {
            FailureKind::Upload => "upload failed",
            FailureKind::Indexing => "indexing failed",
            FailureKind::Query => "query failed",
            FailureKind::Precondition => "no document",
            FailureKind::Backend => "backend error",
            FailureKind::Recipe => "recipe failed",
            FailureKind::Other => "error",
        }
    }
}

impl Error {
    /// Create an upload error
    pub fn upload(message: impl Into<String>) -> Self {
        Self::Upload(message.into())
    }

    /// Create an indexing error
    pub fn indexing(message: impl Into<String>) -> Self {
        Self::Indexing(message.into())
    }

    /// Create a query error
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query(message.into())
    }

    /// Create a backend error
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Create a recipe error
    pub fn recipe(message: impl Into<String>) -> Self {
        Self::Recipe(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Category of this failure for user-visible reporting
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Upload(_) | Error::UnsupportedFileType(_) => FailureKind::Upload,
            Error::Indexing(_) => FailureKind::Indexing,
            Error::Query(_) | Error::EmptyQuestion => FailureKind::Query,
            Error::NoDocument => FailureKind::Precondition,
            Error::Backend(_) => FailureKind::Backend,
            Error::Recipe(_) => FailureKind::Recipe,
            Error::Config(_)
            | Error::Busy(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::Http(_)
            | Error::Internal(_) => FailureKind::Other,
        }
    }
}
