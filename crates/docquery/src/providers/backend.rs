//! Document backend trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::UploadFile;

/// The three workflow transports plus the auxiliary backend calls
///
/// Implementations:
/// - `HttpBackend`: the Flask-style HTTP API (`/upload`, `/populate`, `/query`)
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Upload one file and return its server-assigned locator
    ///
    /// Every failure, including a body without a locator, is `Error::Upload`.
    async fn upload(&self, file: &UploadFile) -> Result<String>;

    /// Ask the backend to index the file at `locator`
    ///
    /// Failures are `Error::Indexing`.
    async fn populate(&self, locator: &str) -> Result<()>;

    /// Ask a question against the indexed document and return the answer text
    ///
    /// Failures are `Error::Query`.
    async fn query(&self, question: &str) -> Result<String>;

    /// List files the backend already holds (empty when it has none)
    async fn check_uploads(&self) -> Result<Vec<String>>;

    /// Clear the backend's index
    async fn reset(&self) -> Result<()>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}
