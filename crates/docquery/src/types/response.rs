//! Response bodies returned by the document backend

use serde::{Deserialize, Serialize};

/// Body of a successful `POST /upload`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Server-assigned locator; missing means the upload failed
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl UploadResponse {
    /// Locator, treating an empty or blank value as missing
    pub fn locator(&self) -> Option<&str> {
        self.file_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// Body of a successful `POST /query`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub response: String,
}

/// Body of `GET /check-uploads`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckUploadsResponse {
    #[serde(default)]
    pub files: Vec<String>,
}

/// Error body the backend attaches to failures (`{"error": "..."}`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Best detail available from a raw failure body
    pub fn detail(raw: &str) -> Option<String> {
        let body: ErrorBody = serde_json::from_str(raw).ok()?;
        body.error.or(body.message)
    }
}
